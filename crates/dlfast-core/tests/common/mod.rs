#![allow(dead_code)]

#[cfg(unix)]
pub mod fake_downloader;
pub mod head_server;
