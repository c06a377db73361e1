pub mod config;
pub mod logging;

pub mod control;
pub mod destination;
pub mod downloader;
pub mod fetch_head;
pub mod item;
pub mod resolver;
pub mod scheduler;
pub mod url_model;
