//! Loopback HTTP/1.1 server for probe tests. One behaviour per server.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    /// `200 OK` with the given `Content-Disposition`.
    Disposition(&'static str),
    /// `302` back to the requested path, forever.
    RedirectToSelf,
    NotFound,
    /// Accepts the connection and never answers.
    Silent,
}

/// Starts the server on a background thread; returns the base URL ending in '/'.
pub(crate) fn start(behavior: Behavior) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream, behavior));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: TcpStream, behavior: Behavior) {
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let response = match behavior {
        Behavior::Disposition(value) => format!(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nContent-Type: application/octet-stream\r\nContent-Disposition: {}\r\nConnection: close\r\n\r\n",
            value
        ),
        Behavior::RedirectToSelf => format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            path
        ),
        Behavior::NotFound => {
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
        }
        Behavior::Silent => {
            // Hold the socket open past any probe timeout used in tests.
            thread::sleep(Duration::from_secs(60));
            return;
        }
    };
    let _ = stream.write_all(response.as_bytes());
}
