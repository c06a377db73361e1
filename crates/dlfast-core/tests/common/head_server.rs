//! Minimal HTTP/1.1 server answering HEAD requests for integration tests.
//!
//! Every path gets `200 OK` with an empty body. Paths registered with a
//! disposition also get a `Content-Disposition` header; `/missing*` paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Starts a server in a background thread. `dispositions` maps a request path
/// (e.g. "/report") to its `Content-Disposition` value. Returns the base URL
/// ending in '/'. The server runs until the process exits.
pub fn start(dispositions: &[(&str, &str)]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let table: Arc<HashMap<String, String>> = Arc::new(
        dispositions
            .iter()
            .map(|(path, value)| (path.to_string(), value.to_string()))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let table = Arc::clone(&table);
            thread::spawn(move || handle(stream, &table));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// Starts a server that accepts connections and never answers. The counter
/// tracks connections the client has not closed yet.
pub fn start_silent() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let open = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&open);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let mut buf = [0u8; 1024];
                // Drain until the client hangs up.
                while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
                counter.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });
    (format!("http://127.0.0.1:{}/", port), open)
}

fn handle(mut stream: TcpStream, table: &HashMap<String, String>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    if path.starts_with("/missing") {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    let disposition = table
        .get(path)
        .map(|v| format!("Content-Disposition: {}\r\n", v))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nContent-Type: application/octet-stream\r\n{}Connection: close\r\n\r\n",
        disposition
    );
    let _ = stream.write_all(response.as_bytes());
}
