//! Minimal scripted HTTP server for exercising the client over a real
//! socket. Serves one canned response per expected request, records what
//! arrived, and shuts down once the script is exhausted, so tests can
//! assert exact request counts.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct MockServer {
    pub base_url: String,
    handle: thread::JoinHandle<Vec<RecordedRequest>>,
}

impl MockServer {
    pub fn spawn(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let mut records = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().expect("accept");
                records.push(read_request(&mut stream));
                write_response(&mut stream, &response);
            }
            records
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    /// Wait for the script to finish and return everything the server saw.
    pub fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().expect("mock server thread")
    }
}

fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];

    // Read until the end of headers.
    let header_end = loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            break raw.len();
        }
        raw.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&raw) {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = headers.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let content_length = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .next()
        .unwrap_or(0);

    let body_start = header_end + 4;
    let mut body = raw[body_start.min(raw.len())..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).expect("read body");
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    RecordedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn write_response(stream: &mut TcpStream, response: &MockResponse) {
    let reason = match response.status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    };

    let payload = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );

    stream.write_all(payload.as_bytes()).expect("write response");
    let _ = stream.flush();
}
