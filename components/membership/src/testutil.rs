//! Minimal HTTP/1.1 plumbing for in-process fake servers in tests.

use std::io::{self, Read, Write};
use std::net::TcpStream;

/// HttpRequest is one request as a fake server received it.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct HttpRequest {
    /// request line and headers, without the terminating blank line
    pub head: String,
    pub body: String,
}

impl HttpRequest {
    /// request_line returns e.g. "GET /v2/members HTTP/1.1".
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    /// route returns method and path, e.g. "GET /v2/members".
    pub fn route(&self) -> String {
        let mut words = self.request_line().split_whitespace();
        let method = words.next().unwrap_or_default();
        let path = words.next().unwrap_or_default();
        format!("{} {}", method, path)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head.lines().skip(1).find_map(|l| {
            if l.to_ascii_lowercase().starts_with(&prefix) {
                Some(l[prefix.len()..].trim().to_string())
            } else {
                None
            }
        })
    }
}

/// read_request reads a request head and a body of `Content-Length` bytes.
pub fn read_request(stream: &mut TcpStream) -> io::Result<HttpRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(p) = find(&buf, b"\r\n\r\n") {
            break p;
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let mut req = HttpRequest {
        head: String::from_utf8_lossy(&buf[..head_end]).to_string(),
        body: String::new(),
    };

    let content_len = req
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + 4 + content_len {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    req.body = String::from_utf8_lossy(&buf[head_end + 4..]).to_string();
    Ok(req)
}

/// write_response answers with `status` and `body` and asks the client to close.
pub fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> io::Result<()> {
    let resp = format!(
        "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes())?;
    stream.flush()
}

fn find(buf: &[u8], pat: &[u8]) -> Option<usize> {
    buf.windows(pat.len()).position(|w| w == pat)
}
