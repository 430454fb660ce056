//! Minimal HTTP client for a local Ollama instance.
//!
//! Speaks just enough HTTP to POST `/api/generate` with `stream: false` and
//! pull the `response` field out of the reply. Requests go out as HTTP/1.0
//! so the server answers with a plain body, but chunked replies are decoded
//! as well.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::coach::AnalysisError;

pub const DEFAULT_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_PORT: u16 = 11434;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESPONSE_BYTES: u64 = 1_048_576;

/// Where and how to reach the model.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    model: String,
    io_timeout: Duration,
}

impl OllamaClient {
    /// Client for `model` at `host`, with a 60 second timeout.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Read/write timeout for a single request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Configured host, as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a TCP connection to the host can be opened quickly.
    pub fn can_connect(&self) -> bool {
        match resolve(&self.host) {
            Ok((_, addr)) => TcpStream::connect_timeout(&addr, Duration::from_millis(300)).is_ok(),
            Err(_) => false,
        }
    }

    /// Send `prompt` and return the generated text.
    pub fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let (hostname, addr) = resolve(&self.host)?;

        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        })
        .to_string();

        let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| AnalysisError::Connection(e.to_string()))?;
        stream
            .set_read_timeout(Some(self.io_timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.io_timeout)))
            .map_err(|e| AnalysisError::Connection(e.to_string()))?;

        let request = format!(
            "POST /api/generate HTTP/1.0\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            hostname,
            body.len(),
            body
        );
        stream
            .write_all(request.as_bytes())
            .map_err(|e| AnalysisError::Connection(e.to_string()))?;

        let mut raw = String::new();
        stream
            .take(MAX_RESPONSE_BYTES)
            .read_to_string(&mut raw)
            .map_err(|e| AnalysisError::Connection(e.to_string()))?;

        tracing::debug!(model = %self.model, bytes = raw.len(), "ollama replied");
        parse_generate_response(&raw)
    }
}

fn resolve(host: &str) -> Result<(String, SocketAddr), AnalysisError> {
    let (hostname, port) = parse_host(host).map_err(AnalysisError::Connection)?;
    let addr = (hostname.as_str(), port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| AnalysisError::Connection(format!("failed to resolve {}", hostname)))?;
    Ok((hostname, addr))
}

/// Split `http://host:port`, `https://host:port` or `host:port` into its
/// parts. The port defaults to Ollama's 11434.
pub fn parse_host(host: &str) -> Result<(String, u16), String> {
    let h = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host)
        .trim_end_matches('/');
    let (hostname, port) = match h.split_once(':') {
        Some((name, port)) => (
            name,
            port.trim()
                .parse::<u16>()
                .map_err(|_| format!("invalid port `{}`", port))?,
        ),
        None => (h, DEFAULT_PORT),
    };
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err("empty hostname".to_string());
    }
    Ok((hostname.to_string(), port))
}

/// Status code of a `HTTP/1.1 200 OK` line, or an error for non-2xx and
/// malformed lines.
pub fn parse_http_status(status_line: &str) -> Result<u16, AnalysisError> {
    let mut parts = status_line.splitn(3, ' ');
    let code = parts
        .nth(1)
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| AnalysisError::MalformedResponse("invalid HTTP status line".into()))?;
    if (200..300).contains(&code) {
        Ok(code)
    } else {
        let reason = parts.next().unwrap_or("Unknown");
        Err(AnalysisError::Http(format!("{} {}", code, reason)))
    }
}

/// Pull the generated text out of a raw HTTP response.
pub fn parse_generate_response(raw: &str) -> Result<String, AnalysisError> {
    let status_line = raw
        .lines()
        .next()
        .ok_or_else(|| AnalysisError::MalformedResponse("empty response".into()))?;
    parse_http_status(status_line)?;

    let (headers, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| AnalysisError::MalformedResponse("missing HTTP body".into()))?;
    let body = if is_chunked(headers) {
        decode_chunked(body)?
    } else {
        body.to_string()
    };
    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
    value
        .get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| AnalysisError::MalformedResponse("missing response field".into()))
}

fn is_chunked(headers: &str) -> bool {
    headers.lines().skip(1).any(|line| {
        line.split_once(':').is_some_and(|(name, value)| {
            name.trim().eq_ignore_ascii_case("transfer-encoding")
                && value.to_ascii_lowercase().contains("chunked")
        })
    })
}

/// Join the chunks of a `Transfer-Encoding: chunked` body.
fn decode_chunked(body: &str) -> Result<String, AnalysisError> {
    let malformed = |msg: &str| AnalysisError::MalformedResponse(msg.to_string());
    let mut rest = body.as_bytes();
    let mut out = Vec::with_capacity(body.len());
    loop {
        let line_end = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| malformed("unterminated chunk size"))?;
        let size_line = std::str::from_utf8(&rest[..line_end])
            .map_err(|_| malformed("invalid chunk size"))?;
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| malformed("invalid chunk size"))?;
        rest = &rest[line_end + 2..];
        if size == 0 {
            break;
        }
        if rest.len() < size {
            return Err(malformed("truncated chunk"));
        }
        out.extend_from_slice(&rest[..size]);
        rest = &rest[size..];
        rest = rest.strip_prefix(b"\r\n").unwrap_or(rest);
    }
    String::from_utf8(out).map_err(|_| malformed("chunked body is not UTF-8"))
}
