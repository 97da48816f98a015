//! Transport engines that execute a resolved option set.
//!
//! # Design
//! A transport receives a finished `TransportOptions` and performs exactly
//! one exchange. It hands back the response as a single combined buffer
//! (header block followed by body) together with the byte lengths needed to
//! cut it apart again. Socket I/O, TLS and redirects all live here; the
//! client never looks inside a connection.
//!
//! `UreqTransport` is the default engine. It builds a new agent for every
//! call, so nothing is pooled between requests.

use std::io::ErrorKind;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ureq::http;
use url::Url;

use crate::options::TransportOptions;

/// Failure codes, numbered like libcurl's so callers can branch on them.
pub mod code {
    pub const UNKNOWN: u32 = 1;
    pub const FAILED_INIT: u32 = 2;
    pub const URL_MALFORMAT: u32 = 3;
    pub const COULDNT_RESOLVE_HOST: u32 = 6;
    pub const COULDNT_CONNECT: u32 = 7;
    pub const OPERATION_TIMEDOUT: u32 = 28;
    pub const SSL_CONNECT_ERROR: u32 = 35;
    pub const TOO_MANY_REDIRECTS: u32 = 47;
    pub const RECV_ERROR: u32 = 56;
    pub const FILESIZE_EXCEEDED: u32 = 63;
}

/// Raw outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Header block and body, concatenated.
    pub buffer: Vec<u8>,
    pub header_size: usize,
    pub download_size: usize,
    pub status: u16,
    /// Outgoing request header block, present when tracing is enabled.
    ///
    /// Rebuilt from the option set, so headers the engine adds on its own
    /// (`Accept-Encoding`, `Content-Length` and the like) are not included.
    pub request_header: Option<String>,
}

/// Transport-level failure with the engine's own message and code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct TransportFailure {
    pub message: String,
    pub code: u32,
}

impl TransportFailure {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// A blocking engine that performs one request per call.
pub trait Transport: Send + Sync {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse, TransportFailure>;
}

/// Default engine backed by `ureq`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }

    fn agent(options: &TransportOptions) -> ureq::Agent {
        let mut builder = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(options.max_redirects);
        if let Some(ms) = options.timeout_ms {
            builder = builder.timeout_global(Some(Duration::from_millis(ms)));
        }
        if let Some(ms) = options.connect_timeout_ms {
            builder = builder.timeout_connect(Some(Duration::from_millis(ms)));
        }
        builder.build().new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, options: &TransportOptions) -> Result<RawResponse, TransportFailure> {
        let url = target_url(options)?;
        let lines = outgoing_header_lines(options);

        let mut builder = http::Request::builder()
            .method(options.wire_method())
            .uri(url.as_str());
        for line in &lines {
            let (name, value) = line.split_once(':').unwrap_or((line.as_str(), ""));
            builder = builder.header(name.trim(), value.trim());
        }

        let request_header = options
            .trace_request_headers
            .then(|| request_trace(options.wire_method(), &url, &lines));

        let agent = Self::agent(options);
        let result = match &options.method.post_fields {
            Some(fields) => agent.run(builder.body(fields.clone()).map_err(init_failure)?),
            None => agent.run(builder.body(()).map_err(init_failure)?),
        };
        let mut response = result.map_err(failure_from)?;

        let status = response.status().as_u16();
        let head = if options.capture_headers {
            response_head(&response)
        } else {
            String::new()
        };

        let body = if options.method.no_body {
            Vec::new()
        } else {
            let body = response.body_mut();
            match options.max_response_bytes {
                Some(limit) => body.with_config().limit(limit).read_to_vec(),
                None => body.with_config().limit(u64::MAX).read_to_vec(),
            }
            .map_err(failure_from)?
        };

        let header_size = head.len();
        let download_size = body.len();
        let mut buffer = head.into_bytes();
        buffer.extend_from_slice(&body);

        Ok(RawResponse {
            buffer,
            header_size,
            download_size,
            status,
            request_header,
        })
    }
}

/// URL with the resolved port applied and user info removed; credentials
/// travel as an authorization header instead.
fn target_url(options: &TransportOptions) -> Result<Url, TransportFailure> {
    let mut url = Url::parse(&options.url)
        .map_err(|e| TransportFailure::new(code::URL_MALFORMAT, format!("URL rejected: {e}")))?;
    if url.set_port(Some(options.port)).is_err() {
        return Err(TransportFailure::new(
            code::URL_MALFORMAT,
            format!("URL rejected: cannot set port on {}", options.url),
        ));
    }
    let _ = url.set_username("");
    let _ = url.set_password(None);
    Ok(url)
}

fn has_line(lines: &[String], name: &str) -> bool {
    lines.iter().any(|line| {
        line.split_once(':')
            .is_some_and(|(existing, _)| existing.trim().eq_ignore_ascii_case(name))
    })
}

/// Request header lines plus the ones implied by the option set. Lines the
/// caller already supplied are never overridden.
fn outgoing_header_lines(options: &TransportOptions) -> Vec<String> {
    let mut lines = options.header_lines.clone();
    if let Some(credentials) = &options.credentials {
        if !has_line(&lines, "authorization") {
            lines.push(format!("Authorization: Basic {}", BASE64.encode(credentials)));
        }
    }
    if options.method.post_fields.is_some() && !has_line(&lines, "content-type") {
        lines.push("Content-Type: application/x-www-form-urlencoded".to_string());
    }
    if let Some(agent) = &options.user_agent {
        if !has_line(&lines, "user-agent") {
            lines.push(format!("User-Agent: {agent}"));
        }
    }
    if (options.forbid_reuse || options.fresh_connect) && !has_line(&lines, "connection") {
        lines.push("Connection: close".to_string());
    }
    lines
}

fn request_trace(method: &str, url: &Url, lines: &[String]) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    let host = match url.port() {
        Some(port) => format!("{}:{port}", url.host_str().unwrap_or_default()),
        None => url.host_str().unwrap_or_default().to_string(),
    };

    let mut block = format!("{method} {target} HTTP/1.1\r\nHost: {host}\r\n");
    for line in lines {
        block.push_str(line);
        block.push_str("\r\n");
    }
    block.push_str("\r\n");
    block
}

/// Status line and header lines as they would appear on the wire.
fn response_head<B>(response: &http::Response<B>) -> String {
    let status = response.status();
    let mut head = format!(
        "{:?} {} {}\r\n",
        response.version(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    for (name, value) in response.headers() {
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    head
}

fn init_failure(err: http::Error) -> TransportFailure {
    TransportFailure::new(code::FAILED_INIT, format!("Request rejected: {err}"))
}

fn failure_from(err: ureq::Error) -> TransportFailure {
    let code = match &err {
        ureq::Error::BadUri(_) => code::URL_MALFORMAT,
        ureq::Error::HostNotFound => code::COULDNT_RESOLVE_HOST,
        ureq::Error::ConnectionFailed => code::COULDNT_CONNECT,
        ureq::Error::Timeout(_) => code::OPERATION_TIMEDOUT,
        ureq::Error::TooManyRedirects => code::TOO_MANY_REDIRECTS,
        ureq::Error::Tls(_) => code::SSL_CONNECT_ERROR,
        ureq::Error::BodyExceedsLimit(_) => code::FILESIZE_EXCEEDED,
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                code::COULDNT_CONNECT
            }
            ErrorKind::TimedOut => code::OPERATION_TIMEDOUT,
            _ => code::RECV_ERROR,
        },
        _ => code::UNKNOWN,
    };
    TransportFailure::new(code, err.to_string())
}
