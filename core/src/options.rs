//! Client configuration and the per-request transport option set.
//!
//! # Design
//! `ClientConfig` is the persistent base a client is built with. It is never
//! mutated after construction. Each call derives a brand new
//! `TransportOptions` from it, so method markers from one request cannot
//! survive into the next.

use serde::Deserialize;

/// Base configuration merged over the fixed defaults.
///
/// Missing fields in a deserialized config keep their default value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Capture the response header block in front of the body.
    pub capture_headers: bool,
    /// Record the outgoing request header block.
    pub trace_request_headers: bool,
    pub forbid_reuse: bool,
    pub fresh_connect: bool,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    /// Redirects the transport may follow on its own. 0 disables following.
    pub max_redirects: u32,
    pub user_agent: Option<String>,
    pub max_response_bytes: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            capture_headers: true,
            trace_request_headers: true,
            forbid_reuse: true,
            fresh_connect: true,
            timeout_ms: None,
            connect_timeout_ms: None,
            max_redirects: 0,
            user_agent: None,
            max_response_bytes: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Mutually exclusive method markers. `Default` is the cleared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDirectives {
    pub http_get: bool,
    pub post: bool,
    pub post_fields: Option<Vec<u8>>,
    pub custom_request: Option<String>,
    pub no_body: bool,
}

/// Everything the transport needs for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub method: MethodDirectives,
    /// Complete `Name: v1, v2` lines, one per request header.
    pub header_lines: Vec<String>,
    pub url: String,
    pub port: u16,
    /// Raw `user:password` taken from the URI.
    pub credentials: Option<String>,
    pub capture_headers: bool,
    pub trace_request_headers: bool,
    pub forbid_reuse: bool,
    pub fresh_connect: bool,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_redirects: u32,
    pub user_agent: Option<String>,
    pub max_response_bytes: Option<u64>,
}

impl TransportOptions {
    /// Option set holding only the base configuration, with no request
    /// specific directives.
    pub fn seeded(config: &ClientConfig) -> Self {
        Self {
            method: MethodDirectives::default(),
            header_lines: Vec::new(),
            url: String::new(),
            port: 80,
            credentials: None,
            capture_headers: config.capture_headers,
            trace_request_headers: config.trace_request_headers,
            forbid_reuse: config.forbid_reuse,
            fresh_connect: config.fresh_connect,
            timeout_ms: config.timeout_ms,
            connect_timeout_ms: config.connect_timeout_ms,
            max_redirects: config.max_redirects,
            user_agent: config.user_agent.clone(),
            max_response_bytes: config.max_response_bytes,
        }
    }

    /// The method token that goes on the wire.
    pub fn wire_method(&self) -> &str {
        if let Some(custom) = &self.method.custom_request {
            custom
        } else if self.method.post {
            "POST"
        } else {
            "GET"
        }
    }
}
