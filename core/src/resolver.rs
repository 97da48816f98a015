//! Derives a `TransportOptions` value from a request.
//!
//! # Design
//! Resolution is pure data construction: the option set starts from
//! `TransportOptions::seeded`, whose method markers are all cleared, and the
//! request fills in the rest. PUT rides on the POST transfer with an
//! overridden method token, which is what ends up on the wire.

use url::Url;

use crate::codec;
use crate::error::HttpClientError;
use crate::http::{Body, Method, Request};
use crate::options::{ClientConfig, MethodDirectives, TransportOptions};
use crate::Result;

const NOT_SEEKABLE: &str = "The request body is not seekable";

/// Build the option set for `request` on top of `config`.
///
/// Fails before anything touches the network when the method is unsupported
/// or a body-carrying method has a body that cannot be rewound.
pub fn resolve(config: &ClientConfig, request: &mut Request) -> Result<TransportOptions> {
    let method = resolve_method(&request.method, &mut request.body)?;
    let target = resolve_uri(&request.uri);

    Ok(TransportOptions {
        method,
        header_lines: codec::encode_headers(&request.headers),
        url: target.url,
        port: target.port,
        credentials: target.credentials,
        ..TransportOptions::seeded(config)
    })
}

/// Map a method token onto transport method markers.
pub fn resolve_method(token: &str, body: &mut Body) -> Result<MethodDirectives> {
    let Some(method) = Method::from_token(token) else {
        return Err(HttpClientError::InvalidMethod(token.to_string()));
    };

    let directives = match method {
        Method::Get => MethodDirectives {
            http_get: true,
            ..Default::default()
        },
        Method::Post => MethodDirectives {
            post: true,
            post_fields: Some(rewound_contents(body)?),
            ..Default::default()
        },
        Method::Put => MethodDirectives {
            post: true,
            post_fields: Some(rewound_contents(body)?),
            custom_request: Some(Method::Put.as_str().to_string()),
            ..Default::default()
        },
        Method::Patch | Method::Delete => MethodDirectives {
            custom_request: Some(method.as_str().to_string()),
            ..Default::default()
        },
        Method::Head => MethodDirectives {
            custom_request: Some(Method::Head.as_str().to_string()),
            no_body: true,
            ..Default::default()
        },
    };

    Ok(directives)
}

fn rewound_contents(body: &mut Body) -> Result<Vec<u8>> {
    if !body.is_seekable() {
        return Err(HttpClientError::InvalidBody(NOT_SEEKABLE.to_string()));
    }
    body.contents()
        .map_err(|e| HttpClientError::InvalidBody(format!("The request body could not be read: {e}")))
}

/// URL, port and credentials derived from a request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub port: u16,
    pub credentials: Option<String>,
}

pub fn resolve_uri(uri: &Url) -> Target {
    Target {
        url: uri.as_str().to_string(),
        port: derive_port(uri),
        credentials: user_info(uri),
    }
}

/// Explicit port first, then 443 for https, otherwise 80.
///
/// `Url::port` hides ports equal to the scheme default, so `http://h:80`
/// and `https://h:443` land on the same values through the fallback.
///
/// The PHP client this replaces forced 443 for every https URI, explicit
/// port or not; here `https://h:8443` keeps 8443.
pub fn derive_port(uri: &Url) -> u16 {
    match uri.port() {
        Some(port) => port,
        None if uri.scheme() == "https" => 443,
        None => 80,
    }
}

fn user_info(uri: &Url) -> Option<String> {
    match (uri.username(), uri.password()) {
        ("", None) => None,
        (user, None) => Some(user.to_string()),
        (user, Some(password)) => Some(format!("{user}:{password}")),
    }
}
