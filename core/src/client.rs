//! Blocking client that runs one request through a transport.
//!
//! # Design
//! `Client` holds only its base `ClientConfig` and a transport. Each
//! `send_request` call resolves a fresh option set, performs one blocking
//! exchange, and assembles the response from the raw buffer. Because nothing
//! per-request is stored on the client, a single instance can be shared
//! between threads whenever its transport allows it.

use log::{debug, trace, warn};

use crate::codec;
use crate::http::{Request, Response};
use crate::options::ClientConfig;
use crate::resolver;
use crate::splitter;
use crate::transport::{RawResponse, Transport, UreqTransport};
use crate::Result;

/// Synchronous HTTP client.
#[derive(Debug, Clone)]
pub struct Client<T: Transport = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<UreqTransport> {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for Client<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `request` and wait for the complete response.
    ///
    /// Unsupported methods and non-rewindable bodies fail before the
    /// transport is invoked. Transport failures are returned with the
    /// engine's own code and message.
    pub fn send_request(&self, mut request: Request) -> Result<Response> {
        let options = resolver::resolve(&self.config, &mut request)?;
        debug!("sending {} {} (port {})", options.wire_method(), options.url, options.port);

        let raw = self.transport.execute(&options).map_err(|failure| {
            warn!("transport failed for {}: {failure}", options.url);
            failure
        })?;
        debug!("received status {} for {}", raw.status, options.url);

        Ok(assemble(raw))
    }
}

fn assemble(raw: RawResponse) -> Response {
    if let Some(block) = &raw.request_header {
        trace!("request header block:\n{block}");
    }
    let (header_block, body) = splitter::split_raw(&raw.buffer, raw.header_size, raw.download_size);
    let headers = codec::decode_headers(&String::from_utf8_lossy(header_block));
    trace!("decoded {} response headers", headers.len());

    let mut response = Response::new(raw.status).with_body(body.to_vec());
    for (name, values) in headers.iter() {
        response.headers.insert(name, values.iter().cloned());
    }
    response
}
