//! Blocking HTTP client built around a pluggable transport engine.
//!
//! # Overview
//! A `Request` is translated into a `TransportOptions` value, handed to a
//! `Transport` for a single blocking exchange, and the transport's combined
//! raw buffer is cut back into a `Response` with multi-value headers.
//!
//! # Design
//! - `Client` keeps only its base `ClientConfig`; the option set is rebuilt
//!   for every call, so requests never inherit each other's method markers.
//! - Supported methods form a closed `Method` enum; anything else is
//!   rejected before the transport runs.
//! - PUT is sent as a POST transfer with the method token overridden.
//! - The transport reports header and body byte lengths, and the buffer is
//!   sliced by those lengths rather than searched for a blank line.
//! - Header values are split on `", "` when decoding. See `codec` for the
//!   consequences for headers such as `Date`.
//!
//! # Example
//!
//! ```no_run
//! use http_client_core::{Client, Request};
//!
//! let client = Client::new();
//! let response = client.send_request(Request::get("http://localhost:3000/get")?)?;
//! assert_eq!(response.status, 200);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod options;
pub mod resolver;
pub mod splitter;
pub mod transport;

pub use client::Client;
pub use error::HttpClientError;
pub use http::{Body, Headers, Method, Request, Response};
pub use options::{ClientConfig, MethodDirectives, TransportOptions};
pub use transport::{RawResponse, Transport, TransportFailure, UreqTransport};

pub type Result<T> = std::result::Result<T, HttpClientError>;
