//! Request and response values exchanged with the client.
//!
//! # Design
//! These types describe HTTP messages as plain data. The client never keeps
//! them across calls: a `Request` is consumed by `Client::send_request` and a
//! fresh `Response` is handed back. Header names are compared
//! case-insensitively but stored with the spelling they were inserted with.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

use serde::de::DeserializeOwned;
use url::Url;

/// Request methods the client knows how to map onto the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    /// Exact, case-sensitive match on the uppercase method token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            "HEAD" => Some(Method::Head),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header mapping of name to values.
///
/// Lookups ignore ASCII case. Replacing a header keeps the position of the
/// first insertion, so iteration follows the order names were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// Set `name` to `values`, replacing whatever was there before.
    pub fn insert<N, I, V>(&mut self, name: N, values: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, values),
            None => self.entries.push((name, values)),
        }
    }

    /// Add one value to `name`, creating the header if needed.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    /// All values of `name` joined with ", ".
    pub fn get_line(&self, name: &str) -> Option<String> {
        self.get(name).map(|values| values.join(", "))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Object-safe alias for readers that can rewind.
pub trait SeekRead: Read + Seek + Send {}

impl<T: Read + Seek + Send> SeekRead for T {}

/// A request payload.
///
/// Everything except `Stream` can be rewound, which is what methods that
/// transmit a body require.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    Seekable(Box<dyn SeekRead>),
    Stream(Box<dyn Read + Send>),
}

impl Body {
    pub fn seekable<R: Read + Seek + Send + 'static>(reader: R) -> Self {
        Body::Seekable(Box::new(reader))
    }

    pub fn stream<R: Read + Send + 'static>(reader: R) -> Self {
        Body::Stream(Box::new(reader))
    }

    pub fn is_seekable(&self) -> bool {
        !matches!(self, Body::Stream(_))
    }

    /// Read the whole payload, rewinding first when the body supports it.
    pub fn contents(&mut self) -> io::Result<Vec<u8>> {
        match self {
            Body::Empty => Ok(Vec::new()),
            Body::Bytes(bytes) => Ok(bytes.clone()),
            Body::Seekable(reader) => {
                reader.seek(SeekFrom::Start(0))?;
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
            Body::Stream(reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Body::Seekable(_) => f.write_str("Seekable(..)"),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&[u8]> for Body {
    fn from(bytes: &[u8]) -> Self {
        Body::Bytes(bytes.to_vec())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Bytes(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Bytes(text.as_bytes().to_vec())
    }
}

/// An outgoing request.
///
/// `method` is kept as the raw token so unsupported methods can be expressed
/// and rejected by the client rather than by the type system.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub uri: Url,
    pub headers: Headers,
    pub body: Body,
}

impl Request {
    pub fn new(method: impl Into<String>, uri: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            method: method.into(),
            uri: Url::parse(uri)?,
            headers: Headers::new(),
            body: Body::Empty,
        })
    }

    pub fn get(uri: &str) -> Result<Self, url::ParseError> {
        Self::new("GET", uri)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }
}

/// A response assembled from one transport exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.headers.insert(name, values);
        self
    }

    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
