//! Header lines in both directions.
//!
//! # Known limitation
//! Decoding splits every header value on `", "`. Headers whose single value
//! legitimately contains that sequence (`Date`, `Expires`, `Set-Cookie` with
//! an expiry) come back as several values. Callers that need the original
//! text can rejoin with `Headers::get_line`.

use crate::http::Headers;

/// One `Name: v1, v2` line per header name, in header order.
pub fn encode_headers(headers: &Headers) -> Vec<String> {
    headers
        .iter()
        .map(|(name, values)| format!("{name}: {}", values.join(", ")))
        .collect()
}

/// Parse a raw header block into a name to values mapping.
///
/// Lines without a `:` (the status line, blank separators) are skipped. A
/// name seen more than once keeps only its last occurrence, which is what a
/// buffer holding several redirect hops needs.
pub fn decode_headers(block: &str) -> Headers {
    let terminator = if block.contains("\r\n") { "\r\n" } else { "\n" };
    let mut headers = Headers::new();

    for line in block.split(terminator) {
        let line = line.trim();
        if line.is_empty() || !line.contains(':') {
            continue;
        }

        let (name, raw_value) = match line.split_once(": ") {
            Some(pair) => pair,
            None => match line.split_once(':') {
                Some((name, value)) => (name, value.trim()),
                None => continue,
            },
        };

        headers.insert(name, raw_value.split(", "));
    }

    headers
}
