//! Splits the transport's combined buffer into header block and body.
//!
//! The transport reports how many bytes belong to each part. Slicing by those
//! lengths is the only reliable cut: a body may itself contain an empty line.

/// Split a combined buffer into its header block and body.
///
/// Lengths come from the transport. A download length of 0 always yields an
/// empty body, even when the buffer holds more than the header block (HEAD).
/// Lengths beyond the buffer are clamped.
pub fn split_raw(raw: &[u8], header_len: usize, download_len: usize) -> (&[u8], &[u8]) {
    let header = &raw[..header_len.min(raw.len())];
    let body = if download_len == 0 {
        &raw[..0]
    } else {
        &raw[raw.len().saturating_sub(download_len)..]
    };
    (header, body)
}
