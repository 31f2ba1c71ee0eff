//! URI classification and inline `data:` payload decoding.

use crate::VfsError;
use crate::path;

/// How a URI found in a document should be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriKind<'a> {
    /// Inline `data:[<mime>][;base64],<payload>` URI.
    Data,
    /// `blob:<id>` object URL, looked up in the fetcher's blob registry.
    Blob(&'a str),
    /// `scheme://rest`, routed to the provider mounted under `scheme`.
    Absolute {
        /// URI scheme (`https`, `file`, ...).
        scheme: &'a str,
        /// Everything after `://`.
        rest: &'a str,
    },
    /// `/path`, resolved from the VFS root instead of the base path.
    Rooted(&'a str),
    /// Anything else, resolved against the document's base path.
    Relative(&'a str),
}

impl<'a> UriKind<'a> {
    /// Detect the URI kind by prefix.
    pub fn classify(uri: &'a str) -> Self {
        if uri.starts_with("data:") {
            return Self::Data;
        }
        if let Some(id) = uri.strip_prefix("blob:") {
            return Self::Blob(id);
        }
        if let Some((scheme, rest)) = uri.split_once("://")
            && is_scheme(scheme)
        {
            return Self::Absolute { scheme, rest };
        }
        if let Some(rooted) = uri.strip_prefix('/') {
            return Self::Rooted(rooted);
        }
        Self::Relative(uri)
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared MIME type (`application/octet-stream` when omitted).
    pub mime_type: String,
    /// Decoded payload bytes.
    pub data: Vec<u8>,
}

/// Parse a data URI (e.g., `data:application/octet-stream;base64,AAAA`).
pub fn decode_data_uri(uri: &str) -> Result<DataUri, VfsError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| VfsError::InvalidUri(format!("not a data URI: {uri}")))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| VfsError::InvalidUri("data URI without ',' separator".into()))?;

    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    let mime_type = if mime.is_empty() {
        "application/octet-stream".to_owned()
    } else {
        mime.to_owned()
    };

    let data = if is_base64 {
        base64_decode(payload)
            .ok_or_else(|| VfsError::InvalidUri("malformed base64 payload".into()))?
    } else {
        path::percent_decode_bytes(payload)
    };

    Ok(DataUri { mime_type, data })
}

/// Standard base64 decoder; ASCII whitespace is skipped.
fn base64_decode(input: &str) -> Option<Vec<u8>> {
    const TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    fn decode_char(c: u8) -> Option<u8> {
        TABLE.iter().position(|&b| b == c).map(|p| p as u8)
    }

    let input: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if input.len() % 4 == 1 {
        return None;
    }
    let mut result = Vec::with_capacity(input.len() * 3 / 4);

    for chunk in input.chunks(4) {
        let mut buf = [0u8; 4];
        let mut pad = 4 - chunk.len();

        for (i, &byte) in chunk.iter().enumerate() {
            if byte == b'=' {
                pad += 1;
            } else {
                buf[i] = decode_char(byte)?;
            }
        }

        result.push((buf[0] << 2) | (buf[1] >> 4));
        if pad < 2 {
            result.push((buf[1] << 4) | (buf[2] >> 2));
        }
        if pad < 1 {
            result.push((buf[2] << 6) | buf[3]);
        }
    }

    Some(result)
}
