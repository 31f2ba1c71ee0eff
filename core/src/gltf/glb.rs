//! Binary glTF (`.glb`) container.
//!
//! ```text
//! header: magic "glTF" | version u32 | total length u32     (12 bytes, LE)
//! chunk:  length u32   | type u32    | payload[length]      (repeated)
//! ```
//!
//! Exactly one JSON chunk, at most one BIN chunk, anything else skipped.

use super::error::GlbError;

/// `glTF` in little-endian.
pub const MAGIC: u32 = 0x4654_6C67;
/// `JSON` chunk tag.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// `BIN\0` chunk tag.
pub const CHUNK_BIN: u32 = 0x004E_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Borrowed view of a parsed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glb<'a> {
    /// Document JSON.
    pub json: &'a [u8],
    /// Embedded binary buffer.
    pub bin: Option<&'a [u8]>,
}

/// Whether `data` starts with the GLB magic.
pub fn is_glb(data: &[u8]) -> bool {
    read_u32(data, 0) == Some(MAGIC)
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

impl<'a> Glb<'a> {
    /// Split a container into its JSON and BIN chunks.
    pub fn from_slice(data: &'a [u8]) -> Result<Self, GlbError> {
        if data.len() < HEADER_LEN {
            return Err(GlbError::Truncated {
                needed: HEADER_LEN,
                available: data.len(),
            });
        }
        let magic = read_u32(data, 0).unwrap_or_default();
        if magic != MAGIC {
            return Err(GlbError::BadMagic(magic));
        }
        let version = read_u32(data, 4).unwrap_or_default();
        if version != 2 {
            return Err(GlbError::UnsupportedVersion(version));
        }
        let declared = read_u32(data, 8).unwrap_or_default() as usize;
        if declared > data.len() {
            return Err(GlbError::LengthMismatch {
                declared,
                available: data.len(),
            });
        }
        let data = &data[..declared];

        let mut json = None;
        let mut bin = None;
        let mut offset = HEADER_LEN;
        while offset < data.len() {
            let truncated = |needed| GlbError::Truncated {
                needed,
                available: data.len(),
            };
            let (Some(length), Some(tag)) = (read_u32(data, offset), read_u32(data, offset + 4))
            else {
                return Err(truncated(offset + CHUNK_HEADER_LEN));
            };
            let start = offset + CHUNK_HEADER_LEN;
            let end = start + length as usize;
            let payload = data.get(start..end).ok_or_else(|| truncated(end))?;

            match tag {
                CHUNK_JSON if json.is_some() => return Err(GlbError::DuplicateChunk("JSON")),
                CHUNK_JSON => json = Some(payload),
                CHUNK_BIN if bin.is_some() => return Err(GlbError::DuplicateChunk("BIN")),
                CHUNK_BIN => bin = Some(payload),
                other => log::debug!("Skipping GLB chunk 0x{other:08X} ({length} bytes)"),
            }
            offset = end;
        }

        Ok(Self {
            json: json.ok_or(GlbError::MissingJsonChunk)?,
            bin,
        })
    }
}

/// Assemble a container from chunks. Payloads are padded to four bytes
/// (JSON with spaces, everything else with zeros).
pub fn build(chunks: &[(u32, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in chunks {
        let pad = (4 - payload.len() % 4) % 4;
        let fill = if *tag == CHUNK_JSON { b' ' } else { 0 };
        body.extend_from_slice(&((payload.len() + pad) as u32).to_le_bytes());
        body.extend_from_slice(&tag.to_le_bytes());
        body.extend_from_slice(payload);
        body.extend(std::iter::repeat_n(fill, pad));
    }
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&((HEADER_LEN + body.len()) as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &[u8] = br#"{"asset":{"version":"2.0"}}"#;

    #[test]
    fn magic_sniff() {
        assert!(is_glb(b"glTF\x02\0\0\0"));
        assert!(!is_glb(b"{\"asset\""));
        assert!(!is_glb(b"gl"));
    }

    #[test]
    fn json_and_bin() {
        let data = build(&[(CHUNK_JSON, JSON), (CHUNK_BIN, &[1, 2, 3, 4])]);
        let glb = Glb::from_slice(&data).unwrap();
        assert_eq!(glb.json.trim_ascii_end(), JSON);
        assert_eq!(glb.bin, Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn unknown_chunk_between_json_and_bin_is_skipped() {
        let data = build(&[
            (CHUNK_JSON, JSON),
            (0x5458_4554, b"ignored payload"),
            (CHUNK_BIN, &[9, 8, 7, 6, 5, 4, 3, 2]),
        ]);
        let glb = Glb::from_slice(&data).unwrap();
        assert_eq!(glb.json.trim_ascii_end(), JSON);
        assert_eq!(glb.bin, Some(&[9u8, 8, 7, 6, 5, 4, 3, 2][..]));
    }

    #[test]
    fn header_errors() {
        assert!(matches!(
            Glb::from_slice(b"glTF"),
            Err(GlbError::Truncated { .. })
        ));

        let mut data = build(&[(CHUNK_JSON, JSON)]);
        data[0] = b'x';
        assert!(matches!(Glb::from_slice(&data), Err(GlbError::BadMagic(_))));

        let mut data = build(&[(CHUNK_JSON, JSON)]);
        data[4] = 1;
        assert_eq!(Glb::from_slice(&data), Err(GlbError::UnsupportedVersion(1)));

        let mut data = build(&[(CHUNK_JSON, JSON)]);
        data[8] = data[8].wrapping_add(100);
        assert!(matches!(
            Glb::from_slice(&data),
            Err(GlbError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn chunk_errors() {
        let data = build(&[(CHUNK_BIN, &[0; 4])]);
        assert_eq!(Glb::from_slice(&data), Err(GlbError::MissingJsonChunk));

        let data = build(&[(CHUNK_JSON, JSON), (CHUNK_JSON, JSON)]);
        assert_eq!(Glb::from_slice(&data), Err(GlbError::DuplicateChunk("JSON")));

        // chunk length pointing past the end
        let mut data = build(&[(CHUNK_JSON, JSON)]);
        data[12] = 0xFF;
        assert!(matches!(
            Glb::from_slice(&data),
            Err(GlbError::Truncated { .. })
        ));
    }
}
