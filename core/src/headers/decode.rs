// ## 📂 File: `src/headers/decode.rs`
//! src/headers/decode.rs
//!
//! Header decoding.
//!
//! Design notes:
//! - Requires the full 8 bytes; a short buffer is a format error, not EOF.
//! - Magic is checked before the chunk size is looked at.
//! - Treat the header as the authoritative source for chunk sizing.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::MAGIC_OWO1;
use crate::headers::types::{ChunkSize, HeaderError, HeaderV1};

/// Deserialize an 8-byte header.
///
/// # Returns
/// - `Ok(HeaderV1)` if the tag matches and the chunk size is in range.
/// - `Err(HeaderError::Truncated)` if fewer than 8 bytes are supplied.
/// - `Err(HeaderError::InvalidMagic)` if the tag does not match.
/// - `Err(HeaderError::InvalidChunkSize)` if the chunk size is 0 or above 1 GiB.
#[inline]
pub fn decode_header(buf: &[u8]) -> Result<HeaderV1, HeaderError> {
    if buf.len() < HeaderV1::LEN {
        return Err(HeaderError::Truncated { have: buf.len(), need: HeaderV1::LEN });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);
    if magic != MAGIC_OWO1 {
        return Err(HeaderError::InvalidMagic { have: magic, need: MAGIC_OWO1 });
    }

    let chunk_size = ChunkSize::new(BigEndian::read_u32(&buf[4..8]))?;
    Ok(HeaderV1 { magic, chunk_size })
}
