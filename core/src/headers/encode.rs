// ## 📂 File: `src/headers/encode.rs`
//! src/headers/encode.rs
//!
//! Header encoding.
//!
//! Design notes:
//! - Serializes `HeaderV1` into a fixed 8-byte buffer, big-endian.
//! - `ChunkSize` is already range-checked, so encoding cannot fail.

use byteorder::{BigEndian, ByteOrder};

use crate::headers::types::HeaderV1;

/// Serialize a `HeaderV1` into its 8-byte wire form.
#[inline]
pub fn encode_header(h: &HeaderV1) -> [u8; HeaderV1::LEN] {
    let mut out = [0u8; HeaderV1::LEN];
    out[0..4].copy_from_slice(&h.magic); // 0..4 magic
    BigEndian::write_u32(&mut out[4..8], h.chunk_size.get()); // 4..8 chunk size
    out
}

impl HeaderV1 {
    pub fn encode(&self) -> [u8; HeaderV1::LEN] {
        encode_header(self)
    }
}
