// ## 📂 File: `src/headers/types.rs`

//! headers/types.rs
//! Core header struct, validated chunk size and header errors.
//!
//! Notes:
//! - The header is 8 bytes, fixed length: magic tag + chunk size.
//! - Multi-byte integers are big-endian on the wire.
//! - The chunk size is the plaintext length of every chunk except possibly the last.

use thiserror::Error;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, FILE_CHUNK_CAP, HEADER_LEN_V1, MAGIC_OWO1, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE,
    SEAL_OVERHEAD,
};

/// Plaintext chunk size, guaranteed to lie in `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSize(u32);

impl ChunkSize {
    /// Validate a raw chunk size.
    pub fn new(raw: u32) -> Result<Self, HeaderError> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&raw) {
            return Err(HeaderError::InvalidChunkSize {
                have: raw,
                min: MIN_CHUNK_SIZE,
                max: MAX_CHUNK_SIZE,
            });
        }
        Ok(Self(raw))
    }

    /// Chunk size used for whole-file encryption: the input length, capped at
    /// `FILE_CHUNK_CAP`, and never below `MIN_CHUNK_SIZE` (empty inputs still
    /// need a decodable header).
    pub fn for_input_len(len: u64) -> Self {
        let capped = len.min(FILE_CHUNK_CAP as u64) as u32;
        Self(capped.max(MIN_CHUNK_SIZE))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Plaintext bytes per chunk as a buffer length.
    #[inline]
    pub fn plaintext_len(self) -> usize {
        self.0 as usize
    }

    /// Wire bytes of a full sealed chunk.
    #[inline]
    pub fn sealed_len(self) -> usize {
        self.0 as usize + SEAL_OVERHEAD
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self(DEFAULT_CHUNK_SIZE)
    }
}

impl TryFrom<u32> for ChunkSize {
    type Error = HeaderError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

/// Stream header, format 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV1 {
    pub magic: [u8; 4],        // "OwO1" magic marker
    pub chunk_size: ChunkSize, // plaintext bytes per chunk
}

impl HeaderV1 {
    pub const LEN: usize = HEADER_LEN_V1;

    pub fn new(chunk_size: ChunkSize) -> Self {
        Self { magic: MAGIC_OWO1, chunk_size }
    }
}

impl Default for HeaderV1 {
    fn default() -> Self {
        Self::new(ChunkSize::default())
    }
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Source ended before a full header arrived.
    #[error("header truncated: {have} < {need} bytes")]
    Truncated { have: usize, need: usize },

    /// Invalid magic marker (expected "OwO1").
    #[error("invalid magic: expected {}, got {}", fmt_bytes(.need), fmt_bytes(.have))]
    InvalidMagic { have: [u8; 4], need: [u8; 4] },

    /// Chunk size outside the accepted range.
    #[error("invalid chunk_size: {have} not in [{min}, {max}]")]
    InvalidChunkSize { have: u32, min: u32, max: u32 },
}

impl HeaderError {
    /// True for errors meaning "this is not a format 1 stream" (as opposed to
    /// a well-formed header carrying an unacceptable chunk size).
    pub fn is_format_error(&self) -> bool {
        matches!(self, HeaderError::Truncated { .. } | HeaderError::InvalidMagic { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_bounds() {
        assert!(ChunkSize::new(0).is_err());
        assert_eq!(ChunkSize::new(1).unwrap().get(), 1);
        assert_eq!(ChunkSize::new(MAX_CHUNK_SIZE).unwrap().get(), MAX_CHUNK_SIZE);
        assert!(matches!(
            ChunkSize::new(MAX_CHUNK_SIZE + 1),
            Err(HeaderError::InvalidChunkSize { have, .. }) if have == MAX_CHUNK_SIZE + 1
        ));
    }

    #[test]
    fn chunk_size_for_input_len() {
        assert_eq!(ChunkSize::for_input_len(0).get(), 1);
        assert_eq!(ChunkSize::for_input_len(11).get(), 11);
        assert_eq!(ChunkSize::for_input_len(u64::MAX).get(), FILE_CHUNK_CAP);
    }

    #[test]
    fn sealed_len_adds_overhead() {
        let cs = ChunkSize::new(4).unwrap();
        assert_eq!(cs.sealed_len(), 4 + SEAL_OVERHEAD);
    }

    #[test]
    fn invalid_magic_message_is_readable() {
        let err = HeaderError::InvalidMagic { have: *b"BAD!", need: MAGIC_OWO1 };
        assert_eq!(err.to_string(), "invalid magic: expected b\"OwO1\", got b\"BAD!\"");
        assert!(err.is_format_error());
    }
}
