//! headers/mod.rs
//! Public module export for the stream header.
//!
//! Notes:
//! - Fixed-size header (8 bytes) enables deterministic IO: the decoder knows
//!   exactly how much to read before the first chunk.
//! - The header is not authenticated. A modified chunk size only makes the
//!   decoder read chunk boundaries in the wrong place, which fails chunk
//!   authentication.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
