//! owo-core
//!
//! Pure Rust chunked sealed-box streaming engine.
//! Data is split into fixed-size chunks, each sealed for the recipient's
//! X25519 public key, behind an 8-byte `OwO1` header.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod headers;
pub mod crypto;
pub mod telemetry;

// Stream layer
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{derive_public_key, CryptoError, KeyPair, PublicKey, SecretKey};
    pub use crate::headers::{ChunkSize, HeaderError, HeaderV1};
    pub use crate::stream::{
        decrypt_file, decrypt_stream, encrypt_file, encrypt_stream, ApiConfig, DecryptParams,
        DecryptReader, EncryptParams, EncryptReader, InputSource, OutputSink, Pull,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{ErrorKind, StreamError};
}
