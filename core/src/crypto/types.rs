// ## 📂 File: `src/crypto/types.rs`

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Sealed box did not verify: tampered data, wrong key or truncated chunk.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Private key could not be turned into a public key.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Key material of the wrong size.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// Key text could not be decoded.
    #[error("invalid key encoding: {0}")]
    KeyEncoding(String),
}
