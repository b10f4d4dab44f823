use std::io;

use thiserror::Error;

use crate::{crypto::CryptoError, headers::HeaderError};

/// Unified stream error covering I/O, header, and crypto failures.
/// - Ergonomic `From<T>` impls enable `?` across the transforms.
/// - Converts to and from `io::Error` without losing the variant, so stacked
///   readers (decrypt over encrypt, or over any wrapper) keep precise kinds.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Failure reported by the underlying byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header missing, malformed or carrying an unacceptable chunk size.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Chunk authentication or key handling failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A previous pull failed; the transform yields nothing further.
    #[error("stream is broken after an earlier error")]
    Poisoned,

    /// Generic high-level validation with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Coarse classification of a `StreamError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    HeaderFormat,
    InvalidChunkSize,
    AuthenticationFailed,
    UnderlyingIo,
    KeyDerivation,
    Poisoned,
    Validation,
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StreamError::Io(_) => ErrorKind::UnderlyingIo,
            StreamError::Header(HeaderError::InvalidChunkSize { .. }) => ErrorKind::InvalidChunkSize,
            StreamError::Header(_) => ErrorKind::HeaderFormat,
            StreamError::Crypto(CryptoError::AuthenticationFailed) => ErrorKind::AuthenticationFailed,
            StreamError::Crypto(_) => ErrorKind::KeyDerivation,
            StreamError::Poisoned => ErrorKind::Poisoned,
            StreamError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Recover a `StreamError` that travelled through an `io::Error`.
    /// Plain I/O errors become `StreamError::Io`.
    pub fn from_io(e: io::Error) -> Self {
        let wraps_stream_error = e.get_ref().is_some_and(|inner| inner.is::<StreamError>());
        if !wraps_stream_error {
            return StreamError::Io(e);
        }
        match e.into_inner().map(|inner| inner.downcast::<StreamError>()) {
            Some(Ok(inner)) => *inner,
            _ => StreamError::Validation("wrapped stream error lost in transit".into()),
        }
    }
}

/// Surface a `StreamError` through `std::io::Read`.
/// Source I/O errors pass through untouched; everything else is `InvalidData`.
impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
