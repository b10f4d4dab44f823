//! Pull-based streaming transforms and the API built on them.
//!
//! - `io`: the `Pull` trait, input/output normalisation, refill helper
//! - `encrypt` / `decrypt`: the two transforms
//! - `core`: whole-stream and file entry points

pub mod io;
pub mod encrypt;
pub mod decrypt;
pub mod core;

pub use self::io::{read_exact_or_eof, pull_to_end, InputSource, OutputSink, Pull};
pub use self::encrypt::{EncryptReader, EncryptState};
pub use self::decrypt::{DecryptReader, DecryptState};
pub use self::core::{
    decrypt_file, decrypt_stream, encrypt_file, encrypt_file_with_chunk_size, encrypt_stream,
    partial_path, ApiConfig, DecryptParams, EncryptParams,
};
