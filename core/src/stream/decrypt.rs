// # 📂 `src/stream/decrypt.rs`

//! Decrypting transform.
//!
//! Wraps a framed ciphertext `Read` and yields the original plaintext.
//!
//! Design notes:
//! - Keys are resolved on the first pull. When only the private key was
//!   given, the public key is derived once and kept for the transform's life.
//! - The header is read with the same refill discipline as chunks; anything
//!   short of 8 bytes is a format error, including an empty source.
//! - A chunk that fails to open breaks the stream for good. There is no
//!   attempt to skip ahead to a later chunk boundary.

use std::io::{self, Read};
use std::time::Instant;

use crypto_box::{PublicKey, SecretKey};
use tracing::{debug, trace, warn};

use crate::crypto::{
    derive_public_key, open_chunk, public_key_from_bytes, secret_key_from_bytes, CryptoError, KeyPair,
};
use crate::headers::{decode_header, ChunkSize, HeaderError, HeaderV1};
use crate::stream::io::{read_exact_or_eof, Pull};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptState {
    /// Keys not resolved yet.
    Fresh,
    /// Keys ready, header not consumed.
    HeaderPending,
    /// Header consumed; `plain` holds (the rest of) the current chunk.
    ChunkPending,
    /// Ciphertext source ran dry; every pull returns 0.
    Exhausted,
    /// An error was reported; every pull fails.
    Failed,
}

/// Key material as handed to the constructor, validated on first use.
enum KeyInput {
    Raw { private_key: Vec<u8>, public_key: Option<Vec<u8>> },
    Ready,
}

pub struct DecryptReader<R> {
    source: R,
    input: KeyInput,
    keys: Option<(PublicKey, SecretKey)>,
    header: Option<HeaderV1>,
    state: DecryptState,
    /// Ciphertext working buffer, one sealed chunk long once allocated.
    sealed: Vec<u8>,
    /// Plaintext of the current chunk.
    plain: Vec<u8>,
    pos: usize,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<R: Read> DecryptReader<R> {
    /// Decrypt with only the private key; the public key is derived lazily.
    pub fn new(private_key: &[u8], source: R) -> Self {
        Self::build(
            KeyInput::Raw { private_key: private_key.to_vec(), public_key: None },
            None,
            source,
        )
    }

    /// Decrypt with an explicitly supplied key pair (no derivation).
    pub fn with_public_key(public_key: &[u8], private_key: &[u8], source: R) -> Self {
        Self::build(
            KeyInput::Raw {
                private_key: private_key.to_vec(),
                public_key: Some(public_key.to_vec()),
            },
            None,
            source,
        )
    }

    pub fn from_key_pair(keys: &KeyPair, source: R) -> Self {
        Self::build(KeyInput::Ready, Some((keys.public().clone(), keys.secret().clone())), source)
    }

    fn build(input: KeyInput, keys: Option<(PublicKey, SecretKey)>, source: R) -> Self {
        Self {
            source,
            input,
            keys,
            header: None,
            state: DecryptState::Fresh,
            sealed: Vec::new(),
            plain: Vec::new(),
            pos: 0,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Chunk size announced by the stream, once the header has been read.
    pub fn chunk_size(&self) -> Option<ChunkSize> {
        self.header.map(|h| h.chunk_size)
    }

    pub fn state(&self) -> DecryptState {
        self.state
    }

    /// Public key in use, once resolved.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.keys.as_ref().map(|(pk, _)| pk)
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.stage_times
    }

    /// Bytes currently reserved by the two working buffers.
    pub fn buffered_capacity(&self) -> usize {
        self.sealed.capacity() + self.plain.capacity()
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn resolve_keys(&mut self) -> Result<(), CryptoError> {
        if let KeyInput::Raw { private_key, public_key } = &self.input {
            let public = match public_key {
                Some(pk) => public_key_from_bytes(pk)?,
                None => {
                    let derived = derive_public_key(private_key)?;
                    debug!("decrypt: public key derived from private key");
                    PublicKey::from(derived)
                }
            };
            let secret = secret_key_from_bytes(private_key)?;
            self.keys = Some((public, secret));
            self.input = KeyInput::Ready;
        }
        Ok(())
    }

    fn read_header(&mut self) -> Result<HeaderV1, StreamError> {
        let mut buf = [0u8; HeaderV1::LEN];
        let n = read_exact_or_eof(&mut self.source, &mut buf)?;
        if n < HeaderV1::LEN {
            return Err(HeaderError::Truncated { have: n, need: HeaderV1::LEN }.into());
        }
        let header = decode_header(&buf)?;
        self.counters.add_header(HeaderV1::LEN);
        debug!(chunk_size = header.chunk_size.get(), "decrypt: header accepted");
        Ok(header)
    }

    /// Read and open the next sealed chunk into `plain`.
    /// Returns `false` when the source had nothing left.
    fn refill(&mut self, chunk_size: ChunkSize) -> Result<bool, StreamError> {
        let sealed_len = chunk_size.sealed_len();
        if self.sealed.len() != sealed_len {
            self.sealed.resize(sealed_len, 0);
        }

        let t = Instant::now();
        let n = read_exact_or_eof(&mut self.source, &mut self.sealed)?;
        self.stage_times.add(Stage::Read, t.elapsed());
        if n == 0 {
            return Ok(false);
        }

        let (public, secret) = match &self.keys {
            Some(keys) => keys,
            None => return Err(StreamError::Validation("keys not resolved before first chunk".into())),
        };

        let t = Instant::now();
        let opened = open_chunk(public, secret, &self.sealed[..n]);
        self.stage_times.add(Stage::Decrypt, t.elapsed());
        self.plain = opened.map_err(|e| {
            warn!(chunk = self.counters.chunks + 1, sealed_len = n, "decrypt: chunk failed authentication");
            e
        })?;
        self.pos = 0;

        self.counters.add_chunk(self.plain.len(), n);
        trace!(chunk = self.counters.chunks, plaintext_len = self.plain.len(), "decrypt: chunk opened");
        Ok(true)
    }

    fn step(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        loop {
            match self.state {
                DecryptState::Fresh => {
                    self.resolve_keys()?;
                    self.state = DecryptState::HeaderPending;
                }
                DecryptState::HeaderPending => {
                    self.header = Some(self.read_header()?);
                    self.state = DecryptState::ChunkPending;
                }
                DecryptState::ChunkPending => {
                    if self.pos < self.plain.len() {
                        let n = buf.len().min(self.plain.len() - self.pos);
                        buf[..n].copy_from_slice(&self.plain[self.pos..self.pos + n]);
                        self.pos += n;
                        return Ok(n);
                    }
                    let chunk_size = match self.header {
                        Some(h) => h.chunk_size,
                        None => return Err(StreamError::Validation("header missing".into())),
                    };
                    if !self.refill(chunk_size)? {
                        self.state = DecryptState::Exhausted;
                        debug!(
                            chunks = self.counters.chunks,
                            bytes_plaintext = self.counters.bytes_plaintext,
                            "decrypt: end of stream"
                        );
                        return Ok(0);
                    }
                }
                DecryptState::Exhausted => return Ok(0),
                DecryptState::Failed => return Err(StreamError::Poisoned),
            }
        }
    }
}

impl<R: Read> Pull for DecryptReader<R> {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if buf.is_empty() && self.state != DecryptState::Failed {
            return Ok(0);
        }
        self.step(buf).map_err(|e| {
            if self.state != DecryptState::Failed {
                debug!(error = %e, "decrypt: stream failed");
                self.state = DecryptState::Failed;
            }
            e
        })
    }
}

impl<R: Read> Read for DecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pull(buf).map_err(io::Error::from)
    }
}
