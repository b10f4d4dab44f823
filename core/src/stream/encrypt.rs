// # 📂 `src/stream/encrypt.rs`

//! Encrypting transform.
//!
//! Wraps a plaintext `Read` and yields the framed ciphertext: the 8-byte
//! header once, then one sealed chunk per refill. The caller's buffer size is
//! unrelated to the chunk size; partially drained chunks are resumed from the
//! saved cursor on the next pull.

use std::io::{self, Read};
use std::time::Instant;

use crypto_box::PublicKey;
use tracing::{debug, trace};

use crate::crypto::seal_chunk;
use crate::headers::{ChunkSize, HeaderV1};
use crate::stream::io::{read_exact_or_eof, Pull};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::types::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptState {
    /// Nothing emitted yet.
    Fresh,
    /// Header synthesized; `out` holds (the rest of) it.
    HeaderPending,
    /// `out` holds (the rest of) a sealed chunk.
    ChunkPending,
    /// Plaintext source ran dry; every pull returns 0.
    Exhausted,
    /// An error was reported; every pull fails.
    Failed,
}

pub struct EncryptReader<R> {
    source: R,
    recipient: PublicKey,
    header: HeaderV1,
    state: EncryptState,
    /// Plaintext working buffer, one chunk long once allocated.
    plain: Vec<u8>,
    /// Bytes being handed out: header or current sealed chunk.
    out: Vec<u8>,
    pos: usize,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<R: Read> EncryptReader<R> {
    /// Encrypt `source` for `recipient` with the default chunk size.
    pub fn new(recipient: PublicKey, source: R) -> Self {
        Self::with_chunk_size(recipient, source, ChunkSize::default())
    }

    pub fn with_chunk_size(recipient: PublicKey, source: R, chunk_size: ChunkSize) -> Self {
        Self {
            source,
            recipient,
            header: HeaderV1::new(chunk_size),
            state: EncryptState::Fresh,
            plain: Vec::new(),
            out: Vec::new(),
            pos: 0,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.header.chunk_size
    }

    pub fn state(&self) -> EncryptState {
        self.state
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.stage_times
    }

    /// Bytes currently reserved by the two working buffers.
    pub fn buffered_capacity(&self) -> usize {
        self.plain.capacity() + self.out.capacity()
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Read the next plaintext chunk and seal it into `out`.
    /// Returns `false` when the source had nothing left.
    fn refill(&mut self) -> Result<bool, StreamError> {
        let chunk_len = self.header.chunk_size.plaintext_len();
        if self.plain.len() != chunk_len {
            self.plain.resize(chunk_len, 0);
        }

        let t = Instant::now();
        let n = read_exact_or_eof(&mut self.source, &mut self.plain)?;
        self.stage_times.add(Stage::Read, t.elapsed());
        if n == 0 {
            return Ok(false);
        }

        let t = Instant::now();
        self.out = seal_chunk(&self.recipient, &self.plain[..n]);
        self.stage_times.add(Stage::Encrypt, t.elapsed());
        self.pos = 0;

        self.counters.add_chunk(n, self.out.len());
        trace!(chunk = self.counters.chunks, plaintext_len = n, "encrypt: chunk sealed");
        Ok(true)
    }

    fn step(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        loop {
            match self.state {
                EncryptState::Fresh => {
                    self.out = self.header.encode().to_vec();
                    self.pos = 0;
                    self.counters.add_header(HeaderV1::LEN);
                    self.state = EncryptState::HeaderPending;
                    debug!(chunk_size = self.header.chunk_size.get(), "encrypt: header emitted");
                }
                EncryptState::HeaderPending | EncryptState::ChunkPending => {
                    if self.pos < self.out.len() {
                        return Ok(self.drain_into(buf));
                    }
                    if self.refill()? {
                        self.state = EncryptState::ChunkPending;
                    } else {
                        self.state = EncryptState::Exhausted;
                        debug!(
                            chunks = self.counters.chunks,
                            bytes_plaintext = self.counters.bytes_plaintext,
                            "encrypt: end of stream"
                        );
                        return Ok(0);
                    }
                }
                EncryptState::Exhausted => return Ok(0),
                EncryptState::Failed => return Err(StreamError::Poisoned),
            }
        }
    }
}

impl<R: Read> Pull for EncryptReader<R> {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        if buf.is_empty() && self.state != EncryptState::Failed {
            return Ok(0);
        }
        self.step(buf).map_err(|e| {
            if self.state != EncryptState::Failed {
                debug!(error = %e, "encrypt: stream failed");
                self.state = EncryptState::Failed;
            }
            e
        })
    }
}

impl<R: Read> Read for EncryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pull(buf).map_err(io::Error::from)
    }
}
