// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters kept by each transform.
//!
//! Summary: Collects chunk counts and byte counts during encrypt/decrypt.
//! Converted into an immutable TelemetrySnapshot when the stream ends.
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use crate::constants::SEAL_OVERHEAD;

/// Deterministic counters collected during stream processing
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub headers: u64,
    pub chunks: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
}

impl TelemetryCounters {
    /// Record the stream header as overhead.
    pub fn add_header(&mut self, header_len: usize) {
        self.headers += 1;
        self.bytes_overhead += header_len as u64;
    }

    /// Record one chunk.
    ///
    /// - `pt_len`: plaintext bytes in the chunk
    /// - `sealed_len`: wire bytes of the sealed chunk (plaintext + overhead)
    pub fn add_chunk(&mut self, pt_len: usize, sealed_len: usize) {
        self.chunks += 1;
        self.bytes_plaintext += pt_len as u64;
        self.bytes_ciphertext += sealed_len as u64;
        self.bytes_overhead += SEAL_OVERHEAD as u64;
    }

    /// Total bytes on the wire (header + sealed chunks).
    pub fn wire_bytes(&self) -> u64 {
        self.bytes_ciphertext + self.bytes_overhead - self.chunks * SEAL_OVERHEAD as u64
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.headers += other.headers;
        self.chunks += other.chunks;
        self.bytes_plaintext += other.bytes_plaintext;
        self.bytes_ciphertext += other.bytes_ciphertext;
        self.bytes_overhead += other.bytes_overhead;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
