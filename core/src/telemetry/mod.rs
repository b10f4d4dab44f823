//! telemetry/mod.rs
//! Unified telemetry module: counters, timers, and immutable snapshots.
//!
//! Notes:
//! - Counters live inside each transform and are updated on every chunk.
//! - Stage timers are accumulated per transform and merged by the file API.
//! - Snapshots are immutable and serde-serialisable for `--stats` output.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
