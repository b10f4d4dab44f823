// ## `core.rs`: stable public API

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::{
    constants::{DEFAULT_IO_BUFFER_LEN, PARTIAL_SUFFIX},
    crypto::public_key_from_bytes,
    headers::ChunkSize,
    stream::{
        decrypt::DecryptReader,
        encrypt::EncryptReader,
        io::{open_input, open_output, InputSource, OutputSink, Pull},
    },
    telemetry::{Stage, TelemetrySnapshot, TelemetryTimer},
    types::StreamError,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct EncryptParams {
    pub chunk_size: ChunkSize,
}

#[derive(Clone, Debug, Default)]
pub struct DecryptParams {
    /// Recipient public key. When `None` it is derived from the private key.
    pub public_key: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Whether to capture the output buffer in memory.
    /// - `None` or `Some(false)` → no buffer capture (production default).
    /// - `Some(true)` → capture buffer for tests/benchmarks.
    pub with_buf: Option<bool>,

    /// Size of the buffer used to pull from the transform and write out.
    pub io_buffer_len: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            with_buf: Some(false),
            io_buffer_len: DEFAULT_IO_BUFFER_LEN,
        }
    }
}

impl ApiConfig {
    pub fn new(with_buf: Option<bool>, io_buffer_len: Option<usize>) -> Self {
        Self {
            with_buf: with_buf.or(Some(false)),
            io_buffer_len: io_buffer_len.unwrap_or(DEFAULT_IO_BUFFER_LEN).max(1),
        }
    }

    pub fn with_buf_enabled() -> Self {
        Self { with_buf: Some(true), ..Self::default() }
    }
}

/// Pull `src` dry into `out`, charging write time to the timer.
fn drive<P: Pull + ?Sized>(
    src: &mut P,
    out: &mut dyn Write,
    buf_len: usize,
    timer: &mut TelemetryTimer,
) -> Result<u64, StreamError> {
    let mut buf = vec![0u8; buf_len.max(1)];
    let mut total = 0u64;
    loop {
        let n = src.pull(&mut buf)?;
        if n == 0 {
            break;
        }
        let t = Instant::now();
        out.write_all(&buf[..n])?;
        timer.add_stage_time(Stage::Write, t.elapsed());
        total += n as u64;
    }
    let t = Instant::now();
    out.flush()?;
    timer.add_stage_time(Stage::Write, t.elapsed());
    Ok(total)
}

fn capture_output(
    maybe_buf: Option<Arc<Mutex<Vec<u8>>>>,
    snapshot: &mut TelemetrySnapshot,
) -> Result<(), StreamError> {
    if let Some(arc_buf) = maybe_buf {
        let buf = arc_buf
            .lock()
            .map_err(|_| StreamError::Validation("shared output buffer poisoned".into()))?;
        snapshot.attach_output(buf.clone());
    }
    Ok(())
}

/// 🔐 Encrypt a whole stream for `public_key`.
pub fn encrypt_stream(
    input: InputSource,
    output: OutputSink,
    public_key: &[u8],
    params: EncryptParams,
    config: ApiConfig,
) -> Result<TelemetrySnapshot, StreamError> {
    let recipient = public_key_from_bytes(public_key)?;

    let reader = open_input(input)?;
    let (mut writer, maybe_buf) = open_output(output, config.with_buf)?;

    let mut timer = TelemetryTimer::new();
    let mut enc = EncryptReader::with_chunk_size(recipient, reader, params.chunk_size);
    let written = drive(&mut enc, writer.as_mut(), config.io_buffer_len, &mut timer)?;

    timer.stage_times.merge(enc.stage_times());
    timer.finish();

    let mut snapshot = TelemetrySnapshot::from(params.chunk_size.get(), enc.counters(), &timer);
    capture_output(maybe_buf, &mut snapshot)?;

    info!(
        chunk_size = params.chunk_size.get(),
        chunks = snapshot.chunks,
        bytes_plaintext = snapshot.bytes_plaintext,
        bytes_written = written,
        "encrypt_stream: done"
    );
    Ok(snapshot)
}

/// 🔓 Decrypt a whole stream with `private_key`.
///
/// Output is written as chunks authenticate, so a failure part way through
/// leaves the already-verified prefix in `output`. Use [`decrypt_file`] to get
/// all-or-nothing behaviour on disk.
pub fn decrypt_stream(
    input: InputSource,
    output: OutputSink,
    private_key: &[u8],
    params: DecryptParams,
    config: ApiConfig,
) -> Result<TelemetrySnapshot, StreamError> {
    let reader = open_input(input)?;
    let (mut writer, maybe_buf) = open_output(output, config.with_buf)?;

    let mut timer = TelemetryTimer::new();
    let mut dec = match &params.public_key {
        Some(pk) => DecryptReader::with_public_key(pk, private_key, reader),
        None => DecryptReader::new(private_key, reader),
    };
    let written = drive(&mut dec, writer.as_mut(), config.io_buffer_len, &mut timer)?;

    timer.stage_times.merge(dec.stage_times());
    timer.finish();

    let chunk_size = dec.chunk_size().map(ChunkSize::get).unwrap_or(0);
    let mut snapshot = TelemetrySnapshot::from(chunk_size, dec.counters(), &timer);
    capture_output(maybe_buf, &mut snapshot)?;

    info!(
        chunk_size,
        chunks = snapshot.chunks,
        bytes_plaintext = written,
        "decrypt_stream: done"
    );
    Ok(snapshot)
}

// ================= File API =================

/// Sibling path the output is staged in before the final rename.
pub fn partial_path(out: &Path) -> PathBuf {
    let mut name = out.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Run `f` against the staging path, then move the result into place.
/// On error the staged file is removed and `out` is left untouched.
fn staged<F>(out: &Path, f: F) -> Result<TelemetrySnapshot, StreamError>
where
    F: FnOnce(&Path) -> Result<TelemetrySnapshot, StreamError>,
{
    let partial = partial_path(out);
    match f(&partial) {
        Ok(snapshot) => {
            fs::rename(&partial, out)?;
            debug!(path = %out.display(), "staged output moved into place");
            Ok(snapshot)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&partial) {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %partial.display(), error = %rm, "could not remove partial output");
                }
            }
            Err(e)
        }
    }
}

/// Encrypt a file. The chunk size is the input length, capped at 128 MiB.
pub fn encrypt_file(
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    public_key: &[u8],
) -> Result<TelemetrySnapshot, StreamError> {
    let in_path = in_path.as_ref();
    let len = fs::metadata(in_path)?.len();
    encrypt_file_with_chunk_size(in_path, out_path, public_key, ChunkSize::for_input_len(len))
}

pub fn encrypt_file_with_chunk_size(
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    public_key: &[u8],
    chunk_size: ChunkSize,
) -> Result<TelemetrySnapshot, StreamError> {
    let in_path = in_path.as_ref().to_path_buf();
    staged(out_path.as_ref(), |partial| {
        encrypt_stream(
            InputSource::File(in_path),
            OutputSink::File(partial.to_path_buf()),
            public_key,
            EncryptParams { chunk_size },
            ApiConfig::default(),
        )
    })
}

/// Decrypt a file. `out_path` only appears once every chunk authenticated.
pub fn decrypt_file(
    in_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
    private_key: &[u8],
    public_key: Option<&[u8]>,
) -> Result<TelemetrySnapshot, StreamError> {
    let in_path = in_path.as_ref().to_path_buf();
    let params = DecryptParams { public_key: public_key.map(<[u8]>::to_vec) };
    staged(out_path.as_ref(), |partial| {
        decrypt_stream(
            InputSource::File(in_path),
            OutputSink::File(partial.to_path_buf()),
            private_key,
            params,
            ApiConfig::default(),
        )
    })
}
