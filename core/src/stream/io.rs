// ## 📂 File: `src/stream/io.rs`
// ## Normalized I/O + the shared "read fully or end" refill

use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::types::StreamError;

/// Pull interface shared by both transforms.
///
/// `pull` copies up to `buf.len()` bytes into `buf` and returns how many were
/// copied. `Ok(0)` with a non-empty `buf` is end of stream. After an error the
/// source is broken and every later call fails.
pub trait Pull {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;
}

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, StreamError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(std::fs::File::open(p)?),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize output sink into a boxed writer.
///
/// For `OutputSink::Memory` with `with_buf = Some(true)` the written bytes are
/// also returned through the shared buffer so the caller can read them back.
pub fn open_output(
    sink: OutputSink,
    with_buf: Option<bool>,
) -> Result<(Box<dyn Write + Send>, Option<Arc<Mutex<Vec<u8>>>>), StreamError> {
    match sink {
        OutputSink::Writer(w) => Ok((w, None)),
        OutputSink::File(p) => Ok((Box::new(std::fs::File::create(p)?), None)),
        OutputSink::Memory => match with_buf {
            Some(true) => {
                let buf = Arc::new(Mutex::new(Vec::new()));
                let writer = SharedBufferWriter { buf: buf.clone() };
                Ok((Box::new(writer), Some(buf)))
            }
            _ => Ok((Box::new(io::sink()), None)),
        },
    }
}

pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared output buffer poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ================= Refill =================

/// Fill `buf` from `r` until it is full or the source reports end.
///
/// Returns the number of bytes filled: `buf.len()` for a full refill, fewer
/// for the final short refill, `0` when the source was already exhausted.
/// Short reads are retried, as is `ErrorKind::Interrupted`. Any other error
/// aborts the refill; bytes gathered so far are discarded with it.
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> Result<usize, StreamError> {
    let mut off = 0;

    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::from_io(e)),
        }
    }

    Ok(off)
}

/// Drain everything `src` produces into `out`, pulling with a buffer of
/// `buf_len` bytes. Returns the number of bytes written.
pub fn pull_to_end<P: Pull + ?Sized, W: Write + ?Sized>(
    src: &mut P,
    out: &mut W,
    buf_len: usize,
) -> Result<u64, StreamError> {
    let mut buf = vec![0u8; buf_len.max(1)];
    let mut total = 0u64;
    loop {
        let n = src.pull(&mut buf)?;
        if n == 0 {
            return Ok(total);
        }
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn short_reads_are_accumulated() {
        let mut src = Trickle { data: b"HELLO WORLD", step: 2 };
        let mut buf = [0u8; 4];
        assert_eq!(read_exact_or_eof(&mut src, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"HELL");
        assert_eq!(read_exact_or_eof(&mut src, &mut buf).unwrap(), 4);
        assert_eq!(read_exact_or_eof(&mut src, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"RLD");
        assert_eq!(read_exact_or_eof(&mut src, &mut buf).unwrap(), 0);
    }

    #[test]
    fn interrupted_is_retried() {
        struct Flaky {
            interrupted: bool,
        }
        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
                }
                buf[0] = 7;
                Ok(1)
            }
        }
        let mut src = Flaky { interrupted: false };
        let mut buf = [0u8; 3];
        assert_eq!(read_exact_or_eof(&mut src, &mut buf).unwrap(), 3);
        assert_eq!(buf, [7, 7, 7]);
    }

    #[test]
    fn other_errors_propagate() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"))
            }
        }
        let mut buf = [0u8; 3];
        let err = read_exact_or_eof(&mut Broken, &mut buf).unwrap_err();
        assert!(matches!(err, StreamError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn memory_output_is_captured() {
        let (mut w, buf) = open_output(OutputSink::Memory, Some(true)).unwrap();
        w.write_all(b"abc").unwrap();
        assert_eq!(*buf.unwrap().lock().unwrap(), b"abc");
    }
}
