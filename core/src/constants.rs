/// Magic tag for this stream format version.
/// "OwO1" = chunked sealed-box stream, format 1
// The tag is a protocol field, so it is typed `[u8; 4]` to match `HeaderV1::magic`.
pub const MAGIC_OWO1: [u8; 4] = *b"OwO1";

/// Header = magic (4) + chunk size (u32 big-endian).
pub const HEADER_LEN_V1: usize = 4 + 4;

/// X25519 key length (public and private).
pub const KEY_LEN: usize = 32;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// Fixed per-chunk overhead of the sealed box: ephemeral public key + tag.
pub const SEAL_OVERHEAD: usize = KEY_LEN + TAG_LEN;

/// Defaults when no chunk size is requested (16 KiB).
pub const DEFAULT_CHUNK_SIZE: u32 = 16 * 1024;

/// Smallest chunk size accepted on encode and decode.
pub const MIN_CHUNK_SIZE: u32 = 1;

/// Max chunk size sanity bound (1 GiB).
pub const MAX_CHUNK_SIZE: u32 = 1024 * 1024 * 1024;

/// Upper bound used when sizing chunks from a file length (128 MiB).
pub const FILE_CHUNK_CAP: u32 = 128 * 1024 * 1024;

/// Suffix of the temporary file a decryption writes into before it is renamed.
pub const PARTIAL_SUFFIX: &str = "partial";

/// Buffer used by the stream API to move bytes from a transform to its sink.
pub const DEFAULT_IO_BUFFER_LEN: usize = 32 * 1024;
