// zlib v1.3.1 deflate — Rust port

pub mod adler32;
pub mod deflate;
pub mod trees;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// These mirror the primary symbols from zlib.h (compression side only).
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming compression session. Equivalent to `z_stream` + `deflate_state`
/// with `deflateInit2` / `deflate` / `deflateEnd` driving it.
/// Drop replaces `deflateEnd` (RAII).
pub use deflate::api::DeflateStream;

/// Per-call outcome of [`DeflateStream::deflate`]: terminal status plus the
/// number of input bytes consumed and output bytes produced.
pub use deflate::api::Deflated;

/// One-shot compression into a freshly allocated buffer.
/// Equivalent to `compress2` from zlib.h.
pub use deflate::api::compress_to_vec;

/// Worst-case zlib-stream size for a given input length.
/// Equivalent to `deflateBound` / `compressBound`.
pub use deflate::api::compress_bound;

/// Flush directives accepted by [`DeflateStream::deflate`].
/// Equivalent to `Z_NO_FLUSH` … `Z_FINISH`.
pub use deflate::types::Flush;

/// Compression strategies. Equivalent to `Z_DEFAULT_STRATEGY`,
/// `Z_FILTERED` and `Z_HUFFMAN_ONLY`.
pub use deflate::types::Strategy;

/// Success statuses returned by [`DeflateStream::deflate`].
/// `Ok` ↔ `Z_OK`, `StreamEnd` ↔ `Z_STREAM_END`.
pub use deflate::types::Status;

/// Error type for all session operations. Variants mirror the negative
/// zlib.h return codes (`Z_STREAM_ERROR`, `Z_BUF_ERROR`, `Z_DATA_ERROR`).
pub use deflate::types::ZlibError;

/// Detected input class for the current block run.
/// Equivalent to `Z_BINARY` / `Z_ASCII` / `Z_UNKNOWN`.
pub use deflate::types::DataType;

/// Running Adler-32 continuation. Equivalent to `adler32(adler, buf, len)`.
pub use adler32::adler32;

// ─────────────────────────────────────────────────────────────────────────────
// Version API  (zlib.h: ZLIB_VERSION / zlibVersion)
// ─────────────────────────────────────────────────────────────────────────────

pub const ZLIB_VER_MAJOR: i32 = 1;
pub const ZLIB_VER_MINOR: i32 = 3;
pub const ZLIB_VER_REVISION: i32 = 1;
pub const ZLIB_VERNUM: i32 =
    ZLIB_VER_MAJOR * 0x1000 + ZLIB_VER_MINOR * 0x100 + ZLIB_VER_REVISION * 0x10;
pub const ZLIB_VERSION: &str = "1.3.1";

/// Returns the ported library version string (e.g. `"1.3.1"`).
/// Equivalent to `zlibVersion()`.
pub fn version_string() -> &'static str {
    ZLIB_VERSION
}

/// Returns the version as a `zlibCompileFlags`-style packed number
/// (e.g. 0x1310 for v1.3.1). Equivalent to `ZLIB_VERNUM`.
pub fn version_number() -> i32 {
    ZLIB_VERNUM
}
