//! Thin wrapper around the `simd-adler32` crate providing the Adler-32 API
//! used by the rest of this crate (mirrors `adler32.c` / `zlib.h` from
//! zlib v1.3.1).
//!
//! Only the compression side is needed: the streaming session folds every
//! consumed input byte into a running checksum and emits it as the zlib
//! trailer; `deflateSetDictionary` folds the dictionary in the same way to
//! form the header dictionary id.

/// Initial value of a running Adler-32, i.e. the checksum of the empty
/// byte sequence. Equivalent to `adler32(0L, Z_NULL, 0)`.
pub const ADLER32_INITIAL: u32 = 1;

/// Continue a running Adler-32 over `data` — equivalent to the C
/// `adler32(adler, buf, len)` function.
///
/// # Parity vectors
/// * `adler32(ADLER32_INITIAL, b"")` == `0x0000_0001`
/// * `adler32(ADLER32_INITIAL, b"Wikipedia")` == `0x11E6_0398`
#[inline]
pub fn adler32(adler: u32, data: &[u8]) -> u32 {
    let mut hasher = simd_adler32::Adler32::from_checksum(adler);
    hasher.write(data);
    hasher.finish()
}
