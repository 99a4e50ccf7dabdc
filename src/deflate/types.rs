//! DEFLATE engine constants, parameter enums, error handling, and the
//! per-level configuration table.
//!
//! Translated from deflate.h / zlib.h v1.3.1:
//!   - Engine constants (`MIN_MATCH`, `MAX_MATCH`, `MIN_LOOKAHEAD`, …)
//!   - Alphabet sizes (`LENGTH_CODES`, `L_CODES`, `D_CODES`, `BL_CODES`)
//!   - [`Flush`]    ← `Z_NO_FLUSH` … `Z_FINISH`
//!   - [`Strategy`] ← `Z_DEFAULT_STRATEGY` / `Z_FILTERED` / `Z_HUFFMAN_ONLY`
//!   - [`Status`] / [`ZlibError`] ← the zlib.h return codes + `z_errmsg[]`
//!   - [`BlockState`] ← `block_state` (deflate.c)
//!   - [`Config`] / [`CONFIGURATION_TABLE`] ← `configuration_table[10]`

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Match and window constants (deflate.h)
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest back-reference the DEFLATE format can encode.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference the DEFLATE format can encode.
pub const MAX_MATCH: usize = 258;

/// Minimum lookahead required before matching, except at the end of the
/// input. See deflate.c's parsing restrictions.
pub const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Matches of length `MIN_MATCH` further back than this are emitted as
/// literals by the lazy evaluator (too expensive to encode).
pub const TOO_FAR: usize = 4096;

/// Valid range for the window log (`windowBits`). Window sizes below 512
/// bytes interact badly with the length-258 match cap, so 8 is excluded.
pub const MIN_WBITS: i32 = 9;
pub const MAX_WBITS: i32 = 15;

pub const MAX_MEM_LEVEL: i32 = 9;
pub const DEF_MEM_LEVEL: i32 = 8;

/// Compression-method nibble of the zlib header. The only method defined
/// by RFC 1950.
pub const Z_DEFLATED: u32 = 8;

/// FDICT flag bit in the zlib header `FLG` byte.
pub const PRESET_DICT: u32 = 0x20;

/// Pass to [`crate::DeflateStream::new`] for the default level (6).
pub const Z_DEFAULT_COMPRESSION: i32 = -1;

// ─────────────────────────────────────────────────────────────────────────────
// Alphabet sizes (deflate.h)
// ─────────────────────────────────────────────────────────────────────────────

/// Number of length codes, not counting the special `END_BLOCK` code.
pub const LENGTH_CODES: usize = 29;

/// Number of literal bytes 0..255.
pub const LITERALS: usize = 256;

/// Number of literal/length codes, including the `END_BLOCK` code.
pub const L_CODES: usize = LITERALS + 1 + LENGTH_CODES;

/// Number of distance codes.
pub const D_CODES: usize = 30;

/// Number of codes used to transfer the bit lengths.
pub const BL_CODES: usize = 19;

/// Maximum heap size for Huffman construction.
pub const HEAP_SIZE: usize = 2 * L_CODES + 1;

/// All codes must not exceed `MAX_BITS` bits.
pub const MAX_BITS: usize = 15;

/// Bit-length codes must not exceed `MAX_BL_BITS` bits.
pub const MAX_BL_BITS: usize = 7;

/// End-of-block literal code.
pub const END_BLOCK: usize = 256;

/// Repeat previous bit length 3-6 times (2 bits of repeat count).
pub const REP_3_6: usize = 16;

/// Repeat a zero length 3-10 times (3 bits of repeat count).
pub const REPZ_3_10: usize = 17;

/// Repeat a zero length 11-138 times (7 bits of repeat count).
pub const REPZ_11_138: usize = 18;

/// Size of the second-level `dist_code` lookup table.
pub const DIST_CODE_LEN: usize = 512;

// Block-type field values of the 3-bit block header (RFC 1951 §3.2.3).
pub const STORED_BLOCK: u32 = 0;
pub const STATIC_TREES: u32 = 1;
pub const DYN_TREES: u32 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Flush values (zlib.h)
// ─────────────────────────────────────────────────────────────────────────────

/// Flush directive for one `deflate` call.
///
/// Discriminants match the zlib.h values so that the "no flush since last
/// progress" comparison (`flush <= old_flush`) translates directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Flush {
    /// Accumulate as much as possible before producing output (`Z_NO_FLUSH`).
    #[default]
    None = 0,
    /// Close the block and emit an empty static block so a decoder can
    /// recover most pending output (`Z_PARTIAL_FLUSH`).
    Partial = 1,
    /// Close the block and byte-align with an empty stored block; the output
    /// then ends in `00 00 FF FF` (`Z_SYNC_FLUSH`).
    Sync = 2,
    /// Like `Sync`, and additionally forget all match history so decoding
    /// can restart at this point (`Z_FULL_FLUSH`).
    Full = 3,
    /// No more input follows; finish the stream and emit the trailer
    /// (`Z_FINISH`).
    Finish = 4,
}

// ─────────────────────────────────────────────────────────────────────────────
// Strategy values (zlib.h)
// ─────────────────────────────────────────────────────────────────────────────

/// Compression strategy, tuning the match/literal balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Strategy {
    /// Normal LZ77 + Huffman (`Z_DEFAULT_STRATEGY`).
    #[default]
    Default = 0,
    /// For data produced by a filter/predictor: suppress short matches,
    /// favour literal statistics (`Z_FILTERED`).
    Filtered = 1,
    /// Huffman coding only, no string matching at all (`Z_HUFFMAN_ONLY`).
    HuffmanOnly = 2,
}

// ─────────────────────────────────────────────────────────────────────────────
// Return codes (zlib.h) and error strings (z_errmsg[] in zutil.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Successful outcomes of a `deflate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Progress was made; more calls expected (`Z_OK`).
    Ok,
    /// The trailer has been fully written; the stream is complete
    /// (`Z_STREAM_END`).
    StreamEnd,
}

/// Session error codes, mirroring the negative zlib.h return values.
///
/// `Buf` is a backpressure signal, not a failure: the call made no forward
/// progress because no input or output space was available. It is fully
/// recoverable by calling again with more of either. Output already staged
/// internally may still have been drained before a `Buf` return; consult
/// `total_out()` for the authoritative byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZlibError {
    /// Inconsistent parameters or stream misuse (`Z_STREAM_ERROR`).
    Stream,
    /// No progress possible with the buffers supplied (`Z_BUF_ERROR`).
    Buf,
    /// Stream finalized before reaching the end state (`Z_DATA_ERROR`).
    Data,
}

impl ZlibError {
    /// Human-readable name, byte-for-byte identical to the corresponding
    /// `z_errmsg[]` entry so that message parity tests pass.
    pub fn error_name(&self) -> &'static str {
        match self {
            ZlibError::Stream => "stream error",
            ZlibError::Buf => "buffer error",
            ZlibError::Data => "data error",
        }
    }

    /// The zlib.h numeric return code for this error.
    pub fn code(&self) -> i32 {
        match self {
            ZlibError::Stream => -2,
            ZlibError::Buf => -5,
            ZlibError::Data => -3,
        }
    }
}

impl fmt::Display for ZlibError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_name())
    }
}

impl std::error::Error for ZlibError {}

// ─────────────────────────────────────────────────────────────────────────────
// block_state (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Result of one strategy-driver run.
///
/// Mirrors `block_state { need_more, block_done, finish_started,
/// finish_done }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Block not completed, need more input or more output room.
    NeedMore,
    /// Block flushed, no more input available for now.
    BlockDone,
    /// Finish started, need only more output room.
    FinishStarted,
    /// Finish done, accept no more input or output.
    FinishDone,
}

// ─────────────────────────────────────────────────────────────────────────────
// Data type heuristic result (zlib.h: Z_BINARY / Z_ASCII / Z_UNKNOWN)
// ─────────────────────────────────────────────────────────────────────────────

/// Best guess at the nature of the input, from literal statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum DataType {
    Binary = 0,
    Ascii = 1,
    #[default]
    Unknown = 2,
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal stream status (deflate.h: INIT_STATE / BUSY_STATE / FINISH_STATE)
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrator state-machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Wrapper header not yet written; `set_dictionary` still allowed.
    Init,
    /// Compressing.
    Busy,
    /// `Z_FINISH` seen; only draining remains.
    Finish,
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-level parameters — configuration_table[10] (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Which block-shape routine drives a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Store only, no matching (level 0).
    Stored,
    /// Greedy matching (levels 1-3).
    Fast,
    /// Lazy matching (levels 4-9).
    Slow,
}

/// Compression tuning parameters for one level.
///
/// Matches `config_s { good_length, max_lazy, nice_length, max_chain,
/// func }` with the function pointer replaced by [`Flavor`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Reduce lazy search above this match length.
    pub good_length: u16,
    /// Do not perform lazy search above this match length.
    pub max_lazy: u16,
    /// Quit search above this match length.
    pub nice_length: u16,
    /// Chain-walk attempt budget.
    pub max_chain: u16,
    /// Strategy driver.
    pub flavor: Flavor,
}

/// Matches `configuration_table[10]` in deflate.c exactly.
pub static CONFIGURATION_TABLE: [Config; 10] = [
    Config { good_length: 0,  max_lazy: 0,   nice_length: 0,   max_chain: 0,    flavor: Flavor::Stored }, /* 0: store only */
    Config { good_length: 4,  max_lazy: 4,   nice_length: 8,   max_chain: 4,    flavor: Flavor::Fast },   /* 1: max speed */
    Config { good_length: 4,  max_lazy: 5,   nice_length: 16,  max_chain: 8,    flavor: Flavor::Fast },
    Config { good_length: 4,  max_lazy: 6,   nice_length: 32,  max_chain: 32,   flavor: Flavor::Fast },
    Config { good_length: 4,  max_lazy: 4,   nice_length: 16,  max_chain: 16,   flavor: Flavor::Slow },   /* 4: lazy matches */
    Config { good_length: 8,  max_lazy: 16,  nice_length: 32,  max_chain: 32,   flavor: Flavor::Slow },
    Config { good_length: 8,  max_lazy: 16,  nice_length: 128, max_chain: 128,  flavor: Flavor::Slow },   /* 6: default */
    Config { good_length: 8,  max_lazy: 32,  nice_length: 128, max_chain: 256,  flavor: Flavor::Slow },
    Config { good_length: 32, max_lazy: 128, nice_length: 258, max_chain: 1024, flavor: Flavor::Slow },
    Config { good_length: 32, max_lazy: 258, nice_length: 258, max_chain: 4096, flavor: Flavor::Slow },   /* 9: max compression */
];
