//! Compression session state.
//!
//! Translated from deflate.h v1.3.1 (`deflate_state`) plus the small
//! state-management helpers from deflate.c:
//!   - [`DeflateState`]    ← `deflate_state`
//!   - [`DeflateState::new`] / [`DeflateState::reset`]
//!     ← `deflateInit2` / `deflateReset` (allocation + `lm_init`)
//!   - [`Io`]              ← the `next_in`/`avail_in`/`next_out`/`avail_out`
//!     cursor quartet of `z_stream`, borrowed per call
//!   - [`flush_pending`]   ← `flush_pending`
//!
//! Ownership notes:
//! - The session exclusively owns the window, hash tables, tree arrays and
//!   the pending/staging buffer; the caller's input and output slices are
//!   borrowed for the duration of one `deflate` call through [`Io`].
//! - The distance/literal symbol buffer overlays the upper three quarters
//!   of the pending buffer (`d_buf` / `l_buf` offsets); bit output and the
//!   overlay never collide because a block is flushed at
//!   `lit_bufsize - 1` symbols.

use crate::adler32::ADLER32_INITIAL;
use crate::deflate::types::{
    DataType, Flavor, Flush, Strategy, StreamStatus, ZlibError, CONFIGURATION_TABLE, HEAP_SIZE,
    MAX_BITS, MAX_MEM_LEVEL, MAX_WBITS, MIN_LOOKAHEAD, MIN_MATCH, MIN_WBITS, BL_CODES, D_CODES,
    Z_DEFAULT_COMPRESSION,
};
use crate::trees::encode::BitWriter;
use crate::trees::tables::{bl_desc, d_desc, l_desc, CtData, StaticTreeDesc, TreeKind};

// ─────────────────────────────────────────────────────────────────────────────
// Per-call I/O cursors (z_stream next_in/avail_in/next_out/avail_out)
// ─────────────────────────────────────────────────────────────────────────────

/// Borrowed input/output ranges for one `deflate` call.
///
/// `next_in` / `next_out` are the consumed/produced byte counts; the
/// remaining capacities are derived, mirroring how `avail_in` / `avail_out`
/// shrink as the C cursors advance.
pub struct Io<'a, 'b> {
    pub src: &'a [u8],
    pub next_in: usize,
    pub dst: &'b mut [u8],
    pub next_out: usize,
}

impl<'a, 'b> Io<'a, 'b> {
    pub fn new(src: &'a [u8], dst: &'b mut [u8]) -> Self {
        Io { src, next_in: 0, dst, next_out: 0 }
    }

    /// Remaining input bytes (`avail_in`).
    #[inline]
    pub fn avail_in(&self) -> usize {
        self.src.len() - self.next_in
    }

    /// Remaining output room (`avail_out`).
    #[inline]
    pub fn avail_out(&self) -> usize {
        self.dst.len() - self.next_out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_state
// ─────────────────────────────────────────────────────────────────────────────

/// The whole state of one compression session.
///
/// Mirrors `deflate_state`; the `z_stream` bookkeeping that zlib keeps on
/// the outer struct (`total_in`, `total_out`, `adler`, `msg`) lives here
/// too, since the Rust session owns both layers.
#[derive(Debug)]
pub struct DeflateState {
    /// Orchestrator phase (C: `status`).
    pub status: StreamStatus,
    /// Bit sink + pending staging buffer (C: `pending_buf` / `bi_buf` / `bi_valid`).
    pub bits: BitWriter,
    /// `true` when emitting the RFC 1950 wrapper (C: `wrap != 0`).
    pub wrap: bool,
    /// The Adler-32 trailer has been staged; the stream may only drain.
    pub trailer_written: bool,
    /// Input-class guess for the current block run (C: `data_type`).
    pub data_type: DataType,
    /// Value of `flush` seen for the previous call, or -1 right after a
    /// call that could not make progress (C: `last_flush`).
    pub last_flush: i32,

    // ── Sliding window ────────────────────────────────────────────────────
    /// LZ77 window size, 2^w_bits (C: `w_size`).
    pub w_size: usize,
    /// log2(w_size)  (8..16) (C: `w_bits`).
    pub w_bits: u32,
    /// `w_size - 1` (C: `w_mask`).
    pub w_mask: usize,
    /// Sliding window, `2 * w_size` bytes (C: `window`).
    pub window: Vec<u8>,
    /// Allocated window size (C: `window_size`).
    pub window_size: usize,
    /// Link to older string with same hash index, indexed by position
    /// modulo `w_size` (C: `prev`).
    pub prev: Vec<u16>,
    /// Head of each hash chain, or 0 (C: `head`).
    pub head: Vec<u16>,
    /// Rolling hash of the 3 bytes at `strstart` (C: `ins_h`).
    pub ins_h: u32,
    pub hash_size: usize,
    pub hash_bits: u32,
    pub hash_mask: u32,
    /// Shift folding one input byte into the hash each step; all 3 bytes of
    /// a string are folded once `hash_shift * MIN_MATCH >= hash_bits`
    /// (C: `hash_shift`).
    pub hash_shift: u32,
    /// Window position at which the current block starts; may become
    /// negative after a window slide, which disables the stored-block path
    /// for that block (C: `block_start`).
    pub block_start: isize,

    // ── Match state ───────────────────────────────────────────────────────
    pub match_length: usize,
    /// Previous match, carried by the lazy evaluator (C: `prev_match`).
    pub prev_match: usize,
    /// Set if the previous byte is still an unemitted literal candidate.
    pub match_available: bool,
    /// Start of the string to insert / match (C: `strstart`).
    pub strstart: usize,
    /// Start of the matching string (C: `match_start`).
    pub match_start: usize,
    /// Number of valid bytes ahead of `strstart` (C: `lookahead`).
    pub lookahead: usize,
    /// Length of the best match at the previous step (C: `prev_length`).
    pub prev_length: usize,
    pub max_chain_length: usize,
    pub max_lazy_match: usize,
    pub level: i32,
    pub strategy: Strategy,
    pub good_match: usize,
    pub nice_match: usize,

    // ── Huffman trees and construction scratch ────────────────────────────
    /// Literal and length tree (C: `dyn_ltree`, `HEAP_SIZE` entries).
    pub dyn_ltree: Vec<CtData>,
    /// Distance tree (C: `dyn_dtree`).
    pub dyn_dtree: Vec<CtData>,
    /// Tree of the bit lengths (C: `bl_tree`).
    pub bl_tree: Vec<CtData>,
    /// Largest code with non-zero frequency, per tree (C: `tree_desc.max_code`).
    pub l_max_code: usize,
    pub d_max_code: usize,
    pub bl_max_code: usize,
    /// Number of codes at each bit length for an optimal tree (C: `bl_count`).
    pub bl_count: [u16; MAX_BITS + 1],
    /// Heap used to build the Huffman trees (C: `heap`).
    pub heap: [usize; HEAP_SIZE],
    pub heap_len: usize,
    pub heap_max: usize,
    /// Depth of each subtree, used as tie breaker for trees of equal
    /// frequency (C: `depth`).
    pub depth: [u8; HEAP_SIZE],

    // ── Symbol buffer (overlaying the pending buffer) ─────────────────────
    /// Size of the literal buffer, `1 << (mem_level + 6)` (C: `lit_bufsize`).
    pub lit_bufsize: usize,
    /// Byte offset of the distance half of the symbol overlay (C: `d_buf`).
    pub d_buf: usize,
    /// Byte offset of the literal/length half (C: `l_buf`).
    pub l_buf: usize,
    /// Number of symbol pairs in the current block (C: `sym_next` analogue).
    pub last_lit: usize,
    /// Number of string matches in the current block (C: `matches`).
    pub matches: usize,
    /// Bit length of the current block with optimal trees (C: `opt_len`).
    pub opt_len: usize,
    /// Bit length of the current block with static trees (C: `static_len`).
    pub static_len: usize,
    /// Bit length of the last emitted end-of-block code, for `_tr_align`'s
    /// "enough bit-room" test (C: `last_eob_len`).
    pub last_eob_len: usize,

    // ── z_stream bookkeeping ──────────────────────────────────────────────
    /// Running Adler-32 of the consumed input (C: `strm->adler`).
    pub adler: u32,
    pub total_in: u64,
    pub total_out: u64,
    /// Last error message, if any (C: `strm->msg`).
    pub msg: Option<&'static str>,
}

impl DeflateState {
    /// Allocate a session. Equivalent to the parameter validation and
    /// buffer allocation half of `deflateInit2`.
    ///
    /// A negative `window_bits` suppresses the zlib wrapper and selects a
    /// raw DEFLATE stream of window size `2^-window_bits`.
    pub fn new(
        level: i32,
        window_bits: i32,
        mem_level: i32,
        strategy: Strategy,
    ) -> Result<Self, ZlibError> {
        let level = if level == Z_DEFAULT_COMPRESSION { 6 } else { level };
        let (wrap, w_bits) = if window_bits < 0 {
            (false, -window_bits)
        } else {
            (true, window_bits)
        };

        if !(MIN_WBITS..=MAX_WBITS).contains(&w_bits)
            || !(1..=MAX_MEM_LEVEL).contains(&mem_level)
            || !(0..=9).contains(&level)
        {
            return Err(ZlibError::Stream);
        }

        let w_size = 1usize << w_bits;
        let hash_bits = (mem_level + 7) as u32;
        let hash_size = 1usize << hash_bits;
        let lit_bufsize = 1usize << (mem_level + 6);

        let mut s = DeflateState {
            status: StreamStatus::Init,
            bits: BitWriter::new(lit_bufsize * 4),
            wrap,
            trailer_written: false,
            data_type: DataType::Unknown,
            last_flush: Flush::None as i32,

            w_size,
            w_bits: w_bits as u32,
            w_mask: w_size - 1,
            window: vec![0; 2 * w_size],
            window_size: 2 * w_size,
            prev: vec![0; w_size],
            head: vec![0; hash_size],
            ins_h: 0,
            hash_size,
            hash_bits,
            hash_mask: (hash_size - 1) as u32,
            hash_shift: (hash_bits + MIN_MATCH as u32 - 1) / MIN_MATCH as u32,
            block_start: 0,

            match_length: MIN_MATCH - 1,
            prev_match: 0,
            match_available: false,
            strstart: 0,
            match_start: 0,
            lookahead: 0,
            prev_length: MIN_MATCH - 1,
            max_chain_length: 0,
            max_lazy_match: 0,
            level,
            strategy,
            good_match: 0,
            nice_match: 0,

            dyn_ltree: vec![CtData::default(); HEAP_SIZE],
            dyn_dtree: vec![CtData::default(); 2 * D_CODES + 1],
            bl_tree: vec![CtData::default(); 2 * BL_CODES + 1],
            l_max_code: 0,
            d_max_code: 0,
            bl_max_code: 0,
            bl_count: [0; MAX_BITS + 1],
            heap: [0; HEAP_SIZE],
            heap_len: 0,
            heap_max: 0,
            depth: [0; HEAP_SIZE],

            lit_bufsize,
            d_buf: lit_bufsize,
            l_buf: 3 * lit_bufsize,
            last_lit: 0,
            matches: 0,
            opt_len: 0,
            static_len: 0,
            last_eob_len: 8,

            adler: ADLER32_INITIAL,
            total_in: 0,
            total_out: 0,
            msg: None,
        };
        s.reset();
        Ok(s)
    }

    /// Re-arm the session for a new stream with the same parameters.
    /// Equivalent to `deflateReset`.
    pub fn reset(&mut self) {
        self.total_in = 0;
        self.total_out = 0;
        self.msg = None;
        self.data_type = DataType::Unknown;
        self.status = StreamStatus::Init;
        self.trailer_written = false;
        self.last_flush = Flush::None as i32;
        self.adler = ADLER32_INITIAL;

        self.bits.reset();
        self.last_eob_len = 8;
        crate::trees::encode::init_block(self);
        self.lm_init();
    }

    /// Initialize the LZ77 matcher. Equivalent to `lm_init`.
    fn lm_init(&mut self) {
        // head must be cleared; prev will only ever be read through live
        // chains, so it can keep stale values.
        self.head.fill(0);

        let cfg = &CONFIGURATION_TABLE[self.level as usize];
        self.max_lazy_match = cfg.max_lazy as usize;
        self.good_match = cfg.good_length as usize;
        self.nice_match = cfg.nice_length as usize;
        self.max_chain_length = cfg.max_chain as usize;

        self.strstart = 0;
        self.block_start = 0;
        self.lookahead = 0;
        self.match_length = MIN_MATCH - 1;
        self.prev_length = MIN_MATCH - 1;
        self.match_available = false;
        self.ins_h = 0;
    }

    /// The block-shape routine configured for the current level.
    #[inline]
    pub fn flavor(&self) -> Flavor {
        CONFIGURATION_TABLE[self.level as usize].flavor
    }

    /// Furthest distance a match may reach back. Equivalent to the
    /// `MAX_DIST(s)` macro (`w_size - MIN_LOOKAHEAD`).
    #[inline]
    pub fn max_dist(&self) -> usize {
        self.w_size - MIN_LOOKAHEAD
    }

    /// Stage a big-endian 16-bit value in the pending buffer.
    /// Equivalent to `putShortMSB`.
    #[inline]
    pub fn put_short_msb(&mut self, v: u32) {
        self.bits.put_byte((v >> 8) as u8);
        self.bits.put_byte((v & 0xff) as u8);
    }

    // ── Tree plumbing for the builder (avoids aliasing the scratch) ──────

    /// Move one tree out of the session for exclusive mutation.
    #[inline]
    pub fn take_tree(&mut self, which: TreeKind) -> Vec<CtData> {
        match which {
            TreeKind::Lit => core::mem::take(&mut self.dyn_ltree),
            TreeKind::Dist => core::mem::take(&mut self.dyn_dtree),
            TreeKind::BitLen => core::mem::take(&mut self.bl_tree),
        }
    }

    /// Return a tree taken with [`take_tree`](Self::take_tree).
    #[inline]
    pub fn put_tree(&mut self, which: TreeKind, tree: Vec<CtData>) {
        match which {
            TreeKind::Lit => self.dyn_ltree = tree,
            TreeKind::Dist => self.dyn_dtree = tree,
            TreeKind::BitLen => self.bl_tree = tree,
        }
    }

    /// Fixed-alphabet descriptor for a tree.
    #[inline]
    pub fn static_desc(&self, which: TreeKind) -> StaticTreeDesc {
        match which {
            TreeKind::Lit => l_desc(),
            TreeKind::Dist => d_desc(),
            TreeKind::BitLen => bl_desc(),
        }
    }

    #[inline]
    pub fn max_code(&self, which: TreeKind) -> usize {
        match which {
            TreeKind::Lit => self.l_max_code,
            TreeKind::Dist => self.d_max_code,
            TreeKind::BitLen => self.bl_max_code,
        }
    }

    #[inline]
    pub fn set_max_code(&mut self, which: TreeKind, max_code: usize) {
        match which {
            TreeKind::Lit => self.l_max_code = max_code,
            TreeKind::Dist => self.d_max_code = max_code,
            TreeKind::BitLen => self.bl_max_code = max_code,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// flush_pending  (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Drain as much of the pending buffer as the caller's output room allows.
///
/// Equivalent to `flush_pending`.
pub fn flush_pending(s: &mut DeflateState, io: &mut Io) {
    let len = s.bits.pending.min(io.avail_out());
    if len == 0 {
        return;
    }
    io.dst[io.next_out..io.next_out + len]
        .copy_from_slice(&s.bits.pending_buf[s.bits.pending_out..s.bits.pending_out + len]);
    io.next_out += len;
    s.bits.pending_out += len;
    s.total_out += len as u64;
    s.bits.pending -= len;
    if s.bits.pending == 0 {
        s.bits.pending_out = 0;
    }
}
