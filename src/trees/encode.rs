//! Bit-level output assembly and block emission.
//!
//! Translated from trees.c v1.3.1:
//!   - [`BitWriter`]       ← `pending_buf` + `bi_buf`/`bi_valid` with
//!     `send_bits` / `send_code` / `bi_flush` / `bi_windup` / `copy_block`
//!   - [`init_block`]      ← `init_block`
//!   - [`tr_tally`]        ← `_tr_tally`
//!   - [`scan_tree`] / [`send_tree`] ← `scan_tree` / `send_tree`
//!   - [`build_bl_tree`] / [`send_all_trees`]
//!   - [`compress_block`]  ← `compress_block`
//!   - [`tr_flush_block`]  ← `_tr_flush_block` (three-way size decision)
//!   - [`tr_stored_block`] ← `_tr_stored_block`
//!   - [`tr_align`]        ← `_tr_align`
//!
//! The distance/length symbol pairs of the current block overlay the upper
//! three quarters of `pending_buf` (16-bit big-endian distance at
//! `d_buf + 2i`, length code at `l_buf + i`); `compress_block` re-reads
//! them while the compressed bits stream into the lower region.

use log::trace;

use crate::deflate::state::DeflateState;
use crate::deflate::types::{
    DataType, BL_CODES, DYN_TREES, D_CODES, END_BLOCK, LITERALS, L_CODES, REPZ_11_138, REPZ_3_10,
    REP_3_6, STATIC_TREES, STORED_BLOCK,
};
use crate::trees::huffman::build_tree;
use crate::trees::tables::{
    d_code, static_tables, CtData, TreeKind, BL_ORDER, EXTRA_DBITS, EXTRA_LBITS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Bit sink
// ─────────────────────────────────────────────────────────────────────────────

/// LSB-first bit accumulator feeding a byte-oriented pending buffer.
///
/// Codes of up to 16 bits are packed into `bi_buf`; whenever an insert
/// would overflow, the full 16-bit register is staged as two little-endian
/// bytes. The pending buffer also stages wrapper bytes and stored-block
/// payloads, and is drained towards the caller by `flush_pending`.
#[derive(Debug)]
pub struct BitWriter {
    /// Output still waiting to be drained (C: `pending_buf`).
    pub pending_buf: Vec<u8>,
    /// Allocated size (C: `pending_buf_size`), `4 * lit_bufsize`.
    pub pending_buf_size: usize,
    /// Next byte to drain (C: `pending_out`, kept as an offset).
    pub pending_out: usize,
    /// Number of staged, undrained bytes (C: `pending`).
    pub pending: usize,
    /// Bit accumulator (C: `bi_buf`).
    pub bi_buf: u16,
    /// Number of valid bits in `bi_buf`; the rest are zero (C: `bi_valid`).
    pub bi_valid: u32,
}

impl BitWriter {
    pub fn new(size: usize) -> Self {
        BitWriter {
            pending_buf: vec![0; size],
            pending_buf_size: size,
            pending_out: 0,
            pending: 0,
            bi_buf: 0,
            bi_valid: 0,
        }
    }

    pub fn reset(&mut self) {
        self.pending = 0;
        self.pending_out = 0;
        self.bi_buf = 0;
        self.bi_valid = 0;
    }

    /// Equivalent to the `put_byte` macro.
    #[inline]
    pub fn put_byte(&mut self, b: u8) {
        self.pending_buf[self.pending] = b;
        self.pending += 1;
    }

    /// Stage a 16-bit value, little-endian. Equivalent to `put_short`.
    #[inline]
    pub fn put_short(&mut self, w: u16) {
        self.put_byte((w & 0xff) as u8);
        self.put_byte((w >> 8) as u8);
    }

    /// Append `length` bits of `value`, lowest bits first.
    ///
    /// Equivalent to `send_bits`. The caller guarantees two bytes of room
    /// in the pending buffer (the block assembler sizes it accordingly).
    pub fn send_bits(&mut self, value: u32, length: u32) {
        debug_assert!((1..=16).contains(&length));
        debug_assert!(value >> length == 0, "value does not fit in length bits");
        if self.bi_valid > 16 - length {
            let old_valid = self.bi_valid;
            self.bi_buf |= (value << old_valid) as u16;
            let full = self.bi_buf;
            self.put_short(full);
            self.bi_buf = (value >> (16 - old_valid)) as u16;
            self.bi_valid = old_valid + length - 16;
        } else {
            self.bi_buf |= (value << self.bi_valid) as u16;
            self.bi_valid += length;
        }
    }

    /// Append one Huffman code. Equivalent to the `send_code` macro.
    #[inline]
    pub fn send_code(&mut self, entry: CtData) {
        self.send_bits(entry.code(), entry.len() as u32);
    }

    /// Stage the accumulator one byte at a time, leaving fewer than 8
    /// valid bits. Equivalent to `bi_flush`.
    pub fn bi_flush(&mut self) {
        if self.bi_valid == 16 {
            let full = self.bi_buf;
            self.put_short(full);
            self.bi_buf = 0;
            self.bi_valid = 0;
        } else if self.bi_valid >= 8 {
            let low = (self.bi_buf & 0xff) as u8;
            self.put_byte(low);
            self.bi_buf >>= 8;
            self.bi_valid -= 8;
        }
    }

    /// Flush the accumulator completely, zero-padding to a byte boundary.
    /// Equivalent to `bi_windup`.
    pub fn bi_windup(&mut self) {
        if self.bi_valid > 8 {
            let full = self.bi_buf;
            self.put_short(full);
        } else if self.bi_valid > 0 {
            let low = (self.bi_buf & 0xff) as u8;
            self.put_byte(low);
        }
        self.bi_buf = 0;
        self.bi_valid = 0;
    }

    /// Byte-align, then stage `buf` verbatim, optionally preceded by the
    /// stored-block `LEN` / `NLEN` fields. Equivalent to `copy_block`.
    pub fn copy_block(&mut self, buf: &[u8], header: bool) {
        self.bi_windup();
        if header {
            self.put_short(buf.len() as u16);
            self.put_short(!(buf.len() as u16));
        }
        self.pending_buf[self.pending..self.pending + buf.len()].copy_from_slice(buf);
        self.pending += buf.len();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// init_block  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Reset all per-block statistics. Equivalent to `init_block`.
pub fn init_block(s: &mut DeflateState) {
    for n in 0..L_CODES {
        s.dyn_ltree[n].set_freq(0);
    }
    for n in 0..D_CODES {
        s.dyn_dtree[n].set_freq(0);
    }
    for n in 0..BL_CODES {
        s.bl_tree[n].set_freq(0);
    }
    s.dyn_ltree[END_BLOCK].set_freq(1);
    s.opt_len = 0;
    s.static_len = 0;
    s.last_lit = 0;
    s.matches = 0;
}

// ─────────────────────────────────────────────────────────────────────────────
// _tr_tally  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Record one literal (`dist == 0`, `lc` = byte) or one match (`dist` =
/// distance, `lc` = length − MIN_MATCH) and update the frequency counts.
///
/// Returns `true` when the current block should be flushed. Equivalent to
/// `_tr_tally`.
pub fn tr_tally(s: &mut DeflateState, dist: usize, lc: usize) -> bool {
    s.bits.pending_buf[s.d_buf + s.last_lit * 2] = (dist >> 8) as u8;
    s.bits.pending_buf[s.d_buf + s.last_lit * 2 + 1] = (dist & 0xff) as u8;
    s.bits.pending_buf[s.l_buf + s.last_lit] = lc as u8;
    s.last_lit += 1;

    if dist == 0 {
        // lc is the unmatched char
        s.dyn_ltree[lc].fc += 1;
    } else {
        s.matches += 1;
        // Here, lc is the match length - MIN_MATCH
        let dist = dist - 1; // dist = match distance - 1
        let t = static_tables();
        s.dyn_ltree[t.length_code[lc] as usize + LITERALS + 1].fc += 1;
        s.dyn_dtree[d_code(dist)].fc += 1;
    }

    if (s.last_lit & 0x1fff) == 0 && s.level > 2 {
        // Compute an upper bound of the compressed length and flush early
        // if the matches are sparse and the block is barely shrinking.
        let mut out_length = s.last_lit * 8;
        let in_length = (s.strstart as isize - s.block_start) as usize;
        for dcode in 0..D_CODES {
            out_length += s.dyn_dtree[dcode].freq() * (5 + EXTRA_DBITS[dcode] as usize);
        }
        out_length >>= 3;
        if s.matches < s.last_lit / 2 && out_length < in_length / 2 {
            return true;
        }
    }
    s.last_lit == s.lit_bufsize - 1
    // The 16-bit distances stage fine here: whenever lit_bufsize is
    // reached the block is flushed before the overlay can collide with
    // the compressed bits below it.
}

// ─────────────────────────────────────────────────────────────────────────────
// set_data_type  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Guess the input class from the literal statistics: binary when codes
/// 0–6 and 128–255 dominate the printable range by more than 4:1.
fn set_data_type(s: &mut DeflateState) {
    let mut bin_freq = 0usize;
    let mut ascii_freq = 0usize;
    for n in 0..7 {
        bin_freq += s.dyn_ltree[n].freq();
    }
    for n in 7..128 {
        ascii_freq += s.dyn_ltree[n].freq();
    }
    for n in 128..LITERALS {
        bin_freq += s.dyn_ltree[n].freq();
    }
    s.data_type = if bin_freq > ascii_freq >> 2 {
        DataType::Binary
    } else {
        DataType::Ascii
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// scan_tree / send_tree  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Walk the code-length sequence of one tree, tallying the run-length
/// alphabet into `bl_tree`. Equivalent to `scan_tree`; also plants the
/// guard value past `max_code` that [`send_tree`] relies on.
pub fn scan_tree(s: &mut DeflateState, which: TreeKind, max_code: usize) {
    let mut tree = s.take_tree(which);
    let mut prevlen: i32 = -1;
    let mut nextlen = tree[0].len() as i32;
    let mut count = 0; // repeat count of the current code
    let (mut max_count, mut min_count) = if nextlen == 0 { (138, 3) } else { (7, 4) };

    tree[max_code + 1].set_len(0xffff); // guard

    for n in 0..=max_code {
        let curlen = nextlen;
        nextlen = tree[n + 1].len() as i32;
        count += 1;
        if count < max_count && curlen == nextlen {
            continue;
        } else if count < min_count {
            s.bl_tree[curlen as usize].fc += count as u16;
        } else if curlen != 0 {
            if curlen != prevlen {
                s.bl_tree[curlen as usize].fc += 1;
            }
            s.bl_tree[REP_3_6].fc += 1;
        } else if count <= 10 {
            s.bl_tree[REPZ_3_10].fc += 1;
        } else {
            s.bl_tree[REPZ_11_138].fc += 1;
        }
        count = 0;
        prevlen = curlen;
        if nextlen == 0 {
            max_count = 138;
            min_count = 3;
        } else if curlen == nextlen {
            max_count = 6;
            min_count = 3;
        } else {
            max_count = 7;
            min_count = 4;
        }
    }

    s.put_tree(which, tree);
}

/// Re-run the same walk as [`scan_tree`], this time emitting the
/// run-length symbols through the bit-length tree. Equivalent to
/// `send_tree`.
pub fn send_tree(s: &mut DeflateState, which: TreeKind, max_code: usize) {
    let tree = s.take_tree(which);
    let mut prevlen: i32 = -1;
    let mut nextlen = tree[0].len() as i32;
    let mut count = 0;
    let (mut max_count, mut min_count) = if nextlen == 0 { (138, 3) } else { (7, 4) };
    // guard at max_code + 1 is already set by scan_tree

    for n in 0..=max_code {
        let curlen = nextlen;
        nextlen = tree[n + 1].len() as i32;
        count += 1;
        if count < max_count && curlen == nextlen {
            continue;
        } else if count < min_count {
            loop {
                let entry = s.bl_tree[curlen as usize];
                s.bits.send_code(entry);
                count -= 1;
                if count == 0 {
                    break;
                }
            }
        } else if curlen != 0 {
            if curlen != prevlen {
                let entry = s.bl_tree[curlen as usize];
                s.bits.send_code(entry);
                count -= 1;
            }
            debug_assert!((3..=6).contains(&count));
            let entry = s.bl_tree[REP_3_6];
            s.bits.send_code(entry);
            s.bits.send_bits(count as u32 - 3, 2);
        } else if count <= 10 {
            let entry = s.bl_tree[REPZ_3_10];
            s.bits.send_code(entry);
            s.bits.send_bits(count as u32 - 3, 3);
        } else {
            let entry = s.bl_tree[REPZ_11_138];
            s.bits.send_code(entry);
            s.bits.send_bits(count as u32 - 11, 7);
        }
        count = 0;
        prevlen = curlen;
        if nextlen == 0 {
            max_count = 138;
            min_count = 3;
        } else if curlen == nextlen {
            max_count = 6;
            min_count = 3;
        } else {
            max_count = 7;
            min_count = 4;
        }
    }

    s.put_tree(which, tree);
}

// ─────────────────────────────────────────────────────────────────────────────
// build_bl_tree / send_all_trees  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Build the bit-length tree over both code-length sequences and decide
/// how many of its code lengths must be transmitted. Returns the index of
/// the last bit-length code to send (at least 3, so at least 4 counts go
/// on the wire). Equivalent to `build_bl_tree`.
pub fn build_bl_tree(s: &mut DeflateState) -> usize {
    // Determine the bit length frequencies for literal and distance trees.
    let l_max = s.l_max_code;
    let d_max = s.d_max_code;
    scan_tree(s, TreeKind::Lit, l_max);
    scan_tree(s, TreeKind::Dist, d_max);

    build_tree(s, TreeKind::BitLen);
    // opt_len now includes the length of the bl tree itself.

    let mut max_blindex = BL_CODES - 1;
    while max_blindex >= 3 {
        if s.bl_tree[BL_ORDER[max_blindex] as usize].len() != 0 {
            break;
        }
        max_blindex -= 1;
    }
    // Update opt_len to include the bit length counts and the HLIT/HDIST/
    // HCLEN fields.
    s.opt_len += 3 * (max_blindex + 1) + 5 + 5 + 4;

    max_blindex
}

/// Emit the dynamic block header: HLIT, HDIST, HCLEN, the bit-length code
/// lengths in [`BL_ORDER`] order, then both RLE-coded length sequences.
/// Equivalent to `send_all_trees`.
pub fn send_all_trees(s: &mut DeflateState, lcodes: usize, dcodes: usize, blcodes: usize) {
    debug_assert!(lcodes >= 257 && dcodes >= 1 && blcodes >= 4, "not enough codes");
    debug_assert!(
        lcodes <= L_CODES && dcodes <= D_CODES && blcodes <= BL_CODES,
        "too many codes"
    );
    s.bits.send_bits(lcodes as u32 - 257, 5); // not +255 as stated in appnote.txt
    s.bits.send_bits(dcodes as u32 - 1, 5);
    s.bits.send_bits(blcodes as u32 - 4, 4); // not -3 as stated in appnote.txt
    for rank in 0..blcodes {
        let len = s.bl_tree[BL_ORDER[rank] as usize].len();
        s.bits.send_bits(len as u32, 3);
    }
    send_tree(s, TreeKind::Lit, lcodes - 1);
    send_tree(s, TreeKind::Dist, dcodes - 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// compress_block  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Which pair of code tables encodes the block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTrees {
    /// RFC 1951 fixed codes.
    Static,
    /// The per-block trees just built from the frequencies.
    Dynamic,
}

#[inline]
fn ltree_entry(s: &DeflateState, trees: BlockTrees, index: usize) -> CtData {
    match trees {
        BlockTrees::Dynamic => s.dyn_ltree[index],
        BlockTrees::Static => static_tables().static_ltree[index],
    }
}

#[inline]
fn dtree_entry(s: &DeflateState, trees: BlockTrees, index: usize) -> CtData {
    match trees {
        BlockTrees::Dynamic => s.dyn_dtree[index],
        BlockTrees::Static => static_tables().static_dtree[index],
    }
}

/// Re-encode the stored (distance, length/literal) pairs through the given
/// trees, ending with `END_BLOCK`. Equivalent to `compress_block`.
pub fn compress_block(s: &mut DeflateState, trees: BlockTrees) {
    let t = static_tables();
    let mut lx = 0; // running index in the symbol overlay

    if s.last_lit != 0 {
        loop {
            let mut dist = ((s.bits.pending_buf[s.d_buf + lx * 2] as usize) << 8)
                | s.bits.pending_buf[s.d_buf + lx * 2 + 1] as usize;
            let mut lc = s.bits.pending_buf[s.l_buf + lx] as usize;
            lx += 1;

            if dist == 0 {
                // send a literal byte
                let entry = ltree_entry(s, trees, lc);
                s.bits.send_code(entry);
            } else {
                // Here, lc is the match length - MIN_MATCH
                let code = t.length_code[lc] as usize;
                let entry = ltree_entry(s, trees, code + LITERALS + 1);
                s.bits.send_code(entry); // send the length code
                let extra = EXTRA_LBITS[code] as u32;
                if extra != 0 {
                    lc -= t.base_length[code] as usize;
                    s.bits.send_bits(lc as u32, extra);
                }
                dist -= 1; // dist is now the match distance - 1
                let code = d_code(dist);
                debug_assert!(code < D_CODES, "bad d_code");
                let entry = dtree_entry(s, trees, code);
                s.bits.send_code(entry); // send the distance code
                let extra = EXTRA_DBITS[code] as u32;
                if extra != 0 {
                    dist -= t.base_dist[code] as usize;
                    s.bits.send_bits(dist as u32, extra);
                }
            }

            if lx >= s.last_lit {
                break;
            }
        }
    }

    let eob = ltree_entry(s, trees, END_BLOCK);
    s.bits.send_code(eob);
    s.last_eob_len = eob.len();
}

// ─────────────────────────────────────────────────────────────────────────────
// _tr_stored_block / _tr_align  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Emit a stored block: 3-bit header, byte alignment, LEN/NLEN, raw window
/// bytes. `buf == None` emits the zero-length marker block used by sync
/// flushes. Equivalent to `_tr_stored_block`.
pub fn tr_stored_block(s: &mut DeflateState, buf: Option<usize>, stored_len: usize, eof: bool) {
    s.bits.send_bits((STORED_BLOCK << 1) + eof as u32, 3);
    match buf {
        Some(offset) => {
            // Two-phase: the window slice and the bit sink are disjoint
            // session fields.
            let window = &s.window[offset..offset + stored_len];
            s.bits.copy_block(window, true);
        }
        None => s.bits.copy_block(&[], true),
    }
}

/// Emit one empty static block to give the decoder enough lookahead to
/// surface all pending output, plus a second one when fewer than 9 spare
/// bits would remain. Equivalent to `_tr_align`.
pub fn tr_align(s: &mut DeflateState) {
    s.bits.send_bits(STATIC_TREES << 1, 3);
    let eob = static_tables().static_ltree[END_BLOCK];
    s.bits.send_code(eob);
    s.bits.bi_flush();

    // Of the 10 bits for the empty block, we have already sent
    // (10 - bi_valid) bits. The lookahead for the last real code (before
    // the EOB of the previous block) was thus at least one plus the length
    // of the EOB plus what we have just sent of the empty static block.
    if 1 + s.last_eob_len as i32 + 10 - (s.bits.bi_valid as i32) < 9 {
        s.bits.send_bits(STATIC_TREES << 1, 3);
        let eob = static_tables().static_ltree[END_BLOCK];
        s.bits.send_code(eob);
        s.bits.bi_flush();
    }
    s.last_eob_len = 7;
}

// ─────────────────────────────────────────────────────────────────────────────
// _tr_flush_block  (trees.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Close the current block, choosing the cheapest of stored / static /
/// dynamic encoding. `buf` is the window offset of the block's first byte,
/// or `None` when the data slid out of the window (stored emission is then
/// impossible). Equivalent to `_tr_flush_block`.
pub fn tr_flush_block(s: &mut DeflateState, buf: Option<usize>, stored_len: usize, eof: bool) {
    let mut opt_lenb;
    let static_lenb;
    let mut max_blindex = 0; // index of last bit length code of non zero freq

    if s.level > 0 {
        // Check if the file is binary or ascii
        if s.data_type == DataType::Unknown {
            set_data_type(s);
        }

        build_tree(s, TreeKind::Lit);
        build_tree(s, TreeKind::Dist);
        // After this, opt_len and static_len are the total bit lengths of
        // the compressed block, excluding tree representations.

        max_blindex = build_bl_tree(s);

        // Determine the best encoding. Compute first the block length in
        // bytes.
        opt_lenb = (s.opt_len + 3 + 7) >> 3;
        static_lenb = (s.static_len + 3 + 7) >> 3;

        trace!(
            "block sizes: opt {opt_lenb}B static {static_lenb}B stored {stored_len}B ({} syms, {} matches)",
            s.last_lit,
            s.matches
        );

        if static_lenb <= opt_lenb {
            opt_lenb = static_lenb;
        }
    } else {
        // stored_len + 5: force a stored block
        opt_lenb = stored_len + 5;
        static_lenb = opt_lenb;
    }

    if stored_len + 4 <= opt_lenb && buf.is_some() {
        // The test buf.is_some() is only necessary if the data slid out of
        // the window; transmitting the whole window as a stored block
        // would be larger.
        tr_stored_block(s, buf, stored_len, eof);
    } else if static_lenb == opt_lenb {
        s.bits.send_bits((STATIC_TREES << 1) + eof as u32, 3);
        compress_block(s, BlockTrees::Static);
    } else {
        s.bits.send_bits((DYN_TREES << 1) + eof as u32, 3);
        let lcodes = s.l_max_code + 1;
        let dcodes = s.d_max_code + 1;
        send_all_trees(s, lcodes, dcodes, max_blindex + 1);
        compress_block(s, BlockTrees::Dynamic);
    }

    init_block(s);

    if eof {
        s.bits.bi_windup();
    }
}
