//! Sliding window management and the rolling hash.
//!
//! Translated from deflate.c v1.3.1:
//!   - [`update_hash`]   ← the `UPDATE_HASH` macro
//!   - [`insert_string`] ← the `INSERT_STRING` macro
//!   - [`read_buf`]      ← `read_buf` (also feeds the running Adler-32)
//!   - [`fill_window`]   ← `fill_window` (incl. the window slide and the
//!     hash-link rebasing)
//!
//! The window is `2 * w_size` bytes. Matching always happens in the lower
//! half plus `MIN_LOOKAHEAD` slack; when `strstart` runs into the upper
//! end, the upper half is copied down, all indices drop by `w_size`, and
//! hash links that would point before the new origin are cut to 0.

use crate::adler32::adler32;
use crate::deflate::state::{DeflateState, Io};
use crate::deflate::types::{MIN_LOOKAHEAD, MIN_MATCH};

/// Fold one more byte into the rolling hash.
///
/// Equivalent to `UPDATE_HASH(s, h, c)`: after `MIN_MATCH` steps the hash
/// depends on exactly the last `MIN_MATCH` bytes.
#[inline]
pub fn update_hash(s: &DeflateState, h: u32, c: u8) -> u32 {
    ((h << s.hash_shift) ^ c as u32) & s.hash_mask
}

/// Insert the 3-byte string starting at window position `pos` into the
/// hash table, returning the previous chain head for that hash (0 when
/// the chain was empty).
///
/// Equivalent to `INSERT_STRING(s, str, match_head)`; on return `ins_h`
/// hashes the bytes at `pos .. pos + 3`.
#[inline]
pub fn insert_string(s: &mut DeflateState, pos: usize) -> usize {
    s.ins_h = update_hash(s, s.ins_h, s.window[pos + (MIN_MATCH - 1)]);
    let head = s.head[s.ins_h as usize];
    s.prev[pos & s.w_mask] = head;
    s.head[s.ins_h as usize] = pos as u16;
    head as usize
}

/// Copy up to `size` bytes of caller input into the window at `offset`,
/// advancing the input cursor, the byte total, and — when the zlib wrapper
/// is active — the running Adler-32.
///
/// Equivalent to `read_buf`.
pub fn read_buf(s: &mut DeflateState, io: &mut Io, offset: usize, size: usize) -> usize {
    let len = io.avail_in().min(size);
    if len == 0 {
        return 0;
    }

    s.window[offset..offset + len].copy_from_slice(&io.src[io.next_in..io.next_in + len]);
    if s.wrap {
        s.adler = adler32(s.adler, &s.window[offset..offset + len]);
    }
    io.next_in += len;
    s.total_in += len as u64;
    len
}

/// Refill the window until `lookahead >= MIN_LOOKAHEAD` or the caller's
/// input is drained, sliding the window first when the free tail is gone.
///
/// Equivalent to `fill_window`.
pub fn fill_window(s: &mut DeflateState, io: &mut Io) {
    loop {
        let mut more = s.window_size - s.lookahead - s.strstart;

        if s.strstart >= s.w_size + s.max_dist() {
            let w_size = s.w_size;
            s.window.copy_within(w_size..2 * w_size, 0);
            // match_start may be stale when no match is pending; the
            // wrapped value is never read in that case.
            s.match_start = s.match_start.wrapping_sub(w_size);
            s.strstart -= w_size;
            s.block_start -= w_size as isize; // may become negative
            // Rebase every hash link; entries now outside the window
            // terminate their chain.
            for head in s.head.iter_mut() {
                let m = *head as usize;
                *head = if m >= w_size { (m - w_size) as u16 } else { 0 };
            }
            for link in s.prev.iter_mut() {
                let m = *link as usize;
                *link = if m >= w_size { (m - w_size) as u16 } else { 0 };
            }
            more += w_size;
        }

        if io.avail_in() == 0 {
            return;
        }

        // If there was no sliding: strstart <= WSIZE+MAX_DIST-1 &&
        //   lookahead <= MIN_LOOKAHEAD - 1 && more == window_size - lookahead - strstart
        // If there was sliding: strstart <= WSIZE - MIN_LOOKAHEAD and
        //   more >= WSIZE, so in both cases more >= 2.
        debug_assert!(more >= 2, "more < 2");

        let offset = s.strstart + s.lookahead;
        let n = read_buf(s, io, offset, more);
        s.lookahead += n;

        // Initialize the hash value now that we have some input.
        if s.lookahead >= MIN_MATCH {
            s.ins_h = s.window[s.strstart] as u32;
            s.ins_h = update_hash(s, s.ins_h, s.window[s.strstart + 1]);
            // If lookahead < MIN_MATCH, ins_h is garbage, but it is not
            // important since only literal bytes will be emitted.
        }

        if s.lookahead >= MIN_LOOKAHEAD || io.avail_in() == 0 {
            return;
        }
    }
}
