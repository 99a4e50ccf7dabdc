//! The three block-shape routines.
//!
//! Translated from deflate.c v1.3.1:
//!   - [`flush_block_only`] ← `FLUSH_BLOCK_ONLY`
//!   - [`deflate_stored`]   ← `deflate_stored` (level 0)
//!   - [`deflate_fast`]     ← `deflate_fast` (levels 1-3, greedy)
//!   - [`deflate_slow`]     ← `deflate_slow` (levels 4-9, lazy)
//!
//! Each routine is a cooperative resumable loop: it advances one literal
//! or one match per iteration, flushes the block when the symbol buffer
//! fills, and returns [`BlockState::NeedMore`] the moment input runs out
//! or the caller's output fills — every loop-carried variable lives in
//! [`DeflateState`], so the next call resumes byte-identically.

use crate::deflate::search::longest_match;
use crate::deflate::state::{flush_pending, DeflateState, Io};
use crate::deflate::types::{BlockState, Flush, Strategy, MIN_LOOKAHEAD, MIN_MATCH, TOO_FAR};
use crate::deflate::window::{fill_window, insert_string, update_hash};
use crate::trees::encode::{tr_flush_block, tr_tally};

/// Flush the current block (without marking it last) and drain what fits.
///
/// Equivalent to the `FLUSH_BLOCK_ONLY` macro. A negative `block_start`
/// (data slid out of the window) disables the stored encoding for this
/// block.
pub fn flush_block_only(s: &mut DeflateState, io: &mut Io, eof: bool) {
    let buf = if s.block_start >= 0 {
        Some(s.block_start as usize)
    } else {
        None
    };
    let stored_len = (s.strstart as isize - s.block_start) as usize;
    tr_flush_block(s, buf, stored_len, eof);
    s.block_start = s.strstart as isize;
    flush_pending(s, io);
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_stored  (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Copy without compression as much as possible from the input stream.
///
/// Equivalent to `deflate_stored`. Stored blocks are limited to 65535
/// bytes and to what the pending buffer can hold behind the 5-byte header.
pub fn deflate_stored(s: &mut DeflateState, io: &mut Io, flush: Flush) -> BlockState {
    let mut max_block_size = 0xffff_usize;
    if max_block_size > s.bits.pending_buf_size - 5 {
        max_block_size = s.bits.pending_buf_size - 5;
    }

    // Copy as much as possible from input to output:
    loop {
        // Fill the window as much as possible:
        if s.lookahead <= 1 {
            fill_window(s, io);
            if s.lookahead == 0 && flush == Flush::None {
                return BlockState::NeedMore;
            }
            if s.lookahead == 0 {
                break; // flush the current block
            }
        }

        debug_assert!(s.block_start >= 0, "block gone");
        s.strstart += s.lookahead;
        s.lookahead = 0;

        // Emit a stored block if it reaches its size limit:
        let max_start = s.block_start + max_block_size as isize;
        if (s.strstart as isize) >= max_start {
            s.lookahead = (s.strstart as isize - max_start) as usize;
            s.strstart = max_start as usize;
            flush_block_only(s, io, false);
            if io.avail_out() == 0 {
                return BlockState::NeedMore;
            }
        }

        // Flush if we may have to slide, otherwise block_start may become
        // negative and the data will be gone:
        if s.strstart as isize - s.block_start >= s.max_dist() as isize {
            flush_block_only(s, io, false);
            if io.avail_out() == 0 {
                return BlockState::NeedMore;
            }
        }
    }

    flush_block_only(s, io, flush == Flush::Finish);
    if io.avail_out() == 0 {
        return if flush == Flush::Finish {
            BlockState::FinishStarted
        } else {
            BlockState::NeedMore
        };
    }
    if flush == Flush::Finish {
        BlockState::FinishDone
    } else {
        BlockState::BlockDone
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_fast  (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Compress as much as possible without lazy evaluation: a new match is
/// only attempted at the head of each emitted run.
///
/// Equivalent to `deflate_fast`.
pub fn deflate_fast(s: &mut DeflateState, io: &mut Io, flush: Flush) -> BlockState {
    let mut hash_head; // head of the hash chain

    loop {
        // Make sure that we always have enough lookahead, except at the
        // end of the input file. We need MAX_MATCH bytes for the next
        // match, plus MIN_MATCH bytes to insert the string following it.
        if s.lookahead < MIN_LOOKAHEAD {
            fill_window(s, io);
            if s.lookahead < MIN_LOOKAHEAD && flush == Flush::None {
                return BlockState::NeedMore;
            }
            if s.lookahead == 0 {
                break; // flush the current block
            }
        }

        // Insert the string window[strstart .. strstart+2] in the
        // dictionary, and set hash_head to the head of the hash chain:
        hash_head = 0;
        if s.lookahead >= MIN_MATCH {
            hash_head = insert_string(s, s.strstart);
        }

        // Find the longest match, discarding those <= prev_length. At this
        // point we always have match_length < MIN_MATCH.
        if hash_head != 0 && s.strstart - hash_head <= s.max_dist() {
            // To simplify the code, we prevent matches with the string of
            // window index 0 (in particular we have to avoid a match of
            // the string with itself at the start of the input file).
            if s.strategy != Strategy::HuffmanOnly {
                s.match_length = longest_match(s, hash_head);
            }
            // longest_match sets match_start
        }

        let bflush; // set if current block must be flushed
        if s.match_length >= MIN_MATCH {
            bflush = tr_tally(s, s.strstart - s.match_start, s.match_length - MIN_MATCH);
            s.lookahead -= s.match_length;

            // Insert new strings in the hash table only if the match
            // length is not too large. This saves time but degrades
            // compression.
            if s.match_length <= s.max_lazy_match && s.lookahead >= MIN_MATCH {
                s.match_length -= 1; // string at strstart already in table
                loop {
                    s.strstart += 1;
                    insert_string(s, s.strstart);
                    // strstart never exceeds WSIZE-MAX_MATCH, so there is
                    // always MIN_MATCH bytes ahead.
                    s.match_length -= 1;
                    if s.match_length == 0 {
                        break;
                    }
                }
                s.strstart += 1;
            } else {
                s.strstart += s.match_length;
                s.match_length = 0;
                s.ins_h = s.window[s.strstart] as u32;
                s.ins_h = update_hash(s, s.ins_h, s.window[s.strstart + 1]);
                // If lookahead < MIN_MATCH, ins_h is garbage, but it does
                // not matter since it will be recomputed at next deflate
                // call.
            }
        } else {
            // No match, output a literal byte
            let lit = s.window[s.strstart];
            bflush = tr_tally(s, 0, lit as usize);
            s.lookahead -= 1;
            s.strstart += 1;
        }
        if bflush {
            flush_block_only(s, io, false);
            if io.avail_out() == 0 {
                return BlockState::NeedMore;
            }
        }
    }

    flush_block_only(s, io, flush == Flush::Finish);
    if io.avail_out() == 0 {
        return if flush == Flush::Finish {
            BlockState::FinishStarted
        } else {
            BlockState::NeedMore
        };
    }
    if flush == Flush::Finish {
        BlockState::FinishDone
    } else {
        BlockState::BlockDone
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_slow  (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

/// Same as [`deflate_fast`] but with better match discovery: the match at
/// the current position is only emitted if the next position does not
/// start a longer one (lazy evaluation).
///
/// Equivalent to `deflate_slow`.
pub fn deflate_slow(s: &mut DeflateState, io: &mut Io, flush: Flush) -> BlockState {
    let mut hash_head; // head of hash chain

    // Process the input block.
    loop {
        // Make sure that we always have enough lookahead, except at the
        // end of the input file.
        if s.lookahead < MIN_LOOKAHEAD {
            fill_window(s, io);
            if s.lookahead < MIN_LOOKAHEAD && flush == Flush::None {
                return BlockState::NeedMore;
            }
            if s.lookahead == 0 {
                break; // flush the current block
            }
        }

        // Insert the string window[strstart .. strstart+2] in the
        // dictionary, and set hash_head to the head of the hash chain:
        hash_head = 0;
        if s.lookahead >= MIN_MATCH {
            hash_head = insert_string(s, s.strstart);
        }

        // Find the longest match, discarding those <= prev_length.
        s.prev_length = s.match_length;
        s.prev_match = s.match_start;
        s.match_length = MIN_MATCH - 1;

        if hash_head != 0
            && s.prev_length < s.max_lazy_match
            && s.strstart - hash_head <= s.max_dist()
        {
            if s.strategy != Strategy::HuffmanOnly {
                s.match_length = longest_match(s, hash_head);
            }
            // longest_match sets match_start

            if s.match_length <= 5
                && (s.strategy == Strategy::Filtered
                    || (s.match_length == MIN_MATCH && s.strstart - s.match_start > TOO_FAR))
            {
                // If prev_match is also MIN_MATCH, match_start is garbage
                // but we will ignore the current match anyway.
                s.match_length = MIN_MATCH - 1;
            }
        }

        // If there was a match at the previous step and the current match
        // is not better, output the previous match:
        if s.prev_length >= MIN_MATCH && s.match_length <= s.prev_length {
            let max_insert = s.strstart + s.lookahead - MIN_MATCH;
            // Do not insert strings in hash table beyond this.

            let bflush = tr_tally(s, s.strstart - 1 - s.prev_match, s.prev_length - MIN_MATCH);

            // Insert in hash table all strings up to the end of the match.
            // strstart-1 and strstart are already inserted. If there is
            // not enough lookahead, the last two strings are not inserted
            // in the hash table.
            s.lookahead -= s.prev_length - 1;
            s.prev_length -= 2;
            loop {
                s.strstart += 1;
                if s.strstart <= max_insert {
                    insert_string(s, s.strstart);
                }
                s.prev_length -= 1;
                if s.prev_length == 0 {
                    break;
                }
            }
            s.match_available = false;
            s.match_length = MIN_MATCH - 1;
            s.strstart += 1;

            if bflush {
                flush_block_only(s, io, false);
                if io.avail_out() == 0 {
                    return BlockState::NeedMore;
                }
            }
        } else if s.match_available {
            // If there was no match at the previous position, output a
            // single literal. If there was a match but the current match
            // is longer, truncate the previous match to a single literal.
            let lit = s.window[s.strstart - 1];
            let bflush = tr_tally(s, 0, lit as usize);
            if bflush {
                flush_block_only(s, io, false);
            }
            s.strstart += 1;
            s.lookahead -= 1;
            if io.avail_out() == 0 {
                return BlockState::NeedMore;
            }
        } else {
            // There is no previous match to compare with, wait for the
            // next step to decide.
            s.match_available = true;
            s.strstart += 1;
            s.lookahead -= 1;
        }
    }

    debug_assert!(flush != Flush::None, "no flush?");
    if s.match_available {
        let lit = s.window[s.strstart - 1];
        tr_tally(s, 0, lit as usize);
        s.match_available = false;
    }
    flush_block_only(s, io, flush == Flush::Finish);
    if io.avail_out() == 0 {
        return if flush == Flush::Finish {
            BlockState::FinishStarted
        } else {
            BlockState::NeedMore
        };
    }
    if flush == Flush::Finish {
        BlockState::FinishDone
    } else {
        BlockState::BlockDone
    }
}
