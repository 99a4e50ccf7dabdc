//! Hash-chain match search.
//!
//! Translated from deflate.c v1.3.1 (`longest_match`). The chain walk is
//! budgeted by `max_chain_length` (quartered once the previous match is
//! already `good_match` long), stops early at `nice_match`, and uses the
//! classic two-byte suffix reject before committing to a full forward
//! comparison.

use crate::deflate::state::DeflateState;
use crate::deflate::types::{MAX_MATCH, MIN_LOOKAHEAD};

/// Find the longest match for the string at `strstart`, walking the hash
/// chain starting at `cur_match` (the chain head for the current hash).
///
/// Returns the match length and records its position in `match_start`;
/// only lengths `>= MIN_MATCH` are meaningful to the caller. Ties prefer
/// the most recent position, which falls out of the walk order.
///
/// Equivalent to `longest_match`. Precondition, as upstream: the chain
/// head is non-zero and within `max_dist()` of `strstart`, and
/// `strstart <= window_size - MIN_LOOKAHEAD`.
pub fn longest_match(s: &mut DeflateState, mut cur_match: usize) -> usize {
    let mut chain_length = s.max_chain_length; // max hash chain length
    let mut scan = s.strstart; // current string
    let mut best_len = s.prev_length; // best match length so far
    let mut nice_match = s.nice_match; // stop if match long enough
    let w_mask = s.w_mask;

    // Stop when cur_match becomes <= limit: positions below it are outside
    // the valid part of the window.
    let limit = if s.strstart > s.max_dist() {
        s.strstart - s.max_dist()
    } else {
        0
    };

    let strend = s.strstart + MAX_MATCH;

    debug_assert!(
        s.strstart <= s.window_size - MIN_LOOKAHEAD,
        "need lookahead"
    );
    debug_assert!(cur_match < s.strstart, "no future");

    // Do not waste too much time if we already have a good match.
    if s.prev_length >= s.good_match {
        chain_length >>= 2;
    }
    // Do not look for matches beyond the end of the input. This is
    // necessary to make deflate deterministic.
    if nice_match > s.lookahead {
        nice_match = s.lookahead;
    }

    let win = &s.window;
    let prev = &s.prev;
    let mut scan_end1 = win[scan + best_len - 1];
    let mut scan_end = win[scan + best_len];
    let mut match_start = s.match_start;

    loop {
        let mut m = cur_match;

        // Skip to next match if the match length cannot increase or if the
        // match length is less than 2. The checked bytes are cheap to
        // compare and likeliest to differ.
        if win[m + best_len] == scan_end
            && win[m + best_len - 1] == scan_end1
            && win[m] == win[scan]
            && win[m + 1] == win[scan + 1]
        {
            // The check at best_len - 1 can be removed because it will be
            // made again later. (This heuristic is not always a win.)
            // scan[2] == match[2] is already implied by the equal hash
            // keys, given hash_bits >= 8.
            scan += 2;
            m += 2;

            // We check for insufficient lookahead only every 8th
            // comparison; the 256th check will be made at strstart + 258.
            loop {
                scan += 1;
                m += 1;
                if scan >= strend || win[scan] != win[m] {
                    break;
                }
            }

            let len = MAX_MATCH - (strend - scan);
            scan = strend - MAX_MATCH;

            if len > best_len {
                match_start = cur_match;
                best_len = len;
                if len >= nice_match {
                    break;
                }
                scan_end1 = win[scan + best_len - 1];
                scan_end = win[scan + best_len];
            }
        }

        cur_match = prev[cur_match & w_mask] as usize;
        if cur_match <= limit {
            break;
        }
        chain_length -= 1;
        if chain_length == 0 {
            break;
        }
    }

    s.match_start = match_start;
    if best_len <= s.lookahead {
        best_len
    } else {
        s.lookahead
    }
}
