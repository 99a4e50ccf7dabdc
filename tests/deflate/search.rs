// Unit tests for the hash-chain match search.
//
// Coverage:
//   - basic match discovery through a primed chain
//   - clamping of the returned length to the available lookahead
//   - most-recent-position preference among equal-length candidates

use zlibr::deflate::state::DeflateState;
use zlibr::deflate::search::longest_match;
use zlibr::deflate::types::{Strategy, MIN_MATCH};
use zlibr::deflate::window::{insert_string, update_hash};

fn state_with(data: &[u8]) -> DeflateState {
    let mut s = DeflateState::new(6, 15, 8, Strategy::Default).expect("valid parameters");
    s.window[..data.len()].copy_from_slice(data);
    s
}

/// Prime the rolling hash at `from` and insert every position in
/// `from..to`, the way the strategy loops do while advancing.
fn insert_range(s: &mut DeflateState, from: usize, to: usize) {
    s.ins_h = s.window[from] as u32;
    s.ins_h = update_hash(s, s.ins_h, s.window[from + 1]);
    for pos in from..to {
        insert_string(s, pos);
    }
}

#[test]
fn finds_a_five_byte_match() {
    // "abcde" at position 1 recurs at position 6, then diverges.
    let mut s = state_with(b"_abcdeabcdeXXXXXXXX");
    insert_range(&mut s, 1, 6);
    s.strstart = 6;
    s.lookahead = 13;
    s.prev_length = MIN_MATCH - 1;

    let head = insert_string(&mut s, 6);
    assert_eq!(head, 1, "chain head should be the earlier occurrence");

    let len = longest_match(&mut s, head);
    assert_eq!(len, 5);
    assert_eq!(s.match_start, 1);
}

#[test]
fn match_length_is_clamped_to_lookahead() {
    let mut s = state_with(b"_abcdeabcdeXXXXXXXX");
    insert_range(&mut s, 1, 6);
    s.strstart = 6;
    s.lookahead = 4; // only 4 valid bytes ahead
    s.prev_length = MIN_MATCH - 1;

    let head = insert_string(&mut s, 6);
    let len = longest_match(&mut s, head);
    assert_eq!(len, 4);
}

#[test]
fn prefers_the_most_recent_candidate_on_ties() {
    // "abc" occurs at positions 1, 6 and 11, each followed by a
    // different byte, so all candidates give length 3.
    let mut s = state_with(b"_abcU_abcV_abcWtrailingpad");
    insert_range(&mut s, 1, 11);
    s.strstart = 11;
    s.lookahead = 15;
    s.prev_length = MIN_MATCH - 1;

    let head = insert_string(&mut s, 11);
    assert_eq!(head, 6, "head of chain is the most recent occurrence");

    let len = longest_match(&mut s, head);
    assert_eq!(len, 3);
    assert_eq!(s.match_start, 6);
}

#[test]
fn long_runs_extend_to_the_full_repeat() {
    // A run of 80 'z' bytes: matching position 2 against position 1
    // yields length 79 in classic run-length style.
    let mut data = vec![b'q'; 120];
    for byte in data.iter_mut().take(81).skip(1) {
        *byte = b'z';
    }
    let mut s = state_with(&data);
    insert_range(&mut s, 1, 2);
    s.strstart = 2;
    s.lookahead = 100;
    s.prev_length = MIN_MATCH - 1;

    let head = insert_string(&mut s, 2);
    assert_eq!(head, 1);

    let len = longest_match(&mut s, head);
    assert_eq!(len, 79);
    assert_eq!(s.match_start, 1);
}
