// Unit tests for the strategy drivers.
//
// The drivers are exercised directly over raw (unwrapped) state so the
// staged bytes can be checked against the RFC 1951 block layout; full
// stream semantics live in the e2e suites.

use zlibr::deflate::compress::{deflate_fast, deflate_slow, deflate_stored};
use zlibr::deflate::state::{DeflateState, Io};
use zlibr::deflate::types::{BlockState, Flush, Strategy};

fn raw_state(level: i32) -> DeflateState {
    DeflateState::new(level, -15, 8, Strategy::Default).expect("valid parameters")
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_stored
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn stored_block_layout_matches_rfc1951() {
    let mut s = raw_state(0);
    let src = b"0123456789".to_vec();
    let mut dst = vec![0u8; 64];
    let mut io = Io::new(&src, &mut dst);

    let state = deflate_stored(&mut s, &mut io, Flush::Finish);
    assert_eq!(state, BlockState::FinishDone);

    let written = io.next_out;
    // BFINAL=1/BTYPE=00 pads to 0x01, then LEN, NLEN, raw payload.
    assert_eq!(
        &dst[..written],
        &[
            0x01, 0x0a, 0x00, 0xf5, 0xff, b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8',
            b'9'
        ]
    );
}

#[test]
fn stored_needs_more_without_input_and_no_flush() {
    let mut s = raw_state(0);
    let src: Vec<u8> = Vec::new();
    let mut dst = vec![0u8; 64];
    let mut io = Io::new(&src, &mut dst);

    assert_eq!(deflate_stored(&mut s, &mut io, Flush::None), BlockState::NeedMore);
    assert_eq!(io.next_out, 0);
}

#[test]
fn stored_empty_finish_emits_empty_final_block() {
    let mut s = raw_state(0);
    let src: Vec<u8> = Vec::new();
    let mut dst = vec![0u8; 16];
    let mut io = Io::new(&src, &mut dst);

    let state = deflate_stored(&mut s, &mut io, Flush::Finish);
    assert_eq!(state, BlockState::FinishDone);
    let next_out = io.next_out;
    assert_eq!(&dst[..next_out], &[0x01, 0x00, 0x00, 0xff, 0xff]);
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate_fast / deflate_slow
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fast_needs_more_without_input_and_no_flush() {
    let mut s = raw_state(1);
    let src: Vec<u8> = Vec::new();
    let mut dst = vec![0u8; 64];
    let mut io = Io::new(&src, &mut dst);

    assert_eq!(deflate_fast(&mut s, &mut io, Flush::None), BlockState::NeedMore);
}

#[test]
fn fast_consumes_all_input_on_finish() {
    let mut s = raw_state(1);
    let src: Vec<u8> = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec();
    let mut dst = vec![0u8; 256];
    let mut io = Io::new(&src, &mut dst);

    let state = deflate_fast(&mut s, &mut io, Flush::Finish);
    assert_eq!(state, BlockState::FinishDone);
    assert_eq!(io.avail_in(), 0);
    assert_eq!(s.strstart as u64, s.total_in);
    assert_eq!(s.lookahead, 0);
    assert_eq!(s.last_lit, 0, "block statistics reset after the flush");
    assert!(io.next_out > 0);
    assert!(io.next_out < src.len(), "run of 'a' must compress");
}

#[test]
fn slow_emits_pending_literal_at_finish() {
    // A 4-byte tail forces the lazy evaluator to resolve its deferred
    // literal on the final flush.
    let mut s = raw_state(9);
    let src = b"abcd".to_vec();
    let mut dst = vec![0u8; 64];
    let mut io = Io::new(&src, &mut dst);

    let state = deflate_slow(&mut s, &mut io, Flush::Finish);
    assert_eq!(state, BlockState::FinishDone);
    assert!(!s.match_available);
    assert_eq!(s.strstart, 4);
    assert!(io.next_out > 0);
}

#[test]
fn strategy_yields_when_output_is_exhausted() {
    // Enough incompressible-ish input to overflow a 4-byte output space
    // mid-block; the driver must preserve state and report NeedMore or
    // FinishStarted without losing bytes.
    let mut src = Vec::with_capacity(200_000);
    let mut x = 0x2545_f491_u32;
    while src.len() < 200_000 {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        src.push((x >> 24) as u8);
    }

    let mut s = raw_state(6);
    let mut first = vec![0u8; 4];
    let mut io = Io::new(&src, &mut first);
    let state = deflate_slow(&mut s, &mut io, Flush::Finish);
    assert!(
        state == BlockState::NeedMore || state == BlockState::FinishStarted,
        "4 bytes of output cannot hold 200k of noise"
    );
    assert_eq!(io.avail_out(), 0);
}
