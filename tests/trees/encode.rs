// Unit tests for the bit sink and block emission.
//
// Coverage:
//   - BitWriter: LSB-first packing, 16-bit spill, bi_flush residue,
//     bi_windup zero padding, copy_block LEN/NLEN layout
//   - tr_stored_block: empty-marker byte sequence (the sync marker)
//   - tr_align: 10-bit empty static block
//   - tr_tally: overlay writes, frequency updates, block-full trigger

use zlibr::deflate::state::DeflateState;
use zlibr::deflate::types::{Strategy, END_BLOCK, LITERALS};
use zlibr::trees::encode::{tr_align, tr_stored_block, tr_tally, BitWriter};

fn fresh_state() -> DeflateState {
    DeflateState::new(6, 15, 8, Strategy::Default).expect("valid parameters")
}

/// Drain whatever the writer staged.
fn staged(bits: &BitWriter) -> &[u8] {
    &bits.pending_buf[bits.pending_out..bits.pending_out + bits.pending]
}

// ─────────────────────────────────────────────────────────────────────────────
// send_bits / bi_flush / bi_windup
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn send_bits_packs_lsb_first() {
    let mut bits = BitWriter::new(64);
    bits.send_bits(0b101, 3); // occupies bits 0..3
    bits.send_bits(0b01, 2); // occupies bits 3..5
    bits.bi_windup();
    assert_eq!(staged(&bits), &[0b0000_1101]);
}

#[test]
fn send_bits_spills_full_register() {
    let mut bits = BitWriter::new(64);
    bits.send_bits(0xffff, 16);
    bits.send_bits(1, 1);
    assert_eq!(bits.bi_valid, 1);
    bits.bi_windup();
    assert_eq!(staged(&bits), &[0xff, 0xff, 0x01]);
}

#[test]
fn send_bits_splits_across_register_boundary() {
    let mut bits = BitWriter::new(64);
    bits.send_bits(0x3fff, 14); // 14 bits set
    bits.send_bits(0b10101, 5); // 3 bits land low, 2 spill
    bits.bi_windup();
    // First 16 bits: 14 ones then the low "01" of 10101 → ff 7f; the
    // remaining "101" pads to one byte.
    assert_eq!(staged(&bits), &[0xff, 0x7f, 0b101]);
}

#[test]
fn bi_flush_leaves_partial_byte() {
    let mut bits = BitWriter::new(64);
    bits.send_bits(0b1_0101_0101_0101, 13);
    bits.bi_flush();
    assert_eq!(bits.pending, 1);
    assert_eq!(bits.bi_valid, 5);
    bits.bi_flush(); // below 8 valid bits: no further output
    assert_eq!(bits.pending, 1);
}

#[test]
fn bi_windup_resets_the_register() {
    let mut bits = BitWriter::new(64);
    bits.send_bits(0b11, 2);
    bits.bi_windup();
    assert_eq!(bits.bi_valid, 0);
    assert_eq!(bits.bi_buf, 0);
    assert_eq!(staged(&bits), &[0b11]);
}

#[test]
fn copy_block_emits_len_nlen_little_endian() {
    let mut bits = BitWriter::new(64);
    bits.copy_block(b"abc", true);
    assert_eq!(staged(&bits), &[0x03, 0x00, 0xfc, 0xff, b'a', b'b', b'c']);
}

// ─────────────────────────────────────────────────────────────────────────────
// Stored marker / align
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_stored_block_is_the_sync_marker() {
    let mut s = fresh_state();
    tr_stored_block(&mut s, None, 0, false);
    // 3 header bits (type 00, not last) pad to one zero byte, then
    // LEN = 0000 and NLEN = ffff.
    assert_eq!(staged(&s.bits), &[0x00, 0x00, 0x00, 0xff, 0xff]);
}

#[test]
fn align_emits_one_empty_static_block() {
    let mut s = fresh_state();
    tr_align(&mut s);
    // 3-bit type 01 header + 7-bit END_BLOCK = 10 bits; one byte staged,
    // two bits remain in the register.
    assert_eq!(s.bits.pending, 1);
    assert_eq!(s.bits.bi_valid, 2);
    assert_eq!(s.last_eob_len, 7);
}

// ─────────────────────────────────────────────────────────────────────────────
// tr_tally
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn tally_literal_updates_overlay_and_freq() {
    let mut s = fresh_state();
    let flush = tr_tally(&mut s, 0, b'A' as usize);
    assert!(!flush);
    assert_eq!(s.last_lit, 1);
    assert_eq!(s.matches, 0);
    assert_eq!(s.dyn_ltree[b'A' as usize].freq(), 1);
    assert_eq!(s.bits.pending_buf[s.d_buf], 0);
    assert_eq!(s.bits.pending_buf[s.d_buf + 1], 0);
    assert_eq!(s.bits.pending_buf[s.l_buf], b'A');
}

#[test]
fn tally_match_updates_both_trees() {
    let mut s = fresh_state();
    // Distance 1, length 3 (lc = 0): length code 257, distance code 0.
    let flush = tr_tally(&mut s, 1, 0);
    assert!(!flush);
    assert_eq!(s.matches, 1);
    assert_eq!(s.dyn_ltree[LITERALS + 1].freq(), 1);
    assert_eq!(s.dyn_dtree[0].freq(), 1);
    // Overlay stores the distance big-endian.
    assert_eq!(s.bits.pending_buf[s.d_buf], 0);
    assert_eq!(s.bits.pending_buf[s.d_buf + 1], 1);
}

#[test]
fn tally_match_distance_is_stored_big_endian() {
    let mut s = fresh_state();
    tr_tally(&mut s, 0x1234, 10);
    assert_eq!(s.bits.pending_buf[s.d_buf], 0x12);
    assert_eq!(s.bits.pending_buf[s.d_buf + 1], 0x34);
    assert_eq!(s.bits.pending_buf[s.l_buf], 10);
}

#[test]
fn tally_reports_full_at_lit_bufsize_minus_one() {
    // mem_level 1 keeps the buffer small: 128 entries.
    let mut s = DeflateState::new(6, 15, 1, Strategy::Default).unwrap();
    for n in 0..s.lit_bufsize - 2 {
        assert!(!tr_tally(&mut s, 0, n & 0xff), "premature flush at {n}");
    }
    assert!(tr_tally(&mut s, 0, 0));
    assert_eq!(s.last_lit, s.lit_bufsize - 1);
}

#[test]
fn end_block_frequency_is_preset() {
    let s = fresh_state();
    assert_eq!(s.dyn_ltree[END_BLOCK].freq(), 1);
}
