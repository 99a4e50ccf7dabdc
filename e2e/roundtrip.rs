//! E2E Test Suite 01: Round-trip correctness
//!
//! Every stream this crate produces must be reconstructed exactly by any
//! conforming RFC 1950/1951 decoder. Two independent decoders are used:
//! flate2 (miniz_oxide) and zune-inflate.
//!
//! Covers:
//! - the full level range 0..=9 and both extra strategies
//! - the windowBits 9..=15 and memLevel 1..=9 parameter axes
//! - raw (unwrapped) streams
//! - boundary scenarios: empty input, 32 KiB of zeros, highly
//!   repetitive text, fixed-seed random data

use zlibr::adler32::{adler32, ADLER32_INITIAL};
use zlibr::{compress_bound, compress_to_vec, DeflateStream, Flush, Status, Strategy};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Decode a zlib (or raw DEFLATE) stream with flate2.
fn inflate(data: &[u8], zlib_wrapper: bool) -> Vec<u8> {
    let mut d = flate2::Decompress::new(zlib_wrapper);
    let mut out = Vec::new();
    loop {
        out.reserve(64 * 1024);
        let consumed = d.total_in() as usize;
        let status = d
            .decompress_vec(&data[consumed..], &mut out, flate2::FlushDecompress::Finish)
            .expect("conforming stream");
        match status {
            flate2::Status::StreamEnd => return out,
            flate2::Status::Ok => {}
            flate2::Status::BufError => panic!("decoder stalled"),
        }
    }
}

/// Decode a zlib stream with zune-inflate (second opinion).
fn inflate_zune(data: &[u8]) -> Vec<u8> {
    zune_inflate::DeflateDecoder::new(data)
        .decode_zlib()
        .expect("conforming stream")
}

fn roundtrip(data: &[u8], level: i32) {
    let out = compress_to_vec(data, level).unwrap();
    assert_eq!(inflate(&out, true), data, "flate2 mismatch at level {level}");
    assert_eq!(inflate_zune(&out), data, "zune mismatch at level {level}");
}

/// Fixed-seed LCG byte generator; deterministic across runs.
fn pseudo_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((seed >> 24) as u8);
    }
    out
}

fn mixed_corpus() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"The quick brown fox jumps over the lazy dog. ".repeat(40).as_slice());
    data.extend_from_slice(&pseudo_random(8 * 1024, 0xbeef));
    data.extend_from_slice(&vec![0u8; 4 * 1024]);
    data.extend_from_slice(b"abcabcabcabcabc".repeat(100).as_slice());
    data
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: All levels round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_all_levels_roundtrip() {
    let data = mixed_corpus();
    for level in 0..=9 {
        roundtrip(&data, level);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Window and memory sizing axes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_window_bits_axis() {
    let data = mixed_corpus();
    for wbits in 9..=15 {
        let mut stream = DeflateStream::with_params(6, wbits, 8, Strategy::Default).unwrap();
        let mut out = vec![0u8; compress_bound(data.len())];
        let done = stream.deflate(&data, &mut out, Flush::Finish).unwrap();
        assert_eq!(done.status, Status::StreamEnd, "wbits {wbits}");
        assert_eq!(inflate(&out[..done.bytes_written], true), data, "wbits {wbits}");
    }
}

#[test]
fn test_mem_level_axis() {
    let data = mixed_corpus();
    for mem_level in 1..=9 {
        let mut stream = DeflateStream::with_params(6, 15, mem_level, Strategy::Default).unwrap();
        let mut out = vec![0u8; compress_bound(data.len())];
        let done = stream.deflate(&data, &mut out, Flush::Finish).unwrap();
        assert_eq!(done.status, Status::StreamEnd, "memLevel {mem_level}");
        assert_eq!(
            inflate(&out[..done.bytes_written], true),
            data,
            "memLevel {mem_level}"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Strategies
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_filtered_and_huffman_only_strategies() {
    let data = mixed_corpus();
    for strategy in [Strategy::Filtered, Strategy::HuffmanOnly] {
        for level in [1, 6, 9] {
            let mut stream = DeflateStream::with_params(level, 15, 8, strategy).unwrap();
            let mut out = vec![0u8; compress_bound(data.len())];
            let done = stream.deflate(&data, &mut out, Flush::Finish).unwrap();
            assert_eq!(done.status, Status::StreamEnd);
            assert_eq!(
                inflate(&out[..done.bytes_written], true),
                data,
                "{strategy:?} level {level}"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Raw (unwrapped) streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_raw_deflate_roundtrip() {
    let data = mixed_corpus();
    for level in [0, 1, 6, 9] {
        let mut stream = DeflateStream::with_params(level, -15, 8, Strategy::Default).unwrap();
        let mut out = vec![0u8; compress_bound(data.len())];
        let done = stream.deflate(&data, &mut out, Flush::Finish).unwrap();
        assert_eq!(done.status, Status::StreamEnd);
        let raw = &out[..done.bytes_written];
        // No zlib header byte: a raw stream starts with a block header.
        assert_eq!(inflate(raw, false), data, "raw level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Boundary scenario — empty input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_input() {
    let out = compress_to_vec(b"", 6).unwrap();
    assert_eq!(out, [0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
    assert_eq!(inflate(&out, true), b"");
    assert_eq!(inflate_zune(&out), b"");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Boundary scenario — 32 KiB of zeros, level 1 vs level 9
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_zeros_level1_vs_level9() {
    let data = vec![0u8; 32 * 1024];
    let lo = compress_to_vec(&data, 1).unwrap();
    let hi = compress_to_vec(&data, 9).unwrap();
    assert_eq!(inflate(&lo, true), data);
    assert_eq!(inflate(&hi, true), data);
    assert!(hi.len() <= lo.len(), "level 9 must not lose to level 1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: Boundary scenario — highly repetitive text
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_repetitive_text_ratio() {
    let data = b"ABC".repeat(10_000);
    let out = compress_to_vec(&data, 6).unwrap();
    assert_eq!(inflate(&out, true), data);
    assert!(
        out.len() * 100 < data.len(),
        "30 KB of 'ABC' must compress below 1% ({} bytes)",
        out.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 8: Boundary scenario — fixed-seed random data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_random_data_expands_bounded() {
    let data = pseudo_random(64 * 1024, 0x1234_5678);
    let out = compress_to_vec(&data, 6).unwrap();
    assert_eq!(inflate(&out, true), data);
    assert_eq!(inflate_zune(&out), data);
    assert!(out.len() <= compress_bound(data.len()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 9: Trailer checksum
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_trailer_is_the_adler_of_the_input() {
    let data = mixed_corpus();
    for level in [0, 1, 6, 9] {
        let out = compress_to_vec(&data, level).unwrap();
        let trailer = u32::from_be_bytes(out[out.len() - 4..].try_into().unwrap());
        assert_eq!(trailer, adler32(ADLER32_INITIAL, &data), "level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 10: Level 0 stores verbatim
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_level0_is_stored_and_slightly_larger() {
    let data = pseudo_random(100_000, 7);
    let out = compress_to_vec(&data, 0).unwrap();
    assert_eq!(inflate(&out, true), data);
    // Stored framing: 5 bytes per up-to-64K block plus the wrapper.
    assert!(out.len() >= data.len());
    assert!(out.len() < data.len() + 64);
}
