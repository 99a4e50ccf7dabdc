//! E2E Test Suite 03: Preset dictionaries
//!
//! Validates `set_dictionary` semantics end to end:
//! - the header carries the FDICT flag and the dictionary's Adler-32 id
//! - the trailer covers the content only, not the dictionary
//! - a decoder given the same dictionary recovers the plaintext
//! - the dictionary actually improves compression of matching content

use zlibr::adler32::{adler32, ADLER32_INITIAL};
use zlibr::{compress_bound, compress_to_vec, DeflateStream, Flush, Status, ZlibError};

const DICT: &[u8] = b"The quick brown fox";
const CONTENT: &[u8] = b"The quick brown fox jumps over the lazy dog";

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn compress_with_dict(dict: &[u8], content: &[u8], level: i32) -> Vec<u8> {
    let mut stream = DeflateStream::new(level).unwrap();
    stream.set_dictionary(dict).unwrap();
    let mut out = vec![0u8; compress_bound(content.len()) + 4];
    let done = stream.deflate(content, &mut out, Flush::Finish).unwrap();
    assert_eq!(done.status, Status::StreamEnd);
    out.truncate(done.bytes_written);
    out
}

/// Decode a zlib stream that demands a preset dictionary.
fn inflate_with_dict(data: &[u8], dict: &[u8]) -> (u32, Vec<u8>) {
    let mut d = flate2::Decompress::new(true);
    let mut out = Vec::with_capacity(64 * 1024);

    // The first decompress attempt stops at the FDICT header.
    let err = d
        .decompress_vec(data, &mut out, flate2::FlushDecompress::Finish)
        .expect_err("decoder must demand the dictionary");
    let dict_id = err.needs_dictionary().expect("NEED_DICT, not a failure");
    d.set_dictionary(dict).expect("dictionary accepted");

    loop {
        let consumed = d.total_in() as usize;
        let status = d
            .decompress_vec(&data[consumed..], &mut out, flate2::FlushDecompress::Finish)
            .expect("conforming stream");
        match status {
            flate2::Status::StreamEnd => return (dict_id, out),
            flate2::Status::Ok => out.reserve(64 * 1024),
            flate2::Status::BufError => panic!("decoder stalled"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Header flag and dictionary id
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_header_carries_fdict_and_id() {
    let out = compress_with_dict(DICT, CONTENT, 6);
    assert_ne!(out[1] & 0x20, 0, "FDICT flag must be set");
    assert_eq!(
        (u16::from_be_bytes([out[0], out[1]])) % 31,
        0,
        "check bits must still hold with FDICT"
    );
    let dict_id = u32::from_be_bytes(out[2..6].try_into().unwrap());
    assert_eq!(dict_id, adler32(ADLER32_INITIAL, DICT));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Round-trip through a dictionary-aware decoder
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_with_decoder_dictionary() {
    for level in [1, 6, 9] {
        let out = compress_with_dict(DICT, CONTENT, level);
        let (dict_id, plain) = inflate_with_dict(&out, DICT);
        assert_eq!(dict_id, adler32(ADLER32_INITIAL, DICT), "level {level}");
        assert_eq!(plain, CONTENT, "level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Trailer covers content only
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_trailer_excludes_the_dictionary() {
    let out = compress_with_dict(DICT, CONTENT, 6);
    let trailer = u32::from_be_bytes(out[out.len() - 4..].try_into().unwrap());
    assert_eq!(trailer, adler32(ADLER32_INITIAL, CONTENT));
    assert_ne!(trailer, adler32(adler32(ADLER32_INITIAL, DICT), CONTENT));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Dictionary improves compression of matching content
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_dictionary_improves_ratio() {
    let with_dict = compress_with_dict(DICT, CONTENT, 9);
    let without = compress_to_vec(CONTENT, 9).unwrap();
    // The stream with a dictionary pays 4 extra header bytes yet still
    // wins, because the 19-byte prefix collapses into one match.
    assert!(
        with_dict.len() < without.len(),
        "dict {} vs plain {}",
        with_dict.len(),
        without.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Oversized dictionaries keep the usable tail
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_oversized_dictionary_uses_tail() {
    // A dictionary larger than the match window is truncated to its tail
    // (w_size - MIN_LOOKAHEAD bytes). Seeding with the oversized
    // dictionary or with that tail directly must produce the same
    // DEFLATE body; only the header dictionary id differs.
    let keep = (1usize << 15) - 262;
    let mut big = vec![b'.'; 40 * 1024];
    let tail = b"needle that must survive the truncation";
    let at = big.len() - tail.len();
    big[at..].copy_from_slice(tail);
    let effective = big[big.len() - keep..].to_vec();

    let content = b"needle that must survive the truncation!";
    let with_big = compress_with_dict(&big, content, 9);
    let with_tail = compress_with_dict(&effective, content, 9);

    assert_ne!(with_big[2..6], with_tail[2..6], "dictionary ids differ");
    assert_eq!(with_big[6..], with_tail[6..], "bodies must be identical");

    // And the tail-seeded stream round-trips through the decoder.
    let (_, plain) = inflate_with_dict(&with_tail, &effective);
    assert_eq!(plain, content);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Dictionary only in INIT state
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_set_dictionary_after_start_is_stream_error() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 64];
    stream.deflate(b"data", &mut out, Flush::None).unwrap();
    assert_eq!(
        stream.set_dictionary(DICT).unwrap_err(),
        ZlibError::Stream
    );
}
