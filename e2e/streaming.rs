//! E2E Test Suite 02: Streaming, chunking and flush semantics
//!
//! Validates the resumable state machine:
//! - chunked input with NO_FLUSH produces output identical to one-shot
//! - arbitrarily small output buffers produce identical bytes
//! - SYNC_FLUSH leaves the 00 00 FF FF marker and the stream continues
//! - FULL_FLUSH makes the tail independently decodable
//! - PARTIAL_FLUSH streams stay decodable

use zlibr::{compress_bound, compress_to_vec, DeflateStream, Flush, Status, Strategy};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

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

fn pseudo_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.push((seed >> 24) as u8);
    }
    out
}

fn corpus() -> Vec<u8> {
    let mut data = b"streaming deflate must be resumable at any byte. "
        .repeat(200);
    data.extend_from_slice(&pseudo_random(16 * 1024, 42));
    data
}

/// Compress `data` feeding input in `chunk` slices with NO_FLUSH, then
/// FINISH; output buffer is never a constraint.
fn compress_chunked_input(data: &[u8], chunk: usize, level: i32) -> Vec<u8> {
    let mut stream = DeflateStream::new(level).unwrap();
    let mut out = vec![0u8; compress_bound(data.len())];
    let mut written = 0;
    for piece in data.chunks(chunk) {
        let done = stream.deflate(piece, &mut out[written..], Flush::None).unwrap();
        assert_eq!(done.bytes_consumed, piece.len(), "window must absorb chunk");
        written += done.bytes_written;
    }
    loop {
        let done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
        written += done.bytes_written;
        if done.status == Status::StreamEnd {
            break;
        }
    }
    out.truncate(written);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: One byte of input per call
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_byte_input_chunks_match_one_shot() {
    let data = corpus();
    let one_shot = compress_to_vec(&data, 6).unwrap();
    let chunked = compress_chunked_input(&data, 1, 6);
    assert_eq!(chunked, one_shot, "input chunking must not change output");
    assert_eq!(inflate(&chunked, true), data);
}

#[test]
fn test_various_input_chunk_sizes() {
    let data = corpus();
    let one_shot = compress_to_vec(&data, 6).unwrap();
    for chunk in [2, 3, 7, 64, 1000, 4096] {
        assert_eq!(
            compress_chunked_input(&data, chunk, 6),
            one_shot,
            "chunk size {chunk}"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: One byte of output room per call
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_byte_output_chunks_match_one_shot() {
    let data = corpus();
    let one_shot = compress_to_vec(&data, 6).unwrap();

    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = Vec::new();
    let mut consumed = 0;
    loop {
        let mut byte = [0u8; 1];
        let done = stream
            .deflate(&data[consumed..], &mut byte, Flush::Finish)
            .unwrap();
        consumed += done.bytes_consumed;
        out.extend_from_slice(&byte[..done.bytes_written]);
        if done.status == Status::StreamEnd {
            break;
        }
    }
    assert_eq!(out, one_shot, "output chunking must not change the bytes");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: SYNC_FLUSH marker and continuation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sync_flush_marker_and_continuation() {
    let part_a = b"first half, flushed to a byte boundary ".repeat(50);
    let part_b = b"second half, appended after the marker".repeat(50);

    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; compress_bound(part_a.len() + part_b.len())];

    let done = stream.deflate(&part_a, &mut out, Flush::Sync).unwrap();
    let flush_point = done.bytes_written;
    assert_eq!(
        &out[flush_point - 4..flush_point],
        &[0x00, 0x00, 0xff, 0xff],
        "sync flush must end with the empty stored block marker"
    );

    let mut written = flush_point;
    let mut done = stream
        .deflate(&part_b, &mut out[written..], Flush::Finish)
        .unwrap();
    written += done.bytes_written;
    while done.status != Status::StreamEnd {
        done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
        written += done.bytes_written;
    }

    let mut whole = part_a.clone();
    whole.extend_from_slice(&part_b);
    assert_eq!(inflate(&out[..written], true), whole);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: FULL_FLUSH drops history
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_flush_tail_decodes_standalone() {
    // Raw stream so the tail after the flush point is itself a complete
    // DEFLATE stream once the final block lands.
    let part_a = b"history history history history ".repeat(100);
    let part_b = b"history history history history ".repeat(100);

    let mut stream = DeflateStream::with_params(6, -15, 8, Strategy::Default).unwrap();
    let mut out = vec![0u8; compress_bound(part_a.len() + part_b.len())];

    let done = stream.deflate(&part_a, &mut out, Flush::Full).unwrap();
    let flush_point = done.bytes_written;

    let mut written = flush_point;
    let mut done = stream
        .deflate(&part_b, &mut out[written..], Flush::Finish)
        .unwrap();
    written += done.bytes_written;
    while done.status != Status::StreamEnd {
        done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
        written += done.bytes_written;
    }

    // Whole stream decodes to A + B.
    let mut whole = part_a.clone();
    whole.extend_from_slice(&part_b);
    assert_eq!(inflate(&out[..written], false), whole);

    // The tail alone decodes to B: no back-reference crosses the flush.
    assert_eq!(inflate(&out[flush_point..written], false), part_b);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: PARTIAL_FLUSH stream stays decodable
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_partial_flush_roundtrip() {
    let pieces: Vec<Vec<u8>> = (0..5)
        .map(|i| pseudo_random(3000 + i * 17, i as u32 + 1))
        .collect();

    let total: usize = pieces.iter().map(Vec::len).sum();
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; compress_bound(total)];
    let mut written = 0;

    for piece in &pieces {
        let done = stream.deflate(piece, &mut out[written..], Flush::Partial).unwrap();
        written += done.bytes_written;
    }
    loop {
        let done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
        written += done.bytes_written;
        if done.status == Status::StreamEnd {
            break;
        }
    }

    let whole: Vec<u8> = pieces.concat();
    assert_eq!(inflate(&out[..written], true), whole);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Sync flush between every chunk
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sync_flush_every_chunk() {
    let data = corpus();
    let mut stream = DeflateStream::new(9).unwrap();
    // Per-chunk blocks plus sync markers can exceed the one-shot bound.
    let mut out = vec![0u8; compress_bound(data.len()) * 2 + 1024];
    let mut written = 0;

    for piece in data.chunks(100) {
        let done = stream.deflate(piece, &mut out[written..], Flush::Sync).unwrap();
        written += done.bytes_written;
    }
    loop {
        let done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
        written += done.bytes_written;
        if done.status == Status::StreamEnd {
            break;
        }
    }
    assert_eq!(inflate(&out[..written], true), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: Random chunk sizes, both directions constrained
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_random_chunking_both_sides() {
    let data = corpus();
    let one_shot = compress_to_vec(&data, 6).unwrap();

    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = Vec::new();
    let mut consumed = 0;
    let mut seed = 0xdead_beef_u32;
    loop {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let in_chunk = (seed >> 28) as usize + 1; // 1..=16
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let out_chunk = (seed >> 28) as usize + 1;

        let src_end = (consumed + in_chunk).min(data.len());
        let flush = if src_end == data.len() { Flush::Finish } else { Flush::None };
        let mut buf = vec![0u8; out_chunk];
        match stream.deflate(&data[consumed..src_end], &mut buf, flush) {
            Ok(done) => {
                consumed += done.bytes_consumed;
                out.extend_from_slice(&buf[..done.bytes_written]);
                if done.status == Status::StreamEnd {
                    break;
                }
            }
            Err(zlibr::ZlibError::Buf) => {
                // No progress possible this round; retry with fresh room.
                continue;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(out, one_shot);
    assert_eq!(inflate(&out, true), data);
}
