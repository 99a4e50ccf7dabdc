// Unit tests for the stream orchestrator.
//
// Coverage:
//   - parameter validation at init
//   - zlib header shape (mod-31 check bits, CM/CINFO, FLEVEL)
//   - the exact empty-input stream
//   - backpressure protocol (BUF_ERROR semantics)
//   - end-of-stream idempotence, totals, reset, params, finish

use zlibr::adler32::{adler32, ADLER32_INITIAL};
use zlibr::deflate::types::{Flush, Status, Strategy, ZlibError};
use zlibr::{compress_bound, compress_to_vec, DeflateStream};

// ─────────────────────────────────────────────────────────────────────────────
// Init validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn init_rejects_bad_parameters() {
    assert_eq!(DeflateStream::new(10).unwrap_err(), ZlibError::Stream);
    assert_eq!(
        DeflateStream::with_params(6, 8, 8, Strategy::Default).unwrap_err(),
        ZlibError::Stream
    );
    assert_eq!(
        DeflateStream::with_params(6, 16, 8, Strategy::Default).unwrap_err(),
        ZlibError::Stream
    );
    assert_eq!(
        DeflateStream::with_params(6, 15, 0, Strategy::Default).unwrap_err(),
        ZlibError::Stream
    );
    assert_eq!(
        DeflateStream::with_params(6, 15, 10, Strategy::Default).unwrap_err(),
        ZlibError::Stream
    );
}

#[test]
fn default_level_resolves_to_six() {
    let stream = DeflateStream::new(-1).unwrap();
    assert_eq!(stream.level(), 6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Header and empty stream
// ─────────────────────────────────────────────────────────────────────────────

#[test_log::test]
fn empty_input_produces_the_canonical_stream() {
    let out = compress_to_vec(b"", 6).unwrap();
    // 2-byte header, 3-byte empty static block, 4-byte Adler-32 of "".
    assert_eq!(out, [0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
}

#[test]
fn header_is_valid_for_every_level_and_window() {
    for level in 0..=9 {
        for wbits in 9..=15 {
            let mut stream =
                DeflateStream::with_params(level, wbits, 8, Strategy::Default).unwrap();
            let mut out = vec![0u8; 128];
            stream.deflate(b"x", &mut out, Flush::Finish).unwrap();

            let cmf = out[0] as u16;
            let flg = out[1] as u16;
            assert_eq!((cmf * 256 + flg) % 31, 0, "check bits level {level} wbits {wbits}");
            assert_eq!(cmf & 0x0f, 8, "CM must be deflate");
            assert_eq!(cmf >> 4, (wbits - 8) as u16, "CINFO");
            assert_eq!(flg & 0x20, 0, "no FDICT without a dictionary");
        }
    }
}

#[test]
fn flevel_reflects_the_compression_level() {
    let levels = [(1, 0u8), (2, 1), (6, 2), (9, 3)];
    for (level, expected) in levels {
        let mut stream = DeflateStream::new(level).unwrap();
        let mut out = vec![0u8; 128];
        stream.deflate(b"x", &mut out, Flush::Finish).unwrap();
        assert_eq!(out[1] >> 6, expected, "level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backpressure protocol
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn zero_output_room_is_buf_error() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = [0u8; 0];
    assert_eq!(
        stream.deflate(b"data", &mut out, Flush::None).unwrap_err(),
        ZlibError::Buf
    );
    assert_eq!(stream.msg(), Some("buffer error"));
}

#[test]
fn repeated_idle_call_is_buf_error() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 64];
    // First call stages and drains the header; nothing else to do.
    let done = stream.deflate(&[], &mut out, Flush::None).unwrap();
    assert_eq!(done.status, Status::Ok);
    assert_eq!(done.bytes_written, 2);
    // Second identical call can make no progress at all.
    assert_eq!(
        stream.deflate(&[], &mut out, Flush::None).unwrap_err(),
        ZlibError::Buf
    );
}

#[test]
fn input_after_finish_is_buf_error() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    let done = stream.deflate(b"payload", &mut out, Flush::Finish).unwrap();
    assert_eq!(done.status, Status::StreamEnd);
    assert_eq!(
        stream.deflate(b"more", &mut out, Flush::Finish).unwrap_err(),
        ZlibError::Buf
    );
}

#[test]
fn non_finish_after_finish_is_stream_error() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    stream.deflate(b"payload", &mut out, Flush::Finish).unwrap();
    assert_eq!(
        stream.deflate(&[], &mut out, Flush::Sync).unwrap_err(),
        ZlibError::Stream
    );
}

#[test]
fn finish_is_idempotent_after_stream_end() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    stream.deflate(b"payload", &mut out, Flush::Finish).unwrap();
    for _ in 0..3 {
        let done = stream.deflate(&[], &mut out, Flush::Finish).unwrap();
        assert_eq!(done.status, Status::StreamEnd);
        assert_eq!(done.bytes_written, 0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Totals, adler, reset, params, finish
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn totals_track_moved_bytes() {
    let data = b"totals should be exact and non-decreasing".to_vec();
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    let mut consumed = 0;
    let mut written = 0;

    for chunk in data.chunks(7) {
        let done = stream.deflate(chunk, &mut out[written..], Flush::None).unwrap();
        consumed += done.bytes_consumed;
        written += done.bytes_written;
        assert_eq!(stream.total_in(), consumed as u64);
        assert_eq!(stream.total_out(), written as u64);
    }
    let done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
    written += done.bytes_written;
    assert_eq!(done.status, Status::StreamEnd);
    assert_eq!(stream.total_in(), data.len() as u64);
    assert_eq!(stream.total_out(), written as u64);
}

#[test]
fn adler_matches_the_consumed_input() {
    let data = b"checksummed content".to_vec();
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    let done = stream.deflate(&data, &mut out, Flush::Finish).unwrap();
    assert_eq!(done.status, Status::StreamEnd);
    let expected = adler32(ADLER32_INITIAL, &data);
    assert_eq!(stream.adler(), expected);
    // The trailer carries the same value, big-endian.
    let n = done.bytes_written;
    let trailer = u32::from_be_bytes(out[n - 4..n].try_into().unwrap());
    assert_eq!(trailer, expected);
}

#[test]
fn reset_reproduces_identical_output() {
    let data = b"the same bytes in, the same bytes out".to_vec();
    let mut stream = DeflateStream::new(8).unwrap();
    let mut first = vec![0u8; 256];
    let a = stream.deflate(&data, &mut first, Flush::Finish).unwrap();

    stream.reset();
    assert_eq!(stream.total_in(), 0);
    assert_eq!(stream.total_out(), 0);

    let mut second = vec![0u8; 256];
    let b = stream.deflate(&data, &mut second, Flush::Finish).unwrap();
    assert_eq!(a, b);
    assert_eq!(first[..a.bytes_written], second[..b.bytes_written]);
}

#[test_log::test]
fn params_switches_level_mid_stream() {
    let mut stream = DeflateStream::new(1).unwrap();
    let mut out = vec![0u8; 4096];
    let mut written = 0;

    let done = stream
        .deflate(&vec![b'x'; 2048], &mut out, Flush::None)
        .unwrap();
    written += done.bytes_written;

    // Fast → slow flavor change with data processed forces a partial
    // flush into the caller's buffer.
    let flushed = stream
        .params(9, Strategy::Default, &mut out[written..])
        .unwrap();
    assert!(flushed > 0);
    written += flushed;
    assert_eq!(stream.level(), 9);

    let done = stream.deflate(&[], &mut out[written..], Flush::Finish).unwrap();
    assert_eq!(done.status, Status::StreamEnd);
}

#[test]
fn params_rejects_bad_level() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 64];
    assert_eq!(
        stream.params(42, Strategy::Default, &mut out).unwrap_err(),
        ZlibError::Stream
    );
}

#[test]
fn finish_reports_incomplete_streams() {
    let mut stream = DeflateStream::new(6).unwrap();
    let mut out = vec![0u8; 256];
    stream.deflate(b"partial", &mut out, Flush::None).unwrap();
    assert_eq!(stream.finish().unwrap_err(), ZlibError::Data);

    let mut stream = DeflateStream::new(6).unwrap();
    stream.deflate(b"whole", &mut out, Flush::Finish).unwrap();
    assert!(stream.finish().is_ok());
}

#[test]
fn one_shot_output_respects_the_bound() {
    for len in [0usize, 1, 100, 10_000] {
        let data: Vec<u8> = (0..len).map(|i| (i * 31 % 251) as u8).collect();
        let out = compress_to_vec(&data, 6).unwrap();
        assert!(out.len() <= compress_bound(data.len()), "len {len}");
    }
}
