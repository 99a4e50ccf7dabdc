// Unit tests for window filling, the rolling hash, and the slide.
//
// Coverage:
//   - read_buf: cursor movement, totals, running Adler-32
//   - fill_window: lookahead growth, hash priming
//   - insert_string: chain structure for repeating trigrams
//   - the window slide: index rebasing and link truncation

use zlibr::adler32::{adler32, ADLER32_INITIAL};
use zlibr::deflate::state::{DeflateState, Io};
use zlibr::deflate::types::{Strategy, MIN_LOOKAHEAD};
use zlibr::deflate::window::{fill_window, insert_string, read_buf, update_hash};

fn small_state() -> DeflateState {
    // 512-byte window keeps slide scenarios cheap.
    DeflateState::new(6, 9, 1, Strategy::Default).expect("valid parameters")
}

// ─────────────────────────────────────────────────────────────────────────────
// read_buf
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn read_buf_copies_and_advances_cursors() {
    let mut s = small_state();
    let src = b"hello world".to_vec();
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);

    let n = read_buf(&mut s, &mut io, 0, 5);
    assert_eq!(n, 5);
    assert_eq!(&s.window[..5], b"hello");
    assert_eq!(io.next_in, 5);
    assert_eq!(io.avail_in(), 6);
    assert_eq!(s.total_in, 5);
}

#[test]
fn read_buf_feeds_the_running_adler() {
    let mut s = small_state();
    let src = b"checksum me".to_vec();
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);

    read_buf(&mut s, &mut io, 0, src.len());
    assert_eq!(s.adler, adler32(ADLER32_INITIAL, b"checksum me"));
}

#[test]
fn read_buf_skips_adler_for_raw_streams() {
    let mut s = DeflateState::new(6, -9, 1, Strategy::Default).unwrap();
    let src = b"raw bytes".to_vec();
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);

    read_buf(&mut s, &mut io, 0, src.len());
    assert_eq!(s.adler, ADLER32_INITIAL);
}

// ─────────────────────────────────────────────────────────────────────────────
// fill_window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn fill_window_consumes_short_input_entirely() {
    let mut s = small_state();
    let src = vec![7u8; 100];
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);

    fill_window(&mut s, &mut io);
    assert_eq!(s.lookahead, 100);
    assert_eq!(io.avail_in(), 0);
}

#[test]
fn fill_window_stops_at_min_lookahead() {
    let mut s = small_state();
    let src = vec![3u8; 1000];
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);

    fill_window(&mut s, &mut io);
    assert!(s.lookahead >= MIN_LOOKAHEAD);
    // Everything read stays inside the allocated window.
    assert!(s.strstart + s.lookahead <= s.window_size);
}

#[test]
fn fill_window_slides_and_rebases_links() {
    let mut s = small_state();
    let w = s.w_size; // 512

    // Pretend a long run has been matched already.
    for (i, byte) in s.window.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    s.strstart = w + s.max_dist(); // slide threshold
    s.lookahead = 0;
    s.block_start = 700;
    s.match_start = 760;
    s.head[5] = 600; // survives, rebased
    s.head[6] = 100; // too old, chain cut
    s.prev[17] = 513;
    s.prev[18] = 40;
    let upper: Vec<u8> = s.window[w..2 * w].to_vec();

    let src = vec![9u8; 64];
    let mut dst = [0u8; 0];
    let mut io = Io::new(&src, &mut dst);
    fill_window(&mut s, &mut io);

    assert_eq!(s.strstart, s.max_dist());
    assert_eq!(s.block_start, 700 - w as isize);
    assert_eq!(s.match_start, 760 - w);
    assert_eq!(s.head[5], 600 - w as u16);
    assert_eq!(s.head[6], 0);
    assert_eq!(s.prev[17], 513 - w as u16);
    assert_eq!(s.prev[18], 0);
    // Upper half moved down, new input appended behind it.
    assert_eq!(&s.window[..w], &upper[..]);
    assert_eq!(s.lookahead, 64);
    assert_eq!(&s.window[s.strstart..s.strstart + 64], &[9u8; 64][..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// insert_string
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn insert_string_builds_chains_for_equal_trigrams() {
    let mut s = small_state();
    let data = b"xabcabcab";
    s.window[..data.len()].copy_from_slice(data);

    // Prime the rolling hash exactly as fill_window would at position 1.
    s.ins_h = s.window[1] as u32;
    s.ins_h = update_hash(&s, s.ins_h, s.window[2]);

    assert_eq!(insert_string(&mut s, 1), 0); // chain empty
    insert_string(&mut s, 2);
    insert_string(&mut s, 3);
    // "abc" again: the previous head (position 1) is returned and the
    // chain now links 4 -> 1.
    let head = insert_string(&mut s, 4);
    assert_eq!(head, 1);
    let hash = s.ins_h as usize;
    assert_eq!(s.head[hash], 4);
    assert_eq!(s.prev[4], 1);
}

#[test]
fn update_hash_depends_on_exactly_three_bytes() {
    let s = small_state();
    let h1 = update_hash(
        &s,
        update_hash(&s, update_hash(&s, 0, b'x'), b'y'),
        b'z',
    );
    let h2 = update_hash(
        &s,
        update_hash(&s, update_hash(&s, 0, b'x'), b'y'),
        b'w',
    );
    assert_ne!(h1, h2);
    assert!(h1 <= s.hash_mask);
}
