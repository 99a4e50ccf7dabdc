//! Streaming session orchestration.
//!
//! Translated from deflate.c v1.3.1 (public zlib.h surface, compression
//! side):
//!   - [`DeflateStream`]                  ← `z_stream` + `deflate_state`
//!   - [`DeflateStream::new`] / [`DeflateStream::with_params`]
//!     ← `deflateInit` / `deflateInit2`
//!   - [`DeflateStream::deflate`]         ← `deflate`
//!   - [`DeflateStream::set_dictionary`]  ← `deflateSetDictionary`
//!   - [`DeflateStream::params`]          ← `deflateParams`
//!   - [`DeflateStream::reset`]           ← `deflateReset`
//!   - [`DeflateStream::finish`]          ← `deflateEnd` (Drop also frees)
//!   - [`compress_bound`]                 ← `deflateBound`
//!   - [`compress_to_vec`]                ← `compress2`
//!
//! The C cursor quartet becomes per-call slices: `deflate(src, dst, flush)`
//! consumes a prefix of `src`, fills a prefix of `dst`, and reports both
//! counts in [`Deflated`]; `total_in` / `total_out` / `adler` live on the
//! session.

use log::trace;

use crate::adler32::{adler32, ADLER32_INITIAL};
use crate::deflate::compress::{deflate_fast, deflate_slow, deflate_stored};
use crate::deflate::state::{flush_pending, DeflateState, Io};
use crate::deflate::types::{
    BlockState, DataType, Flavor, Flush, Status, Strategy, StreamStatus, ZlibError,
    CONFIGURATION_TABLE, DEF_MEM_LEVEL, MAX_WBITS, MIN_MATCH, PRESET_DICT, Z_DEFAULT_COMPRESSION,
    Z_DEFLATED,
};
use crate::deflate::window::{insert_string, update_hash};
use crate::trees::encode::{tr_align, tr_stored_block};

// ─────────────────────────────────────────────────────────────────────────────
// Per-call outcome
// ─────────────────────────────────────────────────────────────────────────────

/// What one [`DeflateStream::deflate`] call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deflated {
    /// `Ok` while the stream continues, `StreamEnd` once the trailer has
    /// been fully written.
    pub status: Status,
    /// Input bytes consumed from `src` by this call.
    pub bytes_consumed: usize,
    /// Output bytes written to `dst` by this call.
    pub bytes_written: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// DeflateStream
// ─────────────────────────────────────────────────────────────────────────────

/// One streaming compression session producing an RFC 1950 zlib stream
/// (or a raw RFC 1951 stream when constructed with negative window bits).
///
/// All buffers are owned by the session; dropping it releases everything
/// (RAII replaces `deflateEnd` — use [`finish`](Self::finish) to also
/// check that the stream actually completed).
///
/// # Thread safety
/// `DeflateStream` is `Send` but not `Sync`; a session is a single
/// cooperative state machine and must not be shared without external
/// synchronization.
#[derive(Debug)]
pub struct DeflateStream {
    state: DeflateState,
}

impl DeflateStream {
    /// Create a session with default window (32 KiB), default memory level
    /// and default strategy. Equivalent to `deflateInit`.
    pub fn new(level: i32) -> Result<Self, ZlibError> {
        Self::with_params(level, MAX_WBITS, DEF_MEM_LEVEL, Strategy::Default)
    }

    /// Create a fully parameterized session. Equivalent to `deflateInit2`
    /// with `method = Z_DEFLATED`.
    ///
    /// `window_bits` in `9..=15` selects a zlib-wrapped stream with a
    /// `2^window_bits` window; `-15..=-9` produces a raw DEFLATE stream.
    /// `mem_level` in `1..=9` sizes the hash table (`mem_level + 7` bits)
    /// and the symbol buffer (`1 << (mem_level + 6)` entries).
    pub fn with_params(
        level: i32,
        window_bits: i32,
        mem_level: i32,
        strategy: Strategy,
    ) -> Result<Self, ZlibError> {
        let state = DeflateState::new(level, window_bits, mem_level, strategy)?;
        trace!(
            "deflate init: level {} wbits {} memlevel {} {:?} wrap {}",
            state.level,
            state.w_bits,
            mem_level,
            strategy,
            state.wrap
        );
        Ok(DeflateStream { state })
    }

    /// Compress from `src` to `dst`, honouring `flush`, and advance as far
    /// as the two buffers allow. Equivalent to `deflate`.
    ///
    /// Returns [`ZlibError::Buf`] when no forward progress was possible;
    /// this is recoverable — call again with more input or output room.
    pub fn deflate(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        flush: Flush,
    ) -> Result<Deflated, ZlibError> {
        let mut io = Io::new(src, dst);
        let status = deflate_inner(&mut self.state, &mut io, flush)?;
        Ok(Deflated {
            status,
            bytes_consumed: io.next_in,
            bytes_written: io.next_out,
        })
    }

    /// Prime the window and hash table from a preset dictionary; with the
    /// zlib wrapper enabled, the dictionary is folded into the running
    /// Adler-32 so the header carries the RFC 1950 dictionary id.
    ///
    /// Only valid before the first `deflate` call. Equivalent to
    /// `deflateSetDictionary`.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<(), ZlibError> {
        let s = &mut self.state;
        if s.status != StreamStatus::Init {
            s.msg = Some("stream error");
            return Err(ZlibError::Stream);
        }

        if s.wrap {
            s.adler = adler32(s.adler, dictionary);
        }
        if dictionary.len() < MIN_MATCH {
            return Ok(());
        }

        // Use the dictionary tail if it does not fit in one match window.
        let mut length = dictionary.len();
        let mut index = 0;
        if length > s.max_dist() {
            length = s.max_dist();
            index = dictionary.len() - length;
        }
        s.window[..length].copy_from_slice(&dictionary[index..index + length]);
        s.strstart = length;
        s.block_start = length as isize;

        // Insert all strings in the hash table (except for the last two
        // bytes, which need a full MIN_MATCH of context).
        s.ins_h = s.window[0] as u32;
        s.ins_h = update_hash(s, s.ins_h, s.window[1]);
        for n in 0..=length - MIN_MATCH {
            insert_string(s, n);
        }
        Ok(())
    }

    /// Change level and strategy mid-stream. If the block-shape routine
    /// changes and data has already been compressed, the current block is
    /// first closed with a partial flush written to `dst`; the number of
    /// bytes written there is returned. Equivalent to `deflateParams`.
    pub fn params(
        &mut self,
        level: i32,
        strategy: Strategy,
        dst: &mut [u8],
    ) -> Result<usize, ZlibError> {
        let level = if level == Z_DEFAULT_COMPRESSION { 6 } else { level };
        if !(0..=9).contains(&level) {
            return Err(ZlibError::Stream);
        }
        let new_flavor = CONFIGURATION_TABLE[level as usize].flavor;

        let mut written = 0;
        if new_flavor != self.state.flavor() && self.state.total_in != 0 {
            // Flush the last buffer with the previous block shape.
            match self.deflate(&[], dst, Flush::Partial) {
                Ok(done) => written = done.bytes_written,
                Err(ZlibError::Buf) => {} // nothing buffered, nothing to flush
                Err(e) => return Err(e),
            }
        }

        let s = &mut self.state;
        if s.level != level {
            s.level = level;
            let cfg = &CONFIGURATION_TABLE[level as usize];
            s.max_lazy_match = cfg.max_lazy as usize;
            s.good_match = cfg.good_length as usize;
            s.nice_match = cfg.nice_length as usize;
            s.max_chain_length = cfg.max_chain as usize;
        }
        s.strategy = strategy;
        Ok(written)
    }

    /// Re-arm the session for a fresh stream with the same parameters,
    /// keeping all allocations. Equivalent to `deflateReset`.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Tear the session down, reporting whether the stream was actually
    /// completed. Equivalent to `deflateEnd`; buffers are released either
    /// way (also on plain `Drop`).
    pub fn finish(self) -> Result<(), ZlibError> {
        if self.state.status == StreamStatus::Busy {
            return Err(ZlibError::Data);
        }
        Ok(())
    }

    // ── z_stream accessors ────────────────────────────────────────────────

    /// Total input bytes consumed so far (`total_in`).
    pub fn total_in(&self) -> u64 {
        self.state.total_in
    }

    /// Total output bytes produced so far (`total_out`).
    pub fn total_out(&self) -> u64 {
        self.state.total_out
    }

    /// Running Adler-32 of the consumed input (`adler`). After the header
    /// of a preset-dictionary stream this restarts at 1 and covers the
    /// content only.
    pub fn adler(&self) -> u32 {
        self.state.adler
    }

    /// Last diagnostic message, if any (`msg`).
    pub fn msg(&self) -> Option<&'static str> {
        self.state.msg
    }

    /// Input-class guess from the literal statistics (`data_type`).
    pub fn data_type(&self) -> DataType {
        self.state.data_type
    }

    /// Currently configured compression level.
    pub fn level(&self) -> i32 {
        self.state.level
    }

    /// Currently configured strategy.
    pub fn strategy(&self) -> Strategy {
        self.state.strategy
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// deflate  (deflate.c)
// ─────────────────────────────────────────────────────────────────────────────

fn deflate_inner(s: &mut DeflateState, io: &mut Io, flush: Flush) -> Result<Status, ZlibError> {
    if s.status == StreamStatus::Finish && flush != Flush::Finish {
        s.msg = Some("stream error");
        return Err(ZlibError::Stream);
    }
    if io.dst.is_empty() {
        s.msg = Some("buffer error");
        return Err(ZlibError::Buf);
    }

    let old_flush = s.last_flush;
    s.last_flush = flush as i32;

    // Write the zlib header.
    if s.status == StreamStatus::Init {
        if s.wrap {
            let mut header = (Z_DEFLATED + ((s.w_bits - 8) << 4)) << 8;
            let level_flags: u32 = if s.strategy == Strategy::HuffmanOnly || s.level < 2 {
                0
            } else if s.level < 6 {
                1
            } else if s.level == 6 {
                2
            } else {
                3
            };
            header |= level_flags << 6;
            if s.strstart != 0 {
                header |= PRESET_DICT;
            }
            header += 31 - header % 31;

            s.put_short_msb(header);

            // Save the adler32 of the preset dictionary:
            if s.strstart != 0 {
                let id = s.adler;
                s.put_short_msb(id >> 16);
                s.put_short_msb(id & 0xffff);
            }
            s.adler = ADLER32_INITIAL;
            trace!("header 0x{header:04x} staged");
        }
        s.status = StreamStatus::Busy;
    }

    // Flush as much pending output as possible.
    if s.bits.pending != 0 {
        flush_pending(s, io);
        if io.avail_out() == 0 {
            // Since avail_out is 0, deflate will be called again with more
            // output space, but possibly with both pending and avail_in
            // equal to zero. There won't be anything to do, but this is
            // not an error situation so make sure we return OK instead of
            // BUF_ERROR at next call of deflate.
            s.last_flush = -1;
            return Ok(Status::Ok);
        }
    } else if io.avail_in() == 0 && (flush as i32) <= old_flush && flush != Flush::Finish {
        // Make sure there is something to do and avoid duplicate
        // consecutive flushes. For repeated and useless calls with
        // Z_FINISH, we keep the BUF_ERROR at the next call, see above.
        s.msg = Some("buffer error");
        return Err(ZlibError::Buf);
    }

    // User must not provide more input after the first FINISH:
    if s.status == StreamStatus::Finish && io.avail_in() != 0 {
        s.msg = Some("buffer error");
        return Err(ZlibError::Buf);
    }

    // Start a new block or continue the current one.
    if io.avail_in() != 0
        || s.lookahead != 0
        || (flush != Flush::None && s.status != StreamStatus::Finish)
    {
        let bstate = match s.flavor() {
            Flavor::Stored => deflate_stored(s, io, flush),
            Flavor::Fast => deflate_fast(s, io, flush),
            Flavor::Slow => deflate_slow(s, io, flush),
        };

        if bstate == BlockState::FinishStarted || bstate == BlockState::FinishDone {
            s.status = StreamStatus::Finish;
        }
        if bstate == BlockState::NeedMore || bstate == BlockState::FinishStarted {
            if io.avail_out() == 0 {
                s.last_flush = -1; // avoid BUF_ERROR next call, see above
            }
            return Ok(Status::Ok);
        }
        if bstate == BlockState::BlockDone {
            if flush == Flush::Partial {
                tr_align(s);
            } else {
                // FULL_FLUSH or SYNC_FLUSH: an empty stored block
                // byte-aligns the output and leaves the 00 00 FF FF
                // resynchronization marker.
                tr_stored_block(s, None, 0, false);
                if flush == Flush::Full {
                    s.head.fill(0); // forget history
                }
            }
            trace!("flush marker staged ({flush:?})");
            flush_pending(s, io);
            if io.avail_out() == 0 {
                s.last_flush = -1; // avoid BUF_ERROR at next call, see above
                return Ok(Status::Ok);
            }
        }
    }

    if flush != Flush::Finish {
        return Ok(Status::Ok);
    }
    if !s.wrap || s.trailer_written {
        return Ok(Status::StreamEnd);
    }

    // Write the zlib trailer (adler32).
    let id = s.adler;
    s.put_short_msb(id >> 16);
    s.put_short_msb(id & 0xffff);
    flush_pending(s, io);
    s.trailer_written = true; // write the trailer only once
    trace!("trailer staged, adler 0x{id:08x}");
    Ok(if s.bits.pending != 0 {
        Status::Ok
    } else {
        Status::StreamEnd
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// deflateBound / compress2  (zlib.h convenience layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Worst-case zlib-stream size for `source_len` input bytes under any
/// parameter combination: stored-block expansion plus the 6 wrapper bytes.
/// Equivalent to `deflateBound` with default parameters.
pub fn compress_bound(source_len: usize) -> usize {
    source_len + (source_len >> 12) + (source_len >> 14) + (source_len >> 25) + 13 + 6
}

/// Compress `input` in one shot into a freshly allocated buffer.
/// Equivalent to `compress2`.
pub fn compress_to_vec(input: &[u8], level: i32) -> Result<Vec<u8>, ZlibError> {
    let mut stream = DeflateStream::new(level)?;
    let mut out = vec![0u8; compress_bound(input.len())];
    let mut consumed = 0;
    let mut produced = 0;
    loop {
        let done = stream.deflate(&input[consumed..], &mut out[produced..], Flush::Finish)?;
        consumed += done.bytes_consumed;
        produced += done.bytes_written;
        if done.status == Status::StreamEnd {
            break;
        }
        if produced == out.len() {
            out.resize(out.len() + 1024, 0);
        }
    }
    out.truncate(produced);
    Ok(out)
}
