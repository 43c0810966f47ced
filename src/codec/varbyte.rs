// Variable-byte fallback codec for the tail that does not fill a block.
//
// Each delta is emitted as 7-bit groups, least-significant group first. Bit 7
// is set on every group except the last one of a value. The byte stream is
// padded with 0x80 to a multiple of 4 and packed big-endian into words (first
// byte in the most significant position).
//
// Padding bytes never clear the continuation bit, so the decoder consumes them
// without emitting a value.

use super::width::bits_for;
use super::{CodecError, ensure_capacity};

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;
const PAD: u8 = CONTINUATION;

/// Maximum encoded bytes for one `u32` delta (ceil(32/7)).
pub const MAX_VARINT_LEN: usize = 5;

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Encoded length in bytes of a single delta.
#[inline]
pub fn varint_len(delta: u32) -> usize {
    bits_for(delta).max(1).div_ceil(7) as usize
}

/// Encoded length in bytes of `input` (before padding), deltas taken against
/// a running baseline starting at `baseline`.
pub fn encoded_len(input: &[u32], baseline: u32) -> usize {
    let mut prev = baseline;
    input
        .iter()
        .map(|&v| {
            let delta = v.wrapping_sub(prev);
            prev = v;
            varint_len(delta)
        })
        .sum()
}

/// Worst-case encoded words for `len` values.
pub fn max_compressed_words(len: usize) -> usize {
    (len * MAX_VARINT_LEN).div_ceil(4)
}

/// Number of values a stream decodes to (bytes with the continuation bit
/// clear).
pub fn value_count(input: &[u32]) -> usize {
    input
        .iter()
        .flat_map(|w| w.to_be_bytes())
        .filter(|&b| b & CONTINUATION == 0)
        .count()
}

// ---------------------------------------------------------------------------
// Compress
// ---------------------------------------------------------------------------

/// Packs bytes into big-endian words.
struct WordSink<'a> {
    out: &'a mut [u32],
    word: u32,
    filled: u32,
    idx: usize,
}

impl<'a> WordSink<'a> {
    fn new(out: &'a mut [u32]) -> Self {
        Self {
            out,
            word: 0,
            filled: 0,
            idx: 0,
        }
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.word = (self.word << 8) | u32::from(byte);
        self.filled += 1;
        if self.filled == 4 {
            self.out[self.idx] = self.word;
            self.idx += 1;
            self.word = 0;
            self.filled = 0;
        }
    }

    /// Pad the last partial word and return the number of words written.
    fn finish(mut self) -> usize {
        while self.filled != 0 {
            self.push(PAD);
        }
        self.idx
    }
}

/// Encode `input` as deltas against a running baseline starting at
/// `baseline`. Returns the number of words written.
///
/// The exact output size is computed before anything is written.
///
/// # Errors
/// `BufferTooSmall` if `output` cannot hold the padded stream.
pub fn compress(input: &[u32], baseline: u32, output: &mut [u32]) -> Result<usize, CodecError> {
    let words = encoded_len(input, baseline).div_ceil(4);
    ensure_capacity(words, output.len())?;

    let mut sink = WordSink::new(&mut output[..words]);
    let mut prev = baseline;
    for &v in input {
        let mut delta = v.wrapping_sub(prev);
        prev = v;
        while delta >= u32::from(CONTINUATION) {
            sink.push(delta as u8 | CONTINUATION);
            delta >>= 7;
        }
        sink.push(delta as u8);
    }
    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// Decompress
// ---------------------------------------------------------------------------

/// Decode every value in `input`, adding deltas to a running baseline
/// starting at `baseline`. Returns the number of values written.
///
/// Reads stop at the end of `input`. A trailing run of continuation bytes
/// (padding, or a value cut short) is discarded. Fragments beyond bit 31 of a
/// malformed value are dropped.
///
/// # Errors
/// `BufferTooSmall` if `output` cannot hold every terminated value. Nothing is
/// written in that case.
pub fn decompress(input: &[u32], baseline: u32, output: &mut [u32]) -> Result<usize, CodecError> {
    ensure_capacity(value_count(input), output.len())?;

    let mut n = 0usize;
    let mut acc = 0u32;
    let mut shift = 0u32;
    let mut prev = baseline;
    for byte in input.iter().flat_map(|w| w.to_be_bytes()) {
        acc |= u32::from(byte & PAYLOAD_MASK)
            .checked_shl(shift)
            .unwrap_or(0);
        if byte & CONTINUATION == 0 {
            prev = prev.wrapping_add(acc);
            output[n] = prev;
            n += 1;
            acc = 0;
            shift = 0;
        } else {
            shift = shift.saturating_add(7);
        }
    }
    Ok(n)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
