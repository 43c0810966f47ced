// Delta bit-packing of one 32-value sub-group.
//
// Wire layout (little-endian bit lanes):
//   delta i occupies bits [i*w, (i+1)*w) of the payload, where payload word j
//   carries bits [32j, 32j+32) least-significant bit first.
//
// 32 deltas of w bits are exactly w words, so a sub-group never straddles a
// partial word. Width 0 emits nothing and decodes to 32 copies of the
// baseline.
//
// Every width 1..=32 gets its own monomorphised kernel so shifts and masks
// are compile-time constants inside the loop.

use super::{CodecError, MAX_WIDTH, MINI_BLOCK_SIZE, ensure_capacity};

// ---------------------------------------------------------------------------
// Width dispatch
// ---------------------------------------------------------------------------

macro_rules! dispatch_width {
    ($width:expr, $kernel:ident ( $($arg:expr),* )) => {
        match $width {
            1 => $kernel::<1>($($arg),*),
            2 => $kernel::<2>($($arg),*),
            3 => $kernel::<3>($($arg),*),
            4 => $kernel::<4>($($arg),*),
            5 => $kernel::<5>($($arg),*),
            6 => $kernel::<6>($($arg),*),
            7 => $kernel::<7>($($arg),*),
            8 => $kernel::<8>($($arg),*),
            9 => $kernel::<9>($($arg),*),
            10 => $kernel::<10>($($arg),*),
            11 => $kernel::<11>($($arg),*),
            12 => $kernel::<12>($($arg),*),
            13 => $kernel::<13>($($arg),*),
            14 => $kernel::<14>($($arg),*),
            15 => $kernel::<15>($($arg),*),
            16 => $kernel::<16>($($arg),*),
            17 => $kernel::<17>($($arg),*),
            18 => $kernel::<18>($($arg),*),
            19 => $kernel::<19>($($arg),*),
            20 => $kernel::<20>($($arg),*),
            21 => $kernel::<21>($($arg),*),
            22 => $kernel::<22>($($arg),*),
            23 => $kernel::<23>($($arg),*),
            24 => $kernel::<24>($($arg),*),
            25 => $kernel::<25>($($arg),*),
            26 => $kernel::<26>($($arg),*),
            27 => $kernel::<27>($($arg),*),
            28 => $kernel::<28>($($arg),*),
            29 => $kernel::<29>($($arg),*),
            30 => $kernel::<30>($($arg),*),
            31 => $kernel::<31>($($arg),*),
            32 => $kernel::<32>($($arg),*),
            w => return Err(CodecError::InvalidWidth(w)),
        }
    };
}

/// Validate a bit width, returning it as a word count.
#[inline]
pub fn checked_width(width: u32) -> Result<usize, CodecError> {
    if width > MAX_WIDTH {
        return Err(CodecError::InvalidWidth(width));
    }
    Ok(width as usize)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Pack the 32 deltas of `values` (against a running baseline starting at
/// `baseline`) into `out[..width]`.
///
/// Returns the number of words written, which is always `width`. Deltas are
/// truncated to `width` bits; pick the width with
/// [`max_bits`](super::width::max_bits) for a lossless result.
///
/// # Errors
/// `InvalidWidth` if `width > 32`, `BufferTooSmall` if `out` holds fewer than
/// `width` words. Nothing is written on error.
pub fn pack(
    baseline: u32,
    values: &[u32; MINI_BLOCK_SIZE],
    width: u32,
    out: &mut [u32],
) -> Result<usize, CodecError> {
    let words = checked_width(width)?;
    ensure_capacity(words, out.len())?;
    if words == 0 {
        return Ok(0);
    }
    let out = &mut out[..words];
    dispatch_width!(width, pack_kernel(baseline, values, out));
    Ok(words)
}

/// Unpack a sub-group of `width` from `words[..width]` into `out[..32]`,
/// adding each delta to a running baseline starting at `baseline`.
///
/// Returns the number of values written, which is always 32.
///
/// # Errors
/// `InvalidWidth` if `width > 32`, `TruncatedInput` if `words` is shorter than
/// `width`, `BufferTooSmall` if `out` holds fewer than 32 values.
pub fn unpack(
    baseline: u32,
    words: &[u32],
    width: u32,
    out: &mut [u32],
) -> Result<usize, CodecError> {
    let n = checked_width(width)?;
    if words.len() < n {
        return Err(CodecError::TruncatedInput {
            needed: n,
            available: words.len(),
        });
    }
    ensure_capacity(MINI_BLOCK_SIZE, out.len())?;
    let out = &mut out[..MINI_BLOCK_SIZE];
    if n == 0 {
        out.fill(baseline);
        return Ok(MINI_BLOCK_SIZE);
    }
    let words = &words[..n];
    dispatch_width!(width, unpack_kernel(baseline, words, out));
    Ok(MINI_BLOCK_SIZE)
}

// ---------------------------------------------------------------------------
// Kernels
// ---------------------------------------------------------------------------

#[inline(always)]
fn lane_mask<const W: u32>() -> u32 {
    u32::MAX >> (u32::BITS - W)
}

/// `out.len() == W`, `1 <= W <= 32`.
#[inline(always)]
fn pack_kernel<const W: u32>(baseline: u32, values: &[u32; MINI_BLOCK_SIZE], out: &mut [u32]) {
    let mask = lane_mask::<W>();
    let mut acc = 0u64;
    let mut bits = 0u32;
    let mut idx = 0usize;
    let mut prev = baseline;
    for &v in values {
        let delta = v.wrapping_sub(prev) & mask;
        prev = v;
        acc |= u64::from(delta) << bits;
        bits += W;
        if bits >= u32::BITS {
            out[idx] = acc as u32;
            idx += 1;
            acc >>= u32::BITS;
            bits -= u32::BITS;
        }
    }
    debug_assert_eq!(idx, W as usize);
    debug_assert_eq!(bits, 0);
}

/// `words.len() == W`, `out.len() == 32`, `1 <= W <= 32`.
#[inline(always)]
fn unpack_kernel<const W: u32>(baseline: u32, words: &[u32], out: &mut [u32]) {
    let mask = lane_mask::<W>();
    let mut acc = 0u64;
    let mut bits = 0u32;
    let mut idx = 0usize;
    let mut prev = baseline;
    for slot in out.iter_mut() {
        if bits < W {
            acc |= u64::from(words[idx]) << bits;
            idx += 1;
            bits += u32::BITS;
        }
        let delta = acc as u32 & mask;
        acc >>= W;
        bits -= W;
        prev = prev.wrapping_add(delta);
        *slot = prev;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
