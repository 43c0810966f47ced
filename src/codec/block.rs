// Block codec: 128-element blocks of four 32-element sub-groups.
//
// Layout:
//   word 0        element count covered by blocks (multiple of 128, may be 0)
//   per block     header word  w1<<24 | w2<<16 | w3<<8 | w4
//                 w1 + w2 + w3 + w4 payload words (see `bitpack`)
//
// The baseline of every sub-group is the last value of the previous
// sub-group. The first sub-group of a block inherits the last value of the
// previous block, and the very first sub-group starts from 0.

use super::bitpack;
use super::width::max_bits;
use super::{BLOCK_SIZE, CodecError, MINI_BLOCK_SIZE, MINI_BLOCKS_PER_BLOCK, ensure_capacity};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the block stage stopped, in both directions.
///
/// `elements` and `words` locate the split between the block stage and the
/// fallback tail; `trailing_baseline` is the value the tail's deltas start
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockSummary {
    /// Input elements covered by blocks.
    pub elements: usize,
    /// Encoded words used by the block stage, count word included.
    pub words: usize,
    /// Last element of the last block, or 0 when there are no blocks.
    pub trailing_baseline: u32,
}

/// The four sub-group widths of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub widths: [u32; MINI_BLOCKS_PER_BLOCK],
}

impl BlockHeader {
    /// Select widths for one block, chaining baselines through sub-groups.
    pub fn for_block(baseline: u32, block: &[u32; BLOCK_SIZE]) -> Self {
        let (groups, _) = block.as_chunks::<MINI_BLOCK_SIZE>();
        let mut widths = [0u32; MINI_BLOCKS_PER_BLOCK];
        let mut carried = baseline;
        for (w, group) in widths.iter_mut().zip(groups) {
            *w = max_bits(carried, group);
            carried = group[MINI_BLOCK_SIZE - 1];
        }
        Self { widths }
    }

    /// Decode a header word. Widths are not validated here.
    pub fn from_word(word: u32) -> Self {
        Self {
            widths: [word >> 24, (word >> 16) & 0xFF, (word >> 8) & 0xFF, word & 0xFF],
        }
    }

    /// Encode as a header word, most significant byte first.
    pub fn to_word(self) -> u32 {
        let [w1, w2, w3, w4] = self.widths;
        (w1 << 24) | (w2 << 16) | (w3 << 8) | w4
    }

    /// Payload words following this header.
    pub fn payload_words(self) -> usize {
        self.widths.iter().map(|&w| w as usize).sum()
    }
}

/// Header chain of an encoded block stage, read without unpacking payloads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockLayout {
    pub headers: Vec<BlockHeader>,
    /// Elements covered by the block stage.
    pub elements: usize,
    /// Words used by the block stage, count word included.
    pub words: usize,
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Number of elements the block stage consumes from an input of `len`.
#[inline]
pub fn aligned_len(len: usize) -> usize {
    len - len % BLOCK_SIZE
}

/// Worst-case encoded words for the block stage of an input of `len`.
pub fn max_compressed_words(len: usize) -> usize {
    let elements = aligned_len(len);
    1 + elements + elements / BLOCK_SIZE
}

fn count_word(elements: usize) -> Result<u32, CodecError> {
    u32::try_from(elements).map_err(|_| CodecError::InputTooLarge(elements))
}

// ---------------------------------------------------------------------------
// Compress
// ---------------------------------------------------------------------------

/// Encode the block-aligned prefix of `input` into `output`.
///
/// Always writes the count word, even when `input` is shorter than one block.
///
/// # Errors
/// `BufferTooSmall` if `output` runs out of room, `InputTooLarge` if the
/// prefix does not fit the 32-bit count word.
pub fn compress(input: &[u32], output: &mut [u32]) -> Result<BlockSummary, CodecError> {
    let elements = aligned_len(input.len());
    let count = count_word(elements)?;
    ensure_capacity(1, output.len())?;
    output[0] = count;

    let (blocks, _) = input[..elements].as_chunks::<BLOCK_SIZE>();
    let mut n = 1usize;
    let mut baseline = 0u32;
    for block in blocks {
        let header = BlockHeader::for_block(baseline, block);
        ensure_capacity(n + 1 + header.payload_words(), output.len())?;
        n += write_block(baseline, block, header, &mut output[n..])?;
        baseline = block[BLOCK_SIZE - 1];
    }

    Ok(BlockSummary {
        elements,
        words: n,
        trailing_baseline: baseline,
    })
}

/// Write one header word plus its four payloads. Returns words written.
fn write_block(
    baseline: u32,
    block: &[u32; BLOCK_SIZE],
    header: BlockHeader,
    out: &mut [u32],
) -> Result<usize, CodecError> {
    ensure_capacity(1, out.len())?;
    out[0] = header.to_word();
    let mut n = 1usize;
    let mut carried = baseline;
    let (groups, _) = block.as_chunks::<MINI_BLOCK_SIZE>();
    for (&width, group) in header.widths.iter().zip(groups) {
        n += bitpack::pack(carried, group, width, &mut out[n..])?;
        carried = group[MINI_BLOCK_SIZE - 1];
    }
    Ok(n)
}

/// Parallel variant of [`compress`]; output is word-for-word identical.
///
/// Each block's starting baseline is the previous block's last input
/// element, so headers can be selected independently. Offsets are then
/// prefix-summed and payloads packed into disjoint output slices.
#[cfg(feature = "parallel")]
pub fn compress_parallel(input: &[u32], output: &mut [u32]) -> Result<BlockSummary, CodecError> {
    let elements = aligned_len(input.len());
    let count = count_word(elements)?;
    ensure_capacity(1, output.len())?;

    let (blocks, _) = input[..elements].as_chunks::<BLOCK_SIZE>();
    let headers: Vec<BlockHeader> = blocks
        .par_iter()
        .enumerate()
        .map(|(i, block)| BlockHeader::for_block(block_baseline(input, i), block))
        .collect();

    let total = 1 + headers
        .iter()
        .map(|h| 1 + h.payload_words())
        .sum::<usize>();
    ensure_capacity(total, output.len())?;
    output[0] = count;

    let mut slots: Vec<&mut [u32]> = Vec::with_capacity(headers.len());
    let mut rest = &mut output[1..total];
    for header in &headers {
        let (slot, tail) = std::mem::take(&mut rest).split_at_mut(1 + header.payload_words());
        slots.push(slot);
        rest = tail;
    }

    slots
        .into_par_iter()
        .zip(headers.par_iter())
        .zip(blocks.par_iter())
        .enumerate()
        .try_for_each(|(i, ((slot, &header), block))| {
            write_block(block_baseline(input, i), block, header, slot).map(|_| ())
        })?;

    let trailing_baseline = if elements == 0 { 0 } else { input[elements - 1] };
    Ok(BlockSummary {
        elements,
        words: total,
        trailing_baseline,
    })
}

#[cfg(feature = "parallel")]
#[inline]
fn block_baseline(input: &[u32], block_index: usize) -> u32 {
    if block_index == 0 {
        0
    } else {
        input[block_index * BLOCK_SIZE - 1]
    }
}

// ---------------------------------------------------------------------------
// Decompress
// ---------------------------------------------------------------------------

/// Decode the block stage at the start of `input` into `output`.
///
/// An empty `input` decodes to nothing.
///
/// # Errors
/// `MisalignedCount` for a count word that is not a multiple of 128,
/// `BufferTooSmall` if `output` cannot hold the declared elements,
/// `TruncatedInput` if a header or payload runs past the end of `input`,
/// `InvalidWidth` for a header width above 32.
pub fn decompress(input: &[u32], output: &mut [u32]) -> Result<BlockSummary, CodecError> {
    let Some(&count) = input.first() else {
        return Ok(BlockSummary::default());
    };
    let elements = declared_elements(count)?;
    ensure_capacity(elements, output.len())?;

    let mut m = 1usize;
    let mut baseline = 0u32;
    for block in output[..elements].chunks_exact_mut(BLOCK_SIZE) {
        let header = read_header(input, m)?;
        m += 1;
        for (&width, group) in header
            .widths
            .iter()
            .zip(block.chunks_exact_mut(MINI_BLOCK_SIZE))
        {
            let end = payload_end(input, m, width)?;
            bitpack::unpack(baseline, &input[m..end], width, group)?;
            baseline = group[MINI_BLOCK_SIZE - 1];
            m = end;
        }
    }

    Ok(BlockSummary {
        elements,
        words: m,
        trailing_baseline: baseline,
    })
}

/// Walk the header chain of the block stage without decoding payloads.
///
/// Fails on the same malformed inputs as [`decompress`], except that no
/// output capacity is required.
pub fn scan(input: &[u32]) -> Result<BlockLayout, CodecError> {
    let Some(&count) = input.first() else {
        return Ok(BlockLayout::default());
    };
    let elements = declared_elements(count)?;
    let blocks = elements / BLOCK_SIZE;

    let mut headers = Vec::with_capacity(blocks.min(input.len()));
    let mut m = 1usize;
    for index in 0..blocks {
        let header = read_header(input, m)?;
        m += 1;
        for &width in &header.widths {
            m = payload_end(input, m, width)?;
        }
        log::trace!("block {index}: widths {:?}", header.widths);
        headers.push(header);
    }

    Ok(BlockLayout {
        headers,
        elements,
        words: m,
    })
}

fn declared_elements(count: u32) -> Result<usize, CodecError> {
    if count as usize % BLOCK_SIZE != 0 {
        return Err(CodecError::MisalignedCount(count));
    }
    Ok(count as usize)
}

fn read_header(input: &[u32], at: usize) -> Result<BlockHeader, CodecError> {
    input
        .get(at)
        .map(|&word| BlockHeader::from_word(word))
        .ok_or(CodecError::TruncatedInput {
            needed: at + 1,
            available: input.len(),
        })
}

/// Validate `width` and return the end of its payload starting at `at`.
fn payload_end(input: &[u32], at: usize, width: u32) -> Result<usize, CodecError> {
    let end = at + bitpack::checked_width(width)?;
    if end > input.len() {
        return Err(CodecError::TruncatedInput {
            needed: end,
            available: input.len(),
        });
    }
    Ok(end)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
