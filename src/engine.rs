// Codec engine: ties the block codec and the variable-byte tail together.
//
// Provides high-level compress/decompress APIs that orchestrate:
//   - Block codec over the largest 128-aligned prefix
//   - Variable-byte codec over the remaining 0..=127 elements, starting from
//     the block stage's trailing baseline
//   - The inverse, rediscovering the split from the leading count word

use crate::codec::block::{self, BlockHeader, BlockSummary};
use crate::codec::{CodecError, varbyte};

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Worst-case encoded words for an input of `len` elements.
///
/// An output slice of this length is always large enough for [`compress`].
pub fn max_compressed_len(len: usize) -> usize {
    let tail = len - block::aligned_len(len);
    block::max_compressed_words(len) + varbyte::max_compressed_words(tail)
}

/// Number of elements `words` decodes to.
///
/// # Errors
/// Same header validation as [`decompress`].
pub fn decoded_len(words: &[u32]) -> Result<usize, CodecError> {
    let layout = block::scan(words)?;
    Ok(layout.elements + varbyte::value_count(&words[layout.words..]))
}

// ---------------------------------------------------------------------------
// Compress / decompress
// ---------------------------------------------------------------------------

/// Compress `input` into `output`, returning the number of words written.
///
/// `output` must be presized; [`max_compressed_len`] is always enough.
///
/// # Errors
/// Propagates `BufferTooSmall` and `InputTooLarge` from the codec stages.
pub fn compress(input: &[u32], output: &mut [u32]) -> Result<usize, CodecError> {
    let summary = block::compress(input, output)?;
    finish_compress(input, output, summary)
}

/// Like [`compress`], encoding blocks on the rayon thread pool.
///
/// Output is identical to [`compress`].
#[cfg(feature = "parallel")]
pub fn compress_parallel(input: &[u32], output: &mut [u32]) -> Result<usize, CodecError> {
    let summary = block::compress_parallel(input, output)?;
    finish_compress(input, output, summary)
}

fn finish_compress(
    input: &[u32],
    output: &mut [u32],
    summary: BlockSummary,
) -> Result<usize, CodecError> {
    let tail = &input[summary.elements..];
    let tail_words = varbyte::compress(
        tail,
        summary.trailing_baseline,
        &mut output[summary.words..],
    )?;
    let total = summary.words + tail_words;
    log::debug!(
        "compressed {} elements ({} in blocks, {} in tail) into {total} words",
        input.len(),
        summary.elements,
        tail.len(),
    );
    Ok(total)
}

/// Decompress `input` into `output`, returning the number of elements
/// written.
///
/// Use [`decoded_len`] to size `output` exactly.
///
/// # Errors
/// Propagates `MisalignedCount`, `TruncatedInput`, `InvalidWidth` and
/// `BufferTooSmall` from the codec stages, unchanged.
pub fn decompress(input: &[u32], output: &mut [u32]) -> Result<usize, CodecError> {
    let summary = block::decompress(input, output)?;
    let tail_len = varbyte::decompress(
        &input[summary.words..],
        summary.trailing_baseline,
        &mut output[summary.elements..],
    )?;
    let total = summary.elements + tail_len;
    log::debug!(
        "decompressed {} words into {total} elements ({} from blocks, {tail_len} from tail)",
        input.len(),
        summary.elements,
    );
    Ok(total)
}

// ---------------------------------------------------------------------------
// Owned convenience API
// ---------------------------------------------------------------------------

/// Compress into a freshly allocated, exactly sized vector.
pub fn compress_to_vec(input: &[u32]) -> Result<Vec<u32>, CodecError> {
    let mut out = vec![0u32; max_compressed_len(input.len())];
    let n = compress(input, &mut out)?;
    out.truncate(n);
    Ok(out)
}

/// Decompress into a freshly allocated, exactly sized vector.
pub fn decompress_to_vec(input: &[u32]) -> Result<Vec<u32>, CodecError> {
    let mut out = vec![0u32; decoded_len(input)?];
    let n = decompress(input, &mut out)?;
    out.truncate(n);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Structure of an encoded stream, read without decoding payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLayout {
    /// Header of every block, in order.
    pub headers: Vec<BlockHeader>,
    /// Elements covered by the block stage.
    pub block_elements: usize,
    /// Words used by the block stage, count word included.
    pub block_words: usize,
    /// Elements in the variable-byte tail.
    pub tail_elements: usize,
    /// Words used by the variable-byte tail.
    pub tail_words: usize,
}

impl StreamLayout {
    /// Total decoded elements.
    pub fn elements(&self) -> usize {
        self.block_elements + self.tail_elements
    }

    /// Total encoded words.
    pub fn words(&self) -> usize {
        self.block_words + self.tail_words
    }

    /// Histogram of sub-group widths: entry `w` counts sub-groups of width `w`.
    pub fn width_histogram(&self) -> [usize; 33] {
        let mut hist = [0usize; 33];
        for header in &self.headers {
            for &w in &header.widths {
                if let Some(slot) = hist.get_mut(w as usize) {
                    *slot += 1;
                }
            }
        }
        hist
    }
}

/// Describe the layout of an encoded stream.
pub fn inspect(input: &[u32]) -> Result<StreamLayout, CodecError> {
    let layout = block::scan(input)?;
    let tail = &input[layout.words..];
    Ok(StreamLayout {
        block_elements: layout.elements,
        block_words: layout.words,
        tail_elements: varbyte::value_count(tail),
        tail_words: tail.len(),
        headers: layout.headers,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
