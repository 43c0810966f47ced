// Delta bit-packing codec for sorted u32 sequences.
//
// This module provides the building blocks of the postings-list format:
//
// - `width`  : bit-width selection over a group of deltas
// - `bitpack`: pack/unpack 32 deltas into exactly `width` words
// - `block`  : 128-element blocks of four 32-element sub-groups
// - `varbyte`: variable-byte fallback for the non-block-aligned tail
//
// The top-level dispatcher that glues `block` and `varbyte` together lives in
// `crate::engine`.

pub mod bitpack;
pub mod block;
pub mod varbyte;
pub mod width;

pub use block::{BlockHeader, BlockLayout, BlockSummary};

/// Number of elements in one block.
pub const BLOCK_SIZE: usize = 128;

/// Number of elements in one sub-group (mini-block). Four per block.
pub const MINI_BLOCK_SIZE: usize = 32;

/// Number of sub-groups per block.
pub const MINI_BLOCKS_PER_BLOCK: usize = BLOCK_SIZE / MINI_BLOCK_SIZE;

/// Largest legal bit width.
pub const MAX_WIDTH: u32 = 32;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure kinds shared by every codec stage.
///
/// All variants describe caller input: retrying with the same buffers always
/// fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Bit width outside `0..=32`.
    #[error("invalid bit width {0} (expected 0..=32)")]
    InvalidWidth(u32),
    /// Destination slice cannot hold the result.
    #[error("buffer too small: need {needed} slots, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    /// Encoded input ends before a header-declared payload does.
    #[error("truncated input: need {needed} words, have {available}")]
    TruncatedInput { needed: usize, available: usize },
    /// Count word is not a whole number of blocks.
    #[error("block element count {0} is not a multiple of {BLOCK_SIZE}")]
    MisalignedCount(u32),
    /// Block-aligned prefix does not fit the 32-bit count word.
    #[error("input of {0} elements exceeds the 32-bit count word")]
    InputTooLarge(usize),
}

/// Ensure `available >= needed`, reporting a `BufferTooSmall` otherwise.
#[inline]
pub(crate) fn ensure_capacity(needed: usize, available: usize) -> Result<(), CodecError> {
    if available < needed {
        return Err(CodecError::BufferTooSmall { needed, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_geometry() {
        assert_eq!(MINI_BLOCKS_PER_BLOCK, 4);
        assert_eq!(BLOCK_SIZE % MINI_BLOCK_SIZE, 0);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            CodecError::InvalidWidth(33).to_string(),
            "invalid bit width 33 (expected 0..=32)"
        );
        assert_eq!(
            CodecError::MisalignedCount(100).to_string(),
            "block element count 100 is not a multiple of 128"
        );
        assert!(ensure_capacity(4, 3).is_err());
        assert!(ensure_capacity(3, 3).is_ok());
    }
}
