// Bit-width selection.
//
// The width of a group is the bit length of the OR of all its deltas. The
// highest set bit of an OR-reduction equals the highest set bit of the
// largest element, so no separate max pass is needed.

/// Number of bits needed to represent `value` (0 for 0).
#[inline]
pub fn bits_for(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Minimum bit width that holds every delta of `values` against a running
/// baseline starting at `baseline`.
///
/// Deltas use wrapping subtraction, so any input is accepted; only sorted
/// input produces small widths.
#[inline]
pub fn max_bits(baseline: u32, values: &[u32]) -> u32 {
    let mut mask = 0u32;
    let mut prev = baseline;
    for &v in values {
        mask |= v.wrapping_sub(prev);
        prev = v;
    }
    bits_for(mask)
}
