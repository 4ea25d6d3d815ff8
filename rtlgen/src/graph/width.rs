use super::value::*;

/// Returns the minimal number of bits needed to represent `value`.
///
/// Zero still occupies a single bit, so the result is never less than `1`.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// assert_eq!(width_of(0u32), 1);
/// assert_eq!(width_of(1u32), 1);
/// assert_eq!(width_of(255u32), 8);
/// assert_eq!(width_of(256u32), 9);
/// ```
pub fn width_of<V: Into<Value>>(value: V) -> u32 {
    value.into().required_bits().max(1)
}

/// Returns the larger of two bit widths.
pub fn max_width(a: u32, b: u32) -> u32 {
    a.max(b)
}

/// Renders the declaration range for a `bit_width`-bit net, eg. `[7:0]`.
///
/// A single bit renders as `[0:0]`.
///
/// # Examples
///
/// ```
/// use rtlgen::*;
///
/// assert_eq!(bit_range(8), "[7:0]");
/// assert_eq!(bit_range(1), "[0:0]");
/// ```
pub fn bit_range(bit_width: u32) -> String {
    format!("[{}:0]", bit_width.saturating_sub(1))
}

/// Number of address bits needed to index `depth` elements, never less than `1`.
pub(crate) fn address_width(depth: u32) -> u32 {
    width_of(depth.saturating_sub(1))
}
