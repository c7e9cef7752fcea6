//! Primitive field types shared by every layout

/// One byte written to or read from the bus; also used for device addresses
pub type I2cByte = u8;

/// Write/read length field (16 bits, signed)
///
/// Valid lengths are non-negative. The signed representation is kept so the
/// layout matches C drivers that declare the field as `int16_t`.
pub type I2cLength = i16;

// Generated by build.rs from I2CTEST_BRIEF_LIMIT (default 16)
include!(concat!(env!("OUT_DIR"), "/brief_limit.rs"));

/// Fixed-capacity byte buffer used by the brief layouts
pub type DataBrief<const N: usize = BRIEF_LIMIT> = [I2cByte; N];

/// Mask selecting the 7-bit device address from an address byte
pub const ADDRESS_MASK: I2cByte = 0x7F;

/// Convert a length field to a buffer length
///
/// Negative lengths map to 0.
#[inline]
pub(crate) const fn length_to_usize(length: I2cLength) -> usize {
    if length < 0 {
        0
    } else {
        length as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_brief_limit_default() {
        if option_env!("I2CTEST_BRIEF_LIMIT").is_none() {
            assert_eq!(BRIEF_LIMIT, 16);
        }
        assert!(BRIEF_LIMIT > 0);
    }

    #[test]
    fn test_field_widths() {
        assert_eq!(core::mem::size_of::<I2cByte>(), 1);
        assert_eq!(core::mem::size_of::<I2cLength>(), 2);
        assert_eq!(core::mem::size_of::<DataBrief>(), BRIEF_LIMIT);
        assert_eq!(core::mem::size_of::<DataBrief<4>>(), 4);
    }

    #[test]
    fn test_length_range() {
        assert_eq!(I2cLength::MIN, -32768);
        assert_eq!(I2cLength::MAX, 32767);
        assert_eq!(length_to_usize(-1), 0);
        assert_eq!(length_to_usize(I2cLength::MAX), 32767);
    }

    proptest! {
        #[test]
        fn prop_length_to_usize_matches_non_negative(len in any::<I2cLength>()) {
            let expected = if len < 0 { 0 } else { len as usize };
            prop_assert_eq!(length_to_usize(len), expected);
        }
    }
}
