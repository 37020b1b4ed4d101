//! Numeric quantization for deterministic output
//!
//! Values are rounded to [`SIGNIFICANT_DIGITS`] significant digits and later
//! printed with [`FIXED_DECIMALS`] digits after the decimal point. The two
//! precisions do not agree: `123.456` quantizes to `123.0` and prints as
//! `123.0000`. Existing generated files depend on this output, so the two
//! steps are kept separate and both are applied.

/// Significant decimal digits kept by [`quantize`]
pub const SIGNIFICANT_DIGITS: i32 = 3;

/// Digits after the decimal point written by [`format_fixed`]
pub const FIXED_DECIMALS: usize = 4;

/// Round `value` to [`SIGNIFICANT_DIGITS`] significant decimal digits.
///
/// Halves round away from zero. Zero and non-finite values are returned
/// unchanged.
pub fn quantize(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }

    let exponent = decimal_exponent(value.abs());
    let shift = SIGNIFICANT_DIGITS - 1 - exponent;

    // Dividing by an exact power of ten keeps results like 0.1 as close to
    // their decimal value as multiplying by 10^-n would not.
    if shift >= 0 {
        let scale = 10f64.powi(shift);
        if !scale.is_finite() {
            // subnormal input
            return value;
        }
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-shift);
        (value / scale).round() * scale
    }
}

/// Format a value with exactly [`FIXED_DECIMALS`] digits after the point,
/// trailing zeros included.
pub fn format_fixed(value: f64) -> String {
    format!("{:.*}", FIXED_DECIMALS, value)
}

/// Position of the leading digit: `floor(log10(magnitude))`, corrected for
/// the error `log10` shows near exact powers of ten.
fn decimal_exponent(magnitude: f64) -> i32 {
    let mut exponent = magnitude.log10().floor() as i32;
    if 10f64.powi(exponent) > magnitude {
        exponent -= 1;
    } else if 10f64.powi(exponent + 1) <= magnitude {
        exponent += 1;
    }
    exponent
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quantize_keeps_three_significant_digits() {
        assert_eq!(quantize(0.123456), 0.123);
        assert_eq!(quantize(123.456), 123.0);
        assert_eq!(quantize(-4.5678), -4.57);
        assert_eq!(quantize(98765.0), 98800.0);
    }

    #[test]
    fn test_quantize_exact_values_unchanged() {
        assert_eq!(quantize(1.5), 1.5);
        assert_eq!(quantize(2.25), 2.25);
        assert_eq!(quantize(1.0), 1.0);
        assert_eq!(quantize(100.0), 100.0);
    }

    #[test]
    fn test_quantize_zero_and_non_finite() {
        assert_eq!(quantize(0.0), 0.0);
        assert!(quantize(f64::NAN).is_nan());
        assert_eq!(quantize(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_quantize_carries_into_next_digit() {
        assert_eq!(quantize(9.996), 10.0);
        assert_eq!(quantize(0.0009996), 0.001);
    }

    #[test]
    fn test_format_fixed_pads_trailing_zeros() {
        assert_eq!(format_fixed(0.0), "0.0000");
        assert_eq!(format_fixed(1.0), "1.0000");
        assert_eq!(format_fixed(2.25), "2.2500");
        assert_eq!(format_fixed(-0.5), "-0.5000");
    }

    #[test]
    fn test_precision_mismatch_is_visible() {
        // three significant digits, four decimals
        assert_eq!(format_fixed(quantize(0.123456)), "0.1230");
        assert_eq!(format_fixed(quantize(123.456)), "123.0000");
    }

    proptest! {
        #[test]
        fn prop_quantize_then_format_is_idempotent(value in -10_000.0f64..10_000.0) {
            let once = quantize(value);
            let twice = quantize(once);
            prop_assert_eq!(format_fixed(once), format_fixed(twice));
        }

        #[test]
        fn prop_quantize_stays_close(value in 0.001f64..10_000.0) {
            let q = quantize(value);
            // relative error bounded by half a unit in the third digit
            prop_assert!(((q - value) / value).abs() <= 0.005 + 1e-12);
        }
    }
}
