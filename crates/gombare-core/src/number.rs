use std::fmt;

use crate::CanonicalizeError;

/// Digits kept after the decimal point for non-integral key fragments.
const FRACTION_DIGITS: usize = 6;

/// Decimal exponents rendered positionally by the loose form; anything else
/// switches to scientific notation.
const LOOSE_EXP_MIN: i32 = -4;
const LOOSE_EXP_MAX: i32 = 6;

/// 2^63, the first float past the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A finite document number stored as IEEE-754 double precision.
#[derive(Clone, Copy, Debug, PartialOrd)]
pub struct Number(f64);

impl Number {
    /// Creates a new [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use gombare_core::Number;
    /// let num = Number::new(42.0)?;
    /// assert_eq!(num.get(), 42.0);
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, CanonicalizeError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(CanonicalizeError::NotFinite { value })
        }
    }

    /// Returns the raw floating-point value.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Canonical key fragment: integers without a fraction, everything else
    /// with exactly six decimals.
    ///
    /// ```
    /// # use gombare_core::Number;
    /// assert_eq!(Number::new(3.0)?.to_key_fragment(), "3");
    /// assert_eq!(Number::new(3.5)?.to_key_fragment(), "3.500000");
    /// assert_eq!(Number::new(-2.0)?.to_key_fragment(), "-2");
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn to_key_fragment(self) -> String {
        match self.as_integer() {
            Some(int) => int.to_string(),
            None => format!("{:.*}", FRACTION_DIGITS, self.0),
        }
    }

    /// Shortest round-trip rendering used by conditional gates.
    ///
    /// Decimal exponents below -4 or from 6 upwards use scientific notation
    /// with a signed, two-digit exponent (`1e+06`, `1e-05`).
    ///
    /// ```
    /// # use gombare_core::Number;
    /// assert_eq!(Number::new(3.5)?.to_loose_string(), "3.5");
    /// assert_eq!(Number::new(123456.0)?.to_loose_string(), "123456");
    /// assert_eq!(Number::new(1e6)?.to_loose_string(), "1e+06");
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn to_loose_string(self) -> String {
        // `{:e}` yields the shortest round-trip digits, so its exponent is
        // the one of the digits actually printed.
        let scientific = format!("{:e}", self.0);
        let Some((mantissa, exp)) = scientific.split_once('e') else {
            return scientific;
        };
        let exponent: i32 = exp.parse().unwrap_or_default();
        if (LOOSE_EXP_MIN..LOOSE_EXP_MAX).contains(&exponent) {
            return self.0.to_string();
        }
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        format!("{mantissa}e{sign}{digits:0>2}")
    }

    fn as_integer(self) -> Option<i64> {
        if self.0.fract() == 0.0 && -I64_LIMIT <= self.0 && self.0 < I64_LIMIT {
            Some(self.0 as i64)
        } else {
            None
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_loose_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64) -> Number {
        Number::new(value).unwrap()
    }

    #[test]
    fn key_fragment_drops_zero_fraction() {
        assert_eq!(num(0.0).to_key_fragment(), "0");
        assert_eq!(num(-0.0).to_key_fragment(), "0");
        assert_eq!(num(1_000_000.0).to_key_fragment(), "1000000");
    }

    #[test]
    fn key_fragment_keeps_integers_past_the_i64_range() {
        assert_eq!(num(-9_223_372_036_854_775_808.0).to_key_fragment(), "-9223372036854775808");
        assert_eq!(num(9_223_372_036_854_775_808.0).to_key_fragment(), "9223372036854775808.000000");
        assert_eq!(num(9_223_372_036_854_774_784.0).to_key_fragment(), "9223372036854774784");
    }

    #[test]
    fn key_fragment_pads_fraction_to_six_digits() {
        assert_eq!(num(0.1).to_key_fragment(), "0.100000");
        assert_eq!(num(-7.25).to_key_fragment(), "-7.250000");
        assert_eq!(num(1.0000004).to_key_fragment(), "1.000000");
    }

    #[test]
    fn loose_string_switches_to_exponent_at_the_edges() {
        assert_eq!(num(3.0).to_loose_string(), "3");
        assert_eq!(num(0.0001).to_loose_string(), "0.0001");
        assert_eq!(num(0.00001).to_loose_string(), "1e-05");
        assert_eq!(num(-2.5e22).to_loose_string(), "-2.5e+22");
        assert_eq!(num(123_456.0).to_loose_string(), "123456");
        assert_eq!(num(1_000_000.0).to_loose_string(), "1e+06");
        assert_eq!(num(1_234_567.0).to_loose_string(), "1.234567e+06");
        assert_eq!(num(1e20).to_loose_string(), "1e+20");
    }

    #[test]
    fn loose_string_reads_the_exponent_from_the_printed_digits() {
        assert_eq!(num(999_999.999_999_999_9).to_loose_string(), "999999.9999999999");
        assert_eq!(num(-0.0).to_loose_string(), "-0");
        assert_eq!(num(0.0).to_loose_string(), "0");
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        assert!(Number::new(f64::NAN).is_err());
        assert!(Number::new(f64::INFINITY).is_err());
    }
}
