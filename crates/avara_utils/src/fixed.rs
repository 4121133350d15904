//! Two-decimal fixed point numbers
//!
//! Map geometry is kept at a precision of hundredths. Storing the values as an integer count of
//! hundredths keeps every derived coordinate exact, and makes rounding happen in exactly one
//! place: [`Fixed::from_ratio`] and [`Fixed::snap`], which both round half away from zero.
//!
//! Values coming from outside, parsed or snapped, are kept within [`Fixed::MAX`] so a handful
//! of them can be summed without overflowing.

use std::{
    fmt::{self, Display},
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

/// A decimal number with two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a decimal number")]
pub struct FixedParseError(pub String);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);

    /// Amount of stored units per 1.0
    pub const DENOMINATOR: i64 = 100;

    /// Largest magnitude accepted from text or floats, `21474836.47`
    pub const MAX: Fixed = Fixed(i32::MAX as i64);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn from_int(value: i64) -> Self {
        Self(value * Self::DENOMINATOR)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Like [`Fixed::from_int`], but refuses values past [`Fixed::MAX`].
    ///
    /// ```
    /// # use avara_utils::Fixed;
    /// assert_eq!(Fixed::checked_from_int(-7), Some(Fixed::from_int(-7)));
    /// assert_eq!(Fixed::checked_from_int(i64::MAX), None);
    /// ```
    pub fn checked_from_int(value: i64) -> Option<Self> {
        value
            .checked_mul(Self::DENOMINATOR)
            .map(Self)
            .filter(|fixed| fixed.in_range())
    }

    pub fn in_range(self) -> bool {
        self.0.abs() <= Self::MAX.0
    }

    /// Computes `numerator / denominator`, rounded to hundredths (half away from zero).
    ///
    /// ## Example
    /// ```
    /// # use avara_utils::Fixed;
    /// assert_eq!(Fixed::from_ratio(9, 18), Fixed::from_hundredths(50));
    /// assert_eq!(Fixed::from_ratio(1, 3), Fixed::from_hundredths(33));
    /// assert_eq!(Fixed::from_ratio(-1, 200), Fixed::from_hundredths(-1));
    /// ```
    pub fn from_ratio(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "division by zero");
        Self(div_round(numerator * Self::DENOMINATOR, denominator))
    }

    /// Rounds a floating point value to hundredths (half away from zero), clamped to
    /// [`Fixed::MAX`]. NaN becomes zero.
    pub fn snap(value: f64) -> Self {
        let limit = Self::MAX.0 as f64;
        Self((value * Self::DENOMINATOR as f64).round().clamp(-limit, limit) as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::DENOMINATOR as f64
    }

    /// Half of the value, rounded like everything else.
    pub fn half(self) -> Self {
        Self(div_round(self.0, 2))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Integer division with the quotient rounded half away from zero.
fn div_round(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 += rhs.0;
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Fixed::from_int(value as i64)
    }
}

/// Prints the shortest exact representation, so `1.50` becomes `1.5` and `2.00` becomes `2`.
///
/// ```
/// # use avara_utils::Fixed;
/// assert_eq!(Fixed::from_hundredths(150).to_string(), "1.5");
/// assert_eq!(Fixed::from_hundredths(200).to_string(), "2");
/// assert_eq!(Fixed::from_hundredths(-25).to_string(), "-0.25");
/// ```
impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = self.0.abs() / Self::DENOMINATOR;
        let fraction = self.0.abs() % Self::DENOMINATOR;

        if fraction == 0 {
            write!(f, "{sign}{whole}")
        } else if fraction % 10 == 0 {
            write!(f, "{sign}{whole}.{}", fraction / 10)
        } else {
            write!(f, "{sign}{whole}.{fraction:02}")
        }
    }
}

/// Parses a plain decimal literal exactly, rounding any digits past the second one half away
/// from zero. Exponents are not supported, the level scripts never use them. Values past
/// [`Fixed::MAX`] are rejected.
///
/// ```
/// # use avara_utils::Fixed;
/// assert_eq!("4".parse::<Fixed>().unwrap(), Fixed::from_int(4));
/// assert_eq!("-0.125".parse::<Fixed>().unwrap(), Fixed::from_hundredths(-13));
/// assert_eq!(".5".parse::<Fixed>().unwrap(), Fixed::from_hundredths(50));
/// assert!("abc".parse::<Fixed>().is_err());
/// ```
impl FromStr for Fixed {
    type Err = FixedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || FixedParseError(s.to_string());

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(error());
        }
        if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(error());
        }

        let whole: i64 = match whole {
            "" => 0,
            w => w.parse().map_err(|_| error())?,
        };

        let mut hundredths = 0;
        let mut fraction_digits = fraction.bytes().map(|b| (b - b'0') as i64);
        for _ in 0..2 {
            hundredths = hundredths * 10 + fraction_digits.next().unwrap_or(0);
        }
        if fraction_digits.next().unwrap_or(0) >= 5 {
            hundredths += 1;
        }

        let magnitude = whole
            .checked_mul(Self::DENOMINATOR)
            .and_then(|w| w.checked_add(hundredths))
            .map(Fixed)
            .filter(|magnitude| magnitude.in_range())
            .ok_or_else(error)?;

        Ok(if negative { -magnitude } else { magnitude })
    }
}

#[cfg(test)]
mod tests {
    use super::Fixed;

    #[test]
    fn ratio_rounds_half_away_from_zero() {
        assert_eq!(Fixed::from_ratio(1, 200), Fixed::from_hundredths(1));
        assert_eq!(Fixed::from_ratio(-1, 200), Fixed::from_hundredths(-1));
        assert_eq!(Fixed::from_ratio(1, 300), Fixed::from_hundredths(0));
        assert_eq!(Fixed::from_ratio(100, 18), Fixed::from_hundredths(556));
        assert_eq!(Fixed::from_ratio(-100, 18), Fixed::from_hundredths(-556));
    }

    #[test]
    fn half_rounds_like_ratio() {
        assert_eq!(Fixed::from_hundredths(300).half(), Fixed::from_hundredths(150));
        assert_eq!(Fixed::from_hundredths(5).half(), Fixed::from_hundredths(3));
        assert_eq!(Fixed::from_hundredths(-5).half(), Fixed::from_hundredths(-3));
    }

    #[test]
    fn snapping_is_idempotent() {
        for value in [0.0, 1.004, 1.005, -2.675, 33.333_333, 1e6 / 7.0] {
            let once = Fixed::snap(value);
            assert_eq!(Fixed::snap(once.to_f64()), once, "{value}");
        }
    }

    #[test]
    fn display_and_parse_agree() {
        for hundredths in [0, 1, 10, 99, 100, 105, -7, -250, 123456] {
            let value = Fixed::from_hundredths(hundredths);
            assert_eq!(value.to_string().parse::<Fixed>().unwrap(), value);
        }
    }

    #[test]
    fn parse_rejects_huge_values() {
        assert_eq!("21474836.47".parse::<Fixed>().unwrap(), Fixed::MAX);
        assert_eq!("-21474836.47".parse::<Fixed>().unwrap(), -Fixed::MAX);
        for s in ["21474836.48", "90000000000000000", "-99999999999999999999"] {
            assert!(s.parse::<Fixed>().is_err(), "{s:?}");
        }
    }

    #[test]
    fn snapping_clamps() {
        assert_eq!(Fixed::snap(1e300), Fixed::MAX);
        assert_eq!(Fixed::snap(f64::NEG_INFINITY), -Fixed::MAX);
        assert_eq!(Fixed::snap(f64::NAN), Fixed::ZERO);
    }

    #[test]
    fn parse_rejects_garbage() {
        for s in ["", "-", ".", "1.2.3", "1e3", "0x10", "four"] {
            assert!(s.parse::<Fixed>().is_err(), "{s:?}");
        }
    }
}
