//! Exact fixed-point numbers for characteristic values.
//!
//! A [Decimal] stores an integer amount of millionths, so comparisons against `Min`, `Med`, and `Max`
//! are exact and no binary floating point is ever involved.
use crate::error::DigraphError;
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, opt},
    sequence::{preceded, tuple},
    IResult,
};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

/// Number of fractional digits a [Decimal] carries.
pub const FRACTION_DIGITS: u32 = 6;
const SCALE: i64 = 1_000_000;

/// Fixed-point decimal with [FRACTION_DIGITS] fractional digits.
#[derive(Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct Decimal(i64);

impl Decimal {
    /// The value `0`.
    pub const ZERO: Decimal = Decimal(0);
    /// The value `1`.
    pub const ONE: Decimal = Decimal(SCALE);
    /// The value `-1`.
    pub const MINUS_ONE: Decimal = Decimal(-SCALE);

    /// Builds a [Decimal] from its raw amount of millionths.
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Raw amount of millionths.
    pub fn units(self) -> i64 {
        self.0
    }

    /// Builds the integral [Decimal] `value`, saturating outside of the representable range.
    pub fn from_int(value: i64) -> Self {
        Self(value.saturating_mul(SCALE))
    }

    /// Builds the integral [Decimal] `value`; [None] outside of the representable range.
    pub fn checked_from_int(value: i64) -> Option<Self> {
        value.checked_mul(SCALE).map(Self)
    }

    /// Exact quotient `numerator / denominator`, rounded half away from zero to the last digit.
    /// Returns [None] on a zero denominator.
    pub fn from_ratio(numerator: i64, denominator: i64) -> Option<Self> {
        div_round(i128::from(numerator) * i128::from(SCALE), i128::from(denominator)).map(Self)
    }

    /// `self / other`, rounded to the last digit; [None] if `other` is zero.
    pub fn checked_div(self, other: Decimal) -> Option<Self> {
        div_round(i128::from(self.0) * i128::from(SCALE), i128::from(other.0)).map(Self)
    }

    /// `self * mul / div` with a single rounding step; [None] if `div` is zero.
    pub fn checked_mul_div(self, mul: Decimal, div: Decimal) -> Option<Self> {
        div_round(i128::from(self.0) * i128::from(mul.0), i128::from(div.0)).map(Self)
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// `-1`, `0`, or `1` according to the sign.
    pub fn signum(self) -> Self {
        Self(self.0.signum() * SCALE)
    }

    /// Mean of two values, rounded half away from zero.
    pub fn midpoint(self, other: Decimal) -> Self {
        Self(div_round(i128::from(self.0) + i128::from(other.0), 2).unwrap_or_default())
    }

    /// Returns true if no fractional digit is set.
    pub fn is_integer(self) -> bool {
        self.0 % SCALE == 0
    }

    /// Rounds half away from zero to `ndigits` fractional digits.
    pub fn round_dp(self, ndigits: u32) -> Self {
        if ndigits >= FRACTION_DIGITS {
            return self;
        }
        let step = 10i64.pow(FRACTION_DIGITS - ndigits);
        let rounded = div_round(i128::from(self.0), i128::from(step)).unwrap_or_default();
        Self(rounded.saturating_mul(step))
    }

    fn literal(input: &str) -> IResult<&str, (Option<char>, &str, Option<&str>)> {
        all_consuming(tuple((
            opt(one_of("+-")),
            digit1,
            opt(preceded(char('.'), digit1)),
        )))(input)
    }
}

fn div_round(numerator: i128, denominator: i128) -> Option<i64> {
    if denominator == 0 {
        return None;
    }
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let quotient = if 2 * remainder.abs() >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    };
    i64::try_from(quotient).ok()
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl FromStr for Decimal {
    type Err = DigraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DigraphError::InvalidValue(s.to_string());
        let (_, (sign, int, fraction)) = Decimal::literal(s.trim()).map_err(|_| invalid())?;
        let fraction = fraction.unwrap_or("");
        if fraction.len() > FRACTION_DIGITS as usize {
            return Err(invalid());
        }
        let int: i64 = int.parse().map_err(|_| invalid())?;
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            fraction.parse::<i64>().map_err(|_| invalid())?
                * 10i64.pow(FRACTION_DIGITS - fraction.len() as u32)
        };
        let units = int
            .checked_mul(SCALE)
            .and_then(|units| units.checked_add(fraction_units))
            .ok_or_else(invalid)?;
        Ok(if sign == Some('-') {
            Self(-units)
        } else {
            Self(units)
        })
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (units, digits) = match f.precision() {
            Some(precision) => {
                let digits = (precision as u32).min(FRACTION_DIGITS);
                (self.round_dp(digits).0, digits)
            }
            None => {
                let mut digits = FRACTION_DIGITS;
                while digits > 0 && self.0 % 10i64.pow(FRACTION_DIGITS - digits + 1) == 0 {
                    digits -= 1;
                }
                (self.0, digits)
            }
        };
        let sign = if units < 0 {
            "-"
        } else if f.sign_plus() {
            "+"
        } else {
            ""
        };
        let magnitude = units.unsigned_abs();
        let scale = SCALE as u64;
        let mut repr = format!("{sign}{}", magnitude / scale);
        if digits > 0 {
            let fraction = (magnitude % scale) / 10u64.pow(FRACTION_DIGITS - digits);
            repr.push_str(&format!(".{:0width$}", fraction, width = digits as usize));
        }
        match f.width() {
            Some(width) => write!(f, "{repr:>width$}"),
            None => f.write_str(&repr),
        }
    }
}

impl Add for Decimal {
    type Output = Decimal;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Decimal {
    type Output = Decimal;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Decimal {
    type Output = Decimal;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Product rounded half away from zero to the last digit.
impl Mul for Decimal {
    type Output = Decimal;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(
            div_round(i128::from(self.0) * i128::from(rhs.0), i128::from(SCALE))
                .unwrap_or_default(),
        )
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal literal or an integer")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Decimal::checked_from_int(v)
            .ok_or_else(|| E::custom(DigraphError::InvalidValue(v.to_string())))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .ok()
            .and_then(Decimal::checked_from_int)
            .ok_or_else(|| E::custom(DigraphError::InvalidValue(v.to_string())))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::custom(format!(
            "binary floating point {v} is not accepted, use a decimal string"
        )))
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Decimal {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Decimal(i64::arbitrary(g) % (4 * SCALE))
    }
}
