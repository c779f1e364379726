//! Exact fraction arithmetic over arbitrary-precision integers.
//!
//! All planning math runs on [`Rational`] so that quantities like `1/3`
//! survive arbitrarily deep recipe expansion without drift. Conversion to
//! `f64` exists for display only and never feeds back into planning.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Errors from the (only) fallible arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RationalError {
    #[error("division by zero")]
    DivisionByZero,
}

/// Errors from parsing a rational literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRationalError {
    #[error("empty rational literal")]
    Empty,

    #[error("invalid rational literal: {0}")]
    Invalid(String),

    #[error("denominator is zero")]
    ZeroDenominator,
}

/// An exact signed fraction: big-integer numerator over a strictly positive
/// big-integer denominator, reduced after every operation.
///
/// Equality, hashing, and ordering all work on the canonical reduced form.
/// Ordering uses cross-multiplication, never float conversion. Serializes
/// as the exact string form (`"3"` or `"2/3"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: BigInt,
    denom: BigInt,
}

impl Rational {
    /// Construct `numer / denom`, normalizing sign and reducing.
    /// Fails only when `denom` is zero.
    pub fn new(numer: BigInt, denom: BigInt) -> Result<Self, RationalError> {
        if denom.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        Ok(Self::normalized(numer, denom))
    }

    /// Construct from small integers. Fails only when `denom` is zero.
    pub fn from_ratio(numer: i64, denom: i64) -> Result<Self, RationalError> {
        Self::new(BigInt::from(numer), BigInt::from(denom))
    }

    /// Construct a whole number.
    pub fn from_integer(n: i64) -> Self {
        Self {
            numer: BigInt::from(n),
            denom: BigInt::one(),
        }
    }

    /// Construct a whole number from a big integer.
    pub fn from_bigint(n: BigInt) -> Self {
        Self {
            numer: n,
            denom: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    /// Parse a decimal literal (`"12"`, `"-3.25"`, `".5"`) exactly, without
    /// routing through IEEE-754.
    pub fn parse_decimal(s: &str) -> Result<Self, ParseRationalError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseRationalError::Empty);
        }
        let (sign, body) = match s.as_bytes()[0] {
            b'-' => (-1, &s[1..]),
            b'+' => (1, &s[1..]),
            _ => (1, s),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseRationalError::Invalid(s.to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ParseRationalError::Invalid(s.to_string()));
        }
        let digits = format!("{int_part}{frac_part}");
        let numer = if digits.is_empty() {
            BigInt::zero()
        } else {
            digits
                .parse::<BigInt>()
                .map_err(|_| ParseRationalError::Invalid(s.to_string()))?
        };
        let denom = num_traits::pow(BigInt::from(10), frac_part.len());
        Ok(Self::normalized(numer * sign, denom))
    }

    /// Parse an `"n/d"` literal.
    pub fn parse_ratio(s: &str) -> Result<Self, ParseRationalError> {
        let (n, d) = s
            .split_once('/')
            .ok_or_else(|| ParseRationalError::Invalid(s.to_string()))?;
        let numer = n
            .trim()
            .parse::<BigInt>()
            .map_err(|_| ParseRationalError::Invalid(s.to_string()))?;
        let denom = d
            .trim()
            .parse::<BigInt>()
            .map_err(|_| ParseRationalError::Invalid(s.to_string()))?;
        if denom.is_zero() {
            return Err(ParseRationalError::ZeroDenominator);
        }
        Ok(Self::normalized(numer, denom))
    }

    /// Reduce and move the sign onto the numerator. `denom` must be nonzero.
    fn normalized(numer: BigInt, denom: BigInt) -> Self {
        debug_assert!(!denom.is_zero());
        if numer.is_zero() {
            return Self {
                numer: BigInt::zero(),
                denom: BigInt::one(),
            };
        }
        let g = numer.gcd(&denom);
        let mut numer = numer / &g;
        let mut denom = denom / g;
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        Self { numer, denom }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.numer.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.numer.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    /// -1, 0, or 1.
    pub fn signum(&self) -> i32 {
        if self.numer.is_negative() {
            -1
        } else if self.numer.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            numer: self.numer.abs(),
            denom: self.denom.clone(),
        }
    }

    /// Exact division. The only fallible arithmetic operation.
    pub fn checked_div(&self, rhs: &Self) -> Result<Self, RationalError> {
        if rhs.numer.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        Ok(Self::normalized(
            &self.numer * &rhs.denom,
            &self.denom * &rhs.numer,
        ))
    }

    /// Largest integer <= self.
    pub fn floor(&self) -> Self {
        Self::from_bigint(self.numer.div_floor(&self.denom))
    }

    /// Smallest integer >= self.
    pub fn ceil(&self) -> Self {
        Self::from_bigint(-(-&self.numer).div_floor(&self.denom))
    }

    /// Nearest integer, rounding halves away from zero.
    pub fn round(&self) -> Self {
        let (q, r) = self.numer.div_rem(&self.denom);
        let mut q = q;
        if r.abs() * 2u8 >= self.denom {
            if self.numer.is_negative() {
                q -= 1;
            } else {
                q += 1;
            }
        }
        Self::from_bigint(q)
    }

    /// Lossy conversion for display only. Never use the result in planning.
    pub fn to_f64(&self) -> f64 {
        let n = self.numer.to_f64().unwrap_or(f64::NAN);
        let d = self.denom.to_f64().unwrap_or(f64::NAN);
        n / d
    }

    /// Exact decimal rendering with `digits` fractional places, rounding
    /// the final place half away from zero.
    pub fn to_fixed(&self, digits: usize) -> String {
        let scale = num_traits::pow(BigInt::from(10), digits);
        let scaled = &self.numer * &scale;
        let (q, r) = scaled.div_rem(&self.denom);
        let mut q = q;
        if r.abs() * 2u8 >= self.denom {
            if scaled.is_negative() {
                q -= 1;
            } else {
                q += 1;
            }
        }
        let negative = q.is_negative();
        let mut body = q.abs().to_string();
        if digits == 0 {
            return if negative { format!("-{body}") } else { body };
        }
        if body.len() <= digits {
            body = format!("{}{}", "0".repeat(digits + 1 - body.len()), body);
        }
        let split = body.len() - digits;
        let (int_part, frac_part) = body.split_at(split);
        if negative {
            format!("-{int_part}.{frac_part}")
        } else {
            format!("{int_part}.{frac_part}")
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_integer(n as i64)
    }
}

impl From<u32> for Rational {
    fn from(n: u32) -> Self {
        Self::from_integer(n as i64)
    }
}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Accepts integer (`"7"`), decimal (`"-0.25"`), and ratio (`"2/3"`) forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            Self::parse_ratio(s)
        } else {
            Self::parse_decimal(s)
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom.is_one() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    /// Cross-multiplication: denominators are strictly positive, so
    /// `a/b <=> c/d` reduces to `a*d <=> c*b`.
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.numer * &other.denom).cmp(&(&other.numer * &self.denom))
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        Rational::normalized(
            &self.numer * &rhs.denom + &rhs.numer * &self.denom,
            &self.denom * &rhs.denom,
        )
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        Rational::normalized(
            &self.numer * &rhs.denom - &rhs.numer * &self.denom,
            &self.denom * &rhs.denom,
        )
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        Rational::normalized(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numer: -&self.numer,
            denom: self.denom.clone(),
        }
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        -&self
    }
}
