//! VRT token amounts.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point drift in
//! balances. The smallest unit is 1 raw = one millionth of a VRT token.
//! Negative amounts are unrepresentable.

use crate::error::AmountError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Number of fractional digits in a VRT amount.
pub const VRT_DECIMALS: u32 = 6;

/// Raw units per whole VRT token.
pub const VRT_UNIT: u128 = 10u128.pow(VRT_DECIMALS);

/// An amount of VRT, stored as raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VrtAmount(u128);

impl VrtAmount {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens, e.g. `from_tokens(10)` is 10 VRT.
    pub const fn from_tokens(tokens: u64) -> Self {
        Self(tokens as u128 * VRT_UNIT)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Approximate value in tokens, for display and reporting only.
    pub fn as_tokens_f64(&self) -> f64 {
        self.0 as f64 / VRT_UNIT as f64
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiply by a basis-point rate (10_000 = 100%), rounding down.
    pub fn mul_bps(self, bps: u32) -> Self {
        Self(self.0.saturating_mul(bps as u128) / 10_000)
    }
}

impl Add for VrtAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for VrtAmount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for VrtAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for VrtAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.saturating_add(x))
    }
}

impl fmt::Display for VrtAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} VRT", DecimalText(self.0))
    }
}

/// Plain decimal rendering without the unit suffix, trailing zeros trimmed.
struct DecimalText(u128);

impl fmt::Display for DecimalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / VRT_UNIT;
        let frac = self.0 % VRT_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", frac, width = VRT_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for VrtAmount {
    type Err = AmountError;

    /// Parse a decimal token string such as `"10"`, `"0.25"` or `"125.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(AmountError::Negative(s.to_string()));
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if frac.len() > VRT_DECIMALS as usize {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::Overflow(s.to_string()))?
        };
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = VRT_DECIMALS as usize);
            padded
                .parse()
                .map_err(|_| AmountError::Malformed(s.to_string()))?
        };

        whole
            .checked_mul(VRT_UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(|| AmountError::Overflow(s.to_string()))
    }
}

// Amounts travel as decimal strings: TOML has no u128 and JSON consumers
// lose precision on large integers.
impl Serialize for VrtAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&DecimalText(self.0))
    }
}

impl<'de> Deserialize<'de> for VrtAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = VrtAmount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative token amount as a decimal string or integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<VrtAmount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<VrtAmount, E> {
        Ok(VrtAmount::from_tokens(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<VrtAmount, E> {
        u64::try_from(v)
            .map(VrtAmount::from_tokens)
            .map_err(|_| E::custom(AmountError::Negative(v.to_string())))
    }
}
