//! The reputation score and its update formulas.

use serde::{Deserialize, Serialize};
use std::fmt;
use verity_types::params::{
    REPUTATION_GAIN_FACTOR, REPUTATION_INITIAL, REPUTATION_LOSS_FACTOR,
    REPUTATION_MAX, REPUTATION_MIN,
};

/// Scale used when a score takes part in integer arithmetic.
pub const MICRO_POINTS: f64 = 1_000_000.0;

/// A reputation score, always inside `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Reputation(f64);

impl Reputation {
    pub const MIN: Self = Self(REPUTATION_MIN);
    pub const MAX: Self = Self(REPUTATION_MAX);
    pub const INITIAL: Self = Self(REPUTATION_INITIAL);

    /// Build a score, clamping into `[0, 100]`. NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(REPUTATION_MIN, REPUTATION_MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Score in millionths of a point, rounded. Used for reward shares.
    pub fn to_micro(&self) -> u128 {
        (self.0 * MICRO_POINTS).round() as u128
    }

    /// The score as an exact dyadic rational: `value = mantissa · 2^(shift − 1074)`.
    ///
    /// Every non-negative finite f64 has this form, so scores can be compared
    /// and summed in integer arithmetic without rounding.
    pub fn scaled_parts(&self) -> (u64, u32) {
        let bits = self.0.to_bits();
        let biased_exponent = ((bits >> 52) & 0x7ff) as u32;
        let fraction = bits & ((1u64 << 52) - 1);
        if biased_exponent == 0 {
            // Zero or subnormal.
            (fraction, 0)
        } else {
            (fraction | (1u64 << 52), biased_exponent - 1)
        }
    }

    /// `R' = R + gain · (100 − R)`.
    ///
    /// Below 100 the result stays strictly below 100: when the gained headroom
    /// is smaller than f64 resolution the score is left unchanged.
    pub fn after_correct(self, gain: f64) -> Self {
        let r = self.0;
        let next = r + gain * (REPUTATION_MAX - r);
        if next >= REPUTATION_MAX && r < REPUTATION_MAX && gain < 1.0 {
            return self;
        }
        Self::new(next)
    }

    /// `R' = R − loss · R`, computed as `R · (1 − loss)`.
    pub fn after_incorrect(self, loss: f64) -> Self {
        Self::new(self.0 * (1.0 - loss))
    }

    /// Apply the default protocol factors for a vote outcome.
    pub fn after_vote(self, was_correct: bool) -> Self {
        if was_correct {
            self.after_correct(REPUTATION_GAIN_FACTOR)
        } else {
            self.after_incorrect(REPUTATION_LOSS_FACTOR)
        }
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<f64> for Reputation {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Reputation> for f64 {
    fn from(r: Reputation) -> Self {
        r.0
    }
}

impl fmt::Display for Reputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_out_of_range_values() {
        assert_eq!(Reputation::new(-5.0), Reputation::MIN);
        assert_eq!(Reputation::new(150.0), Reputation::MAX);
        assert_eq!(Reputation::new(f64::NAN), Reputation::MIN);
        assert_eq!(Reputation::new(42.5).value(), 42.5);
    }

    #[test]
    fn correct_vote_closes_five_percent_of_headroom() {
        assert_eq!(Reputation::new(50.0).after_vote(true).value(), 52.5);
        assert_eq!(Reputation::new(80.0).after_vote(true).value(), 81.0);
        assert_eq!(Reputation::MAX.after_vote(true), Reputation::MAX);
        assert_eq!(Reputation::MIN.after_vote(true).value(), 5.0);
    }

    #[test]
    fn incorrect_vote_loses_ten_percent() {
        assert_eq!(Reputation::new(50.0).after_vote(false).value(), 45.0);
        assert_eq!(Reputation::MIN.after_vote(false), Reputation::MIN);
    }

    #[test]
    fn near_max_score_never_rounds_up_to_max() {
        let almost = Reputation::new(99.999_999_999_999_99);
        let next = almost.after_vote(true);
        assert!(next.value() < 100.0);
        assert!(next >= almost);
    }

    #[test]
    fn micro_points_round_to_nearest() {
        assert_eq!(Reputation::new(50.0).to_micro(), 50_000_000);
        assert_eq!(Reputation::new(52.5).to_micro(), 52_500_000);
        assert_eq!(Reputation::MIN.to_micro(), 0);
    }

    #[test]
    fn scaled_parts_are_exact() {
        assert_eq!(Reputation::MIN.scaled_parts(), (0, 0));
        // 0.5 = 2^52 · 2^(1021 − 1074)
        assert_eq!(Reputation::new(0.5).scaled_parts(), (1 << 52, 1021));
        // 50 = 25 · 2^48 · 2^(1027 − 1074)
        assert_eq!(Reputation::new(50.0).scaled_parts(), (25 << 48, 1027));
        // Smallest subnormal.
        assert_eq!(Reputation::new(5e-324).scaled_parts(), (1, 0));
    }

    #[test]
    fn scaled_parts_keep_sub_micro_differences() {
        let a = Reputation::new(50.000_000_4);
        let b = Reputation::new(50.0);
        assert_eq!(a.to_micro(), b.to_micro());
        assert_ne!(a.scaled_parts(), b.scaled_parts());
    }
}
