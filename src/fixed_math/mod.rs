//! Deterministic saturating fixed-point mathematics.
//!
//! The target has no FPU, so every value the solver touches is a Q16.16
//! integer. All arithmetic saturates at the representable range instead of
//! wrapping or trapping: a runaway value pins at MAX/MIN and the simulation
//! keeps running. Identical inputs produce bit-identical outputs on every
//! platform.

use core::cmp::{max, min};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use fixed::traits::ToFixed;
use fixed::types::I16F16;
use serde::{Deserialize, Serialize};

pub use vec2::FixedVec2;

mod vec2;

#[cfg(test)]
mod tests;

/// Fixed-point scalar used throughout the simulation.
///
/// Wraps `I16F16`: 16 integer bits (range ±32768) and 16 fractional bits
/// (resolution ~0.000015). The panel is 128 px wide and density sums stay
/// below N, so the integer range leaves plenty of headroom; the fractional
/// bits give the sub-pixel positions that keep slow particles from snapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedNum(I16F16);

impl FixedNum {
    pub const FRAC_BITS: u32 = 16;
    pub const ZERO: Self = Self(I16F16::ZERO);
    pub const ONE: Self = Self(I16F16::ONE);
    pub const MAX: Self = Self(I16F16::MAX);
    pub const MIN: Self = Self(I16F16::MIN);
    /// Smallest positive value (one unit in the last place).
    pub const DELTA: Self = Self(I16F16::DELTA);

    pub const fn from_bits(bits: i32) -> Self {
        Self(I16F16::from_bits(bits))
    }

    pub const fn to_bits(self) -> i32 {
        self.0.to_bits()
    }

    pub const fn from_int(value: i16) -> Self {
        Self(I16F16::from_bits((value as i32) << Self::FRAC_BITS))
    }

    /// Convert from any numeric type, saturating when out of range.
    pub fn from_num<Src: ToFixed>(src: Src) -> Self {
        Self(I16F16::saturating_from_num(src))
    }

    /// Lossy conversion for diagnostics and tests. The solver never uses it.
    pub fn to_f32(self) -> f32 {
        self.0.to_num::<f32>()
    }

    /// Integer part, rounded towards negative infinity.
    pub const fn floor_int(self) -> i32 {
        self.to_bits() >> Self::FRAC_BITS
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn half(self) -> Self {
        Self::from_bits(self.to_bits() / 2)
    }

    pub fn saturating_div(self, rhs: Self) -> Self {
        if rhs == Self::ZERO {
            return match self.cmp(&Self::ZERO) {
                core::cmp::Ordering::Greater => Self::MAX,
                core::cmp::Ordering::Less => Self::MIN,
                core::cmp::Ordering::Equal => Self::ZERO,
            };
        }
        Self(self.0.saturating_div(rhs.0))
    }
}

impl core::fmt::Display for FixedNum {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl Add for FixedNum {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for FixedNum {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for FixedNum {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_mul(rhs.0))
    }
}

impl Div for FixedNum {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        self.saturating_div(rhs)
    }
}

impl Neg for FixedNum {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(self.0.saturating_neg())
    }
}

impl AddAssign for FixedNum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedNum {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for FixedNum {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for FixedNum {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

/// α for the alpha-max-plus-beta-min estimator (0.96043387 in Q16.16).
pub const MAGNITUDE_ALPHA: FixedNum = FixedNum::from_bits(62_943);
/// β for the alpha-max-plus-beta-min estimator (0.39782473 in Q16.16).
pub const MAGNITUDE_BETA: FixedNum = FixedNum::from_bits(26_072);

/// Estimate `sqrt(dx² + dy²)` without a square root.
///
/// Returns `α·max(|dx|,|dy|) + β·min(|dx|,|dy|)`. With the constants above the
/// relative error stays within about 4% in every direction. The estimate is
/// non-decreasing in `|dx|` and in `|dy|`, which is all the falloff kernels
/// rely on; it is not exact and must not be compared for equality against a
/// true length.
pub fn approx_magnitude(dx: FixedNum, dy: FixedNum) -> FixedNum {
    let dx = dx.abs();
    let dy = dy.abs();
    let a = max(dx, dy);
    let b = min(dx, dy);
    a * MAGNITUDE_ALPHA + b * MAGNITUDE_BETA
}
