use std::{
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use fraction::Fraction;

use super::{fraction_tools::zero, TimeSignature};

/// Musical length in whole notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Hash)]
pub struct Length {
    fraction: Fraction,
}
impl Length {
    pub fn zero() -> Self {
        Self { fraction: zero() }
    }
    /// Length of `ticks` at the given resolution.
    ///
    /// # Example
    /// ```
    /// # use fraction::Fraction;
    /// # use scoreline::primitives::Length;
    /// assert_eq!(
    ///     Length::from_ticks(960, 480),
    ///     Length::from(Fraction::new(1u64, 2u64))
    /// );
    /// ```
    pub fn from_ticks(ticks: u64, ticks_per_quarter: u64) -> Self {
        Self {
            fraction: Fraction::new(ticks, ticks_per_quarter * 4),
        }
    }
    pub fn get(&self) -> Fraction {
        self.fraction
    }
    pub fn is_zero(&self) -> bool {
        self.fraction == zero()
    }
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        match rhs.fraction > self.fraction {
            true => None,
            false => Some(Self::from(self.fraction - rhs.fraction)),
        }
    }
}
impl Default for Length {
    fn default() -> Self {
        Self::zero()
    }
}
impl From<Fraction> for Length {
    fn from(value: Fraction) -> Self {
        Self { fraction: value }
    }
}
impl From<&TimeSignature> for Length {
    fn from(ts: &TimeSignature) -> Self {
        Self {
            fraction: Fraction::new(ts.numerator(), ts.denominator()),
        }
    }
}
impl Add for Length {
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            fraction: self.fraction + rhs.fraction,
        }
    }
    type Output = Self;
}
impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Self) {
        self.fraction = self.fraction + rhs.fraction;
    }
}
impl Sub for Length {
    fn sub(self, rhs: Self) -> Self::Output {
        match self.checked_sub(rhs) {
            Some(length) => length,
            None => panic!(
                "length can not be negative. left: {}, right: {}",
                self.fraction, rhs.fraction
            ),
        }
    }
    type Output = Self;
}
impl Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, length| acc + length)
    }
}
