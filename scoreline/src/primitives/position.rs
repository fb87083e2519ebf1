//! Onsets of events, counted from the track start or from a barline.
//!
//! Both kinds are measured in whole notes and converted through a
//! [`TimeMap`].
//!
//! ```
//! use fraction::Fraction;
//! use scoreline::primitives::{
//!     AbsolutePosition, GenericPosition, RelativePosition, TimeMap,
//!     TimeSignature,
//! };
//!
//! let time_map = TimeMap::new(TimeSignature::new(7, 8).unwrap(), 480);
//! let a = AbsolutePosition::from(Fraction::new(10u64, 8u64));
//! let b = RelativePosition::new(2, Fraction::new(3u64, 8u64));
//! assert_eq!(b.get_absolute_position(&time_map), a);
//! assert_eq!(a.get_relative_position(&time_map), b);
//! ```

use std::ops::{Add, AddAssign};

use fraction::Fraction;

use super::{fraction_tools::zero, time_map::TimeMap, Length};

/// Conversion between the two kinds of positions.
pub trait GenericPosition {
    fn get_absolute_position(&self, time_map: &TimeMap) -> AbsolutePosition;
    fn get_relative_position(&self, time_map: &TimeMap) -> RelativePosition;
}

/// Offset from the start of the track.
#[derive(Debug, PartialEq, Eq, PartialOrd, Clone, Copy, Hash)]
pub struct AbsolutePosition {
    position: Fraction,
}
impl AbsolutePosition {
    pub fn new(position: Fraction) -> Self {
        Self { position }
    }
    pub fn zero() -> Self {
        Self::new(zero())
    }
    pub fn get(&self) -> Fraction {
        self.position
    }
}
impl Default for AbsolutePosition {
    fn default() -> Self {
        Self::zero()
    }
}
impl GenericPosition for AbsolutePosition {
    fn get_absolute_position(&self, _time_map: &TimeMap) -> AbsolutePosition {
        *self
    }
    fn get_relative_position(&self, time_map: &TimeMap) -> RelativePosition {
        time_map.pos_relative_from_absolute(self)
    }
}
impl Add<Length> for AbsolutePosition {
    fn add(self, rhs: Length) -> Self::Output {
        Self {
            position: self.position + rhs.get(),
        }
    }

    type Output = Self;
}
impl AddAssign<Length> for AbsolutePosition {
    fn add_assign(&mut self, rhs: Length) {
        self.position = self.position + rhs.get()
    }
}
impl From<Fraction> for AbsolutePosition {
    fn from(value: Fraction) -> Self {
        Self { position: value }
    }
}
impl From<Length> for AbsolutePosition {
    fn from(value: Length) -> Self {
        Self {
            position: value.get(),
        }
    }
}

/// Measure number and offset from its barline.
#[derive(Debug, Eq, PartialEq, PartialOrd, Clone, Copy, Hash)]
pub struct RelativePosition {
    measure_index: u32,
    /// Offset from the barline.
    measure_position: Fraction,
}
impl RelativePosition {
    /// `measure_index` is 1-based.
    pub fn new(measure_index: u32, measure_position: Fraction) -> Self {
        Self {
            measure_index,
            measure_position,
        }
    }
    pub fn get_position(&self) -> Fraction {
        self.measure_position
    }
    pub fn get_measure_index(&self) -> u32 {
        self.measure_index
    }
    /// What is left of the measure: 5/8 from 3/8 of a 4/4 bar.
    pub fn get_distance_to_bar_end(&self, time_map: &TimeMap) -> Length {
        time_map
            .measure_length()
            .checked_sub(Length::from(self.measure_position))
            .unwrap_or_default()
    }
}
impl GenericPosition for RelativePosition {
    fn get_absolute_position(&self, time_map: &TimeMap) -> AbsolutePosition {
        time_map.pos_absolute_from_relative(self)
    }
    fn get_relative_position(&self, _time_map: &TimeMap) -> RelativePosition {
        *self
    }
}
