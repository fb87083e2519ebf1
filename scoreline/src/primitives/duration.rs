//! The closed set of representable durations and the quantization rules.
//!
//! Durations are written as base codes (`1` whole, `2` half, ... `64`,
//! `0.5` double-whole), optionally dotted, or as the uncertain `?`.

use std::{fmt, str::FromStr};

use fraction::Fraction;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

use super::{
    fraction_tools::{distance, from_ratio},
    normalize_fraction, Length,
};

/// Undotted note value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BaseValue {
    DoubleWhole,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}
impl BaseValue {
    /// From the longest to the shortest.
    pub const ALL: [BaseValue; 8] = [
        Self::DoubleWhole,
        Self::Whole,
        Self::Half,
        Self::Quarter,
        Self::Eighth,
        Self::Sixteenth,
        Self::ThirtySecond,
        Self::SixtyFourth,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::DoubleWhole => "0.5",
            Self::Whole => "1",
            Self::Half => "2",
            Self::Quarter => "4",
            Self::Eighth => "8",
            Self::Sixteenth => "16",
            Self::ThirtySecond => "32",
            Self::SixtyFourth => "64",
        }
    }

    /// Length in whole notes.
    pub fn length(&self) -> Length {
        match self {
            Self::DoubleWhole => Length::from(Fraction::new(2_u64, 1_u64)),
            x => Length::from(Fraction::new(1_u64, x.divisions())),
        }
    }

    /// How many values of this kind fit into a whole note, at least one.
    fn divisions(&self) -> u64 {
        match self {
            Self::DoubleWhole | Self::Whole => 1,
            Self::Half => 2,
            Self::Quarter => 4,
            Self::Eighth => 8,
            Self::Sixteenth => 16,
            Self::ThirtySecond => 32,
            Self::SixtyFourth => 64,
        }
    }
}
impl FromStr for BaseValue {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|base| base.code() == s)
            .ok_or_else(|| TokenError::UnknownDuration(s.to_string()))
    }
}

/// Base value with dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteValue {
    pub base: BaseValue,
    pub dots: u8,
}
impl NoteValue {
    pub fn new(base: BaseValue, dots: u8) -> Self {
        Self { base, dots }
    }
    pub fn plain(base: BaseValue) -> Self {
        Self::new(base, 0)
    }
    /// `base * (2 - 1/2^dots)`
    ///
    /// # Example
    /// ```
    /// # use fraction::Fraction;
    /// # use scoreline::primitives::{BaseValue, Length, NoteValue};
    /// assert_eq!(
    ///     NoteValue::new(BaseValue::Quarter, 2).length(),
    ///     Length::from(Fraction::new(7u64, 16u64))
    /// );
    /// ```
    pub fn length(&self) -> Length {
        let power = 2_u64.pow(self.dots as u32);
        Length::from(
            self.base.length().get() * Fraction::new(power * 2 - 1, power),
        )
    }
}
impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.code())?;
        for _ in 0..self.dots {
            write!(f, ".")?;
        }
        Ok(())
    }
}

/// Quantized duration of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    Value(NoteValue),
    /// Could not be mapped to the grid within tolerance.
    Uncertain,
}
impl Duration {
    pub fn plain(base: BaseValue) -> Self {
        Self::Value(NoteValue::plain(base))
    }
    pub fn dotted(base: BaseValue, dots: u8) -> Self {
        Self::Value(NoteValue::new(base, dots))
    }
    pub fn is_uncertain(&self) -> bool {
        matches!(self, Self::Uncertain)
    }
    pub fn length(&self) -> Option<Length> {
        match self {
            Self::Value(value) => Some(value.length()),
            Self::Uncertain => None,
        }
    }
}
impl From<NoteValue> for Duration {
    fn from(value: NoteValue) -> Self {
        Self::Value(value)
    }
}
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Uncertain => write!(f, "?"),
        }
    }
}
/// Parses the code with dots, without slash and tie: `4..`, `0.5`, `?`.
impl FromStr for Duration {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "?" {
            return Ok(Self::Uncertain);
        }
        let code = s.trim_end_matches('.');
        // `0.5` ends with a digit, so trailing dots are always dots.
        let dots = s.len() - code.len();
        let dots = u8::try_from(dots)
            .map_err(|_| TokenError::UnknownDuration(s.to_string()))?;
        let base = code
            .parse::<BaseValue>()
            .map_err(|_| TokenError::UnknownDuration(s.to_string()))?;
        Ok(Self::dotted(base, dots))
    }
}

/// Candidate values of quantization and the tolerance of matching.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationGrid {
    /// from the longest to the shortest
    candidates: Vec<(NoteValue, Fraction)>,
    finest: NoteValue,
    tolerance: Length,
}
impl DurationGrid {
    pub const MAX_DOTS: u8 = 2;

    /// Grid down to `finest`, tolerance is `tolerance_ratio` of its length.
    pub fn new(finest: BaseValue, tolerance_ratio: f64) -> Self {
        let tolerance = Length::from(
            finest.length().get() * from_ratio(tolerance_ratio),
        );
        Self::with_tolerance(finest, tolerance)
    }

    pub fn with_tolerance(finest: BaseValue, tolerance: Length) -> Self {
        let finest_length = finest.length();
        let mut candidates: Vec<(NoteValue, Fraction)> = BaseValue::ALL
            .into_iter()
            .filter(|base| *base <= finest)
            .flat_map(|base| {
                (0..=Self::MAX_DOTS).map(move |dots| NoteValue::new(base, dots))
            })
            // the last dot can not be finer than the grid
            .filter(|value| {
                let smallest = value.base.length().get()
                    / Fraction::new(2_u64.pow(value.dots as u32), 1_u64);
                smallest >= finest_length.get()
            })
            .map(|value| (value, value.length().get()))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            candidates,
            finest: NoteValue::plain(finest),
            tolerance,
        }
    }

    pub fn finest(&self) -> NoteValue {
        self.finest
    }
    pub fn tolerance(&self) -> Length {
        self.tolerance
    }

    /// Closest candidate within tolerance.
    pub fn nearest(&self, length: Length) -> Option<NoteValue> {
        let length = length.get();
        let tolerance = self.tolerance.get();
        let mut best: Option<(NoteValue, Fraction)> = None;
        for (value, candidate) in self.candidates.iter() {
            let diff = distance(*candidate, length);
            if diff > tolerance {
                continue;
            }
            match best {
                Some((_, best_diff)) if best_diff <= diff => (),
                _ => best = Some((*value, diff)),
            }
        }
        best.map(|(value, _)| value)
    }

    /// Quantize length to a chain of durations, that should be tied
    /// together.
    ///
    /// - single value, if any candidate is close enough;
    /// - several values, if the length is covered by consecutive values;
    /// - `Duration::Uncertain` otherwise.
    ///
    /// Lengths shorter than the finest value become the finest value.
    pub fn quantize_length(&self, length: Length) -> Vec<Duration> {
        if length < self.finest.length() {
            return vec![Duration::Value(self.finest)];
        }
        if let Some(value) = self.nearest(length) {
            return vec![Duration::Value(value)];
        }
        match normalize_fraction(
            length.get(),
            &self.candidates,
            self.tolerance.get(),
        ) {
            Some(chain) if !chain.is_empty() => {
                chain.into_iter().map(Duration::Value).collect()
            }
            Some(_) => vec![Duration::Value(self.finest)],
            None => {
                debug!("length {} does not fit the grid", length.get());
                vec![Duration::Uncertain]
            }
        }
    }

    /// Quantize the tick interval.
    ///
    /// # Returns
    /// the (first) duration and whether a tied continuation is needed to
    /// cover the rest of the interval.
    ///
    /// # Example
    /// ```
    /// # use scoreline::primitives::{BaseValue, Duration, DurationGrid};
    /// let grid = DurationGrid::new(BaseValue::SixtyFourth, 0.1);
    /// assert_eq!(
    ///     grid.quantize(0, 960, 480),
    ///     (Duration::plain(BaseValue::Half), false)
    /// );
    /// assert_eq!(
    ///     grid.quantize(1920, 2700, 480),
    ///     (Duration::dotted(BaseValue::Quarter, 1), true)
    /// );
    /// assert_eq!(grid.quantize(0, 1000, 480), (Duration::Uncertain, false));
    /// ```
    pub fn quantize(
        &self,
        start_tick: u64,
        end_tick: u64,
        ticks_per_quarter: u64,
    ) -> (Duration, bool) {
        let length = Length::from_ticks(
            end_tick.saturating_sub(start_tick),
            ticks_per_quarter,
        );
        let chain = self.quantize_length(length);
        match chain.first() {
            Some(first) => (*first, chain.len() > 1),
            None => (Duration::Uncertain, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use super::{BaseValue, Duration, DurationGrid, NoteValue};
    use crate::primitives::Length;

    fn grid() -> DurationGrid {
        DurationGrid::new(BaseValue::SixtyFourth, 0.1)
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!("4".parse(), Ok(Duration::plain(BaseValue::Quarter)));
        assert_eq!("0.5.".parse(), Ok(Duration::dotted(BaseValue::DoubleWhole, 1)));
        assert_eq!("16..".parse(), Ok(Duration::dotted(BaseValue::Sixteenth, 2)));
        assert_eq!("?".parse(), Ok(Duration::Uncertain));
        for bad in ["8t", "3", "", ".", "?.", "04", "0.25", "128"] {
            assert!(bad.parse::<Duration>().is_err(), "{bad}");
        }
        assert_eq!(Duration::dotted(BaseValue::Half, 1).to_string(), "2.");
        assert_eq!(Duration::plain(BaseValue::DoubleWhole).to_string(), "0.5");
    }

    #[test]
    fn test_lengths() {
        assert_eq!(
            BaseValue::DoubleWhole.length(),
            Length::from(Fraction::new(2u64, 1u64))
        );
        assert_eq!(
            NoteValue::new(BaseValue::Half, 1).length(),
            Length::from(Fraction::new(3u64, 4u64))
        );
        assert_eq!(Duration::Uncertain.length(), None);
    }

    #[test]
    fn test_candidates_respect_finest() {
        let grid = DurationGrid::new(BaseValue::Sixteenth, 0.1);
        // 8.. needs a 32nd
        assert_eq!(
            grid.quantize_length(Length::from(Fraction::new(7u64, 32u64))),
            vec![Duration::Uncertain]
        );
        assert_eq!(
            grid.quantize_length(Length::from(Fraction::new(3u64, 16u64))),
            vec![Duration::dotted(BaseValue::Eighth, 1)]
        );
        assert_eq!(grid.finest(), NoteValue::plain(BaseValue::Sixteenth));
        assert_eq!(
            grid.tolerance(),
            Length::from(Fraction::new(1u64, 160u64))
        );
    }

    #[test]
    fn test_quantize() {
        let grid = grid();
        // exact and nearly exact values
        assert_eq!(
            grid.quantize(0, 480, 480),
            (Duration::plain(BaseValue::Quarter), false)
        );
        assert_eq!(
            grid.quantize(0, 482, 480),
            (Duration::plain(BaseValue::Quarter), false)
        );
        assert_eq!(
            grid.quantize(0, 720, 480),
            (Duration::dotted(BaseValue::Quarter, 1), false)
        );
        assert_eq!(
            grid.quantize(0, 3840, 480),
            (Duration::plain(BaseValue::DoubleWhole), false)
        );
        // shorter than 1/64 becomes 1/64
        assert_eq!(
            grid.quantize(0, 10, 480),
            (Duration::plain(BaseValue::SixtyFourth), false)
        );
        // 1.625 quarters: dotted quarter tied to 32nd
        assert_eq!(
            grid.quantize_length(Length::from_ticks(780, 480)),
            vec![
                Duration::dotted(BaseValue::Quarter, 1),
                Duration::plain(BaseValue::ThirtySecond)
            ]
        );
        // 1000 ticks is neither 960 nor a chain
        assert_eq!(grid.quantize(0, 1000, 480), (Duration::Uncertain, false));
    }

    #[test]
    fn test_sixteenth_tolerance() {
        // tolerance of 10% of a sixteenth is 12 ticks at 480
        let grid = DurationGrid::new(BaseValue::Sixteenth, 0.1);
        assert_eq!(
            grid.quantize(0, 970, 480),
            (Duration::plain(BaseValue::Half), false)
        );
        assert_eq!(grid.quantize(0, 1000, 480), (Duration::Uncertain, false));
    }
}
