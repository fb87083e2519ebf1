use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

use super::Length;

/// Meter of a measure, like 3/4 or 7/8.
///
/// Numerator is at least one, denominator is a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct TimeSignature {
    numerator: u32,
    denominator: u32,
}
impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, TokenError> {
        if numerator == 0 || !denominator.is_power_of_two() {
            return Err(TokenError::InvalidTimeSignature(format!(
                "{numerator}/{denominator}"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
    pub fn numerator(&self) -> u32 {
        self.numerator
    }
    pub fn denominator(&self) -> u32 {
        self.denominator
    }
    /// Nominal length of a measure in whole notes.
    pub fn length(&self) -> Length {
        Length::from(self)
    }
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}
impl TryFrom<(u32, u32)> for TimeSignature {
    type Error = TokenError;
    fn try_from((numerator, denominator): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(numerator, denominator)
    }
}
impl From<TimeSignature> for (u32, u32) {
    fn from(ts: TimeSignature) -> Self {
        (ts.numerator, ts.denominator)
    }
}
impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
/// Parses the bracketed token form: `[3/4]`.
impl FromStr for TimeSignature {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TokenError::InvalidTimeSignature(s.to_string());
        let inner = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(err)?;
        let (num, den) = inner.split_once('/').ok_or_else(err)?;
        Self::new(
            parse_canonical(num).ok_or_else(err)?,
            parse_canonical(den).ok_or_else(err)?,
        )
        .map_err(|_| err())
    }
}

/// Parse unsigned decimal without sign, padding or leading zeros.
pub(crate) fn parse_canonical(s: &str) -> Option<u32> {
    if s.is_empty()
        || !s.bytes().all(|b| b.is_ascii_digit())
        || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}
