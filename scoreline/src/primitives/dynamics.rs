//! Eight dynamic levels and their segmentation over a track.

use std::{fmt, str::FromStr};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Dynamics {
    Ppp,
    Pp,
    P,
    Mp,
    Mf,
    F,
    Ff,
    Fff,
}
impl Dynamics {
    /// From the softest to the loudest.
    pub const ALL: [Dynamics; 8] = [
        Self::Ppp,
        Self::Pp,
        Self::P,
        Self::Mp,
        Self::Mf,
        Self::F,
        Self::Ff,
        Self::Fff,
    ];
    /// Velocity range covered by every level.
    pub const BIN_WIDTH: u8 = 16;

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Ppp => "ppp",
            Self::Pp => "pp",
            Self::P => "p",
            Self::Mp => "mp",
            Self::Mf => "mf",
            Self::F => "f",
            Self::Ff => "ff",
            Self::Fff => "fff",
        }
    }

    /// MIDI velocity to level: `[0,16)` is ppp, ..., `[112,127]` is fff.
    ///
    /// # Example
    /// ```
    /// # use scoreline::primitives::Dynamics;
    /// assert_eq!(Dynamics::from_velocity(0), Dynamics::Ppp);
    /// assert_eq!(Dynamics::from_velocity(70), Dynamics::Mf);
    /// assert_eq!(Dynamics::from_velocity(127), Dynamics::Fff);
    /// ```
    pub fn from_velocity(velocity: u8) -> Self {
        if velocity > 127 {
            warn!("velocity {velocity} is out of MIDI range, using mf");
            return Self::Mf;
        }
        Self::ALL[(velocity / Self::BIN_WIDTH) as usize]
    }
}
impl fmt::Display for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
impl FromStr for Dynamics {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dynamics| dynamics.symbol() == s)
            .ok_or_else(|| TokenError::UnknownDynamics(s.to_string()))
    }
}

/// One step of the dynamics fold.
///
/// # Returns
/// (level in force after the event, marker to attach to the event)
pub fn next_marker(
    current: Option<Dynamics>,
    level: Dynamics,
) -> (Option<Dynamics>, Option<Dynamics>) {
    match current == Some(level) {
        true => (current, None),
        false => (Some(level), Some(level)),
    }
}

/// Markers for consecutive sounding events of one track, given their
/// velocities. The first event is always marked, later only on change.
pub fn segment(velocities: impl IntoIterator<Item = u8>) -> Vec<Option<Dynamics>> {
    velocities
        .into_iter()
        .scan(None, |current, velocity| {
            let (level, marker) =
                next_marker(*current, Dynamics::from_velocity(velocity));
            *current = level;
            Some(marker)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{segment, Dynamics};

    #[test]
    fn test_bins() {
        let expected = [
            (15, Dynamics::Ppp),
            (16, Dynamics::Pp),
            (47, Dynamics::P),
            (48, Dynamics::Mp),
            (79, Dynamics::Mf),
            (80, Dynamics::F),
            (95, Dynamics::F),
            (96, Dynamics::Ff),
            (111, Dynamics::Ff),
            (112, Dynamics::Fff),
            (200, Dynamics::Mf),
        ];
        for (velocity, dynamics) in expected {
            assert_eq!(Dynamics::from_velocity(velocity), dynamics, "{velocity}");
        }
    }

    #[test]
    fn test_symbols() {
        for dynamics in Dynamics::ALL {
            assert_eq!(dynamics.symbol().parse(), Ok(dynamics));
        }
        assert!("sfz".parse::<Dynamics>().is_err());
        assert!("MF".parse::<Dynamics>().is_err());
    }

    #[test]
    fn test_segment() {
        assert_eq!(
            segment([70, 72, 95, 90, 70]),
            vec![Some(Dynamics::Mf), None, Some(Dynamics::F), None, Some(Dynamics::Mf)]
        );
        assert_eq!(segment([]), vec![]);
    }
}
