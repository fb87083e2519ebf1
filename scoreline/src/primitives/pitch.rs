use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::TokenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl NoteName {
    /// Semitones from C.
    pub fn semitones(&self) -> i32 {
        match self {
            Self::C => 0,
            Self::D => 2,
            Self::E => 4,
            Self::F => 5,
            Self::G => 7,
            Self::A => 9,
            Self::B => 11,
        }
    }
    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }
}
impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,
    Flat,
}
impl Accidental {
    pub fn semitones(&self) -> i32 {
        match self {
            Self::Natural => 0,
            Self::Sharp => 1,
            Self::Flat => -1,
        }
    }
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Natural => "",
            Self::Sharp => "#",
            Self::Flat => "b",
        }
    }
}

/// Spelled pitch, middle C is `C4`.
///
/// Equality is by spelling: `C#4` and `Db4` are different pitches of the
/// same [`Pitch::height`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub note: NoteName,
    pub accidental: Accidental,
    pub octave: i32,
}
impl Pitch {
    pub fn new(note: NoteName, accidental: Accidental, octave: i32) -> Self {
        Self {
            note,
            accidental,
            octave,
        }
    }

    /// Spells MIDI note with sharps.
    ///
    /// # Example
    /// ```
    /// # use scoreline::primitives::Pitch;
    /// assert_eq!(Pitch::from_midi(60).to_string(), "C4");
    /// assert_eq!(Pitch::from_midi(61).to_string(), "C#4");
    /// assert_eq!(Pitch::from_midi(0).to_string(), "C-1");
    /// ```
    pub fn from_midi(midi: u8) -> Self {
        use Accidental::*;
        use NoteName::*;
        let (note, accidental) = match midi % 12 {
            0 => (C, Natural),
            1 => (C, Sharp),
            2 => (D, Natural),
            3 => (D, Sharp),
            4 => (E, Natural),
            5 => (F, Natural),
            6 => (F, Sharp),
            7 => (G, Natural),
            8 => (G, Sharp),
            9 => (A, Natural),
            10 => (A, Sharp),
            _ => (B, Natural),
        };
        Self::new(note, accidental, midi as i32 / 12 - 1)
    }

    /// Semitone value, equals to MIDI note number inside MIDI range.
    pub fn height(&self) -> i32 {
        (self.octave + 1) * 12 + self.note.semitones() + self.accidental.semitones()
    }
}
impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.note, self.accidental.symbol(), self.octave)
    }
}
impl FromStr for Pitch {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TokenError::UnknownPitch(s.to_string());
        let mut chars = s.chars();
        let note = chars.next().and_then(NoteName::from_char).ok_or_else(err)?;
        let rest = chars.as_str();
        let (accidental, octave) = match rest.chars().next() {
            Some('#') => (Accidental::Sharp, &rest[1..]),
            Some('b') => (Accidental::Flat, &rest[1..]),
            _ => (Accidental::Natural, rest),
        };
        Ok(Self::new(note, accidental, parse_octave(octave).ok_or_else(err)?))
    }
}

/// Signed decimal without plus sign, padding, leading zeros or `-0`.
fn parse_octave(s: &str) -> Option<i32> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
        || (digits == "0" && s.starts_with('-'))
    {
        return None;
    }
    s.parse().ok()
}
