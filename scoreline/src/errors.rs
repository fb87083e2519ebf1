//! Fatal errors and recoverable warnings of the codec.

use std::fmt;

use thiserror::Error;

use crate::primitives::TimeSignature;

/// Why a single token does not belong to the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown pitch `{0}`")]
    UnknownPitch(String),
    #[error("unknown duration `{0}`")]
    UnknownDuration(String),
    #[error("unknown dynamics `{0}`")]
    UnknownDynamics(String),
    #[error("invalid time signature `{0}`")]
    InvalidTimeSignature(String),
    #[error("invalid measure label `{0}`")]
    InvalidLabel(String),
    #[error("chord pitches must be strictly ascending: `{0}`")]
    UnsortedChord(String),
    #[error("{0}")]
    Unexpected(String),
}

/// Where in a document something went wrong.
///
/// `track` is the 0-based position of the track block in the document,
/// not the `T` index of its header. `token` is the 0-based position inside
/// the block, where token 0 is the track header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub track: Option<usize>,
    pub token: usize,
}
impl Location {
    pub fn header() -> Self {
        Self {
            track: None,
            token: 0,
        }
    }
    pub fn token(track: usize, token: usize) -> Self {
        Self {
            track: Some(track),
            token,
        }
    }
}
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.track {
            Some(track) => write!(f, "track {track}, token {}", self.token),
            None => write!(f, "document header"),
        }
    }
}

/// Unrecoverable conditions. They abort the current encode or parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("malformed token `{token}` at {location}: {reason}")]
    MalformedToken {
        location: Location,
        token: String,
        reason: String,
    },
    /// `track` is the `T` index of the track.
    #[error("invalid chord in track {track}, measure {measure}: {reason}")]
    InvalidChord {
        track: usize,
        measure: u32,
        reason: String,
    },
    /// `track` is the `T` index of the track.
    #[error("invalid track {track}: {reason}")]
    InvalidTrack { track: usize, reason: String },
    #[error("tie of `{token}` at {location} is never continued")]
    UnterminatedTie { location: Location, token: String },
}
impl CodecError {
    pub(crate) fn malformed(
        location: Location,
        token: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::MalformedToken {
            location,
            token: token.into(),
            reason: reason.to_string(),
        }
    }
}
pub type CodecResult<T> = Result<T, CodecError>;

/// Recoverable conditions. They are reflected in the output and reported
/// next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Quantization found no grid value within tolerance, `/?` was emitted.
    AmbiguousDuration { track: usize, measure: u32, tick: u64 },
    /// Several time signatures at one tick, only the last is kept.
    ConflictingTimeSignatureAtSameTick {
        track: usize,
        tick: u64,
        kept: TimeSignature,
        dropped: TimeSignature,
    },
}
impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousDuration {
                track,
                measure,
                tick,
            } => write!(
                f,
                "track {track}, measure {measure}: ambiguous duration at tick {tick}"
            ),
            Self::ConflictingTimeSignatureAtSameTick {
                track,
                tick,
                kept,
                dropped,
            } => write!(
                f,
                "track {track}: time signature {dropped} at tick {tick} \
                is overridden by {kept}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CodecError, Location, TokenError};

    #[test]
    fn test_messages() {
        let err = CodecError::malformed(
            Location::token(1, 4),
            "C4/8t",
            TokenError::UnknownDuration("8t".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "malformed token `C4/8t` at track 1, token 4: unknown duration `8t`"
        );
        assert_eq!(Location::header().to_string(), "document header");
    }
}
