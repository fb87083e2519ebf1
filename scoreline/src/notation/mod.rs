//! Vocabulary of the text notation.
//!
//! A document consists of blocks, separated by one blank line. The first
//! block may be `Key: {name}`, every other block is a track:
//!
//! ```text
//! T0 Piano:
//! | 1 [4/4] dyn(mf) C4+E4/4 dyn(f) C4/2.~ | C4/4 R/2. | R/1 | R/1 | 5 R/1
//! ```
//!
//! Body tokens are separated by single spaces.

use std::str::FromStr;

use crate::{
    errors::TokenError,
    primitives::{
        time_signature::parse_canonical, Chord, Duration, Dynamics, EventType,
        Note, Pitch, Rest, TimeSignature,
    },
};

pub mod parser;
pub mod ties;

pub const BARLINE: &str = "|";
pub const TIE: &str = "~";
pub const CHORD_JOINER: &str = "+";
pub const REST: &str = "R";
pub const KEY_PREFIX: &str = "Key: ";
pub const BLOCK_SEPARATOR: &str = "\n\n";
pub const TOKEN_SEPARATOR: &str = " ";
const DURATION_SEPARATOR: char = '/';
const DYNAMICS_PREFIX: &str = "dyn(";
const DYNAMICS_SUFFIX: &str = ")";

/// Single token of a track body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Barline,
    /// Measure number after the barline.
    Label(u32),
    TimeSignature(TimeSignature),
    Dynamics(Dynamics),
    Event(EventType),
}
impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == BARLINE {
            return Ok(Self::Barline);
        }
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return parse_canonical(s)
                .filter(|label| *label > 0)
                .map(Self::Label)
                .ok_or_else(|| TokenError::InvalidLabel(s.to_string()));
        }
        if s.starts_with('[') {
            return Ok(Self::TimeSignature(s.parse()?));
        }
        if let Some(symbol) = s
            .strip_prefix(DYNAMICS_PREFIX)
            .and_then(|s| s.strip_suffix(DYNAMICS_SUFFIX))
        {
            return Ok(Self::Dynamics(symbol.parse()?));
        }
        Ok(Self::Event(parse_event(s)?))
    }
}

/// Parse note, chord or rest token. Annotations are not part of it.
///
/// # Example
/// ```
/// # use scoreline::notation::parse_event;
/// # use scoreline::primitives::{BaseValue, Duration, EventType};
/// let event = parse_event("C4+E4+G4/2.~").unwrap();
/// assert_eq!(event.pitches().len(), 3);
/// assert_eq!(event.duration(), Duration::dotted(BaseValue::Half, 1));
/// assert!(event.tie());
/// assert!(parse_event("C4/8t").is_err());
/// assert!(parse_event("E4+C4/4").is_err());
/// ```
pub fn parse_event(token: &str) -> Result<EventType, TokenError> {
    let (head, tail) = token
        .split_once(DURATION_SEPARATOR)
        .ok_or_else(|| TokenError::Unexpected(format!("no duration in `{token}`")))?;
    let (code, tie) = match tail.strip_suffix(TIE) {
        Some(code) => (code, true),
        None => (tail, false),
    };
    let duration: Duration = code.parse()?;
    if head == REST {
        if tie {
            return Err(TokenError::Unexpected("rest can not be tied".to_string()));
        }
        return Ok(EventType::Rest(Rest::new(duration)));
    }
    if tie && duration.is_uncertain() {
        return Err(TokenError::Unexpected(
            "uncertain duration can not be tied".to_string(),
        ));
    }
    let pitches = head
        .split(CHORD_JOINER)
        .map(Pitch::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    match (pitches.as_slice(), duration) {
        ([pitch], duration) => {
            let mut note = Note::new(*pitch, duration);
            note.set_tie(tie);
            Ok(EventType::Note(note))
        }
        (_, Duration::Uncertain) => Err(TokenError::Unexpected(
            "chord can not have uncertain duration".to_string(),
        )),
        (_, Duration::Value(value)) => {
            let mut chord = Chord::new(pitches.clone(), value);
            if chord.pitches != pitches || !chord.is_sorted() {
                return Err(TokenError::UnsortedChord(head.to_string()));
            }
            chord.set_tie(tie);
            Ok(EventType::Chord(chord))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::TokenError,
        primitives::{BaseValue, Duration, Dynamics, EventType, TimeSignature},
    };

    use super::{parse_event, Token};

    #[test]
    fn test_tokens() {
        assert_eq!("|".parse(), Ok(Token::Barline));
        assert_eq!("15".parse(), Ok(Token::Label(15)));
        assert!("015".parse::<Token>().is_err());
        assert!("0".parse::<Token>().is_err());
        assert_eq!(
            "[3/4]".parse(),
            Ok(Token::TimeSignature(TimeSignature::new(3, 4).unwrap()))
        );
        assert_eq!("dyn(pp)".parse(), Ok(Token::Dynamics(Dynamics::Pp)));
        assert_eq!(
            "dyn(sfz)".parse::<Token>(),
            Err(TokenError::UnknownDynamics("sfz".to_string()))
        );
        assert!("%comment".parse::<Token>().is_err());
        assert!("||".parse::<Token>().is_err());
    }

    #[test]
    fn test_events() {
        match parse_event("R/4.").unwrap() {
            EventType::Rest(rest) => {
                assert_eq!(rest.duration, Duration::dotted(BaseValue::Quarter, 1))
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(parse_event("Bb-1/?").unwrap().duration(), Duration::Uncertain);
        for bad in [
            "R/4~", "C4/?~", "C4/?.", "C4+E4/?", "C4+C4/4", "C#4+Db4/4",
            "C4+/4", "C4", "C4/", "C4/4~~", "C4/16t", "r/4",
        ] {
            assert!(parse_event(bad).is_err(), "{bad}");
        }
        assert_eq!(
            parse_event("C4+E4/8t"),
            Err(TokenError::UnknownDuration("8t".to_string()))
        );
    }
}
