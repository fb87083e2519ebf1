//! Document parser: text to [`Score`].
//!
//! Accepts exactly what the renderer emits, so that rendering of a parsed
//! score gives the same bytes back.

use log::{debug, info};

use crate::{
    dom::{Score, Track},
    errors::{CodecError, CodecResult, Location},
    primitives::{
        time_signature::parse_canonical, Dynamics, EventInfo, EventType,
        Measure, TimeSignature,
    },
};

use super::{ties::check_ties, Token, BLOCK_SEPARATOR, KEY_PREFIX, TOKEN_SEPARATOR};

/// Parse and validate the whole document.
///
/// # Example
/// ```
/// # use scoreline::notation::parser::parse_document;
/// let score = parse_document("Key: G major\n\nT0 Flute:\n| 1 dyn(p) G5/1").unwrap();
/// assert_eq!(score.key.as_deref(), Some("G major"));
/// assert_eq!(score.tracks[0].name, "Flute");
/// assert!(parse_document("T0 Flute:\n| 1 G5/1\n").is_err());
/// ```
pub fn parse_document(text: &str) -> CodecResult<Score> {
    if text.is_empty() {
        return Ok(Score::new(None, Vec::new()));
    }
    let mut blocks = text.split(BLOCK_SEPARATOR).peekable();
    let key = match blocks.peek() {
        Some(block) if block.starts_with(KEY_PREFIX) => {
            let key = parse_key(block)?;
            blocks.next();
            Some(key)
        }
        _ => None,
    };
    let tracks = blocks
        .enumerate()
        .map(|(position, block)| parse_track(position, block))
        .collect::<CodecResult<Vec<_>>>()?;
    info!("parsed document with {} tracks", tracks.len());
    Ok(Score::new(key, tracks))
}

fn parse_key(block: &str) -> CodecResult<String> {
    match block.strip_prefix(KEY_PREFIX) {
        Some(key) if !key.contains('\n') => Ok(key.to_string()),
        _ => Err(CodecError::malformed(
            Location::header(),
            block,
            "key block has to be single line followed by a blank line",
        )),
    }
}

/// `T{index} {name}:`
fn parse_header(position: usize, header: &str) -> CodecResult<(usize, String)> {
    let err = |reason: &str| {
        CodecError::malformed(Location::token(position, 0), header, reason)
    };
    let inner = header
        .strip_prefix('T')
        .and_then(|h| h.strip_suffix(':'))
        .ok_or_else(|| err("track header has to look like `T{index} {name}:`"))?;
    let (index, name) = inner
        .split_once(' ')
        .ok_or_else(|| err("no space between track index and name"))?;
    let index = parse_canonical(index).ok_or_else(|| err("invalid track index"))?;
    Ok((index as usize, name.to_string()))
}

/// Parse a block of track: header line and body line.
///
/// `position` is the place of the block among track blocks, it is used
/// for error locations.
pub fn parse_track(position: usize, block: &str) -> CodecResult<Track> {
    let (header, body) = block.split_once('\n').ok_or_else(|| {
        CodecError::malformed(
            Location::token(position, 0),
            block,
            "track block needs header and body lines",
        )
    })?;
    let (index, name) = parse_header(position, header)?;
    if body.contains('\n') {
        return Err(CodecError::malformed(
            Location::token(position, 0),
            body,
            "track body has to be a single line without trailing newline",
        ));
    }
    let measures = parse_body(position, body)?;
    let track = Track::new(index, name, measures);
    check_ties(&track, position)?;
    debug!("parsed track {} with {} measures", track.index, track.measures.len());
    Ok(track)
}

/// Annotations, waiting for their event.
#[derive(Debug, Default)]
struct Pending {
    time_signature: Option<TimeSignature>,
    dynamic: Option<Dynamics>,
}
impl Pending {
    fn is_empty(&self) -> bool {
        self.time_signature.is_none() && self.dynamic.is_none()
    }
}

fn parse_body(position: usize, body: &str) -> CodecResult<Vec<Measure>> {
    let mut measures: Vec<Measure> = Vec::new();
    let mut current: Option<Measure> = None;
    let mut expected_label: Option<u32> = None;
    let mut pending = Pending::default();
    let mut current_dynamic: Option<Dynamics> = None;
    let mut last_location = Location::token(position, 1);
    for (idx, raw) in body.split(TOKEN_SEPARATOR).enumerate() {
        let location = Location::token(position, idx + 1);
        last_location = location;
        let err = |reason: String| CodecError::malformed(location, raw, reason);
        if raw.is_empty() {
            return Err(err("empty token, tokens are separated by single space".into()));
        }
        let token: Token = raw.parse().map_err(|e| CodecError::malformed(location, raw, e))?;
        if let Some(label) = expected_label.take() {
            match token {
                Token::Label(found) if found == label => continue,
                _ => return Err(err(format!("measure {label} has to be labeled"))),
            }
        }
        let token = match token {
            Token::Barline => {
                if !pending.is_empty() {
                    return Err(err("annotation is not followed by event".into()));
                }
                if let Some(measure) = current.take() {
                    if measure.events().is_empty() {
                        return Err(err(format!("measure {} is empty", measure.index())));
                    }
                    measures.push(measure);
                }
                let index = measures.len() as u32 + 1;
                expected_label = Measure::label_of(index);
                current = Some(Measure::new(index, Vec::new()));
                continue;
            }
            Token::Label(_) => return Err(err("unexpected measure label".into())),
            token => token,
        };
        let measure = match current.as_mut() {
            Some(measure) => measure,
            None => return Err(err("track body has to start with barline".into())),
        };
        match token {
            Token::TimeSignature(time_signature) => {
                if !pending.is_empty() {
                    return Err(err(
                        "time signature has to precede dynamics and be single".into(),
                    ));
                }
                pending.time_signature = Some(time_signature);
            }
            Token::Dynamics(dynamic) => {
                if pending.dynamic.is_some() {
                    return Err(err("dynamics is repeated".into()));
                }
                if current_dynamic == Some(dynamic) {
                    return Err(err(format!("dynamics {dynamic} is already in force")));
                }
                pending.dynamic = Some(dynamic);
            }
            Token::Event(mut event) => {
                if let Some(dynamic) = pending.dynamic.take() {
                    match &mut event {
                        EventType::Rest(_) => {
                            return Err(err("rest can not carry dynamics".into()))
                        }
                        EventType::Note(note) => {
                            note.set_dynamic(Some(dynamic));
                        }
                        EventType::Chord(chord) => {
                            chord.set_dynamic(Some(dynamic));
                        }
                    }
                    current_dynamic = Some(dynamic);
                }
                let mut info = EventInfo::new(event);
                info.time_signature = pending.time_signature.take();
                measure.push(info);
            }
            Token::Barline | Token::Label(_) => (),
        }
    }
    let end_err = |reason: String| CodecError::malformed(last_location, body, reason);
    if let Some(label) = expected_label {
        return Err(end_err(format!("measure {label} has to be labeled")));
    }
    if !pending.is_empty() {
        return Err(end_err("annotation is not followed by event".into()));
    }
    match current {
        Some(measure) if !measure.events().is_empty() => measures.push(measure),
        Some(measure) => {
            return Err(end_err(format!("measure {} is empty", measure.index())))
        }
        None => return Err(end_err("track body is empty".into())),
    }
    Ok(measures)
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::{CodecError, Location},
        primitives::{Dynamics, EventType, TimeSignature},
    };

    use super::{parse_document, parse_track};

    fn malformed_at(text: &str) -> (Location, String) {
        match parse_document(text) {
            Err(CodecError::MalformedToken {
                location, token, ..
            }) => (location, token),
            other => panic!("expected malformed token for `{text}`, got {other:?}"),
        }
    }

    #[test]
    fn test_track() {
        let track =
            parse_track(0, "T3 Lead Synth:\n| 1 [3/4] dyn(mf) C4+E4/4 R/2 | C4/2.")
                .unwrap();
        assert_eq!(track.index, 3);
        assert_eq!(track.name, "Lead Synth");
        assert_eq!(track.measures.len(), 2);
        let first = &track.measures[0].events()[0];
        assert_eq!(first.time_signature, Some(TimeSignature::new(3, 4).unwrap()));
        assert_eq!(first.event.dynamic(), Some(Dynamics::Mf));
        assert!(matches!(first.event, EventType::Chord(_)));
    }

    #[test]
    fn test_empty_document() {
        let score = parse_document("").unwrap();
        assert_eq!(score.key, None);
        assert!(score.tracks.is_empty());
        assert_eq!(parse_document("Key: ").unwrap().key.as_deref(), Some(""));
    }

    #[test]
    fn test_structure_errors() {
        let cases = [
            ("T0 A:\n| 1 C4/1 ", Location::token(0, 4), ""),
            ("T0 A:\n| 1  C4/1", Location::token(0, 3), ""),
            ("T0 A:\n| C4/1", Location::token(0, 2), "C4/1"),
            ("T0 A:\n| 1 C4/1 | 2 C4/1", Location::token(0, 5), "2"),
            ("T0 A:\n| 1 C4/1 | | C4/1", Location::token(0, 5), "|"),
            ("T0 A:\nC4/1", Location::token(0, 1), "C4/1"),
            ("T0 A:\n| 1 dyn(p) | C4/1", Location::token(0, 4), "|"),
            ("T0 A:\n| 1 dyn(p) [3/4] C4/1", Location::token(0, 4), "[3/4]"),
            ("T0 A:\n| 1 dyn(p) R/1", Location::token(0, 4), "R/1"),
            ("T0 A:\n| 1 dyn(p) C4/2 dyn(p) C4/2", Location::token(0, 5), "dyn(p)"),
            ("T0 A:\n| 1 C4/4 % comment", Location::token(0, 4), "%"),
            ("T0 A:\n| 1 C4/8t", Location::token(0, 3), "C4/8t"),
            ("T1 B:\n| 1 G4+C4/4", Location::token(0, 3), "G4+C4"),
            ("Key: C\n\nT0 A:\n| 1 C4/1\n\nT1 B:\n| 1 C4/?~", Location::token(1, 3), "C4/?~"),
        ];
        for (text, location, token) in cases {
            let (found_location, found_token) = malformed_at(text);
            assert_eq!(found_location, location, "{text}");
            if !token.is_empty() {
                assert!(found_token.starts_with(token), "{text}: {found_token}");
            }
        }
    }

    #[test]
    fn test_document_layout_errors() {
        for text in [
            "T0 A:\n| 1 C4/1\n",
            "T0 A:\n| 1 C4/1\n\n",
            "T0 A:\n| 1 C4/1\n\n\nT1 B:\n| 1 C4/1",
            "T0 A:\n| 1 C4/1\nT1 B:\n| 1 C4/1",
            "Key: C\nT0 A:\n| 1 C4/1",
            "T0 A\n| 1 C4/1",
            "T00 A:\n| 1 C4/1",
            "TA:\n| 1 C4/1",
            "T0 A:",
            "T0 A:\n",
        ] {
            assert!(parse_document(text).is_err(), "{text:?}");
        }
    }
}
