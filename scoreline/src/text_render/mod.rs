use serde::{Deserialize, Serialize};

use crate::{
    dom::{Score, Track},
    errors::{CodecError, CodecResult, Location},
    notation::{
        BARLINE, BLOCK_SEPARATOR, CHORD_JOINER, KEY_PREFIX, REST, TIE,
        TOKEN_SEPARATOR,
    },
    primitives::{
        BaseValue, Chord, Duration, DurationGrid, Dynamics, EventInfo,
        EventType, Note, Rest, TimeSignature,
    },
};

/// Parameters of encoding. Every field can be omitted in serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Tolerance as a ratio of the finest value.
    pub tolerance_ratio: f64,
    pub finest_value: BaseValue,
    /// Meter of the bars when nothing is given at tick 0.
    pub default_time_signature: TimeSignature,
    /// Used when the input reports zero resolution.
    pub default_ticks_per_quarter: u64,
    /// Silence shorter than this is not rendered as rest.
    pub min_rest_ticks: u64,
}
impl RenderSettings {
    pub fn grid(&self) -> DurationGrid {
        DurationGrid::new(self.finest_value, self.tolerance_ratio)
    }
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tolerance_ratio: 0.1,
            finest_value: BaseValue::SixtyFourth,
            default_time_signature: TimeSignature::default(),
            default_ticks_per_quarter: 480,
            min_rest_ticks: 5,
        }
    }
}

pub trait RendersToText {
    fn render_text(&self) -> String;
}

impl RendersToText for TimeSignature {
    fn render_text(&self) -> String {
        format!("[{}/{}]", self.numerator(), self.denominator())
    }
}

impl RendersToText for Dynamics {
    fn render_text(&self) -> String {
        format!("dyn({})", self.symbol())
    }
}

fn tie_suffix(tie: bool) -> &'static str {
    match tie {
        true => TIE,
        false => "",
    }
}

impl RendersToText for Note {
    fn render_text(&self) -> String {
        format!("{}/{}{}", self.pitch, self.duration, tie_suffix(self.tie))
    }
}

impl RendersToText for Chord {
    fn render_text(&self) -> String {
        let pitches = self
            .pitches
            .iter()
            .map(|pitch| pitch.to_string())
            .collect::<Vec<_>>()
            .join(CHORD_JOINER);
        format!("{pitches}/{}{}", self.value, tie_suffix(self.tie))
    }
}

impl RendersToText for Rest {
    fn render_text(&self) -> String {
        format!("{REST}/{}", self.duration)
    }
}

impl RendersToText for EventType {
    fn render_text(&self) -> String {
        match self {
            Self::Rest(rest) => rest.render_text(),
            Self::Note(note) => note.render_text(),
            Self::Chord(chord) => match chord.pitches.as_slice() {
                [pitch] => {
                    let mut note =
                        Note::new(*pitch, Duration::Value(chord.value));
                    note.set_tie(chord.tie);
                    note.render_text()
                }
                _ => chord.render_text(),
            },
        }
    }
}

/// Annotations and the event, separated by spaces.
impl RendersToText for EventInfo {
    fn render_text(&self) -> String {
        let mut tokens = Vec::with_capacity(3);
        if let Some(time_signature) = &self.time_signature {
            tokens.push(time_signature.render_text());
        }
        if let Some(dynamic) = self.event.dynamic() {
            tokens.push(dynamic.render_text());
        }
        tokens.push(self.event.render_text());
        tokens.join(TOKEN_SEPARATOR)
    }
}

/// Check the track against the contracts of the grammar.
///
/// Measures have to be numbered from one without gaps, and no measure
/// can be empty. Chords are strictly ascending, uncertain notes are not
/// tied, dynamics are not repeated.
pub fn validate_track(track: &Track) -> CodecResult<()> {
    let invalid_track = |reason: String| CodecError::InvalidTrack {
        track: track.index,
        reason,
    };
    if track.name.contains('\n') {
        return Err(invalid_track("name has to be single line".to_string()));
    }
    if track.measures.is_empty() {
        return Err(invalid_track("track has no measures".to_string()));
    }
    let mut current_dynamic = None;
    for (position, measure) in track.measures.iter().enumerate() {
        if measure.index() as usize != position + 1 {
            return Err(invalid_track(format!(
                "measure {} is at position {}",
                measure.index(),
                position + 1
            )));
        }
        if measure.events().is_empty() {
            return Err(invalid_track(format!(
                "measure {} is empty",
                measure.index()
            )));
        }
        for event in measure.events() {
            match &event.event {
                EventType::Note(note) if note.tie && note.duration.is_uncertain() => {
                    return Err(invalid_track(format!(
                        "uncertain note {} in measure {} is tied",
                        note.pitch,
                        measure.index()
                    )));
                }
                EventType::Chord(chord) if chord.pitches.is_empty() => {
                    return Err(CodecError::InvalidChord {
                        track: track.index,
                        measure: measure.index(),
                        reason: "chord has no pitches".to_string(),
                    });
                }
                EventType::Chord(chord) if !chord.is_sorted() => {
                    return Err(CodecError::InvalidChord {
                        track: track.index,
                        measure: measure.index(),
                        reason: format!(
                            "pitches of `{}` are duplicated or not ascending",
                            chord.render_text()
                        ),
                    });
                }
                _ => (),
            }
            if let Some(dynamic) = event.event.dynamic() {
                if current_dynamic == Some(dynamic) {
                    return Err(invalid_track(format!(
                        "dynamics {dynamic} is repeated in measure {}",
                        measure.index()
                    )));
                }
                current_dynamic = Some(dynamic);
            }
        }
    }
    Ok(())
}

/// Render track block: header line and body line.
///
/// # Example
/// ```
/// # use scoreline::dom::Track;
/// # use scoreline::primitives::Measure;
/// # use scoreline::text_render::render_track;
/// let track = Track::new(0, "Piano", vec![Measure::full_rest(1)]);
/// assert_eq!(render_track(&track).unwrap(), "T0 Piano:\n| 1 R/1");
/// ```
pub fn render_track(track: &Track) -> CodecResult<String> {
    validate_track(track)?;
    let body = track
        .measures
        .iter()
        .map(|measure| {
            let mut tokens = vec![BARLINE.to_string()];
            if let Some(label) = measure.label() {
                tokens.push(label.to_string());
            }
            tokens.extend(measure.events().iter().map(|ev| ev.render_text()));
            tokens.join(TOKEN_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join(TOKEN_SEPARATOR);
    Ok(format!("T{} {}:\n{body}", track.index, track.name))
}

/// Render the whole document: optional key block and track blocks.
pub fn render_score(score: &Score) -> CodecResult<String> {
    let mut blocks = Vec::with_capacity(score.tracks.len() + 1);
    if let Some(key) = &score.key {
        if key.contains('\n') {
            return Err(CodecError::malformed(
                Location::header(),
                key.clone(),
                "key name has to be single line",
            ));
        }
        blocks.push(format!("{KEY_PREFIX}{key}"));
    }
    for track in score.tracks.iter() {
        blocks.push(render_track(track)?);
    }
    Ok(blocks.join(BLOCK_SEPARATOR))
}
