//! Document object model: score of tracks of measures.

use crate::{
    errors::CodecResult,
    notation::ties::{logical_notes, LogicalNote},
    primitives::Measure,
    text_render::{render_score, render_track, RenderSettings},
};

pub mod midi_parse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// 0-based.
    pub index: usize,
    /// Single line.
    pub name: String,
    pub measures: Vec<Measure>,
}
impl Track {
    pub fn new(index: usize, name: impl Into<String>, measures: Vec<Measure>) -> Self {
        Self {
            index,
            name: name.into(),
            measures,
        }
    }
    pub fn render(&self) -> CodecResult<String> {
        render_track(self)
    }
    /// Tie chains merged into continuous notes.
    ///
    /// Errors are located as in a document of this track alone.
    pub fn logical_notes(&self, settings: &RenderSettings) -> CodecResult<Vec<LogicalNote>> {
        logical_notes(self, 0, settings)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Score {
    pub key: Option<String>,
    pub tracks: Vec<Track>,
}
impl Score {
    pub fn new(key: Option<String>, tracks: Vec<Track>) -> Self {
        Self { key, tracks }
    }
    pub fn render(&self) -> CodecResult<String> {
        render_score(self)
    }
    /// Logical notes of every track, in block order.
    pub fn logical_notes(&self, settings: &RenderSettings) -> CodecResult<Vec<Vec<LogicalNote>>> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(block, track)| logical_notes(track, block, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        errors::CodecError,
        primitives::{
            BaseValue, Chord, EventInfo, EventType, Measure, NoteValue, Pitch,
        },
    };

    use super::{Score, Track};

    #[test]
    fn test_render_score() {
        let score = Score::new(
            Some("D minor".to_string()),
            vec![
                Track::new(0, "Bass", vec![Measure::full_rest(1)]),
                Track::new(1, "Keys", vec![Measure::full_rest(1), Measure::full_rest(2)]),
            ],
        );
        assert_eq!(
            score.render().unwrap(),
            "Key: D minor\n\nT0 Bass:\n| 1 R/1\n\nT1 Keys:\n| 1 R/1 | R/1"
        );
        assert_eq!(Score::default().render().unwrap(), "");
    }

    #[test]
    fn test_contract_violations() {
        let empty_chord = Chord::new(Vec::new(), NoteValue::plain(BaseValue::Half));
        let track = Track::new(
            2,
            "X",
            vec![Measure::new(1, vec![EventInfo::new(EventType::Chord(empty_chord))])],
        );
        assert!(matches!(
            track.render(),
            Err(CodecError::InvalidChord { track: 2, measure: 1, .. })
        ));
        let mut duplicated =
            Chord::new(vec![Pitch::from_midi(60)], NoteValue::plain(BaseValue::Half));
        duplicated.pitches.push(Pitch::from_midi(60));
        let track = Track::new(
            0,
            "X",
            vec![Measure::new(1, vec![EventInfo::new(EventType::Chord(duplicated))])],
        );
        assert!(matches!(track.render(), Err(CodecError::InvalidChord { .. })));
        for track in [
            Track::new(0, "X", Vec::new()),
            Track::new(0, "X", vec![Measure::new(1, Vec::new())]),
            Track::new(0, "X", vec![Measure::full_rest(2)]),
            Track::new(0, "X\nY", vec![Measure::full_rest(1)]),
        ] {
            assert!(matches!(track.render(), Err(CodecError::InvalidTrack { .. })));
        }
        let score = Score::new(Some("C\nmajor".to_string()), Vec::new());
        assert!(matches!(score.render(), Err(CodecError::MalformedToken { .. })));
    }
}
