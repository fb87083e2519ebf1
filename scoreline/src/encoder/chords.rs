use itertools::Itertools;

use crate::primitives::Pitch;

use super::quantizer::{QuantizedNote, Segment};

/// Notes, that start together and are split and tied as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGroup {
    pub start_tick: u64,
    /// Ascending by height.
    pub pitches: Vec<Pitch>,
    /// The loudest member.
    pub velocity: u8,
    pub segments: Vec<Segment>,
}
impl From<QuantizedNote> for NoteGroup {
    fn from(note: QuantizedNote) -> Self {
        Self {
            start_tick: note.source.start_tick,
            pitches: vec![note.pitch],
            velocity: note.source.velocity,
            segments: note.segments,
        }
    }
}

/// Merge notes with the same start tick and the same segments into chord
/// groups. Notes with any uncertain segment stay alone.
///
/// Notes have to be sorted by start tick.
pub fn aggregate(notes: Vec<QuantizedNote>) -> Vec<NoteGroup> {
    let mut groups = Vec::with_capacity(notes.len());
    for (_, simultaneous) in &notes.into_iter().group_by(|note| note.source.start_tick) {
        let mut at_onset: Vec<NoteGroup> = Vec::new();
        for note in simultaneous {
            let matching = match note.is_uncertain() {
                true => None,
                false => at_onset
                    .iter_mut()
                    .find(|group| group.segments == note.segments),
            };
            match matching {
                Some(group) => {
                    group.pitches.push(note.pitch);
                    group.velocity = group.velocity.max(note.source.velocity);
                }
                None => at_onset.push(NoteGroup::from(note)),
            }
        }
        for group in at_onset.iter_mut() {
            group.pitches.sort_by_key(|pitch| pitch.height());
        }
        groups.extend(at_onset);
    }
    groups
}

#[cfg(test)]
mod tests {
    use crate::{
        dom::midi_parse::NoteEvent,
        encoder::quantizer::quantize_notes,
        primitives::{BaseValue, DurationGrid, Pitch, TimeMap, TimeSignature},
    };

    use super::aggregate;

    fn groups(notes: &[NoteEvent]) -> Vec<(Vec<Pitch>, u8)> {
        let time_map = TimeMap::new(TimeSignature::default(), 480);
        let grid = DurationGrid::new(BaseValue::SixtyFourth, 0.1);
        aggregate(quantize_notes(notes, &time_map, &grid))
            .into_iter()
            .map(|group| (group.pitches, group.velocity))
            .collect()
    }

    #[test]
    fn test_aggregate() {
        let c4 = Pitch::from_midi(60);
        let e4 = Pitch::from_midi(64);
        let g4 = Pitch::from_midi(67);
        assert_eq!(
            groups(&[
                NoteEvent::new(0, 480, 60, 70),
                NoteEvent::new(0, 480, 64, 90),
                NoteEvent::new(0, 960, 67, 70),
                NoteEvent::new(480, 961, 60, 70),
            ]),
            vec![(vec![c4, e4], 90), (vec![g4], 70), (vec![c4], 70)]
        );
        // equal lengths within tolerance give equal segments
        assert_eq!(
            groups(&[NoteEvent::new(0, 479, 67, 50), NoteEvent::new(0, 481, 60, 60)]),
            vec![(vec![c4, g4], 60)]
        );
    }

    #[test]
    fn test_uncertain_are_not_merged() {
        assert_eq!(
            groups(&[NoteEvent::new(0, 1000, 60, 70), NoteEvent::new(0, 1000, 64, 70)]).len(),
            2
        );
    }
}
