//! Mapping of tick intervals onto the duration grid, measure by measure.

use log::debug;

use crate::{
    dom::midi_parse::NoteEvent,
    primitives::{
        AbsolutePosition, Duration, DurationGrid, Length, Pitch, TimeMap,
    },
};

/// One piece of a note or a rest, that fits the grid and a single measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub onset: AbsolutePosition,
    /// 1-based.
    pub measure: u32,
    pub duration: Duration,
    /// Continues into the next segment of the same note.
    pub tie: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedNote {
    pub source: NoteEvent,
    pub pitch: Pitch,
    pub segments: Vec<Segment>,
}
impl QuantizedNote {
    pub fn is_uncertain(&self) -> bool {
        self.segments.iter().any(|seg| seg.duration.is_uncertain())
    }
}

/// Split `[start, end)` at barlines and quantize every piece.
///
/// A piece, that is not longer than tolerance, is dropped if it is not the
/// only one. Every piece can become a chain of values. Untied segments
/// are returned, see [`tie_chain`].
pub fn quantize_interval(
    start: AbsolutePosition,
    end: AbsolutePosition,
    time_map: &TimeMap,
    grid: &DurationGrid,
) -> Vec<Segment> {
    let pieces = time_map.split_at_barlines(start, end);
    let significant: Vec<_> = pieces
        .iter()
        .filter(|(_, _, length)| *length > grid.tolerance())
        .copied()
        .collect();
    let pieces = match (significant.is_empty(), pieces.first()) {
        (false, _) => significant,
        (true, Some(first)) => vec![*first],
        (true, None) => Vec::new(),
    };
    let mut segments = Vec::new();
    for (measure, position, length) in pieces {
        let mut onset = position;
        for duration in grid.quantize_length(length) {
            segments.push(Segment {
                onset,
                measure,
                duration,
                tie: false,
            });
            onset += duration.length().unwrap_or(length);
        }
    }
    segments
}

/// Tie every segment to the next one. Uncertain segments are neither tied
/// nor continued by a tie.
pub fn tie_chain(segments: &mut [Segment]) {
    let certain: Vec<bool> = segments
        .iter()
        .map(|segment| !segment.duration.is_uncertain())
        .collect();
    for (idx, segment) in segments.iter_mut().enumerate() {
        segment.tie = certain[idx] && certain.get(idx + 1).copied().unwrap_or(false);
    }
}

pub fn quantize_notes(
    notes: &[NoteEvent],
    time_map: &TimeMap,
    grid: &DurationGrid,
) -> Vec<QuantizedNote> {
    notes
        .iter()
        .map(|note| {
            let mut segments = quantize_interval(
                time_map.position_from_ticks(note.start_tick),
                time_map.position_from_ticks(note.end_tick),
                time_map,
                grid,
            );
            tie_chain(&mut segments);
            QuantizedNote {
                source: *note,
                pitch: Pitch::from_midi(note.pitch),
                segments,
            }
        })
        .collect()
}

/// Rests for every place, where nothing sounds, up to `end`.
///
/// Silence shorter than `min_rest` is absorbed. Rests are never tied.
pub fn quantize_gaps(
    notes: &[NoteEvent],
    end: AbsolutePosition,
    time_map: &TimeMap,
    grid: &DurationGrid,
    min_rest: Length,
) -> Vec<Segment> {
    let mut gaps = Vec::new();
    let mut cursor = AbsolutePosition::zero();
    for note in notes.iter() {
        let start = time_map.position_from_ticks(note.start_tick);
        if start > cursor {
            gaps.push((cursor, start));
        }
        let note_end = time_map.position_from_ticks(note.end_tick);
        if note_end > cursor {
            cursor = note_end;
        }
    }
    if end > cursor {
        gaps.push((cursor, end));
    }
    let mut segments = Vec::new();
    for (start, stop) in gaps {
        for (_, position, length) in time_map.split_at_barlines(start, stop) {
            if length < min_rest {
                debug!("absorbing silence of {} at {}", length.get(), position.get());
                continue;
            }
            segments.extend(quantize_interval(
                position,
                position + length,
                time_map,
                grid,
            ));
        }
    }
    segments
}
