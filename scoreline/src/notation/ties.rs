//! Tie validation and merging of tie chains into logical notes.

use std::collections::HashMap;

use crate::{
    dom::Track,
    errors::{CodecError, CodecResult, Location},
    primitives::{
        AbsolutePosition, Dynamics, EventInfo, GenericPosition, Length, Pitch,
        RelativePosition, TimeMap,
    },
    text_render::{RenderSettings, RendersToText},
};

/// Sounding events of the track with their token positions, counted the
/// way the parser counts them.
fn sounding_events(track: &Track) -> Vec<(usize, u32, &EventInfo)> {
    let mut token = 0;
    let mut events = Vec::new();
    for measure in track.measures.iter() {
        token += 1;
        if measure.label().is_some() {
            token += 1;
        }
        for event in measure.events() {
            token += event.time_signature.is_some() as usize
                + event.event.dynamic().is_some() as usize
                + 1;
            if event.event.is_sounding() {
                events.push((token, measure.index(), event));
            }
        }
    }
    events
}

/// Every tied event has to be continued by the next later sounding event
/// that shares any of its pitches, and that event has to hold exactly the
/// same pitches.
///
/// `block` is the position of the track block, used for error location.
pub fn check_ties(track: &Track, block: usize) -> CodecResult<()> {
    let events = sounding_events(track);
    let mut next: HashMap<Pitch, usize> = HashMap::new();
    let mut first_unterminated = None;
    for (idx, (_, _, event)) in events.iter().enumerate().rev() {
        let pitches = event.event.pitches();
        if event.event.tie() {
            let terminated = pitches
                .iter()
                .filter_map(|pitch| next.get(pitch))
                .min()
                .map(|following| events[*following].2.event.pitches() == pitches)
                .unwrap_or(false);
            if !terminated {
                first_unterminated = Some(idx);
            }
        }
        for pitch in pitches {
            next.insert(pitch, idx);
        }
    }
    match first_unterminated {
        None => Ok(()),
        Some(idx) => {
            let (token, _, event) = events[idx];
            Err(CodecError::UnterminatedTie {
                location: Location::token(block, token),
                token: event.event.render_text(),
            })
        }
    }
}

/// Tie chain merged into one continuous note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalNote {
    /// Ascending, as written.
    pub pitches: Vec<Pitch>,
    /// Measure of the first segment.
    pub measure: u32,
    /// From the start of the track. Unknown after an uncertain duration
    /// earlier in the same measure.
    pub onset: Option<AbsolutePosition>,
    /// Unknown, if any segment is uncertain.
    pub length: Option<Length>,
    /// Level in force at the onset.
    pub dynamic: Option<Dynamics>,
    /// How many tied segments are merged.
    pub segments: usize,
}

/// Merge tie chains of a valid track into logical notes, ordered by onset
/// as written.
///
/// Barlines are placed by the time signature of the first event, or by
/// `settings.default_time_signature` if the track does not start with one,
/// the same way the encoder places them. `block` is the position of the
/// track block, used for error location.
pub fn logical_notes(
    track: &Track,
    block: usize,
    settings: &RenderSettings,
) -> CodecResult<Vec<LogicalNote>> {
    check_ties(track, block)?;
    let time_signature = track
        .measures
        .first()
        .and_then(|measure| measure.events().first())
        .and_then(|event| event.time_signature)
        .unwrap_or(settings.default_time_signature);
    let time_map = TimeMap::new(time_signature, settings.default_ticks_per_quarter);
    let mut notes: Vec<LogicalNote> = Vec::new();
    let mut open: HashMap<Vec<Pitch>, usize> = HashMap::new();
    let mut dynamic = None;
    for measure in track.measures.iter() {
        let mut cursor = Some(Length::zero());
        for event in measure.events() {
            let onset = cursor.map(|cursor| {
                RelativePosition::new(measure.index(), cursor.get())
                    .get_absolute_position(&time_map)
            });
            let duration = event.event.duration().length();
            cursor = cursor.zip(duration).map(|(cursor, length)| cursor + length);
            if !event.event.is_sounding() {
                continue;
            }
            if let Some(marker) = event.event.dynamic() {
                dynamic = Some(marker);
            }
            let pitches = event.event.pitches();
            let idx = match open.remove(&pitches) {
                Some(idx) => {
                    let note = &mut notes[idx];
                    note.length = note.length.zip(duration).map(|(a, b)| a + b);
                    note.segments += 1;
                    idx
                }
                None => {
                    notes.push(LogicalNote {
                        pitches: pitches.clone(),
                        measure: measure.index(),
                        onset,
                        length: duration,
                        dynamic,
                        segments: 1,
                    });
                    notes.len() - 1
                }
            };
            if event.event.tie() {
                open.insert(pitches, idx);
            }
        }
    }
    Ok(notes)
}
