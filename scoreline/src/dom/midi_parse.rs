//! Timed events, as they come from a MIDI reader, and their clean-up.

use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_tick: u64,
    pub end_tick: u64,
    /// MIDI note number, 60 is C4.
    pub pitch: u8,
    pub velocity: u8,
}
impl NoteEvent {
    pub fn new(start_tick: u64, end_tick: u64, pitch: u8, velocity: u8) -> Self {
        Self {
            start_tick,
            end_tick,
            pitch,
            velocity,
        }
    }
}

/// Meter change as reported by the reader, not validated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignatureEvent {
    pub tick: u64,
    pub numerator: u32,
    pub denominator: u32,
}
impl TimeSignatureEvent {
    pub fn new(tick: u64, numerator: u32, denominator: u32) -> Self {
        Self {
            tick,
            numerator,
            denominator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackEvents {
    /// 0-based.
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub notes: Vec<NoteEvent>,
    #[serde(default)]
    pub time_signatures: Vec<TimeSignatureEvent>,
}
impl TrackEvents {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = NoteEvent>) -> Self {
        self.notes.extend(notes);
        self
    }
    pub fn with_time_signatures(
        mut self,
        time_signatures: impl IntoIterator<Item = TimeSignatureEvent>,
    ) -> Self {
        self.time_signatures.extend(time_signatures);
        self
    }

    /// Notes, ready for quantization, sorted by start and pitch.
    ///
    /// - notes with `end <= start` are dropped;
    /// - a pitch, struck again while sounding, is cut at the new strike;
    /// - duplicates at the same start keep the longest end.
    ///
    /// # Example
    /// ```
    /// # use scoreline::dom::midi_parse::{NoteEvent, TrackEvents};
    /// let track = TrackEvents::new(0, "Piano").with_notes([
    ///     NoteEvent::new(480, 960, 60, 80),
    ///     NoteEvent::new(0, 960, 60, 80),
    ///     NoteEvent::new(100, 100, 64, 80),
    /// ]);
    /// assert_eq!(
    ///     track.sanitized_notes(),
    ///     vec![NoteEvent::new(0, 480, 60, 80), NoteEvent::new(480, 960, 60, 80)]
    /// );
    /// ```
    pub fn sanitized_notes(&self) -> Vec<NoteEvent> {
        let mut notes: Vec<NoteEvent> = self
            .notes
            .iter()
            .filter(|note| match note.end_tick > note.start_tick {
                true => true,
                false => {
                    debug!("track {}: dropping empty note {note:?}", self.index);
                    false
                }
            })
            .copied()
            .collect();
        notes.sort_by_key(|note| (note.pitch, note.start_tick, note.end_tick));
        let mut sanitized = Vec::with_capacity(notes.len());
        for (pitch, group) in &notes.into_iter().group_by(|note| note.pitch) {
            let mut previous: Option<NoteEvent> = None;
            for note in group {
                previous = match previous {
                    None => Some(note),
                    Some(mut prev) if prev.start_tick == note.start_tick => {
                        debug!(
                            "track {}: merging duplicated pitch {pitch} at {}",
                            self.index, note.start_tick
                        );
                        prev.end_tick = prev.end_tick.max(note.end_tick);
                        prev.velocity = prev.velocity.max(note.velocity);
                        Some(prev)
                    }
                    Some(mut prev) => {
                        if prev.end_tick > note.start_tick {
                            warn!(
                                "track {}: pitch {pitch} struck at {} while sounding \
                                since {}, cutting the earlier note",
                                self.index, note.start_tick, prev.start_tick
                            );
                            prev.end_tick = note.start_tick;
                        }
                        sanitized.push(prev);
                        Some(note)
                    }
                };
            }
            sanitized.extend(previous);
        }
        sanitized.sort_by_key(|note| (note.start_tick, note.pitch));
        sanitized
    }
}

/// Everything the encoder needs to know about the source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreEvents {
    #[serde(default)]
    pub key: Option<String>,
    pub ticks_per_quarter: u64,
    pub tracks: Vec<TrackEvents>,
}
impl ScoreEvents {
    pub fn new(ticks_per_quarter: u64, tracks: Vec<TrackEvents>) -> Self {
        Self {
            key: None,
            ticks_per_quarter,
            tracks,
        }
    }
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Resolution, or `default` for zero.
    pub fn resolution(&self, default: u64) -> u64 {
        match self.ticks_per_quarter {
            0 => {
                warn!("zero ticks per quarter, using {default}");
                default
            }
            x => x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteEvent, ScoreEvents, TrackEvents};

    #[test]
    fn test_sanitize() {
        let track = TrackEvents::new(1, "Strings").with_notes([
            NoteEvent::new(0, 960, 64, 50),
            NoteEvent::new(0, 480, 64, 90),
            NoteEvent::new(0, 480, 60, 70),
            NoteEvent::new(960, 480, 67, 70),
            NoteEvent::new(480, 1440, 60, 70),
            NoteEvent::new(1440, 1920, 60, 70),
        ]);
        assert_eq!(
            track.sanitized_notes(),
            vec![
                NoteEvent::new(0, 480, 60, 70),
                NoteEvent::new(0, 960, 64, 90),
                NoteEvent::new(480, 1440, 60, 70),
                NoteEvent::new(1440, 1920, 60, 70),
            ]
        );
    }

    #[test]
    fn test_from_json() {
        let events: ScoreEvents = serde_json::from_str(
            r#"{
                "ticks_per_quarter": 0,
                "tracks": [
                    {
                        "index": 0,
                        "name": "Lead",
                        "notes": [
                            {"start_tick": 0, "end_tick": 480, "pitch": 72, "velocity": 100}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(events.key, None);
        assert_eq!(events.resolution(480), 480);
        assert_eq!(events.tracks[0].notes.len(), 1);
        assert!(events.tracks[0].time_signatures.is_empty());
    }
}
