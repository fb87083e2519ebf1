//! A smallest piece of music, that is held by Measure.
use super::{Duration, Dynamics, NoteValue, Pitch, TimeSignature};

/// Can be considered as "Generic" Event.
///
/// EventInfo holds the annotations rendered before the event, while
/// EventType responds for Event-representation and rendering.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct EventInfo {
    /// `[N/D]` change, rendered before the event.
    pub time_signature: Option<TimeSignature>,
    pub event: EventType,
}
impl EventInfo {
    pub fn new(event: EventType) -> Self {
        Self {
            time_signature: None,
            event,
        }
    }
    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = Some(time_signature);
        self
    }
}
impl From<EventType> for EventInfo {
    fn from(event: EventType) -> Self {
        Self::new(event)
    }
}

/// Various types of events with concrete realizations
/// as variant args.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum EventType {
    Rest(Rest),
    Note(Note),
    Chord(Chord),
}
impl EventType {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Rest(rest) => rest.duration,
            Self::Note(note) => note.duration,
            Self::Chord(chord) => Duration::Value(chord.value),
        }
    }
    pub fn tie(&self) -> bool {
        match self {
            Self::Rest(_) => false,
            Self::Note(note) => note.tie,
            Self::Chord(chord) => chord.tie,
        }
    }
    /// Marker, attached to the sounding event.
    pub fn dynamic(&self) -> Option<Dynamics> {
        match self {
            Self::Rest(_) => None,
            Self::Note(note) => note.dynamic,
            Self::Chord(chord) => chord.dynamic,
        }
    }
    /// Sounding pitches, empty for rest.
    pub fn pitches(&self) -> Vec<Pitch> {
        match self {
            Self::Rest(_) => Vec::new(),
            Self::Note(note) => vec![note.pitch],
            Self::Chord(chord) => chord.pitches.clone(),
        }
    }
    pub fn is_sounding(&self) -> bool {
        !matches!(self, Self::Rest(_))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: Duration,
    /// Has no sense with uncertain duration.
    pub tie: bool,
    pub dynamic: Option<Dynamics>,
}
impl Note {
    pub fn new(pitch: Pitch, duration: Duration) -> Self {
        Self {
            pitch,
            duration,
            tie: false,
            dynamic: None,
        }
    }
    pub fn set_tie(&mut self, tie: bool) -> &mut Self {
        self.tie = tie;
        self
    }
    pub fn set_dynamic(&mut self, dynamic: Option<Dynamics>) -> &mut Self {
        self.dynamic = dynamic;
        self
    }
}

/// Simultaneous pitches of one fixed value.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Chord {
    /// Strictly ascending by height.
    pub pitches: Vec<Pitch>,
    pub value: NoteValue,
    pub tie: bool,
    pub dynamic: Option<Dynamics>,
}
impl Chord {
    /// Sorts pitches by height. Spelling of every pitch is preserved.
    pub fn new(mut pitches: Vec<Pitch>, value: NoteValue) -> Self {
        pitches.sort_by_key(|pitch| pitch.height());
        Self {
            pitches,
            value,
            tie: false,
            dynamic: None,
        }
    }
    pub fn set_tie(&mut self, tie: bool) -> &mut Self {
        self.tie = tie;
        self
    }
    pub fn set_dynamic(&mut self, dynamic: Option<Dynamics>) -> &mut Self {
        self.dynamic = dynamic;
        self
    }
    /// Heights are strictly ascending, so there are no duplicates.
    pub fn is_sorted(&self) -> bool {
        self.pitches
            .windows(2)
            .all(|pair| pair[0].height() < pair[1].height())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rest {
    pub duration: Duration,
}
impl Rest {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}
