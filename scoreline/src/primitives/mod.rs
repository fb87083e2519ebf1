//! Elements, from which DOM constructed.
//!
//! At first, a TimeMap is created from the initial time signature.
//! Then note events are quantized against the DurationGrid and laid out
//! into Measures, keeping annotations on the events themselves.
//! Then measures are organized in tracks and rendered to text.

pub mod duration;
pub mod dynamics;
pub mod event;
pub mod fraction_tools;
pub mod length;
pub mod measure;
pub mod pitch;
pub mod position;
pub mod time_map;
pub mod time_signature;

pub use duration::{BaseValue, Duration, DurationGrid, NoteValue};
pub use dynamics::Dynamics;
pub use event::{Chord, EventInfo, EventType, Note, Rest};
pub use fraction_tools::normalize_fraction;
pub use length::Length;
pub use measure::Measure;
pub use pitch::{Accidental, NoteName, Pitch};
pub use position::{AbsolutePosition, GenericPosition, RelativePosition};
pub use time_map::TimeMap;
pub use time_signature::TimeSignature;
