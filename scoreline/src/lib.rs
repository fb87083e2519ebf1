//! Codec between timed MIDI note events and a one-line-per-track text
//! notation.
//!
//! ```
//! use scoreline::{
//!     dom::midi_parse::{NoteEvent, ScoreEvents, TrackEvents},
//!     text_render::RenderSettings,
//! };
//!
//! let events = ScoreEvents::new(
//!     480,
//!     vec![TrackEvents::new(0, "Flute").with_notes([NoteEvent::new(0, 1920, 72, 64)])],
//! );
//! let encoded = scoreline::encode(&events, &RenderSettings::default()).unwrap();
//! assert_eq!(encoded.text, "T0 Flute:\n| 1 dyn(mf) C5/1");
//!
//! let score = scoreline::parse(&encoded.text).unwrap();
//! assert_eq!(score, encoded.score);
//! ```

pub mod dom;
pub mod encoder;
pub mod errors;
pub mod notation;
pub mod primitives;
pub mod text_render;

use dom::{midi_parse::ScoreEvents, Score};
use encoder::EncodedScore;
use errors::CodecResult;
use text_render::RenderSettings;

/// Encode the whole score to text.
pub fn encode(events: &ScoreEvents, settings: &RenderSettings) -> CodecResult<EncodedScore> {
    encoder::encode_score(events, settings)
}

/// Parse and validate the text notation.
pub fn parse(text: &str) -> CodecResult<Score> {
    notation::parser::parse_document(text)
}
