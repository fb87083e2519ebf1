//! Timed note events to [`Score`] and text.
//!
//! Every track goes through the same pipeline:
//! sanitation, quantization against barlines of the initial meter, chord
//! aggregation, rests for silence, layout into measures, annotation with
//! time signature changes and dynamics.

use fraction::Fraction;
use log::{info, warn};

use crate::{
    dom::{
        midi_parse::{ScoreEvents, TrackEvents},
        Score, Track,
    },
    errors::{CodecError, CodecResult, Warning},
    primitives::{
        fraction_tools::whole_part, BaseValue, Chord, Duration, Dynamics, EventInfo,
        EventType, Length, Measure, Note, Rest, TimeMap,
    },
    text_render::RenderSettings,
};

pub mod annotate;
pub mod chords;
pub mod layout;
pub mod quantizer;

use annotate::{attach_time_signatures, dynamic_markers, resolve_time_signatures};
use chords::aggregate;
use layout::{lay_out, rest_items, sounding_items, Item, ItemKind};
use quantizer::{quantize_gaps, quantize_notes, Segment};

/// Result of encoding: the document model, its text and everything, that
/// was recovered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedScore {
    pub score: Score,
    pub text: String,
    pub warnings: Vec<Warning>,
}

pub fn encode_score(
    events: &ScoreEvents,
    settings: &RenderSettings,
) -> CodecResult<EncodedScore> {
    let ticks_per_quarter = events.resolution(settings.default_ticks_per_quarter);
    let mut warnings = Vec::new();
    let tracks = events
        .tracks
        .iter()
        .map(|track| encode_track(track, ticks_per_quarter, settings, &mut warnings))
        .collect::<CodecResult<Vec<_>>>()?;
    let score = Score::new(events.key.clone(), tracks);
    let text = score.render()?;
    info!(
        "encoded {} tracks with {} warnings",
        score.tracks.len(),
        warnings.len()
    );
    Ok(EncodedScore {
        score,
        text,
        warnings,
    })
}

/// Encode a single track. Recoverable problems are appended to `warnings`.
pub fn encode_track(
    track: &TrackEvents,
    ticks_per_quarter: u64,
    settings: &RenderSettings,
    warnings: &mut Vec<Warning>,
) -> CodecResult<Track> {
    let resolved =
        resolve_time_signatures(track, settings.default_time_signature, warnings);
    let time_map = TimeMap::new(resolved.initial, ticks_per_quarter);
    let grid = settings.grid();
    let notes = track.sanitized_notes();

    let groups = aggregate(quantize_notes(&notes, &time_map, &grid));
    let measures_count = groups
        .iter()
        .flat_map(|group| group.segments.iter())
        .map(|segment| segment.measure)
        .max()
        .unwrap_or(1);
    let end = time_map.get_absolute_position_of_measure(measures_count + 1);
    let rests = quantize_gaps(
        &notes,
        end,
        &time_map,
        &grid,
        Length::from_ticks(settings.min_rest_ticks, ticks_per_quarter),
    );
    let mut buckets = lay_out(
        sounding_items(groups).chain(rest_items(rests)),
        measures_count,
    );
    for (idx, bucket) in buckets.iter_mut().enumerate() {
        if !bucket.iter().any(Item::is_sounding) {
            *bucket = vec![full_rest(idx as u32 + 1, &time_map)];
        }
    }

    let items: Vec<&Item> = buckets.iter().flatten().collect();
    let onsets: Vec<_> = items.iter().map(|item| item.segment.onset).collect();
    let changes: Vec<_> = resolved
        .changes
        .iter()
        .map(|(tick, ts)| (time_map.position_from_ticks(*tick), *ts))
        .collect();
    let mut annotations = attach_time_signatures(&onsets, &changes)
        .into_iter()
        .zip(dynamic_markers(items));

    let mut measures = Vec::with_capacity(buckets.len());
    for (idx, bucket) in buckets.into_iter().enumerate() {
        let mut events = Vec::with_capacity(bucket.len());
        for (item, (time_signature, dynamic)) in bucket.into_iter().zip(&mut annotations) {
            let event = event_from_item(item, dynamic, track.index, ticks_per_quarter, warnings)?;
            events.push(EventInfo {
                time_signature,
                event,
            });
        }
        measures.push(Measure::new(idx as u32 + 1, events));
    }
    info!(
        "track {}: {} notes in {} measures of {}",
        track.index,
        notes.len(),
        measures.len(),
        resolved.initial
    );
    Ok(Track::new(track.index, track.name.clone(), measures))
}

fn full_rest(measure: u32, time_map: &TimeMap) -> Item {
    Item {
        segment: Segment {
            onset: time_map.get_absolute_position_of_measure(measure),
            measure,
            duration: Duration::plain(BaseValue::Whole),
            tie: false,
        },
        kind: ItemKind::Rest,
    }
}

fn event_from_item(
    item: Item,
    dynamic: Option<Dynamics>,
    track: usize,
    ticks_per_quarter: u64,
    warnings: &mut Vec<Warning>,
) -> CodecResult<EventType> {
    let Segment {
        onset,
        measure,
        duration,
        tie,
    } = item.segment;
    if duration.is_uncertain() {
        let tick = whole_part(onset.get() * Fraction::new(4 * ticks_per_quarter, 1_u64));
        warn!("track {track}, measure {measure}: ambiguous duration at tick {tick}");
        warnings.push(Warning::AmbiguousDuration {
            track,
            measure,
            tick,
        });
    }
    let pitches = match item.kind {
        ItemKind::Rest => return Ok(EventType::Rest(Rest::new(duration))),
        ItemKind::Sounding { pitches, .. } => pitches,
    };
    if let [pitch] = pitches.as_slice() {
        let mut note = Note::new(*pitch, duration);
        note.set_tie(tie).set_dynamic(dynamic);
        return Ok(EventType::Note(note));
    }
    match duration {
        Duration::Value(value) => {
            let mut chord = Chord::new(pitches, value);
            chord.set_tie(tie).set_dynamic(dynamic);
            Ok(EventType::Chord(chord))
        }
        Duration::Uncertain => Err(CodecError::InvalidChord {
            track,
            measure,
            reason: "chord can not have uncertain duration".to_string(),
        }),
    }
}
