//! Annotations of the event stream: time signature changes and dynamics.

use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    dom::midi_parse::TrackEvents,
    errors::Warning,
    primitives::{dynamics::segment, AbsolutePosition, Dynamics, TimeSignature},
};

use super::layout::{Item, ItemKind};

/// Valid changes of meter, one per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimeSignatures {
    /// Meter of all the bars.
    pub initial: TimeSignature,
    /// Sorted by tick.
    pub changes: Vec<(u64, TimeSignature)>,
}

/// Drop invalid signatures and resolve conflicts at the same tick: the
/// last one in input order wins.
pub fn resolve_time_signatures(
    track: &TrackEvents,
    default: TimeSignature,
    warnings: &mut Vec<Warning>,
) -> ResolvedTimeSignatures {
    let mut valid: Vec<(u64, TimeSignature)> = track
        .time_signatures
        .iter()
        .filter_map(|event| {
            match TimeSignature::new(event.numerator, event.denominator) {
                Ok(time_signature) => Some((event.tick, time_signature)),
                Err(err) => {
                    warn!("track {}: skipping {err} at tick {}", track.index, event.tick);
                    None
                }
            }
        })
        .collect();
    valid.sort_by_key(|(tick, _)| *tick);
    let mut changes = Vec::with_capacity(valid.len());
    for (tick, group) in &valid.into_iter().group_by(|(tick, _)| *tick) {
        let group: Vec<TimeSignature> = group.map(|(_, ts)| ts).collect();
        if let Some((kept, dropped)) = group.split_last() {
            for dropped in dropped {
                warn!(
                    "track {}: time signature {dropped} at tick {tick} is overridden by {kept}",
                    track.index
                );
                warnings.push(Warning::ConflictingTimeSignatureAtSameTick {
                    track: track.index,
                    tick,
                    kept: *kept,
                    dropped: *dropped,
                });
            }
            changes.push((tick, *kept));
        }
    }
    let initial = match changes.first() {
        Some((0, time_signature)) => *time_signature,
        _ => default,
    };
    ResolvedTimeSignatures { initial, changes }
}

/// For every item: the change of meter to render before it.
///
/// A change goes before the first item at or after its position. Changes
/// after the last item are dropped, and of two changes before the same
/// item the later is kept.
pub fn attach_time_signatures(
    onsets: &[AbsolutePosition],
    changes: &[(AbsolutePosition, TimeSignature)],
) -> Vec<Option<TimeSignature>> {
    let mut attached = vec![None; onsets.len()];
    for (position, time_signature) in changes {
        match onsets.iter().position(|onset| onset >= position) {
            Some(idx) => {
                if let Some(previous) = attached[idx].replace(*time_signature) {
                    info!(
                        "time signature {previous} is replaced by {time_signature} \
                        before the same event"
                    );
                }
            }
            None => info!(
                "time signature {time_signature} at {} is after the last event",
                position.get()
            ),
        }
    }
    attached
}

fn onset_velocity(item: &Item) -> Option<u8> {
    match item.kind {
        ItemKind::Sounding {
            velocity,
            head: true,
            ..
        } => Some(velocity),
        _ => None,
    }
}

/// Dynamics of every onset segmented over the items. Continuations and
/// rests never get a marker.
pub fn dynamic_markers<'a>(
    items: impl IntoIterator<Item = &'a Item>,
) -> Vec<Option<Dynamics>> {
    let items: Vec<&Item> = items.into_iter().collect();
    let mut markers = segment(items.iter().filter_map(|item| onset_velocity(item)))
        .into_iter();
    items
        .into_iter()
        .map(|item| {
            onset_velocity(item)?;
            let marker = markers.next().flatten();
            if let Some(marker) = marker {
                debug!("dynamics {marker} at {}", item.segment.onset.get());
            }
            marker
        })
        .collect()
}
