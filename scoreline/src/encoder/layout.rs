//! Distribution of segments over measures and their order inside.

use std::cmp::Ordering;

use log::debug;

use crate::primitives::{Length, Pitch};

use super::{chords::NoteGroup, quantizer::Segment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Sounding {
        pitches: Vec<Pitch>,
        velocity: u8,
        /// The first segment of a group, the only one that is an onset.
        head: bool,
    },
    Rest,
}

/// Segment, that is going to become an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub segment: Segment,
    pub kind: ItemKind,
}
impl Item {
    pub fn is_sounding(&self) -> bool {
        matches!(self.kind, ItemKind::Sounding { .. })
    }
    fn lowest_height(&self) -> Option<i32> {
        match &self.kind {
            ItemKind::Sounding { pitches, .. } => {
                pitches.iter().map(|pitch| pitch.height()).min()
            }
            ItemKind::Rest => None,
        }
    }
}

pub fn sounding_items(groups: Vec<NoteGroup>) -> impl Iterator<Item = Item> {
    groups.into_iter().flat_map(|group| {
        let NoteGroup {
            pitches,
            velocity,
            segments,
            ..
        } = group;
        segments
            .into_iter()
            .enumerate()
            .map(move |(idx, segment)| Item {
                segment,
                kind: ItemKind::Sounding {
                    pitches: pitches.clone(),
                    velocity,
                    head: idx == 0,
                },
            })
    })
}

pub fn rest_items(segments: Vec<Segment>) -> impl Iterator<Item = Item> {
    segments.into_iter().map(|segment| Item {
        segment,
        kind: ItemKind::Rest,
    })
}

/// Unknown lengths are the longest.
fn compare_lengths(a: Option<Length>, b: Option<Length>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order of items in a measure: by onset, sounding before rests,
/// shorter before longer, lower before higher.
pub fn compare_items(a: &Item, b: &Item) -> Ordering {
    a.segment
        .onset
        .partial_cmp(&b.segment.onset)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.is_sounding().cmp(&a.is_sounding()))
        .then_with(|| {
            compare_lengths(a.segment.duration.length(), b.segment.duration.length())
        })
        .then_with(|| a.lowest_height().cmp(&b.lowest_height()))
}

/// Put items into `measures` buckets, every bucket is sorted.
///
/// Items of measures outside of the range are dropped.
pub fn lay_out(items: impl IntoIterator<Item = Item>, measures: u32) -> Vec<Vec<Item>> {
    let mut buckets: Vec<Vec<Item>> = (0..measures).map(|_| Vec::new()).collect();
    for item in items {
        let idx = item.segment.measure as usize;
        match buckets.get_mut(idx.wrapping_sub(1)) {
            Some(bucket) => bucket.push(item),
            None => debug!("item {item:?} is beyond the last measure"),
        }
    }
    for bucket in buckets.iter_mut() {
        bucket.sort_by(compare_items);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use crate::{
        encoder::quantizer::Segment,
        primitives::{AbsolutePosition, BaseValue, Duration, Length, Pitch},
    };

    use super::{lay_out, Item, ItemKind};

    fn item(ticks: u64, measure: u32, duration: Duration, pitch: Option<u8>) -> Item {
        Item {
            segment: Segment {
                onset: AbsolutePosition::from(Length::from_ticks(ticks, 480)),
                measure,
                duration,
                tie: false,
            },
            kind: match pitch {
                Some(pitch) => ItemKind::Sounding {
                    pitches: vec![Pitch::from_midi(pitch)],
                    velocity: 64,
                    head: true,
                },
                None => ItemKind::Rest,
            },
        }
    }

    #[test]
    fn test_order() {
        let half = Duration::plain(BaseValue::Half);
        let quarter = Duration::plain(BaseValue::Quarter);
        let items = vec![
            item(960, 1, half, None),
            item(0, 1, Duration::Uncertain, Some(48)),
            item(0, 1, half, Some(50)),
            item(0, 1, quarter, Some(72)),
            item(0, 1, quarter, Some(60)),
            item(1920, 2, quarter, Some(60)),
            item(3840, 3, quarter, Some(60)),
        ];
        let measures = lay_out(items, 2);
        assert_eq!(measures.len(), 2);
        let heights: Vec<_> = measures[0]
            .iter()
            .map(|item| item.lowest_height())
            .collect();
        assert_eq!(
            heights,
            vec![Some(60), Some(72), Some(50), Some(48), None]
        );
        assert_eq!(measures[1].len(), 1);
    }
}
