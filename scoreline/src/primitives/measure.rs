//! Measure contains events of one track between two barlines.
//!
//! Measure is never empty: a bar without sounding events holds rests,
//! and a bar that is entirely silent holds the single full-measure rest.

use super::{BaseValue, Duration, EventInfo, EventType, Rest};

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Measure {
    index: u32,
    pub events: Vec<EventInfo>,
}
impl Measure {
    /// Label is shown for the first measure and every fifth one.
    pub const LABEL_PERIOD: u32 = 5;

    /// `index` is 1-based.
    pub fn new(index: u32, events: Vec<EventInfo>) -> Self {
        Self { index, events }
    }
    /// Measure holding only `R/1`.
    pub fn full_rest(index: u32) -> Self {
        Self::new(
            index,
            vec![EventInfo::new(EventType::Rest(Rest::new(
                Duration::plain(BaseValue::Whole),
            )))],
        )
    }

    pub fn index(&self) -> u32 {
        self.index
    }
    pub fn events(&self) -> &[EventInfo] {
        &self.events
    }
    pub fn push(&mut self, event: EventInfo) -> &mut Self {
        self.events.push(event);
        self
    }

    /// # Example
    /// ```
    /// # use scoreline::primitives::Measure;
    /// let labels: Vec<_> = (1..=11).map(|i| Measure::label_of(i)).collect();
    /// assert_eq!(
    ///     labels,
    ///     vec![Some(1), None, None, None, Some(5), None, None, None, None, Some(10), None]
    /// );
    /// ```
    pub fn label_of(index: u32) -> Option<u32> {
        match index == 1 || index % Self::LABEL_PERIOD == 0 {
            true => Some(index),
            false => None,
        }
    }
    pub fn label(&self) -> Option<u32> {
        Self::label_of(self.index)
    }

    /// Sole content is an un-annotated `R/1`.
    pub fn is_full_rest(&self) -> bool {
        match self.events.as_slice() {
            [only] => {
                only.time_signature.is_none()
                    && only.event
                        == EventType::Rest(Rest::new(Duration::plain(
                            BaseValue::Whole,
                        )))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::{
        BaseValue, Duration, EventInfo, EventType, Note, Pitch, Rest,
    };

    use super::Measure;

    #[test]
    fn test_full_rest() {
        let measure = Measure::full_rest(3);
        assert!(measure.is_full_rest());
        assert_eq!(measure.label(), None);
        let mut measure = Measure::new(5, Vec::new());
        measure
            .push(EventInfo::new(EventType::Rest(Rest::new(Duration::plain(
                BaseValue::Half,
            )))))
            .push(EventInfo::new(EventType::Note(Note::new(
                Pitch::from_midi(60),
                Duration::plain(BaseValue::Half),
            ))));
        assert!(!measure.is_full_rest());
        assert_eq!(measure.label(), Some(5));
        assert_eq!(measure.events().len(), 2);
    }
}
