//! Main "ruler" for laying out measures and moving through a track.
//!
//! Barlines come from a single time signature: they form an arithmetic
//! progression from the track start, later changes of meter never move them.

use fraction::Fraction;

use super::{
    fraction_tools::whole_part,
    position::{AbsolutePosition, RelativePosition},
    Length, TimeSignature,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeMap {
    time_signature: TimeSignature,
    ticks_per_quarter: u64,
}
impl TimeMap {
    /// `ticks_per_quarter` has to be positive.
    pub fn new(time_signature: TimeSignature, ticks_per_quarter: u64) -> Self {
        Self {
            time_signature,
            ticks_per_quarter,
        }
    }
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
    pub fn ticks_per_quarter(&self) -> u64 {
        self.ticks_per_quarter
    }
    pub fn measure_length(&self) -> Length {
        self.time_signature.length()
    }

    pub fn position_from_ticks(&self, ticks: u64) -> AbsolutePosition {
        AbsolutePosition::from(Length::from_ticks(ticks, self.ticks_per_quarter))
    }

    /// Get absolute position of measure start.
    /// Index is 1-based.
    pub fn get_absolute_position_of_measure(
        &self,
        measure_index: u32,
    ) -> AbsolutePosition {
        let preceding = measure_index.saturating_sub(1) as u64;
        AbsolutePosition::from(
            self.measure_length().get() * Fraction::new(preceding, 1_u64),
        )
    }

    /// Index of the measure, that contains position. Barline belongs to
    /// the measure it opens.
    pub fn measure_index_at(&self, absolute: &AbsolutePosition) -> u32 {
        whole_part(absolute.get() / self.measure_length().get()) as u32 + 1
    }

    pub fn pos_relative_from_absolute(
        &self,
        absolute: &AbsolutePosition,
    ) -> RelativePosition {
        let index = self.measure_index_at(absolute);
        let start = self.get_absolute_position_of_measure(index);
        RelativePosition::new(index, absolute.get() - start.get())
    }
    pub fn pos_absolute_from_relative(
        &self,
        relative: &RelativePosition,
    ) -> AbsolutePosition {
        let m_pos =
            self.get_absolute_position_of_measure(relative.get_measure_index());
        AbsolutePosition::from(m_pos.get() + relative.get_position())
    }

    /// Split `[start, end)` at every barline it crosses.
    ///
    /// # Returns
    /// pieces as (measure index, start, length), in time order.
    ///
    /// # Example
    /// ```
    /// # use fraction::Fraction;
    /// # use scoreline::primitives::{AbsolutePosition, Length, TimeMap, TimeSignature};
    /// let time_map = TimeMap::new(TimeSignature::new(3, 4).unwrap(), 480);
    /// let pieces = time_map.split_at_barlines(
    ///     time_map.position_from_ticks(960),
    ///     time_map.position_from_ticks(2400),
    /// );
    /// assert_eq!(
    ///     pieces,
    ///     vec![
    ///         (1, time_map.position_from_ticks(960), Length::from_ticks(480, 480)),
    ///         (2, time_map.position_from_ticks(1440), Length::from_ticks(960, 480)),
    ///     ]
    /// );
    /// ```
    pub fn split_at_barlines(
        &self,
        start: AbsolutePosition,
        end: AbsolutePosition,
    ) -> Vec<(u32, AbsolutePosition, Length)> {
        let mut pieces = Vec::new();
        let mut position = start;
        let mut remaining = Length::from(end.get())
            .checked_sub(Length::from(start.get()))
            .unwrap_or_default();
        while !remaining.is_zero() {
            let relative = self.pos_relative_from_absolute(&position);
            let to_bar_end = relative.get_distance_to_bar_end(self);
            let piece = match remaining > to_bar_end {
                true => to_bar_end,
                false => remaining,
            };
            pieces.push((relative.get_measure_index(), position, piece));
            position += piece;
            remaining = remaining - piece;
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use crate::primitives::{
        position::{AbsolutePosition, RelativePosition},
        Length, TimeSignature,
    };

    use super::TimeMap;

    fn time_map(num: u32, den: u32) -> TimeMap {
        TimeMap::new(TimeSignature::new(num, den).unwrap(), 480)
    }

    #[test]
    fn test_measure_position() {
        let time_map = time_map(7, 8);
        assert_eq!(
            time_map.get_absolute_position_of_measure(1),
            AbsolutePosition::zero()
        );
        assert_eq!(
            time_map.get_absolute_position_of_measure(3),
            AbsolutePosition::from(Fraction::new(14u64, 8u64))
        );
        assert_eq!(time_map.measure_index_at(&time_map.position_from_ticks(0)), 1);
        // 7/8 at 480 is 1680 ticks
        assert_eq!(
            time_map.measure_index_at(&time_map.position_from_ticks(1679)),
            1
        );
        assert_eq!(
            time_map.measure_index_at(&time_map.position_from_ticks(1680)),
            2
        );
    }

    #[test]
    fn test_converter() {
        let time_map = time_map(4, 4);
        let absolute = AbsolutePosition::from(Fraction::new(19u64, 8u64));
        let relative = RelativePosition::new(3, Fraction::new(3u64, 8u64));
        assert_eq!(time_map.pos_absolute_from_relative(&relative), absolute);
        assert_eq!(time_map.pos_relative_from_absolute(&absolute), relative);
    }

    #[test]
    fn test_split() {
        let time_map = time_map(4, 4);
        let pieces = time_map.split_at_barlines(
            time_map.position_from_ticks(1440),
            time_map.position_from_ticks(5760),
        );
        assert_eq!(
            pieces,
            vec![
                (1, time_map.position_from_ticks(1440), Length::from_ticks(480, 480)),
                (2, time_map.position_from_ticks(1920), Length::from_ticks(1920, 480)),
                (3, time_map.position_from_ticks(3840), Length::from_ticks(1920, 480)),
            ]
        );
        assert!(time_map
            .split_at_barlines(
                time_map.position_from_ticks(10),
                time_map.position_from_ticks(10)
            )
            .is_empty());
    }
}
