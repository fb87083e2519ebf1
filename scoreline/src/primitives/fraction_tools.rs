//! Tools for treating fractions as musical lengths.

use fraction::Fraction;

/// Zero as a fraction.
pub fn zero() -> Fraction {
    Fraction::new(0_u64, 1_u64)
}

/// Integer part of a non-negative fraction.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use scoreline::primitives::fraction_tools::whole_part;
/// assert_eq!(whole_part(Fraction::new(7u64, 2u64)), 3);
/// assert_eq!(whole_part(Fraction::new(1u64, 3u64)), 0);
/// ```
pub fn whole_part(frac: Fraction) -> u64 {
    if frac.is_sign_negative() {
        return 0;
    }
    match (frac.numer(), frac.denom()) {
        (Some(num), Some(den)) if *den != 0 => num / den,
        _ => 0,
    }
}

/// Absolute distance between two fractions.
pub fn distance(a: Fraction, b: Fraction) -> Fraction {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Build a fraction from a non-negative ratio, rounded to thousandths.
pub fn from_ratio(ratio: f64) -> Fraction {
    if !ratio.is_finite() || ratio <= 0.0 {
        return zero();
    }
    Fraction::new((ratio * 1000.0).round() as u64, 1000_u64)
}

/// Split complex fraction by simple fractions, that could be interpreted as
/// musical lengths.
///
/// Candidates have to be sorted from the longest to the shortest. Every step
/// takes the longest candidate, that is not longer than the remainder plus
/// tolerance.
///
/// # Returns
///
/// Keys of the chosen candidates, from the longest to the shortest, or `None`
/// if the remainder can not be covered within tolerance.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use scoreline::primitives::normalize_fraction;
/// let candidates = [
///     ("1/2", Fraction::new(1u64, 2u64)),
///     ("1/4", Fraction::new(1u64, 4u64)),
///     ("1/16", Fraction::new(1u64, 16u64)),
/// ];
/// assert_eq!(
///     normalize_fraction(
///         Fraction::new(13u64, 16u64),
///         &candidates,
///         Fraction::new(0u64, 1u64)
///     ),
///     Some(vec!["1/2", "1/4", "1/16"])
/// );
/// ```
pub fn normalize_fraction<T: Copy>(
    frac: Fraction,
    candidates: &[(T, Fraction)],
    tolerance: Fraction,
) -> Option<Vec<T>> {
    let mut remainder = frac;
    let mut head = Vec::new();
    while remainder > tolerance {
        let (key, length) = candidates
            .iter()
            .find(|(_, length)| *length <= remainder + tolerance)?;
        head.push(*key);
        if *length >= remainder {
            break;
        }
        remainder = remainder - *length;
    }
    Some(head)
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use super::{distance, from_ratio, normalize_fraction, whole_part};

    fn candidates() -> Vec<(u8, Fraction)> {
        vec![
            (1, Fraction::new(1u64, 1u64)),
            (2, Fraction::new(1u64, 2u64)),
            (4, Fraction::new(1u64, 4u64)),
            (8, Fraction::new(1u64, 8u64)),
        ]
    }

    #[test]
    fn test_whole_part() {
        assert_eq!(whole_part(Fraction::new(9u64, 4u64)), 2);
        assert_eq!(whole_part(Fraction::new(8u64, 4u64)), 2);
        assert_eq!(whole_part(Fraction::new(0u64, 4u64)), 0);
    }

    #[test]
    fn test_distance_and_ratio() {
        let a = Fraction::new(1u64, 4u64);
        let b = Fraction::new(3u64, 8u64);
        assert_eq!(distance(a, b), Fraction::new(1u64, 8u64));
        assert_eq!(distance(b, a), Fraction::new(1u64, 8u64));
        assert_eq!(from_ratio(0.1), Fraction::new(1u64, 10u64));
        assert_eq!(from_ratio(-3.0), Fraction::new(0u64, 1u64));
    }

    #[test]
    fn test_normalize_fraction() {
        let zero = Fraction::new(0u64, 1u64);
        assert_eq!(
            normalize_fraction(Fraction::new(5u64, 8u64), &candidates(), zero),
            Some(vec![2, 8])
        );
        assert_eq!(
            normalize_fraction(Fraction::new(7u64, 4u64), &candidates(), zero),
            Some(vec![1, 2, 4])
        );
        assert_eq!(
            normalize_fraction(Fraction::new(1u64, 16u64), &candidates(), zero),
            None
        );
        // the remainder vanishes within tolerance
        assert_eq!(
            normalize_fraction(
                Fraction::new(17u64, 32u64),
                &candidates(),
                Fraction::new(1u64, 32u64)
            ),
            Some(vec![2])
        );
    }
}
