//! Splitting an ID interval into balanced contiguous sub-ranges

use crate::error::{Error, Result};
use std::ops::Range;

/// Check that `[first, last)` is a usable ID range
pub fn validate_id_range(first: i64, last: i64) -> Result<()> {
    if first < 0 || last < 0 || first > last {
        return Err(Error::InvalidRange { first, last });
    }
    Ok(())
}

/// Split `[left, right)` into `n` contiguous sub-ranges.
///
/// With `span = right - left`, `k = span / n` and `m = span % n`, the first `m`
/// sub-ranges are `k + 1` wide and the rest `k` wide. Concatenated in order they
/// reproduce `[left, right)` exactly. When `n > span` the trailing sub-ranges are
/// empty, so callers should cap `n` at the span.
///
/// Both bounds must be non-negative, which keeps `right - left` in range.
pub fn partition(left: i64, right: i64, n: usize) -> Result<Vec<Range<i64>>> {
    validate_id_range(left, right)?;
    if n == 0 {
        return Err(Error::InvalidWorkerCount);
    }

    let span = right - left;
    let n = i64::try_from(n).map_err(|_| Error::InvalidWorkerCount)?;
    let (k, m) = (span / n, span % n);

    Ok((0..n)
        .map(|i| left + i * k + i.min(m)..left + (i + 1) * k + (i + 1).min(m))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(ranges: &[Range<i64>]) -> (Vec<i64>, Vec<i64>) {
        ranges.iter().map(|r| (r.start, r.end)).unzip()
    }

    #[test]
    fn test_partition_uneven_span() {
        let ranges = partition(0, 10, 3).unwrap();
        let (firsts, lasts) = bounds(&ranges);
        assert_eq!(firsts, vec![0, 4, 7]);
        assert_eq!(lasts, vec![4, 7, 10]);
    }

    #[test]
    fn test_partition_unit_width() {
        let ranges = partition(0, 5, 5).unwrap();
        let (firsts, lasts) = bounds(&ranges);
        assert_eq!(firsts, vec![0, 1, 2, 3, 4]);
        assert_eq!(lasts, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_partition_offset_left_bound() {
        let ranges = partition(100, 110, 2).unwrap();
        assert_eq!(ranges, vec![100..105, 105..110]);
    }

    #[test]
    fn test_partition_single_worker() {
        assert_eq!(partition(7, 42, 1).unwrap(), vec![7..42]);
    }

    #[test]
    fn test_partition_zero_span() {
        let ranges = partition(3, 3, 4).unwrap();
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| r.is_empty() && r.start == 3));
    }

    #[test]
    fn test_partition_more_workers_than_ids() {
        let ranges = partition(0, 2, 4).unwrap();
        assert_eq!(ranges, vec![0..1, 1..2, 2..2, 2..2]);
    }

    #[test]
    fn test_partition_rejects_inverted_range() {
        assert!(matches!(
            partition(10, 5, 2),
            Err(Error::InvalidRange { first: 10, last: 5 })
        ));
    }

    #[test]
    fn test_partition_rejects_negative_bounds() {
        assert!(matches!(
            partition(-10, -4, 2),
            Err(Error::InvalidRange { first: -10, last: -4 })
        ));
        assert!(matches!(
            partition(i64::MIN, i64::MAX, 2),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_partition_widest_span() {
        let ranges = partition(0, i64::MAX, 2).unwrap();
        assert_eq!(ranges, vec![0..i64::MAX / 2 + 1, i64::MAX / 2 + 1..i64::MAX]);
    }

    #[test]
    fn test_partition_rejects_unrepresentable_worker_count() {
        assert!(matches!(
            partition(0, 10, usize::MAX),
            Err(Error::InvalidWorkerCount)
        ));
    }

    #[test]
    fn test_partition_rejects_zero_workers() {
        assert!(matches!(partition(0, 5, 0), Err(Error::InvalidWorkerCount)));
    }

    #[test]
    fn test_validate_id_range() {
        assert!(validate_id_range(0, 0).is_ok());
        assert!(validate_id_range(100, 110).is_ok());
        assert!(validate_id_range(-1, 5).is_err());
        assert!(validate_id_range(1, -5).is_err());
        assert!(validate_id_range(6, 5).is_err());
    }

    proptest! {
        #[test]
        fn prop_partition_covers_range(
            left in 0i64..1_000_000,
            span in 0i64..5_000,
            n in 1usize..64,
        ) {
            let right = left + span;
            let ranges = partition(left, right, n).unwrap();
            prop_assert_eq!(ranges.len(), n);

            let mut cursor = left;
            for range in &ranges {
                prop_assert_eq!(range.start, cursor);
                prop_assert!(range.end >= range.start);
                cursor = range.end;
            }
            prop_assert_eq!(cursor, right);

            let widths: Vec<i64> = ranges.iter().map(|r| r.end - r.start).collect();
            let widest = widths.iter().max().copied().unwrap_or(0);
            let narrowest = widths.iter().min().copied().unwrap_or(0);
            prop_assert!(widest - narrowest <= 1);
        }
    }
}
