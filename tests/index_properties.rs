//! Property-based tests for IntervalIndex containment queries
//!
//! **Property 1: containment completeness** - every position inside any
//! interval is found, overlapping and nested intervals included.
//! **Property 2: bound rejection** - positions outside every interval miss.
//! **Property 3: build idempotence** - the same BED file builds the same index.

use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;
use vcf_intersect::{canonical_chrom, IntervalIndex};

/// Generate a chromosome name with or without the "chr" prefix
fn arb_chrom() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..=22).prop_map(|n| n.to_string()),
        (1u8..=22).prop_map(|n| format!("chr{}", n)),
        Just("X".to_string()),
        Just("chrY".to_string()),
    ]
}

/// Generate possibly-overlapping inclusive intervals
fn arb_intervals() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec(
        (0u64..10_000, 0u64..500).prop_map(|(start, len)| (start, start + len)),
        1..40,
    )
}

fn build(chrom: &str, intervals: &[(u64, u64)]) -> IntervalIndex {
    IntervalIndex::from_records(intervals.iter().map(|&(s, e)| (chrom, s, e)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_every_covered_position_is_contained(
        chrom in arb_chrom(),
        intervals in arb_intervals(),
        pick in any::<prop::sample::Index>(),
        offset in 0u64..500,
    ) {
        let index = build(&chrom, &intervals);
        let (start, end) = intervals[pick.index(intervals.len())];
        let pos = start + offset.min(end - start);

        prop_assert!(index.contains(&chrom, pos));
        prop_assert!(index.contains(&chrom, start));
        prop_assert!(index.contains(&chrom, end));
    }

    #[test]
    fn prop_matches_brute_force(
        intervals in arb_intervals(),
        pos in 0u64..11_000,
    ) {
        let index = build("chr1", &intervals);
        let expected = intervals.iter().any(|&(s, e)| s <= pos && pos <= e);

        prop_assert_eq!(index.contains("chr1", pos), expected);
        prop_assert_eq!(index.get("chr1").unwrap().contains_linear(pos), expected);
    }

    #[test]
    fn prop_outside_bounds_is_rejected(
        intervals in arb_intervals(),
        below in 0u64..1_000,
        above in 1u64..1_000,
    ) {
        let shifted: Vec<(u64, u64)> = intervals.iter().map(|&(s, e)| (s + 1_000, e + 1_000)).collect();
        let index = build("chr2", &shifted);
        let min_start = shifted.iter().map(|&(s, _)| s).min().unwrap();
        let max_end = shifted.iter().map(|&(_, e)| e).max().unwrap();

        prop_assert!(min_start > below);
        prop_assert!(!index.contains("chr2", below));
        prop_assert!(!index.contains("chr2", max_end + above));
    }

    #[test]
    fn prop_prefixed_and_bare_names_share_bucket(
        n in 1u8..=22,
        intervals in arb_intervals(),
        pos in 0u64..11_000,
    ) {
        let bare = n.to_string();
        let prefixed = format!("chr{}", n);
        let index = build(&bare, &intervals);

        prop_assert_eq!(canonical_chrom(&bare), canonical_chrom(&prefixed));
        prop_assert_eq!(index.contains(&bare, pos), index.contains(&prefixed, pos));
        prop_assert_eq!(index.interval_count(&bare), intervals.len());
    }

    #[test]
    fn prop_intervals_sorted_by_start(intervals in arb_intervals()) {
        let index = build("chr3", &intervals);
        let starts: Vec<u64> = index.get("chr3").unwrap().intervals().map(|(s, _)| s).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_bed_build_is_idempotent(
        rows in prop::collection::vec((arb_chrom(), 0u64..10_000, 0u64..500), 0..30),
    ) {
        let mut bed = NamedTempFile::new().unwrap();
        for (chrom, start, len) in &rows {
            writeln!(bed, "{}\t{}\t{}\tname", chrom, start, start + len).unwrap();
        }
        bed.flush().unwrap();

        let first = IntervalIndex::from_bed_file(bed.path()).unwrap();
        let second = IntervalIndex::from_bed_file(bed.path()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.total_intervals(), rows.len());
    }
}

#[test]
fn test_empty_bed_file_gives_empty_index() {
    let bed = NamedTempFile::new().unwrap();
    let index = IntervalIndex::from_bed_file(bed.path()).unwrap();
    assert!(index.is_empty());
}
