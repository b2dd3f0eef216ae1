//! Interval index for position containment queries
//!
//! Uses rust-lapper for O(log n + k) lookups. Intervals are never merged,
//! so a position is contained when it falls inside ANY interval of its
//! chromosome, overlapping and nested intervals included.

use crate::core::error::IntervalResult;
use crate::formats::bed::read_bed_intervals;
use rust_lapper::{Interval, Lapper};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Prefix every chromosome name carries inside the index
pub const CHROM_PREFIX: &str = "chr";

/// Canonicalize a chromosome name by prefixing "chr" unless already present
///
/// Lookups and index construction must go through the same rule, otherwise
/// queries silently miss.
pub fn canonical_chrom(chrom: &str) -> Cow<'_, str> {
    if chrom.starts_with(CHROM_PREFIX) {
        Cow::Borrowed(chrom)
    } else {
        Cow::Owned(format!("{}{}", CHROM_PREFIX, chrom))
    }
}

/// Half-open lapper interval backing an inclusive `[start, end]` range
pub type PositionInterval = Interval<u64, ()>;

/// Sorted intervals of a single chromosome
pub struct ChromIntervals {
    lapper: Lapper<u64, ()>,
    /// Smallest start and largest end, None when no interval holds a position
    bounds: Option<(u64, u64)>,
}

impl ChromIntervals {
    /// Build from inclusive `(start, end)` pairs in any order
    ///
    /// Rows with `start > end` contain no position and are left out.
    pub fn new(ranges: Vec<(u64, u64)>) -> Self {
        let mut bounds: Option<(u64, u64)> = None;
        let intervals: Vec<PositionInterval> = ranges
            .into_iter()
            .filter(|&(start, end)| {
                if start > end {
                    log::warn!("Ignoring inverted interval {}-{}", start, end);
                }
                start <= end
            })
            .map(|(start, end)| {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(start), hi.max(end)),
                    None => (start, end),
                });
                Interval {
                    start,
                    stop: end.saturating_add(1),
                    val: (),
                }
            })
            .collect();

        Self {
            lapper: Lapper::new(intervals),
            bounds,
        }
    }

    /// Whether `pos` lies inside any interval (inclusive on both ends)
    pub fn contains(&self, pos: u64) -> bool {
        let Some((lo, hi)) = self.bounds else {
            return false;
        };

        // Cheap rejection outside the chromosome's covered span
        if pos < lo || pos > hi {
            return false;
        }

        self.lapper.find(pos, pos.saturating_add(1)).next().is_some()
    }

    /// Reference linear scan in ascending start order
    ///
    /// Stops as soon as an interval starts past `pos`; no later interval can
    /// contain it. Returns the same answer as [`ChromIntervals::contains`].
    pub fn contains_linear(&self, pos: u64) -> bool {
        for (start, end) in self.intervals() {
            if start > pos {
                return false;
            }
            if pos <= end {
                return true;
            }
        }
        false
    }

    /// Inclusive `(start, end)` pairs sorted ascending by start
    pub fn intervals(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.lapper
            .intervals
            .iter()
            .map(|iv| (iv.start, iv.stop - 1))
    }

    /// Smallest start and largest end of this chromosome
    pub fn bounds(&self) -> Option<(u64, u64)> {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.lapper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lapper.len() == 0
    }
}

impl PartialEq for ChromIntervals {
    fn eq(&self, other: &Self) -> bool {
        self.intervals().eq(other.intervals())
    }
}

impl Eq for ChromIntervals {}

impl fmt::Debug for ChromIntervals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.intervals()).finish()
    }
}

/// Interval index organized by canonical chromosome name
///
/// Built once before scanning starts and shared read-only by every worker.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IntervalIndex {
    /// Canonical chromosome -> sorted intervals
    chroms: HashMap<String, ChromIntervals>,
}

impl IntervalIndex {
    /// Build the index from a BED-like file
    ///
    /// # Example
    /// ```ignore
    /// let index = IntervalIndex::from_bed_file("targets.bed")?;
    /// assert!(index.contains("1", 150));
    /// ```
    pub fn from_bed_file<P: AsRef<Path>>(path: P) -> IntervalResult<Self> {
        let rows = read_bed_intervals(path.as_ref())?;
        Ok(Self::from_records(rows))
    }

    /// Build the index from `(chrom, start, end)` triples
    ///
    /// Chromosome names are canonicalized; each chromosome's intervals end
    /// up sorted ascending by start.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, u64, u64)>,
        S: AsRef<str>,
    {
        let mut by_chrom: HashMap<String, Vec<(u64, u64)>> = HashMap::new();

        for (chrom, start, end) in records {
            by_chrom
                .entry(canonical_chrom(chrom.as_ref()).into_owned())
                .or_default()
                .push((start, end));
        }

        let chroms = by_chrom
            .into_iter()
            .map(|(chrom, ranges)| (chrom, ChromIntervals::new(ranges)))
            .collect();

        Self { chroms }
    }

    /// Intervals of a chromosome, after canonicalization
    pub fn get(&self, chrom: &str) -> Option<&ChromIntervals> {
        self.chroms.get(canonical_chrom(chrom).as_ref())
    }

    /// Whether `pos` on `chrom` falls inside any indexed interval
    ///
    /// Unknown chromosomes are a plain miss, not an error.
    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        self.get(chrom).is_some_and(|intervals| intervals.contains(pos))
    }

    /// Check if a chromosome exists in the index
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.get(chrom).is_some()
    }

    /// Canonical chromosome names present in the index
    pub fn chroms(&self) -> impl Iterator<Item = &str> {
        self.chroms.keys().map(|s| s.as_str())
    }

    /// Get the number of intervals for a chromosome
    pub fn interval_count(&self, chrom: &str) -> usize {
        self.get(chrom).map(|c| c.len()).unwrap_or(0)
    }

    /// Get total number of intervals across all chromosomes
    pub fn total_intervals(&self) -> usize {
        self.chroms.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }
}
