//! vcf-intersect - Stream VCF records that fall inside BED intervals
//!
//! Builds a per-chromosome interval index from a BED-like file, scans any
//! number of compressed VCF files concurrently, and writes each matching
//! PASS record once per (chrom, pos, ref, alt) key.
//!
//! # Features
//!
//! - Interval containment queries backed by rust-lapper
//! - One scan task per input file on a bounded rayon pool
//! - Bounded results queue with a single dedup consumer
//! - gzip (including BGZF), bzip2 or plain input, LF/CRLF/CR line endings
//!
//! # Example
//!
//! ```ignore
//! use vcf_intersect::{run, ScanConfig};
//!
//! let config = ScanConfig::new("targets.bed", "calls/*.vcf.gz");
//! let mut out = std::io::stdout();
//! let summary = run(&config, &mut out)?;
//! for (key, count) in summary.seen.sorted() {
//!     println!("{} {}", key, count);
//! }
//! ```

pub mod core;
pub mod formats;
pub mod pipeline;

// Re-export commonly used types
pub use core::{
    canonical_chrom, ChromIntervals, ConfigError, IntersectError, IntervalIndex,
    IntervalParseError, Result, VariantFileError,
};
pub use formats::{bed, vcf, VariantKey};
pub use pipeline::{run, scan_files, RunSummary, ScanConfig, SeenSet};
