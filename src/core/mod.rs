//! Core interval and input functionality
//!
//! This module contains the error taxonomy, the per-chromosome interval
//! index with its containment queries, and the input/line-reading layer.

mod error;
mod index;
pub mod io;

pub use error::{
    ConfigError, IntersectError, IntervalParseError, IntervalResult, Result, VariantFileError,
    VariantResult,
};
pub use index::{canonical_chrom, ChromIntervals, IntervalIndex, PositionInterval, CHROM_PREFIX};
pub use io::{
    open_input, split_columns, CompressionFormat, LineEnding, SmartReader, TabularReader,
    DEFAULT_BUFFER_SIZE, MMAP_THRESHOLD,
};
