//! Error types for vcf-intersect
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vcf-intersect operations
#[derive(Debug, Error)]
pub enum IntersectError {
    /// Bad or missing run configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Interval (BED) file errors
    #[error("Interval file error: {0}")]
    Interval(#[from] IntervalParseError),

    /// Variant (VCF) file errors
    #[error("Variant file error: {0}")]
    Variant(#[from] VariantFileError),

    /// The dedup consumer stopped before all workers finished
    #[error("Result consumer stopped unexpectedly: {0}")]
    Consumer(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--bedPath` was empty
    #[error("bedPath required")]
    MissingBedPath,

    /// `--vcfGlob` was empty
    #[error("vcfGlob required")]
    MissingVcfGlob,

    /// The glob pattern could not be compiled
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The glob pattern matched nothing
    #[error("No files matched glob pattern '{0}'")]
    NoMatches(String),

    /// A glob entry could not be read
    #[error("Cannot read glob match {path}: {message}")]
    UnreadableMatch { path: PathBuf, message: String },

    /// The results queue needs room for at least one message
    #[error("Queue capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// Errors that can occur while building the interval index
#[derive(Debug, Error)]
pub enum IntervalParseError {
    /// Row has fewer than chrom/start/end columns
    #[error("Too few fields at line {line}: expected at least 3, found {found}")]
    TooFewFields { line: usize, found: usize },

    /// Failed to parse integer
    #[error("Failed to parse integer '{value}' at line {line}: {message}")]
    ParseInt {
        line: usize,
        value: String,
        message: String,
    },

    /// Column is not valid UTF-8
    #[error("Invalid UTF-8 in field {field} at line {line}")]
    InvalidUtf8 { line: usize, field: &'static str },

    /// File not found
    #[error("Interval file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while scanning a variant file
#[derive(Debug, Error)]
pub enum VariantFileError {
    /// Leading line does not carry the expected file format marker
    #[error("Not a VCF file: {path} (first line: '{found}')")]
    NotVcf { path: PathBuf, found: String },

    /// No `#CHROM` column header before the first record
    #[error("No header found in {0}")]
    MissingHeader(PathBuf),

    /// Record ends before the FILTER column
    #[error("Too few fields in {path} at line {line}: expected at least {expected}, found {found}")]
    TooFewFields {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// POS column is not an integer
    #[error("Invalid position '{value}' in {path} at line {line}")]
    InvalidPosition {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// Column is not valid UTF-8
    #[error("Invalid UTF-8 in field {field} in {path} at line {line}")]
    InvalidUtf8 {
        path: PathBuf,
        line: usize,
        field: &'static str,
    },

    /// I/O error while opening or decompressing
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VariantFileError {
    /// Wrap an I/O error with the file it came from
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VariantFileError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for vcf-intersect operations
pub type Result<T> = std::result::Result<T, IntersectError>;

/// Result type alias for interval file parsing
pub type IntervalResult<T> = std::result::Result<T, IntervalParseError>;

/// Result type alias for variant file scanning
pub type VariantResult<T> = std::result::Result<T, VariantFileError>;
