//! Scan pipeline: coordinator, worker pool and dedup consumer
//!
//! The coordinator builds the interval index, echoes the header of the
//! first matched file, then fans the files out over a bounded rayon pool.
//! Workers publish matches into a bounded crossbeam channel drained by a
//! single consumer thread. The first fatal error raises a shared cancel
//! flag; peers stop at their next record and the error is returned.

pub mod consumer;
pub mod worker;

pub use consumer::{Deduplicator, ResultMessage, SeenSet};
pub use worker::{scan_file, scan_records, ScanStats};

use crate::core::{ConfigError, IntersectError, IntervalIndex, Result};
use crate::formats::{open_vcf, write_header};
use crossbeam_channel::bounded;
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// Default worker-pool size
pub const DEFAULT_THREADS: usize = 16;

/// Default results-queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// BED-like interval file
    pub bed_path: PathBuf,
    /// Glob selecting the variant files
    pub vcf_glob: String,
    /// Upper bound on concurrently scanned files
    pub threads: usize,
    /// Results-queue capacity; full queues block workers
    pub queue_capacity: usize,
}

impl ScanConfig {
    pub fn new(bed_path: impl Into<PathBuf>, vcf_glob: impl Into<String>) -> Self {
        Self {
            bed_path: bed_path.into(),
            vcf_glob: vcf_glob.into(),
            threads: DEFAULT_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.bed_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingBedPath);
        }
        if self.vcf_glob.is_empty() {
            return Err(ConfigError::MissingVcfGlob);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

/// Outcome of a completed run
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    /// Variant files scanned
    pub files: usize,
    /// Header lines echoed from the first file
    pub header_lines: usize,
    /// Data records read across all files
    pub records: usize,
    /// Matches published by workers, duplicates included
    pub matches: usize,
    /// Final occurrence count per key
    pub seen: SeenSet,
}

impl RunSummary {
    /// Lines written to output (one per distinct key)
    pub fn emitted(&self) -> usize {
        self.seen.len()
    }

    /// Matches dropped as repeats of an already-emitted key
    pub fn duplicates(&self) -> usize {
        self.matches - self.seen.len()
    }
}

/// Expand a glob into the sorted list of matching paths
pub fn expand_glob(pattern: &str) -> std::result::Result<Vec<PathBuf>, ConfigError> {
    let entries = glob::glob(pattern).map_err(|e| ConfigError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => {
                return Err(ConfigError::UnreadableMatch {
                    path: e.path().to_path_buf(),
                    message: e.error().to_string(),
                })
            }
        }
    }

    if files.is_empty() {
        return Err(ConfigError::NoMatches(pattern.to_string()));
    }

    files.sort();
    Ok(files)
}

/// Build the index, expand the glob and scan every match into `out`
pub fn run<W: Write + Send>(config: &ScanConfig, out: &mut W) -> Result<RunSummary> {
    config.validate()?;

    let index = IntervalIndex::from_bed_file(&config.bed_path)?;
    log::info!(
        "Loaded {} intervals on {} chromosomes from {}",
        index.total_intervals(),
        index.chroms().count(),
        config.bed_path.display()
    );

    let files = expand_glob(&config.vcf_glob)?;
    log::info!("Scanning {} files matching {}", files.len(), config.vcf_glob);

    scan_files(&index, &files, config.threads, config.queue_capacity, out)
}

/// Echo the first file's header, then scan all files concurrently
///
/// `files` must not be empty. Output order of matching lines follows queue
/// arrival, which is not deterministic across runs.
pub fn scan_files<W: Write + Send>(
    index: &IntervalIndex,
    files: &[PathBuf],
    threads: usize,
    queue_capacity: usize,
    out: &mut W,
) -> Result<RunSummary> {
    let first = files.first().ok_or(ConfigError::NoMatches(String::new()))?;
    let header_lines = echo_header(first, out)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.clamp(1, files.len()))
        .thread_name(|i| format!("scan-worker-{}", i))
        .build()
        .map_err(|e| IntersectError::Io(std::io::Error::other(format!(
            "Failed to create thread pool: {}",
            e
        ))))?;

    let (tx, rx) = bounded::<ResultMessage>(queue_capacity.max(1));
    let cancel = AtomicBool::new(false);
    let records = AtomicUsize::new(0);
    let matches = AtomicUsize::new(0);

    let (scan_result, consumer_result) = thread::scope(|scope| {
        let consumer = scope.spawn(move || Deduplicator::new(out).drain(rx));

        // Every sender clone lives inside the pool; all are dropped once
        // `install` returns, which closes the queue for the consumer.
        let scan_result = pool.install(|| {
            files.par_iter().try_for_each_with(tx, |tx, path| {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(());
                }
                match scan_file(path, index, tx, &cancel) {
                    Ok(stats) => {
                        records.fetch_add(stats.records, Ordering::Relaxed);
                        matches.fetch_add(stats.matches, Ordering::Relaxed);
                        Ok(())
                    }
                    Err(e) => {
                        log::debug!("{}: aborting run: {}", path.display(), e);
                        cancel.store(true, Ordering::Relaxed);
                        Err(e)
                    }
                }
            })
        });

        (scan_result, consumer.join())
    });

    let seen = match (scan_result, consumer_result) {
        // A closed queue means the consumer failed first; report its error
        (Err(IntersectError::Consumer(_)), Ok(Err(e))) => return Err(e.into()),
        (Err(e), _) => return Err(e),
        (Ok(()), Ok(Ok(seen))) => seen,
        (Ok(()), Ok(Err(e))) => return Err(e.into()),
        (Ok(()), Err(_)) => {
            return Err(IntersectError::Consumer("consumer thread panicked".to_string()))
        }
    };

    Ok(RunSummary {
        files: files.len(),
        header_lines,
        records: records.into_inner(),
        matches: matches.into_inner(),
        seen,
    })
}

/// Validate the first file and copy its header to `out`
fn echo_header<W: Write>(path: &Path, out: &mut W) -> Result<usize> {
    let mut reader = open_vcf(path)?;
    let lines = write_header(&mut reader, path, out)?;
    out.flush()?;
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ScanConfig::new("a.bed", "*.vcf.gz");
        assert_eq!(config.threads, DEFAULT_THREADS);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            ScanConfig::new("", "*.vcf.gz").validate(),
            Err(ConfigError::MissingBedPath)
        ));
        assert!(matches!(
            ScanConfig::new("a.bed", "").validate(),
            Err(ConfigError::MissingVcfGlob)
        ));
        assert!(matches!(
            ScanConfig::new("a.bed", "*.vcf.gz").with_queue_capacity(0).validate(),
            Err(ConfigError::ZeroQueueCapacity)
        ));
    }

    #[test]
    fn test_expand_glob_no_matches() {
        let result = expand_glob("/nonexistent-dir-for-test/*.vcf.gz");
        assert!(matches!(result, Err(ConfigError::NoMatches(_))));
    }

    #[test]
    fn test_expand_glob_invalid_pattern() {
        let result = expand_glob("[unclosed");
        assert!(matches!(result, Err(ConfigError::InvalidGlob { .. })));
    }

    #[test]
    fn test_expand_glob_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.vcf.gz", "a.vcf.gz", "c.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pattern = format!("{}/*.vcf.gz", dir.path().display());
        let files = expand_glob(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.vcf.gz", "b.vcf.gz"]);
    }

    #[test]
    fn test_scan_files_empty_list() {
        let index = IntervalIndex::default();
        let mut out = Vec::new();
        let result = scan_files(&index, &[], 1, 1, &mut out);
        assert!(matches!(
            result,
            Err(IntersectError::Config(ConfigError::NoMatches(_)))
        ));
    }
}
