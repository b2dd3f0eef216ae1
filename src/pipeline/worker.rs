//! Per-file scan worker
//!
//! Opens one variant file, validates its version line and streams its
//! records through the PASS filter and the interval index. Matches are
//! published as [`ResultMessage`]s.

use crate::core::{IntersectError, IntervalIndex, Result, TabularReader, VariantFileError};
use crate::formats::{open_vcf, VcfRecordView};
use crate::pipeline::consumer::ResultMessage;
use crossbeam_channel::Sender;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-file scan statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Data records read (header and comment lines excluded)
    pub records: usize,
    /// Records published to the results queue
    pub matches: usize,
}

/// Scan one variant file, sending matches to `results`
///
/// Returns early, without error, once `cancel` is raised by a failing peer.
pub fn scan_file(
    path: &Path,
    index: &IntervalIndex,
    results: &Sender<ResultMessage>,
    cancel: &AtomicBool,
) -> Result<ScanStats> {
    let mut reader = open_vcf(path)?;

    let stats = scan_records(&mut reader, path, index, cancel, |message| {
        results
            .send(message)
            .map_err(|_| IntersectError::Consumer("results queue closed".to_string()))
    })?;

    log::debug!(
        "{}: {} records, {} matches",
        path.display(),
        stats.records,
        stats.matches
    );
    Ok(stats)
}

/// Scan records from an already-validated reader
///
/// Comment lines and non-PASS records are skipped, as are records on
/// chromosomes absent from the index. A malformed POS on a record that
/// reaches the interval lookup is fatal.
pub fn scan_records<R, F>(
    reader: &mut TabularReader<R>,
    path: &Path,
    index: &IntervalIndex,
    cancel: &AtomicBool,
    mut publish: F,
) -> Result<ScanStats>
where
    R: BufRead,
    F: FnMut(ResultMessage) -> Result<()>,
{
    let mut stats = ScanStats::default();
    let mut buf = Vec::with_capacity(4096);
    // Line 1 is the version line consumed by the reader
    let mut line_no = 1;

    loop {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("{}: cancelled at line {}", path.display(), line_no);
            break;
        }

        let n = reader
            .read_raw(&mut buf)
            .map_err(|e| VariantFileError::io(path, e))?;
        if n == 0 {
            break;
        }
        line_no += 1;

        if buf[0] == b'#' {
            continue;
        }

        let line = reader.strip(&buf);
        if line.is_empty() {
            continue;
        }
        stats.records += 1;

        let view = VcfRecordView::parse(line).map_err(|e| e.at(path, line_no))?;
        if !view.is_pass() {
            continue;
        }

        let chrom = view.chrom().map_err(|e| e.at(path, line_no))?;
        let Some(intervals) = index.get(chrom) else {
            continue;
        };

        let pos = view.pos().map_err(|e| e.at(path, line_no))?;
        if !intervals.contains(pos) {
            continue;
        }

        let key = view.variant_key().map_err(|e| e.at(path, line_no))?;
        stats.matches += 1;
        publish(ResultMessage {
            key,
            line: std::mem::take(&mut buf),
        })?;
    }

    Ok(stats)
}
