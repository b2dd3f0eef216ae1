//! BED format adapter
//!
//! Reads the interval definitions that drive the scan: tab-separated
//! `chrom start end [...]` rows, parsed with zero-copy views.

use crate::core::{open_input, split_columns, IntervalParseError, IntervalResult};
use std::io::{self, BufRead};
use std::path::Path;

/// Zero-copy BED record view
///
/// Only chrom, start and end are parsed; trailing columns are ignored.
pub struct BedRecordView<'a> {
    /// Chromosome name as written in the file
    pub chrom: &'a str,
    /// Start position
    pub start: u64,
    /// End position (inclusive)
    pub end: u64,
    field_count: usize,
}

impl<'a> BedRecordView<'a> {
    /// Parse a BED line (terminator already stripped)
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse(line: &'a [u8], line_no: usize) -> IntervalResult<Self> {
        let columns = split_columns(line);
        if columns.len() < 3 {
            return Err(IntervalParseError::TooFewFields {
                line: line_no,
                found: columns.len(),
            });
        }

        let field = |i: usize, name: &'static str| {
            std::str::from_utf8(columns[i]).map_err(|_| IntervalParseError::InvalidUtf8 {
                line: line_no,
                field: name,
            })
        };

        let chrom = field(0, "chrom")?;
        let start = parse_coordinate(field(1, "start")?, line_no)?;
        let end = parse_coordinate(field(2, "end")?, line_no)?;

        Ok(Self {
            chrom,
            start,
            end,
            field_count: columns.len(),
        })
    }

    /// Number of columns in the row
    pub fn field_count(&self) -> usize {
        self.field_count
    }
}

fn parse_coordinate(value: &str, line_no: usize) -> IntervalResult<u64> {
    value.parse().map_err(|e: std::num::ParseIntError| IntervalParseError::ParseInt {
        line: line_no,
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Whether a BED line carries no interval (blank, comment, track/browser)
fn is_bed_header(line: &[u8]) -> bool {
    line.is_empty()
        || line[0] == b'#'
        || line.starts_with(b"track")
        || line.starts_with(b"browser")
}

/// Read every interval row of a BED file
///
/// Returns `(chrom, start, end)` in file order with chromosome names as
/// written. Any malformed row aborts the read. An empty file yields no rows.
pub fn read_bed_intervals(path: &Path) -> IntervalResult<Vec<(String, u64, u64)>> {
    let reader = open_input(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IntervalParseError::FileNotFound(path.to_path_buf()),
        _ => IntervalParseError::Io(e),
    })?;
    read_bed_reader(reader)
}

/// Read interval rows from any buffered reader
pub fn read_bed_reader<R: BufRead>(mut reader: R) -> IntervalResult<Vec<(String, u64, u64)>> {
    let mut rows = Vec::new();
    let mut buf = Vec::with_capacity(256);
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if is_bed_header(line) {
            continue;
        }

        let view = BedRecordView::parse(line, line_no)?;
        rows.push((view.chrom.to_string(), view.start, view.end));
    }

    log::debug!("Read {} interval rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bed_record_view_bed3() {
        let view = BedRecordView::parse(b"chr1\t100\t200", 1).unwrap();
        assert_eq!(view.chrom, "chr1");
        assert_eq!(view.start, 100);
        assert_eq!(view.end, 200);
        assert_eq!(view.field_count(), 3);
    }

    #[test]
    fn test_bed_record_view_extra_columns() {
        let view = BedRecordView::parse(b"1\t100\t200\tgeneA\t0\t+", 1).unwrap();
        assert_eq!(view.chrom, "1");
        assert_eq!(view.end, 200);
        assert_eq!(view.field_count(), 6);
    }

    #[test]
    fn test_bed_record_view_trailing_tab() {
        let view = BedRecordView::parse(b"1\t100\t200\t", 1).unwrap();
        assert_eq!(view.end, 200);
        assert_eq!(view.field_count(), 4);
    }

    #[test]
    fn test_bed_record_view_too_few_fields() {
        let result = BedRecordView::parse(b"chr1\t100", 7);
        assert!(matches!(
            result,
            Err(IntervalParseError::TooFewFields { line: 7, found: 2 })
        ));
    }

    #[test]
    fn test_bed_record_view_bad_integer() {
        let result = BedRecordView::parse(b"chr1\tabc\t200", 3);
        match result {
            Err(IntervalParseError::ParseInt { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            _ => panic!("expected ParseInt error"),
        }
    }

    #[test]
    fn test_read_bed_reader_skips_headers() {
        let data = b"track name=test\n#comment\n\n1\t100\t200\nchr2\t5\t10\r\n";
        let rows = read_bed_reader(Cursor::new(&data[..])).unwrap();
        assert_eq!(
            rows,
            vec![("1".to_string(), 100, 200), ("chr2".to_string(), 5, 10)]
        );
    }

    #[test]
    fn test_read_bed_reader_reports_line_number() {
        let data = b"1\t100\t200\n1\t300\tx\n";
        let result = read_bed_reader(Cursor::new(&data[..]));
        assert!(matches!(
            result,
            Err(IntervalParseError::ParseInt { line: 2, .. })
        ));
    }

    #[test]
    fn test_read_bed_reader_empty() {
        let rows = read_bed_reader(Cursor::new(&b""[..])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_bed_missing_file() {
        let result = read_bed_intervals(Path::new("/nonexistent/targets.bed"));
        assert!(matches!(result, Err(IntervalParseError::FileNotFound(_))));
    }
}
