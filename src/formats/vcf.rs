//! VCF format adapter
//!
//! Zero-copy record views, variant identity keys, version-line validation
//! and the header pass over the first input file.

use crate::core::{
    canonical_chrom, open_input, split_columns, IntersectError, TabularReader, VariantFileError,
    VariantResult,
};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

pub const CHROM_IDX: usize = 0;
pub const POS_IDX: usize = 1;
pub const ID_IDX: usize = 2;
pub const REF_IDX: usize = 3;
pub const ALT_IDX: usize = 4;
pub const QUAL_IDX: usize = 5;
pub const FILTER_IDX: usize = 6;
pub const INFO_IDX: usize = 7;
pub const FORMAT_IDX: usize = 8;

/// Columns a record needs to reach FILTER
pub const MIN_FIELDS: usize = FILTER_IDX + 1;

/// Marker the leading line must contain
pub const VERSION_MARKER: &str = "##fileformat=VCFv4";

/// First column of the column-header row
pub const COLUMN_HEADER: &str = "#CHROM";

/// The only FILTER value that is scanned
pub const FILTER_PASS: &str = "PASS";

/// Separator between the parts of a [`VariantKey`]
pub const KEY_SEPARATOR: char = '_';

/// Type alias for the reader returned by [`open_vcf`]
pub type VcfReader = TabularReader<Box<dyn BufRead + Send>>;

/// Zero-copy VCF record view
///
/// Columns are split once; individual fields are decoded lazily so that
/// filtered-out records never pay for UTF-8 checks or integer parsing.
pub struct VcfRecordView<'a> {
    columns: Vec<&'a [u8]>,
}

impl<'a> VcfRecordView<'a> {
    /// Split a record (terminator already stripped) into columns
    pub fn parse(line: &'a [u8]) -> Result<Self, VcfParseError> {
        if line.is_empty() {
            return Err(VcfParseError::EmptyLine);
        }

        let columns = split_columns(line);
        if columns.len() < MIN_FIELDS {
            return Err(VcfParseError::TooFewFields {
                expected: MIN_FIELDS,
                found: columns.len(),
            });
        }

        Ok(Self { columns })
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Raw bytes of a column
    pub fn raw_field(&self, index: usize) -> Option<&'a [u8]> {
        self.columns.get(index).copied()
    }

    /// Get field as string slice (lazy access)
    pub fn field(&self, index: usize, name: &'static str) -> Result<&'a str, VcfParseError> {
        let raw = self.raw_field(index).unwrap_or_default();
        std::str::from_utf8(raw).map_err(|_| VcfParseError::InvalidUtf8(name))
    }

    pub fn chrom(&self) -> Result<&'a str, VcfParseError> {
        self.field(CHROM_IDX, "CHROM")
    }

    /// Parse POS (1-based)
    pub fn pos(&self) -> Result<u64, VcfParseError> {
        let pos_str = self.field(POS_IDX, "POS")?;
        pos_str
            .parse()
            .map_err(|_| VcfParseError::InvalidNumber("POS", pos_str.to_string()))
    }

    pub fn id(&self) -> Result<&'a str, VcfParseError> {
        self.field(ID_IDX, "ID")
    }

    pub fn ref_allele(&self) -> Result<&'a str, VcfParseError> {
        self.field(REF_IDX, "REF")
    }

    pub fn alt_alleles(&self) -> Result<&'a str, VcfParseError> {
        self.field(ALT_IDX, "ALT")
    }

    pub fn qual(&self) -> Result<&'a str, VcfParseError> {
        self.field(QUAL_IDX, "QUAL")
    }

    /// FILTER column as raw bytes
    pub fn filter(&self) -> &'a [u8] {
        self.columns[FILTER_IDX]
    }

    /// Whether FILTER is exactly `PASS`
    pub fn is_pass(&self) -> bool {
        self.filter() == FILTER_PASS.as_bytes()
    }

    /// INFO column, absent in truncated sites-only records
    pub fn info(&self) -> Option<&'a str> {
        if self.field_count() > INFO_IDX {
            self.field(INFO_IDX, "INFO").ok()
        } else {
            None
        }
    }

    /// FORMAT column if present
    pub fn format(&self) -> Option<&'a str> {
        if self.field_count() > FORMAT_IDX {
            self.field(FORMAT_IDX, "FORMAT").ok()
        } else {
            None
        }
    }

    /// Sample columns
    pub fn samples(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.columns.iter().skip(FORMAT_IDX + 1).copied()
    }

    /// Identity of this variant: canonical chrom, POS text, REF and ALT
    pub fn variant_key(&self) -> Result<VariantKey, VcfParseError> {
        Ok(VariantKey::new(
            self.chrom()?,
            self.field(POS_IDX, "POS")?,
            self.ref_allele()?,
            self.alt_alleles()?,
        ))
    }
}

/// VCF record parsing error
#[derive(Debug, thiserror::Error)]
pub enum VcfParseError {
    #[error("Empty line")]
    EmptyLine,

    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid UTF-8 in field: {0}")]
    InvalidUtf8(&'static str),

    #[error("Invalid number in field {0}: {1}")]
    InvalidNumber(&'static str, String),
}

impl VcfParseError {
    /// Attach the file and line a record came from
    pub fn at(self, path: &Path, line: usize) -> VariantFileError {
        let path = path.to_path_buf();
        match self {
            VcfParseError::EmptyLine => VariantFileError::TooFewFields {
                path,
                line,
                expected: MIN_FIELDS,
                found: 0,
            },
            VcfParseError::TooFewFields { expected, found } => VariantFileError::TooFewFields {
                path,
                line,
                expected,
                found,
            },
            VcfParseError::InvalidUtf8(field) => {
                VariantFileError::InvalidUtf8 { path, line, field }
            }
            VcfParseError::InvalidNumber(_, value) => {
                VariantFileError::InvalidPosition { path, line, value }
            }
        }
    }
}

/// Deduplication identity of a variant
///
/// `<chrom>_<pos>_<ref>_<alt>` with the chromosome canonicalized, so `1`
/// and `chr1` records share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(chrom: &str, pos: &str, ref_allele: &str, alt: &str) -> Self {
        let chrom = canonical_chrom(chrom);
        let mut key =
            String::with_capacity(chrom.len() + pos.len() + ref_allele.len() + alt.len() + 3);
        key.push_str(&chrom);
        key.push(KEY_SEPARATOR);
        key.push_str(pos);
        key.push(KEY_SEPARATOR);
        key.push_str(ref_allele);
        key.push(KEY_SEPARATOR);
        key.push_str(alt);
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VariantKey> for String {
    fn from(key: VariantKey) -> Self {
        key.0
    }
}

/// Whether a leading line declares a supported VCF version
pub fn is_vcf_version_line(line: &str) -> bool {
    line.contains(VERSION_MARKER)
}

/// Open a variant file and validate its version line
///
/// A missing or foreign version line means the input cannot be trusted.
pub fn open_vcf(path: &Path) -> VariantResult<VcfReader> {
    let input = open_input(path).map_err(|e| VariantFileError::io(path, e))?;
    let reader = TabularReader::new(input).map_err(|e| VariantFileError::io(path, e))?;

    match reader.first_line() {
        Some(line) if is_vcf_version_line(line) => Ok(reader),
        other => Err(VariantFileError::NotVcf {
            path: path.to_path_buf(),
            found: other.unwrap_or_default().chars().take(80).collect(),
        }),
    }
}

/// Copy the header of an opened VCF to `out`
///
/// Writes the version line, then every `#` line up to and including the
/// `#CHROM` row, each with its original terminator. Returns the number of
/// lines written.
pub fn write_header<W: Write>(
    reader: &mut VcfReader,
    path: &Path,
    out: &mut W,
) -> Result<usize, IntersectError> {
    if let Some(version) = reader.first_line() {
        out.write_all(version.as_bytes())?;
        out.write_all(reader.line_ending().as_bytes())?;
    }
    let mut written = 1;

    let mut buf = Vec::with_capacity(1024);
    loop {
        let n = reader
            .read_raw(&mut buf)
            .map_err(|e| VariantFileError::io(path, e))?;
        if n == 0 {
            break;
        }
        if buf.first() != Some(&b'#') {
            continue;
        }

        out.write_all(&buf)?;
        written += 1;

        let line = reader.strip(&buf);
        if split_columns(line)[CHROM_IDX] == COLUMN_HEADER.as_bytes() {
            return Ok(written);
        }
    }

    Err(VariantFileError::MissingHeader(path.to_path_buf()).into())
}
