//! Input layer: file opening, decompression and the tabular line reader
//!
//! Variant files are read through [`open_input`], which picks buffered or
//! memory-mapped access and unwraps gzip/bzip2 containers. [`TabularReader`]
//! then works out which end-of-line convention the stream uses from its
//! first line and yields raw records of unbounded length.

use memchr::{memchr2, memchr_iter};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Threshold for using memory mapping (100MB)
pub const MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;

/// A raw file reader that picks buffered or memory-mapped access by size
pub enum SmartReader {
    /// Buffered reader for smaller files
    Buffered(BufReader<File>),
    /// Memory-mapped reader for large files
    Mapped(MappedReader),
}

/// Memory-mapped file reader
pub struct MappedReader {
    mmap: Mmap,
    position: usize,
}

impl MappedReader {
    pub fn new(file: &File) -> io::Result<Self> {
        // SAFETY: inputs are not modified while a scan is running
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }
}

impl Read for MappedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.mmap[self.position..];
        let to_read = buf.len().min(remaining.len());
        buf[..to_read].copy_from_slice(&remaining[..to_read]);
        self.position += to_read;
        Ok(to_read)
    }
}

impl BufRead for MappedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&self.mmap[self.position..])
    }

    fn consume(&mut self, amt: usize) {
        self.position = (self.position + amt).min(self.mmap.len());
    }
}

impl SmartReader {
    /// Open a file, memory-mapping it at or above [`MMAP_THRESHOLD`]
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len();

        if file_size >= MMAP_THRESHOLD {
            Ok(SmartReader::Mapped(MappedReader::new(&file)?))
        } else {
            Ok(SmartReader::Buffered(BufReader::with_capacity(
                DEFAULT_BUFFER_SIZE,
                file,
            )))
        }
    }

    /// Check if using memory mapping
    pub fn is_mapped(&self) -> bool {
        matches!(self, SmartReader::Mapped(_))
    }
}

impl Read for SmartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SmartReader::Buffered(reader) => reader.read(buf),
            SmartReader::Mapped(reader) => reader.read(buf),
        }
    }
}

impl BufRead for SmartReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            SmartReader::Buffered(reader) => reader.fill_buf(),
            SmartReader::Mapped(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            SmartReader::Buffered(reader) => reader.consume(amt),
            SmartReader::Mapped(reader) => reader.consume(amt),
        }
    }
}

/// Compression container of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz, including multi-member BGZF)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

/// Detect compression from magic bytes, falling back to the extension
///
/// Magic bytes win because `.vcf.gz` files are sometimes plain text.
pub fn detect_compression<R: BufRead>(reader: &mut R, path: &Path) -> io::Result<CompressionFormat> {
    let magic = reader.fill_buf()?;

    if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        return Ok(CompressionFormat::Gzip);
    }
    // BZ2 magic: "BZh"
    if magic.len() >= 3 && &magic[..3] == b"BZh" {
        return Ok(CompressionFormat::Bzip2);
    }
    if !magic.is_empty() {
        return Ok(CompressionFormat::Plain);
    }

    // Empty file: let the extension decide so the decoder reports it
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") | Some("bgz") => Ok(CompressionFormat::Gzip),
        Some("bz2") => Ok(CompressionFormat::Bzip2),
        _ => Ok(CompressionFormat::Plain),
    }
}

/// Open a possibly-compressed file as a buffered byte stream
pub fn open_input<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let mut raw = SmartReader::open(path)?;

    let reader: Box<dyn BufRead + Send> = match detect_compression(&mut raw, path)? {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            flate2::read::MultiGzDecoder::new(raw),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::MultiBzDecoder::new(raw),
        )),
        CompressionFormat::Plain => Box::new(raw),
    };

    Ok(reader)
}

/// End-of-line convention of a tabular stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// bare `\r`
    Cr,
}

impl LineEnding {
    /// Byte a record read scans up to
    pub fn delimiter(self) -> u8 {
        match self {
            LineEnding::Lf | LineEnding::CrLf => b'\n',
            LineEnding::Cr => b'\r',
        }
    }

    /// Marker bytes
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
            LineEnding::Cr => b"\r",
        }
    }

    /// Number of marker bytes stripped from each record
    pub fn marker_len(self) -> usize {
        self.as_bytes().len()
    }

    /// Strip this marker from the end of a raw record, if present
    ///
    /// A final record without terminator is returned unchanged. A stray bare
    /// `\n` inside a CRLF stream is still stripped.
    pub fn strip(self, raw: &[u8]) -> &[u8] {
        match raw.strip_suffix(self.as_bytes()) {
            Some(stripped) => stripped,
            None if self == LineEnding::CrLf => raw.strip_suffix(b"\n").unwrap_or(raw),
            None => raw,
        }
    }
}

/// Split a stripped record into its tab-separated columns
pub fn split_columns(line: &[u8]) -> Vec<&[u8]> {
    let mut columns = Vec::with_capacity(10);
    let mut start = 0;
    for tab in memchr_iter(b'\t', line) {
        columns.push(&line[start..tab]);
        start = tab + 1;
    }
    columns.push(&line[start..]);
    columns
}

/// Line reader for tab-separated streams with a discovered line ending
///
/// The first line is consumed at construction; it is the format/version
/// line for VCF input and is exposed through [`TabularReader::first_line`].
pub struct TabularReader<R: BufRead> {
    reader: R,
    line_ending: LineEnding,
    first_line: Option<String>,
}

impl<R: BufRead> TabularReader<R> {
    /// Read the first line and detect the stream's line ending
    ///
    /// Streams without any terminator are treated as LF.
    pub fn new(mut reader: R) -> io::Result<Self> {
        let (first, line_ending) = read_first_line(&mut reader)?;
        let first_line = match first {
            Some(bytes) => Some(
                String::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            ),
            None => None,
        };

        Ok(Self {
            reader,
            line_ending,
            first_line,
        })
    }

    /// Leading line with its terminator stripped, None for an empty stream
    pub fn first_line(&self) -> Option<&str> {
        self.first_line.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Read the next raw record into `buf`, terminator included
    ///
    /// Returns the number of bytes read; 0 means end of stream.
    pub fn read_raw(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        buf.clear();
        self.reader.read_until(self.line_ending.delimiter(), buf)
    }

    /// Strip the detected terminator from a record returned by `read_raw`
    pub fn strip<'a>(&self, raw: &'a [u8]) -> &'a [u8] {
        self.line_ending.strip(raw)
    }
}

/// Consume bytes up to the first `\n` or `\r`, classifying the terminator
fn read_first_line<R: BufRead>(reader: &mut R) -> io::Result<(Option<Vec<u8>>, LineEnding)> {
    let mut line = Vec::new();
    let mut seen_any = false;

    loop {
        let (done, used, found) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                (true, 0, None)
            } else {
                seen_any = true;
                match memchr2(b'\n', b'\r', available) {
                    Some(i) => {
                        line.extend_from_slice(&available[..i]);
                        (true, i + 1, Some(available[i]))
                    }
                    None => {
                        line.extend_from_slice(available);
                        (false, available.len(), None)
                    }
                }
            }
        };
        reader.consume(used);

        if done {
            let line_ending = match found {
                Some(b'\r') => {
                    // CR followed by LF is CRLF; a lone CR is old-Mac style
                    let next = reader.fill_buf()?;
                    if next.first() == Some(&b'\n') {
                        reader.consume(1);
                        LineEnding::CrLf
                    } else {
                        LineEnding::Cr
                    }
                }
                _ => LineEnding::Lf,
            };
            return Ok((seen_any.then_some(line), line_ending));
        }
    }
}
