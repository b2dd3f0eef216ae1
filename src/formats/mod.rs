//! File format adapters
//!
//! Adapters for the interval (BED) and variant (VCF) inputs.

pub mod bed;
pub mod vcf;

pub use bed::{read_bed_intervals, read_bed_reader, BedRecordView};
pub use vcf::{
    is_vcf_version_line, open_vcf, write_header, VariantKey, VcfParseError, VcfReader,
    VcfRecordView,
};
