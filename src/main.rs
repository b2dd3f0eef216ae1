//! vcf-intersect CLI entry point
//!
//! Streams deduplicated VCF records inside BED intervals to stdout and
//! reports per-variant occurrence counts on the log.

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;
use vcf_intersect::pipeline::{DEFAULT_QUEUE_CAPACITY, DEFAULT_THREADS};
use vcf_intersect::{run, ScanConfig};

#[derive(Parser)]
#[command(name = "vcf-intersect")]
#[command(about = "Emit VCF records that fall inside BED intervals, once per variant")]
#[command(version)]
struct Cli {
    /// BED-like interval file (chrom, start, end)
    #[arg(long = "bedPath")]
    bed_path: Option<PathBuf>,

    /// Glob pattern selecting the compressed VCF files
    #[arg(long = "vcfGlob")]
    vcf_glob: Option<String>,

    /// Maximum number of files scanned at once
    #[arg(short = 't', long, default_value_t = DEFAULT_THREADS)]
    threads: usize,

    /// Capacity of the results queue between workers and the writer
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    // Missing flags surface as configuration errors from the library
    let config = ScanConfig::new(
        cli.bed_path.unwrap_or_default(),
        cli.vcf_glob.unwrap_or_default(),
    )
    .with_threads(cli.threads)
    .with_queue_capacity(cli.queue_capacity);

    eprintln!("Loading interval file: {:?}", config.bed_path);

    let mut out = BufWriter::with_capacity(128 * 1024, io::stdout());
    let summary = run(&config, &mut out).context("Scan failed")?;

    for (key, count) in summary.seen.sorted() {
        log::info!("Saw {} {} times", key, count);
    }

    eprintln!("\n=== Scan Statistics ===");
    eprintln!("Files scanned:   {}", summary.files);
    eprintln!("Records read:    {}", summary.records);
    eprintln!("Matches:         {}", summary.matches);
    eprintln!("Unique variants: {}", summary.emitted());
    eprintln!("Duplicates:      {}", summary.duplicates());
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
