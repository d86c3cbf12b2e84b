//! Command-line interface for the cycle log extractor.
//!
//! Converts every JSON cycle log in a directory into Parquet files holding the
//! flattened operations of one kind.

use anyhow::Result;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use cycle_extract::{CycleReader, OperationKind, ParquetWriter};
use log::{info, LevelFilter};
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flatten battery cycle logs into Parquet tables",
    long_about = "Extracts the charge or discharge operations of battery cycle logs (JSON documents \
                  holding a `cycle` list) into one flat table per file, written as Parquet.\n\n\
                  Every row carries its operation_id, temperature, type and start_time."
)]
struct Args {
    /// Directory containing .json cycle logs
    #[arg(value_name = "IN_DIR")]
    in_dir: String,

    /// Root output directory for converted Parquet files
    #[arg(short, long, value_name = "OUT_ROOT")]
    out_root: String,

    /// Operation type to extract: charge or discharge
    #[arg(long, value_name = "TYPE")]
    operation: String,

    /// Number of rows per Parquet file chunk
    #[arg(long, default_value = "50000")]
    chunk_size: usize,

    /// Log the first N rows of each extracted table
    #[arg(long, default_value = "0")]
    preview: usize,
}

fn convert_one_file(
    input_file: &Path,
    output_dir: &Path,
    kind: OperationKind,
    args: &Args,
) -> Result<()> {
    info!("📄 Processing: {}", input_file.to_string_lossy());

    let start_time = Instant::now();

    let t0 = Instant::now();
    let reader = CycleReader::from_file(input_file)?;
    info!(
        "   ├─ Loaded {} cycles in {:.2?}",
        reader.cycle_count(),
        t0.elapsed()
    );
    for (type_name, count) in reader.operation_counts() {
        info!("   ├─ {} {} operation(s)", count, type_name);
    }

    let t1 = Instant::now();
    let table = reader.extract(kind)?;
    info!(
        "   ├─ Extracted {} {} rows in {:.2?}",
        table.num_rows(),
        kind,
        t1.elapsed()
    );

    if args.preview > 0 {
        let head = table.slice(0, args.preview.min(table.num_rows()));
        info!("\n{}", pretty_format_batches(&[head])?);
    }

    let t2 = Instant::now();
    let stats = ParquetWriter::new(output_dir)
        .chunk_size(args.chunk_size)
        .write_with_stats(&table)?;

    info!("   ├─ Wrote Parquet in {:.2?}", t2.elapsed());
    info!("   ├─ {}", stats.summary());
    info!("   └─ ✓ Total time: {:.2?}\n", start_time.elapsed());

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let kind: OperationKind = args.operation.parse()?;

    let in_path = Path::new(&args.in_dir);
    let out_path = Path::new(&args.out_root);

    if !in_path.is_dir() {
        anyhow::bail!("'{}' is not a valid directory", args.in_dir);
    }

    let mut input_files: Vec<_> = fs::read_dir(in_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect();
    input_files.sort();

    if input_files.is_empty() {
        info!("No .json files found in {}", args.in_dir);
        return Ok(());
    }

    info!("");
    info!("📂 Found {} cycle log(s) in {}", input_files.len(), args.in_dir);
    info!("📁 Output directory: {}", args.out_root);
    info!("🔋 Operation type: {}", kind);
    info!("📊 Chunk size: {} rows per file", args.chunk_size);
    info!("");

    let total_start = Instant::now();
    let mut failures = 0;

    for (idx, input_file) in input_files.iter().enumerate() {
        let file_name = input_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        info!("[{}/{}]", idx + 1, input_files.len());

        let output_dir = out_path
            .join(format!("filename={}", file_name))
            .join(format!("operation={}", kind));
        fs::create_dir_all(&output_dir)?;

        if let Err(e) = convert_one_file(input_file, &output_dir, kind, &args) {
            log::error!("   └─ ✗ Error: {}", e);
            log::error!("");
            failures += 1;
            continue;
        }
    }

    info!("═══════════════════════════════════════════");
    info!(
        "🏁 {} of {} files processed in {:.2?}",
        input_files.len() - failures,
        input_files.len(),
        total_start.elapsed()
    );
    info!("");

    Ok(())
}
