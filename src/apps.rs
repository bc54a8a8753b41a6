use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::PartitionConfig;
use crate::metrics::PartitionSummary;
use crate::pipeline::run_partition;
use crate::writer::{FileSplitWriter, MemorySplitWriter, SplitSink};

const RULE: &str = "------------------------------";

#[derive(Debug, Parser)]
#[command(
    name = "partition",
    disable_help_subcommand = true,
    about = "Partition labeled samples into quota-driven splits",
    long_about = "Pool samples by canonical label (O, W, N), shuffle them once with a fixed seed, and write each split's per-label quota as one JSON file per sample.",
    after_help = "Without --config the built-in reference experiment is used. Flags override the loaded config."
)]
/// CLI for `partition`.
///
/// Common usage:
/// - Reference experiment from the working directory: `partition`
/// - Explicit config: `--config partition.json`
/// - Repeat `--source <PATH>` to replace configured sources, in read order
/// - Plan only, leave the disk untouched: `--dry-run`
struct PartitionCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON config file; omitted fields keep built-in defaults"
    )]
    config: Option<PathBuf>,
    #[arg(
        long = "source",
        value_name = "PATH",
        help = "Source file or directory, repeat as needed in read order"
    )]
    sources: Vec<PathBuf>,
    #[arg(long = "output-root", value_name = "PATH", help = "Output root override")]
    output_root: Option<PathBuf>,
    #[arg(long, help = "Shuffle seed override")]
    seed: Option<u64>,
    #[arg(
        long = "dry-run",
        help = "Allocate in memory and print the report without touching the output root"
    )]
    dry_run: bool,
}

/// Parse `args_iter` (without the program name), run the partition, and print the report.
pub fn run_partition_app<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<PartitionCli, _>(std::iter::once("partition".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = resolve_config(&cli)?;
    println!(">>> Reading {} source location(s)...", config.sources.len());

    let mut file_sink;
    let mut memory_sink;
    let sink: &mut dyn SplitSink = if cli.dry_run {
        memory_sink = MemorySplitWriter::new();
        &mut memory_sink
    } else {
        file_sink = FileSplitWriter::new(&config.output_root);
        &mut file_sink
    };

    let summary = run_partition(&config, sink)?;
    print!("{}", render_summary(&summary, cli.dry_run));
    Ok(())
}

fn resolve_config(cli: &PartitionCli) -> Result<PartitionConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => PartitionConfig::from_json_file(path)?,
        None => PartitionConfig::default(),
    };
    if !cli.sources.is_empty() {
        config = config.with_sources(cli.sources.iter().cloned());
    }
    if let Some(output_root) = &cli.output_root {
        config = config.with_output_root(output_root.clone());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

/// Human-readable run report: failures, inventory, per-split counts, spare.
pub fn render_summary(summary: &PartitionSummary, dry_run: bool) -> String {
    let mut out = String::new();
    for failure in &summary.source_failures {
        let _ = writeln!(out, "[Error] Skipped {}: {}", failure.source_id, failure.reason);
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "[Raw Inventory] {}", summary.inventory);
    let _ = writeln!(out, "[Total Raw] {}", summary.inventory.total());
    let _ = writeln!(out, "{RULE}");

    for split in &summary.splits {
        let _ = writeln!(out, "Generating Dataset: [{split}] ...");
        for extraction in summary.extractions.iter().filter(|e| &e.split == split) {
            if extraction.is_short() {
                let _ = writeln!(
                    out,
                    "  [Warning] Insufficient data for {}! Needed {}, got {}",
                    extraction.label, extraction.requested, extraction.extracted
                );
            }
            let _ = writeln!(
                out,
                "  - {}: Extracted {} samples",
                extraction.label, extraction.extracted
            );
        }
    }

    let _ = writeln!(out, "{RULE}");
    if dry_run {
        let _ = writeln!(
            out,
            "Dry run complete. Nothing written to {}",
            summary.output_root.display()
        );
    } else {
        let _ = writeln!(
            out,
            "Process completed. Output directory: {}",
            summary.output_root.display()
        );
    }
    let _ = writeln!(out, "  Unused spare data: {}", summary.unused);
    let _ = writeln!(out, "  Membership fingerprint: {:016x}", summary.fingerprint);
    out
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
