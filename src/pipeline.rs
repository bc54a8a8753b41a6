//! Run orchestration: load, shuffle, allocate, write, summarize.
//!
//! The pipeline is strictly linear. Source problems and quota shortfalls are
//! collected into the summary; only invalid configuration and sink failures
//! end a run early.

use std::hash::Hash;
use tracing::info;

use crate::config::PartitionConfig;
use crate::errors::PartitionError;
use crate::hash::stable_hash_with;
use crate::metrics::{PartitionSummary, SplitExtraction};
use crate::shuffle::shuffle_pool;
use crate::source::{SampleSource, load_pool};
use crate::splits::allocate;
use crate::transport::fs::JsonDiscovery;
use crate::writer::{SplitSink, encode_unit};

/// Run a partition over the configured source locations.
///
/// Source directories are expanded only after the sink is reset, and never
/// descend into the output root, so earlier output is not read back as input.
pub fn run_partition(
    config: &PartitionConfig,
    sink: &mut dyn SplitSink,
) -> Result<PartitionSummary, PartitionError> {
    config.validate()?;
    sink.reset()?;
    let sources: Vec<Box<dyn SampleSource>> = JsonDiscovery::new()
        .excluding(&config.output_root)
        .expand(&config.sources)
        .into_iter()
        .map(|source| Box::new(source) as Box<dyn SampleSource>)
        .collect();
    partition_sources(config, &sources, sink)
}

/// Run a partition over explicit sources; `config.sources` is ignored.
pub fn run_with_sources(
    config: &PartitionConfig,
    sources: &[Box<dyn SampleSource>],
    sink: &mut dyn SplitSink,
) -> Result<PartitionSummary, PartitionError> {
    config.validate()?;
    sink.reset()?;
    partition_sources(config, sources, sink)
}

fn partition_sources(
    config: &PartitionConfig,
    sources: &[Box<dyn SampleSource>],
    sink: &mut dyn SplitSink,
) -> Result<PartitionSummary, PartitionError> {
    let report = load_pool(sources);
    let mut pool = report.pool;
    let inventory = pool.counts();
    info!(%inventory, total = inventory.total(), "raw inventory");

    shuffle_pool(&mut pool, config.seed);
    let plan = allocate(&pool, &config.requirements);

    let mut extractions = Vec::with_capacity(plan.allocations.len());
    let mut fingerprint_parts = Vec::new();
    for split in &plan.splits {
        info!(split = %split, "generating split");
        sink.prepare_split(split)?;
        for allocation in plan.allocations_for(split) {
            let samples = allocation.samples(&pool);
            let extracted = sink.write(split, allocation.label, samples)?;
            for (index, sample) in samples.iter().enumerate() {
                fingerprint_parts.push((
                    split.as_str(),
                    allocation.label.as_str(),
                    index,
                    encode_unit(sample)?,
                ));
            }
            extractions.push(SplitExtraction {
                split: split.clone(),
                label: allocation.label,
                requested: allocation.requested,
                extracted,
            });
        }
    }

    let unused = plan.unused(&pool);
    let fingerprint = stable_hash_with(|hasher| fingerprint_parts.hash(hasher));
    info!(
        %unused,
        extracted = extractions.iter().map(|e| e.extracted).sum::<usize>(),
        shortfalls = plan.shortfalls.len(),
        fingerprint,
        "partition complete"
    );

    Ok(PartitionSummary {
        output_root: config.output_root.clone(),
        inventory,
        splits: plan.splits,
        extractions,
        shortfalls: plan.shortfalls,
        source_failures: report.failures,
        unused,
        fingerprint,
    })
}
