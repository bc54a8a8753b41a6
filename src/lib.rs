#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner shared by the `partition` binary.
pub mod apps;
/// Run configuration and JSON config loading.
pub mod config;
/// Centralized constants used across loading, allocation, and writing.
pub mod constants;
/// Sample and pool types.
pub mod data;
mod hash;
/// Canonical labels and raw label normalization.
pub mod label;
/// Per-label counters and run summaries.
pub mod metrics;
/// Load, shuffle, allocate, write.
pub mod pipeline;
/// Seeded pool shuffling.
pub mod shuffle;
/// Sample source traits and built-in sources.
pub mod source;
/// Split requirements and the quota allocator.
pub mod splits;
/// Source discovery transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Split sinks and unit encoding.
pub mod writer;

mod errors;

pub use config::PartitionConfig;
pub use data::{Pool, Sample};
pub use errors::PartitionError;
pub use label::{CanonicalLabel, normalize};
pub use metrics::{LabelCounts, PartitionSummary, SpareCounts, SplitExtraction};
pub use pipeline::{run_partition, run_with_sources};
pub use shuffle::{DeterministicRng, shuffle_pool};
pub use source::{InMemorySource, JsonFileSource, LoadReport, SampleSource, SourceFailure, load_pool};
pub use splits::{Allocation, AllocationPlan, Cursor, Quota, Shortfall, SplitRequirement, allocate};
pub use types::{SourceId, SplitName, UnitName};
pub use writer::{FileSplitWriter, MemorySplitWriter, SplitSink};
