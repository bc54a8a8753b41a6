//! Sample sources and the pool loader.
//!
//! A `SampleSource` yields the full, ordered sample list of one input
//! collection. `load_pool` drains sources in order into a `Pool`; a source
//! that fails contributes nothing and is reported instead of aborting.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::data::{Pool, Sample};
use crate::errors::PartitionError;
use crate::types::SourceId;

/// Source implementation modules.
pub mod sources;
pub use sources::json_file::JsonFileSource;

/// One input collection of samples.
///
/// For a fixed backing state `load` must return the same samples in the same
/// order; shuffling reproducibility depends on it.
pub trait SampleSource {
    /// Stable identifier used in logs and failure reports.
    fn id(&self) -> &str;
    /// Read every sample of this source, in source order.
    fn load(&self) -> Result<Vec<Sample>, PartitionError>;
}

/// A source that was skipped while loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFailure {
    /// Skipped source.
    pub source_id: SourceId,
    /// Error text that caused the skip.
    pub reason: String,
}

/// Pool plus the per-source failures collected while building it.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    /// Samples from every source that loaded.
    pub pool: Pool,
    /// Sources that were skipped, in read order.
    pub failures: Vec<SourceFailure>,
}

/// Load `sources` in order into a fresh pool.
///
/// Samples keep source order, then in-source order, within each bucket.
pub fn load_pool(sources: &[Box<dyn SampleSource>]) -> LoadReport {
    let mut report = LoadReport::default();
    for source in sources {
        match source.load() {
            Ok(samples) => {
                debug!(source = source.id(), samples = samples.len(), "loaded source");
                report.pool.extend(samples);
            }
            Err(err) => {
                warn!(source = source.id(), error = %err, "skipping source");
                report.failures.push(SourceFailure {
                    source_id: source.id().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
    info!(
        inventory = %report.pool.counts(),
        total = report.pool.total(),
        skipped = report.failures.len(),
        "pool loaded"
    );
    report
}

/// In-memory source over prebuilt samples.
pub struct InMemorySource {
    id: SourceId,
    samples: Arc<Vec<Sample>>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt samples.
    pub fn new(id: impl Into<SourceId>, samples: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            samples: Arc::new(samples),
        }
    }
}

impl SampleSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn load(&self) -> Result<Vec<Sample>, PartitionError> {
        Ok(self.samples.as_ref().clone())
    }
}
