use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for source loading, configuration, and split persistence failures.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Source could not be read at all.
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Failing source.
        source_id: SourceId,
        /// Underlying cause.
        reason: String,
    },
    /// Source was read but is not a usable sample document.
    #[error("data source '{source_id}' is malformed: {details}")]
    SourceMalformed {
        /// Failing source.
        source_id: SourceId,
        /// What was wrong with the document.
        details: String,
    },
    /// Invalid or unreadable run configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A unit file could not be written.
    #[error("failed to write split unit '{}': {reason}", path.display())]
    Write {
        /// Unit path.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },
    /// Filesystem failure while resetting or preparing the output root.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Unit encoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartitionError {
    /// True for failures that only drop a single source from the pool.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            PartitionError::SourceUnavailable { .. } | PartitionError::SourceMalformed { .. }
        )
    }
}
