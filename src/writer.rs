//! Persistence of allocated samples, one unit per sample.

use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::documents::JSON_EXTENSION;
use crate::data::Sample;
use crate::errors::PartitionError;
use crate::label::CanonicalLabel;
use crate::types::{SplitName, UnitName};

/// Destination for split units.
///
/// Units are addressed by `(split, label, index)`; index restarts at zero for
/// every `(split, label)` and follows allocation order.
pub trait SplitSink {
    /// Drop everything previously written and start from an empty root.
    fn reset(&mut self) -> Result<(), PartitionError>;
    /// Make sure the container for `split` exists. Idempotent.
    fn prepare_split(&mut self, split: &str) -> Result<(), PartitionError>;
    /// Persist `samples` as units `{label}_0..` and return how many were written.
    ///
    /// An empty slice writes nothing and creates no label container.
    fn write(
        &mut self,
        split: &str,
        label: CanonicalLabel,
        samples: &[Sample],
    ) -> Result<usize, PartitionError>;
}

/// Unit name without extension, e.g. `O_0`.
pub fn unit_name(label: CanonicalLabel, index: usize) -> UnitName {
    format!("{label}_{index}")
}

#[derive(Serialize)]
struct UnitDocument<'a> {
    strokes: [&'a Sample; 1],
}

/// Encode one sample as a self-describing single-element `strokes` document.
pub fn encode_unit(sample: &Sample) -> Result<Vec<u8>, PartitionError> {
    Ok(serde_json::to_vec(&UnitDocument { strokes: [sample] })?)
}

/// Writes units to `<root>/<split>/<label>/<label>_<index>.json`.
#[derive(Clone, Debug)]
pub struct FileSplitWriter {
    root: PathBuf,
}

impl FileSplitWriter {
    /// Writer rooted at `root`; nothing is touched until `reset`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a single unit under this writer's root.
    pub fn unit_path(&self, split: &str, label: CanonicalLabel, index: usize) -> PathBuf {
        self.root
            .join(split)
            .join(label.as_str())
            .join(format!("{}.{JSON_EXTENSION}", unit_name(label, index)))
    }
}

impl SplitSink for FileSplitWriter {
    fn reset(&mut self) -> Result<(), PartitionError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn prepare_split(&mut self, split: &str) -> Result<(), PartitionError> {
        fs::create_dir_all(self.root.join(split))?;
        Ok(())
    }

    fn write(
        &mut self,
        split: &str,
        label: CanonicalLabel,
        samples: &[Sample],
    ) -> Result<usize, PartitionError> {
        if samples.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(self.root.join(split).join(label.as_str()))?;
        for (index, sample) in samples.iter().enumerate() {
            let path = self.unit_path(split, label, index);
            let payload = encode_unit(sample)?;
            fs::write(&path, payload).map_err(|err| PartitionError::Write {
                path: path.clone(),
                reason: err.to_string(),
            })?;
            debug!(path = %path.display(), "wrote unit");
        }
        Ok(samples.len())
    }
}

/// In-memory sink holding encoded units; used for dry runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySplitWriter {
    splits: IndexMap<SplitName, IndexMap<CanonicalLabel, Vec<Vec<u8>>>>,
}

impl MemorySplitWriter {
    /// Empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepared split names in preparation order.
    pub fn splits(&self) -> impl Iterator<Item = &str> {
        self.splits.keys().map(String::as_str)
    }

    /// Encoded units for `(split, label)`; empty when nothing was written.
    pub fn units(&self, split: &str, label: CanonicalLabel) -> &[Vec<u8>] {
        self.splits
            .get(split)
            .and_then(|labels| labels.get(&label))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Labels with at least one unit in `split`.
    pub fn labels(&self, split: &str) -> Vec<CanonicalLabel> {
        self.splits
            .get(split)
            .map(|labels| labels.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Total units across every split and label.
    pub fn unit_count(&self) -> usize {
        self.splits
            .values()
            .flat_map(|labels| labels.values())
            .map(Vec::len)
            .sum()
    }
}

impl SplitSink for MemorySplitWriter {
    fn reset(&mut self) -> Result<(), PartitionError> {
        self.splits.clear();
        Ok(())
    }

    fn prepare_split(&mut self, split: &str) -> Result<(), PartitionError> {
        self.splits.entry(split.to_string()).or_default();
        Ok(())
    }

    fn write(
        &mut self,
        split: &str,
        label: CanonicalLabel,
        samples: &[Sample],
    ) -> Result<usize, PartitionError> {
        if samples.is_empty() {
            return Ok(0);
        }
        let units = samples
            .iter()
            .map(encode_unit)
            .collect::<Result<Vec<_>, _>>()?;
        self.splits
            .entry(split.to_string())
            .or_default()
            .entry(label)
            .or_default()
            .extend(units);
        Ok(samples.len())
    }
}
