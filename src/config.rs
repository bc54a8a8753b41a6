use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::constants::config::{DEFAULT_OUTPUT_ROOT, DEFAULT_SEED, DEFAULT_SOURCES};
use crate::errors::PartitionError;
use crate::splits::{Quota, SplitRequirement};
use crate::types::SplitName;

/// Immutable description of one partition run.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionConfig {
    /// Source locations in read order. Directories expand to their `*.json` files.
    pub sources: Vec<PathBuf>,
    /// Root that is wiped and rebuilt at the start of every run.
    pub output_root: PathBuf,
    /// Seed for the single run-wide shuffle generator.
    pub seed: u64,
    /// Split requirements in processing order.
    pub requirements: Vec<SplitRequirement>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(PathBuf::from).collect(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            seed: DEFAULT_SEED,
            requirements: default_requirements(),
        }
    }
}

/// Server set balanced, client sets biased toward one gesture each, small unseen test set.
fn default_requirements() -> Vec<SplitRequirement> {
    vec![
        SplitRequirement::new("server", Quota::new(100, 100, 200)),
        SplitRequirement::new("client_A", Quota::new(80, 0, 80)),
        SplitRequirement::new("client_B", Quota::new(0, 80, 80)),
        SplitRequirement::new("test", Quota::new(20, 20, 40)),
    ]
}

/// On-disk config shape. `requirements` keeps the key order of the document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    sources: Option<Vec<PathBuf>>,
    output_root: Option<PathBuf>,
    seed: Option<u64>,
    requirements: Option<IndexMap<SplitName, Quota>>,
}

impl PartitionConfig {
    /// Parse a JSON config; omitted fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, PartitionError> {
        let document: ConfigDocument = serde_json::from_str(raw)
            .map_err(|err| PartitionError::Configuration(format!("invalid config: {err}")))?;
        let mut config = Self::default();
        if let Some(sources) = document.sources {
            config.sources = sources;
        }
        if let Some(output_root) = document.output_root {
            config.output_root = output_root;
        }
        if let Some(seed) = document.seed {
            config.seed = seed;
        }
        if let Some(requirements) = document.requirements {
            config.requirements = requirements
                .into_iter()
                .map(|(name, quota)| SplitRequirement::new(name, quota))
                .collect();
        }
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PartitionError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            PartitionError::Configuration(format!(
                "cannot read config '{}': {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Replace the source locations, in read order.
    pub fn with_sources<I, P>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the output root.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Replace the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the split requirements, in processing order.
    pub fn with_requirements(mut self, requirements: Vec<SplitRequirement>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Reject configs that would write outside the output root, collide, or
    /// wipe a configured source when the output root is reset.
    pub fn validate(&self) -> Result<(), PartitionError> {
        if self.output_root.as_os_str().is_empty() {
            return Err(PartitionError::Configuration(
                "output root must not be empty".into(),
            ));
        }
        if let Ok(root) = fs::canonicalize(&self.output_root) {
            for source in &self.sources {
                if let Ok(source_path) = fs::canonicalize(source)
                    && source_path.starts_with(&root)
                {
                    return Err(PartitionError::Configuration(format!(
                        "output root '{}' contains source '{}' and would delete it",
                        self.output_root.display(),
                        source.display()
                    )));
                }
            }
        }
        let mut seen = HashSet::new();
        for requirement in &self.requirements {
            let name = requirement.name.as_str();
            if !is_single_component(name) {
                return Err(PartitionError::Configuration(format!(
                    "split name '{name}' must be a single directory name"
                )));
            }
            if !seen.insert(name) {
                return Err(PartitionError::Configuration(format!(
                    "split '{name}' is declared more than once"
                )));
            }
        }
        Ok(())
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == OsStr::new(name)
    )
}
