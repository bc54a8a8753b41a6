use std::fmt;
use std::path::PathBuf;

use crate::label::CanonicalLabel;
use crate::source::SourceFailure;
use crate::splits::Shortfall;
use crate::types::SplitName;

/// Per-label counters in canonical order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: [usize; 3],
}

impl LabelCounts {
    /// Build from explicit `O`, `W`, `N` values.
    pub const fn new(o: usize, w: usize, n: usize) -> Self {
        Self { counts: [o, w, n] }
    }

    /// Count for `label`.
    pub fn get(&self, label: CanonicalLabel) -> usize {
        self.counts[label.index()]
    }

    /// Overwrite the count for `label`.
    pub fn set(&mut self, label: CanonicalLabel, value: usize) {
        self.counts[label.index()] = value;
    }

    /// Add `value` to the count for `label`.
    pub fn add(&mut self, label: CanonicalLabel, value: usize) {
        self.counts[label.index()] += value;
    }

    /// Sum over all labels.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for LabelCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_per_label(f, |label| self.get(label))
    }
}

/// Per-label remainder past the final cursor.
///
/// Signed: a label whose cursor was advanced past its bucket by a shortfall
/// reports the overshoot as a negative remainder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpareCounts {
    counts: [i64; 3],
}

impl SpareCounts {
    /// Build from explicit `O`, `W`, `N` values.
    pub const fn new(o: i64, w: i64, n: i64) -> Self {
        Self { counts: [o, w, n] }
    }

    /// Remainder for `label`.
    pub fn get(&self, label: CanonicalLabel) -> i64 {
        self.counts[label.index()]
    }

    /// Overwrite the remainder for `label`.
    pub fn set(&mut self, label: CanonicalLabel, value: i64) {
        self.counts[label.index()] = value;
    }

    /// Sum over all labels.
    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }
}

impl fmt::Display for SpareCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_per_label(f, |label| self.get(label))
    }
}

fn write_per_label<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    value: impl Fn(CanonicalLabel) -> T,
) -> fmt::Result {
    for (idx, label) in CanonicalLabel::ALL.into_iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{label}: {}", value(label))?;
    }
    Ok(())
}

/// Outcome of one non-zero quota for one split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitExtraction {
    /// Split the units were written to.
    pub split: SplitName,
    /// Label of the written units.
    pub label: CanonicalLabel,
    /// Quota asked for.
    pub requested: usize,
    /// Units actually written.
    pub extracted: usize,
}

impl SplitExtraction {
    /// True when fewer units were written than requested.
    pub fn is_short(&self) -> bool {
        self.extracted < self.requested
    }
}

/// Everything a run reports once it completes.
#[derive(Clone, Debug)]
pub struct PartitionSummary {
    /// Output root the units were written under.
    pub output_root: PathBuf,
    /// Pool sizes after loading, before any allocation.
    pub inventory: LabelCounts,
    /// Splits in processing order, including splits with all-zero quotas.
    pub splits: Vec<SplitName>,
    /// Non-zero quotas in processing order.
    pub extractions: Vec<SplitExtraction>,
    /// Quotas that could not be filled, in processing order.
    pub shortfalls: Vec<Shortfall>,
    /// Sources skipped while loading.
    pub source_failures: Vec<SourceFailure>,
    /// Pool length minus final cursor per label; negative after a shortfall.
    pub unused: SpareCounts,
    /// Stable hash over written split membership and payloads.
    pub fingerprint: u64,
}

impl PartitionSummary {
    /// Units written per label for `split`.
    pub fn extracted_for(&self, split: &str) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for extraction in self.extractions.iter().filter(|e| e.split == split) {
            counts.add(extraction.label, extraction.extracted);
        }
        counts
    }

    /// Units written across all splits.
    pub fn total_extracted(&self) -> usize {
        self.extractions.iter().map(|e| e.extracted).sum()
    }
}
