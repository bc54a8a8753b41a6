use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::documents::LABEL_FIELD;
use crate::label::CanonicalLabel;
use crate::metrics::LabelCounts;

/// One opaque sample record.
///
/// Only the `label` field is ever inspected. Everything else, including key
/// order, is carried through to the written unit untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Value);

impl Sample {
    /// Wrap a parsed record.
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Raw label string, or `None` when missing, null, or not a string.
    pub fn raw_label(&self) -> Option<&str> {
        self.0.get(LABEL_FIELD).and_then(Value::as_str)
    }

    /// Canonical label derived from [`Sample::raw_label`].
    pub fn label(&self) -> CanonicalLabel {
        CanonicalLabel::normalize(self.raw_label())
    }

    /// Borrow the original record.
    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Take back the original record.
    pub fn into_payload(self) -> Value {
        self.0
    }
}

impl From<Value> for Sample {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

/// Samples bucketed by canonical label.
///
/// All three buckets always exist; an empty bucket is the floor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pool {
    buckets: [Vec<Sample>; 3],
}

impl Pool {
    /// Create a pool with three empty buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `sample` and append it to its bucket. Returns the bucket label.
    pub fn push(&mut self, sample: Sample) -> CanonicalLabel {
        let label = sample.label();
        self.buckets[label.index()].push(sample);
        label
    }

    /// Ordered samples for `label`.
    pub fn bucket(&self, label: CanonicalLabel) -> &[Sample] {
        &self.buckets[label.index()]
    }

    pub(crate) fn bucket_mut(&mut self, label: CanonicalLabel) -> &mut Vec<Sample> {
        &mut self.buckets[label.index()]
    }

    /// Number of samples pooled under `label`.
    pub fn len(&self, label: CanonicalLabel) -> usize {
        self.buckets[label.index()].len()
    }

    /// Number of samples across all buckets.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// True when every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Per-label bucket sizes.
    pub fn counts(&self) -> LabelCounts {
        let mut counts = LabelCounts::default();
        for label in CanonicalLabel::ALL {
            counts.set(label, self.len(label));
        }
        counts
    }
}

impl Extend<Sample> for Pool {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        for sample in iter {
            self.push(sample);
        }
    }
}

impl FromIterator<Sample> for Pool {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        let mut pool = Pool::new();
        pool.extend(iter);
        pool
    }
}
