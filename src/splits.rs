//! Split requirements and the quota allocator.
//!
//! The allocator never touches samples. It walks the requirements in order,
//! and for each non-zero quota it hands out the next contiguous index range
//! of that label's shuffled bucket, tracked by a per-label cursor that only
//! moves forward.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use tracing::{info, warn};

use crate::data::{Pool, Sample};
use crate::label::CanonicalLabel;
use crate::metrics::SpareCounts;
use crate::types::SplitName;

/// Required sample count per canonical label. Missing labels mean zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quota {
    /// Samples of `O` to hand out.
    #[serde(rename = "O", alias = "o", default)]
    pub o: usize,
    /// Samples of `W` to hand out.
    #[serde(rename = "W", alias = "w", default)]
    pub w: usize,
    /// Samples of `N` to hand out.
    #[serde(rename = "N", alias = "n", default)]
    pub n: usize,
}

impl Quota {
    /// Build from explicit `O`, `W`, `N` counts.
    pub const fn new(o: usize, w: usize, n: usize) -> Self {
        Self { o, w, n }
    }

    /// Requested count for `label`.
    pub fn get(&self, label: CanonicalLabel) -> usize {
        match label {
            CanonicalLabel::O => self.o,
            CanonicalLabel::W => self.w,
            CanonicalLabel::N => self.n,
        }
    }

    /// True when every label asks for zero samples.
    pub fn is_empty(&self) -> bool {
        self.o == 0 && self.w == 0 && self.n == 0
    }
}

/// A named split and its per-label quota.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitRequirement {
    /// Split name, also its directory under the output root.
    pub name: SplitName,
    /// Per-label counts for this split.
    pub quota: Quota,
}

impl SplitRequirement {
    /// Pair a split name with its quota.
    pub fn new(name: impl Into<SplitName>, quota: Quota) -> Self {
        Self {
            name: name.into(),
            quota,
        }
    }
}

/// Per-label read offsets into the shuffled pool.
///
/// Offsets advance by the requested count, so after a shortfall an offset
/// sits past the end of its bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    offsets: [usize; 3],
}

impl Cursor {
    /// Offset for `label`; may exceed the bucket length.
    pub fn get(&self, label: CanonicalLabel) -> usize {
        self.offsets[label.index()]
    }

    fn advance(&mut self, label: CanonicalLabel, by: usize) {
        let slot = &mut self.offsets[label.index()];
        *slot = slot.saturating_add(by);
    }
}

/// A contiguous slice of one label's shuffled bucket handed to one split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Receiving split.
    pub split: SplitName,
    /// Bucket the range indexes into.
    pub label: CanonicalLabel,
    /// Index range into `pool.bucket(label)`, already clamped to its length.
    pub range: Range<usize>,
    /// Quota asked for; the cursor advanced by this much.
    pub requested: usize,
}

impl Allocation {
    /// Number of samples actually obtained.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// True when no sample was obtained.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// True when fewer samples were obtained than requested.
    pub fn is_short(&self) -> bool {
        self.len() < self.requested
    }

    /// Borrow the allocated samples from the pool the plan was built on.
    pub fn samples<'a>(&self, pool: &'a Pool) -> &'a [Sample] {
        &pool.bucket(self.label)[self.range.clone()]
    }
}

/// A quota that could not be filled from the remaining samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    /// Split that came up short.
    pub split: SplitName,
    /// Label that ran out.
    pub label: CanonicalLabel,
    /// Quota asked for.
    pub requested: usize,
    /// Samples actually handed out.
    pub obtained: usize,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient data for {} in '{}': needed {}, got {}",
            self.label, self.split, self.requested, self.obtained
        )
    }
}

/// Output of [`allocate`].
#[derive(Clone, Debug, Default)]
pub struct AllocationPlan {
    /// Every split name in processing order, including all-zero splits.
    pub splits: Vec<SplitName>,
    /// Non-zero quotas in processing order, possibly empty on shortfall.
    pub allocations: Vec<Allocation>,
    /// Final cursor after all requirements.
    pub cursor: Cursor,
    /// Quotas that could not be filled, in processing order.
    pub shortfalls: Vec<Shortfall>,
}

impl AllocationPlan {
    /// Allocations belonging to `split`, in label order.
    pub fn allocations_for<'a>(&'a self, split: &str) -> impl Iterator<Item = &'a Allocation> {
        self.allocations
            .iter()
            .filter(move |allocation| allocation.split == split)
    }

    /// Bucket length minus final cursor per label.
    ///
    /// Goes negative by the overshoot when a shortfall advanced the cursor
    /// past the end of the bucket.
    pub fn unused(&self, pool: &Pool) -> SpareCounts {
        let mut unused = SpareCounts::default();
        for label in CanonicalLabel::ALL {
            unused.set(label, signed(pool.len(label)) - signed(self.cursor.get(label)));
        }
        unused
    }
}

fn signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Slice per-label quotas out of `pool` for each requirement in order.
///
/// Over-requesting is never an error: the range is clamped to the bucket,
/// a [`Shortfall`] is recorded, and the cursor still advances by the full
/// requested count.
pub fn allocate(pool: &Pool, requirements: &[SplitRequirement]) -> AllocationPlan {
    let mut plan = AllocationPlan::default();
    for requirement in requirements {
        plan.splits.push(requirement.name.clone());
        for label in CanonicalLabel::ALL {
            let count = requirement.quota.get(label);
            if count == 0 {
                continue;
            }
            let len = pool.len(label);
            let start = plan.cursor.get(label);
            let end = start.saturating_add(count);
            let range = start.min(len)..end.min(len);
            let obtained = range.len();

            if obtained < count {
                let shortfall = Shortfall {
                    split: requirement.name.clone(),
                    label,
                    requested: count,
                    obtained,
                };
                warn!(
                    split = %requirement.name,
                    %label,
                    requested = count,
                    obtained,
                    "{shortfall}"
                );
                plan.shortfalls.push(shortfall);
            }

            plan.cursor.advance(label, count);
            info!(split = %requirement.name, %label, extracted = obtained, "allocated");
            plan.allocations.push(Allocation {
                split: requirement.name.clone(),
                label,
                range,
                requested: count,
            });
        }
    }
    plan
}
