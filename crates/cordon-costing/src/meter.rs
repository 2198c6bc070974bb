//! Per-run cost accounting shared between a worker and its initiator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::category::CostCategory;
use crate::profile::ExecutionProfile;

/// Raised when a run exhausts the budget for one cost category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "terminated due to excessive use of {}: {used} of {threshold} budgeted units",
    .category.activity()
)]
pub struct ThresholdError {
    /// Category whose budget was exhausted.
    pub category: CostCategory,
    /// Configured budget for the category.
    pub threshold: u64,
    /// Units accumulated at the point of violation.
    pub used: u64,
}

/// Immutable snapshot of accumulated costs, keyed by category.
///
/// Snapshots are ordered maps, so rendered and serialised reports are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CostSnapshot(BTreeMap<CostCategory, u64>);

impl CostSnapshot {
    /// Accumulated units for `category`.
    #[must_use]
    pub fn of(&self, category: CostCategory) -> u64 {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Iterates categories and their accumulated units.
    pub fn iter(&self) -> impl Iterator<Item = (CostCategory, u64)> + '_ {
        self.0.iter().map(|(category, units)| (*category, *units))
    }

    /// True when no category has accrued any cost.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.values().all(|units| *units == 0)
    }
}

/// Cost accounting scope for a single isolated run.
///
/// A fresh meter is created when a run enters its isolation scope, so
/// counters always start at zero; they only ever increase. The meter is
/// shared between the worker thread and the initiating thread so totals
/// can be snapshotted after completion, including after a deadline expiry.
#[derive(Debug)]
pub struct CostMeter {
    profile: ExecutionProfile,
    allocation: AtomicU64,
    invocation: AtomicU64,
    jump: AtomicU64,
    throw: AtomicU64,
}

impl CostMeter {
    /// Creates a meter enforcing `profile`.
    #[must_use]
    pub const fn new(profile: ExecutionProfile) -> Self {
        Self {
            profile,
            allocation: AtomicU64::new(0),
            invocation: AtomicU64::new(0),
            jump: AtomicU64::new(0),
            throw: AtomicU64::new(0),
        }
    }

    /// The profile this meter enforces.
    #[must_use]
    pub const fn profile(&self) -> &ExecutionProfile {
        &self.profile
    }

    /// Adds `units` of cost to `category` and checks its budget.
    ///
    /// # Errors
    ///
    /// Fails with [`ThresholdError`] once the accumulated units exceed the
    /// profile's threshold for the category. The units are recorded either
    /// way, so a post-fault snapshot shows the total that tripped the
    /// budget.
    pub fn record(&self, category: CostCategory, units: u64) -> Result<(), ThresholdError> {
        let used = self
            .counter(category)
            .fetch_add(units, Ordering::Relaxed)
            .saturating_add(units);
        match self.profile.threshold_of(category) {
            Some(threshold) if used > threshold => Err(ThresholdError {
                category,
                threshold,
                used,
            }),
            _ => Ok(()),
        }
    }

    /// Snapshot of the accumulated totals across every category.
    #[must_use]
    pub fn snapshot(&self) -> CostSnapshot {
        CostSnapshot(
            CostCategory::iter()
                .map(|category| (category, self.counter(category).load(Ordering::Relaxed)))
                .collect(),
        )
    }

    const fn counter(&self, category: CostCategory) -> &AtomicU64 {
        match category {
            CostCategory::Allocation => &self.allocation,
            CostCategory::Invocation => &self.invocation,
            CostCategory::Jump => &self.jump,
            CostCategory::Throw => &self.throw,
        }
    }
}
