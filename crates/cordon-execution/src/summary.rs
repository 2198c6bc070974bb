//! Immutable summaries of sandboxed runs.

use cordon_costing::{CostCategory, CostSnapshot};
use serde::Serialize;
use serde_json::Value;

/// Resource usage of one run, win or lose.
///
/// A summary is created when the run's isolation scope ends and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    costs: CostSnapshot,
}

impl ExecutionSummary {
    /// Wraps a cost snapshot.
    #[must_use]
    pub const fn new(costs: CostSnapshot) -> Self {
        Self { costs }
    }

    /// The accumulated cost map.
    #[must_use]
    pub const fn costs(&self) -> &CostSnapshot {
        &self.costs
    }

    /// Units accrued in `category`.
    #[must_use]
    pub fn cost_of(&self, category: CostCategory) -> u64 {
        self.costs.of(category)
    }
}

/// Resource usage plus the optional output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummaryWithResult<T = Value> {
    result: Option<T>,
    costs: CostSnapshot,
}

impl<T> ExecutionSummaryWithResult<T> {
    /// Wraps a run's output and cost snapshot.
    #[must_use]
    pub const fn new(result: Option<T>, costs: CostSnapshot) -> Self {
        Self { result, costs }
    }

    /// The run's output, when it produced one.
    #[must_use]
    pub const fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// The accumulated cost map.
    #[must_use]
    pub const fn costs(&self) -> &CostSnapshot {
        &self.costs
    }

    /// Units accrued in `category`.
    #[must_use]
    pub fn cost_of(&self, category: CostCategory) -> u64 {
        self.costs.of(category)
    }

    /// Consumes the summary, yielding the output and cost snapshot.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, CostSnapshot) {
        (self.result, self.costs)
    }
}
