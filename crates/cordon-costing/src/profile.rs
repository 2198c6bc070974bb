//! Execution profiles bounding the budgets of a single run.

use serde::{Deserialize, Serialize};

use crate::category::CostCategory;

/// Cost thresholds applied to one sandboxed run.
///
/// Each category is budgeted independently and an absent threshold leaves
/// its category unbounded. Profiles are immutable values chosen per
/// sandbox configuration; the builder methods return an updated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionProfile {
    allocation_threshold: Option<u64>,
    invocation_threshold: Option<u64>,
    jump_threshold: Option<u64>,
    throw_threshold: Option<u64>,
}

impl ExecutionProfile {
    /// Profile with every category unbounded.
    pub const UNLIMITED: Self = Self {
        allocation_threshold: None,
        invocation_threshold: None,
        jump_threshold: None,
        throw_threshold: None,
    };

    /// Budget applied to production runs: one gibibyte of allocation and
    /// one million invocations, jumps, and throws.
    pub const DEFAULT: Self = Self {
        allocation_threshold: Some(1024 * 1024 * 1024),
        invocation_threshold: Some(1_000_000),
        jump_threshold: Some(1_000_000),
        throw_threshold: Some(1_000_000),
    };

    /// Creates an unbounded profile.
    #[must_use]
    pub const fn new() -> Self {
        Self::UNLIMITED
    }

    /// Caps the allocation budget at `units` bytes.
    #[must_use]
    pub const fn with_allocation_threshold(mut self, units: u64) -> Self {
        self.allocation_threshold = Some(units);
        self
    }

    /// Caps the invocation budget at `units` calls.
    #[must_use]
    pub const fn with_invocation_threshold(mut self, units: u64) -> Self {
        self.invocation_threshold = Some(units);
        self
    }

    /// Caps the jump budget at `units` branches.
    #[must_use]
    pub const fn with_jump_threshold(mut self, units: u64) -> Self {
        self.jump_threshold = Some(units);
        self
    }

    /// Caps the throw budget at `units` raised throwables.
    #[must_use]
    pub const fn with_throw_threshold(mut self, units: u64) -> Self {
        self.throw_threshold = Some(units);
        self
    }

    /// The configured threshold for `category`, if any.
    #[must_use]
    pub const fn threshold_of(&self, category: CostCategory) -> Option<u64> {
        match category {
            CostCategory::Allocation => self.allocation_threshold,
            CostCategory::Invocation => self.invocation_threshold,
            CostCategory::Jump => self.jump_threshold,
            CostCategory::Throw => self.throw_threshold,
        }
    }

    /// True when no category carries a threshold.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.allocation_threshold.is_none()
            && self.invocation_threshold.is_none()
            && self.jump_threshold.is_none()
            && self.throw_threshold.is_none()
    }
}
