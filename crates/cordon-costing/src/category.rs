//! Cost categories tracked by the runtime instrumentation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A category of runtime activity that accrues deterministic cost.
///
/// Instrumented code reports one cost entry per allocation site, call
/// site, jump and throw site it passes through, so two runs of the same
/// code over the same input accrue identical totals.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Heap memory reserved by the sandboxed code, in bytes.
    Allocation,
    /// Method and constructor invocations.
    Invocation,
    /// Branch and jump instructions, including loop back-edges.
    Jump,
    /// Throwables raised by the sandboxed code.
    Throw,
}

impl CostCategory {
    /// Human-readable description of the activity, used in budget
    /// violation messages.
    #[must_use]
    pub const fn activity(self) -> &'static str {
        match self {
            Self::Allocation => "memory allocation",
            Self::Invocation => "method invocation",
            Self::Jump => "looping",
            Self::Throw => "exception throwing",
        }
    }
}
