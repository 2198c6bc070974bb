//! Deterministic resource budgets for sandboxed runs.
//!
//! The `cordon-costing` crate defines the cost model the sandbox uses to
//! bound untrusted code: a closed set of [`CostCategory`] values, an
//! immutable [`ExecutionProfile`] holding the per-category budgets of one
//! sandbox configuration, and a per-run [`CostMeter`] that instrumented
//! code reports its activity to.
//!
//! A meter is created fresh when a run enters its isolation scope, so
//! counters always start at zero and runs never observe each other's
//! totals. Recording against an exhausted budget fails with a
//! [`ThresholdError`]; the error's message is the one operators see when a
//! run is terminated for exceeding its budget.
//!
//! ```
//! use cordon_costing::{CostCategory, CostMeter, ExecutionProfile};
//!
//! let profile = ExecutionProfile::UNLIMITED.with_jump_threshold(10);
//! let meter = CostMeter::new(profile);
//! assert!(meter.record(CostCategory::Jump, 10).is_ok());
//! assert!(meter.record(CostCategory::Jump, 1).is_err());
//! assert_eq!(meter.snapshot().of(CostCategory::Jump), 11);
//! ```

mod category;
mod meter;
mod profile;

pub use category::CostCategory;
pub use meter::{CostMeter, CostSnapshot, ThresholdError};
pub use profile::ExecutionProfile;

#[cfg(test)]
mod tests;
