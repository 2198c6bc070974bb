//! Isolated execution of validated sandbox code under resource budgets.
//!
//! This crate sits on top of `cordon-analysis` and `cordon-costing` and
//! orchestrates complete sandbox runs. A [`SandboxExecutor`] resolves an
//! entry class, drives reference validation, loads the class through the
//! external loader, and invokes its entry operation — all inside an
//! [`IsolatedTask`]: a dedicated worker thread with its own fresh
//! cost-accounting scope and a one-shot completion signal back to the
//! caller.
//!
//! Faults never unwind across the thread boundary. Everything raised
//! inside the worker is captured into a [`RunResult`] and either turned
//! into a success summary or re-raised as the single caller-facing
//! [`SandboxError`], which always carries an [`ExecutionSummary`] so
//! resource usage is observable win or lose.
//!
//! Runs are independent: concurrent calls execute on independent worker
//! threads with independent meters and analysis contexts, sharing only
//! the immutable configuration.

mod executor;
mod fault;
mod isolated;
mod summary;

pub use cordon_costing::{CostCategory, ExecutionProfile};
pub use executor::SandboxExecutor;
pub use fault::{Fault, SandboxError};
pub use isolated::{IsolatedTask, IsolationError, RunResult};
pub use summary::{ExecutionSummary, ExecutionSummaryWithResult};

#[cfg(test)]
mod tests;
