//! Top-level sandbox orchestration.

use std::sync::Arc;
use std::time::Duration;

use cordon_analysis::{
    AnalysisConfiguration, AnalysisContext, ClassLoader, ClassSource, InvocationFault,
    LoadedClass, ReferenceExtractor, ReferenceValidator, ValidationSummary,
};
use cordon_costing::ExecutionProfile;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::fault::{Fault, SandboxError};
use crate::isolated::{IsolatedTask, RunResult};
use crate::summary::{ExecutionSummary, ExecutionSummaryWithResult};

/// Tracing target for executor operations.
const EXECUTOR_TARGET: &str = "cordon_execution::executor";

/// Executes, loads, and validates sandboxed entry classes.
///
/// Every call is one-shot and moves through validation, loading,
/// instantiation, and invocation inside a dedicated isolated run; there is
/// no retry state. A call either returns its result with a cost summary or
/// raises a [`SandboxError`] that still carries the costs accrued up to
/// the fault.
pub struct SandboxExecutor {
    configuration: Arc<AnalysisConfiguration>,
    loader: Arc<dyn ClassLoader>,
    extractor: Arc<dyn ReferenceExtractor>,
    profile: ExecutionProfile,
    deadline: Option<Duration>,
}

impl SandboxExecutor {
    /// Creates an executor with an unbounded execution profile.
    #[must_use]
    pub const fn new(
        configuration: Arc<AnalysisConfiguration>,
        loader: Arc<dyn ClassLoader>,
        extractor: Arc<dyn ReferenceExtractor>,
    ) -> Self {
        Self {
            configuration,
            loader,
            extractor,
            profile: ExecutionProfile::UNLIMITED,
            deadline: None,
        }
    }

    /// Applies a capped execution profile to subsequent runs.
    #[must_use]
    pub const fn with_profile(mut self, profile: ExecutionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Bounds how long callers wait for each isolated run.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Runs `entry`'s single entry operation with `input` in the sandbox.
    ///
    /// The isolated action validates the reference closure of the entry,
    /// loads it, obtains its entry handle, and invokes it with the run's
    /// cost meter. A stack-overflow fault raised by the sandboxed code is
    /// re-minted fresh so internal frames never reach the caller.
    ///
    /// # Errors
    ///
    /// Every fault surfaces as a [`SandboxError`] carrying the worker
    /// identifier, the entry source, and the costs accrued before the
    /// fault.
    pub fn run(
        &self,
        entry: &ClassSource,
        input: Value,
    ) -> Result<ExecutionSummaryWithResult, SandboxError> {
        let configuration = Arc::clone(&self.configuration);
        let loader = Arc::clone(&self.loader);
        let extractor = Arc::clone(&self.extractor);
        let entry_source = entry.clone();
        let result = self
            .task("cordon-run")
            .run(move |meter| {
                let mut context =
                    AnalysisContext::for_entries(&configuration, vec![entry_source.clone()]);
                let validator =
                    ReferenceValidator::new(&configuration, loader.as_ref(), extractor.as_ref());
                validator.validate(&mut context).map_err(Fault::from)?;

                let loaded = loader
                    .load(&entry_source, &mut context)
                    .map_err(Fault::from)?;
                let entry_point = loaded.entry_point().ok_or_else(|| Fault::EntryNotFound {
                    class_name: loaded.binary_name().to_owned(),
                    reason: "class does not expose a single entry operation".to_owned(),
                })?;
                entry_point.invoke(input, meter).map_err(translate_fault)
            })
            .map_err(|spawn| spawn_failure(entry, &spawn.to_string()))?;
        conclude(entry, result)
    }

    /// Runs `entry` with a typed input, deserialising the output.
    ///
    /// # Errors
    ///
    /// Fails like [`SandboxExecutor::run`]; conversion failures surface
    /// as a worker fault carrying the serde error.
    pub fn run_as<I, O>(
        &self,
        entry: &ClassSource,
        input: &I,
    ) -> Result<ExecutionSummaryWithResult<O>, SandboxError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let encoded =
            serde_json::to_value(input).map_err(|error| conversion_failure(entry, &error))?;
        let summary = self.run(entry, encoded)?;
        let (raw, costs) = summary.into_parts();
        let output = raw
            .map(serde_json::from_value)
            .transpose()
            .map_err(|error| conversion_failure(entry, &error))?;
        Ok(ExecutionSummaryWithResult::new(output, costs))
    }

    /// Loads `source` through the sandbox loader without executing it.
    ///
    /// # Errors
    ///
    /// Fails with a [`SandboxError`] carrying an entry-not-found fault
    /// when the loader yields nothing, and with the usual faults
    /// otherwise.
    pub fn load(&self, source: &ClassSource) -> Result<LoadedClass, SandboxError> {
        let configuration = Arc::clone(&self.configuration);
        let loader = Arc::clone(&self.loader);
        let load_source = source.clone();
        let result = self
            .task("cordon-load")
            .run(move |_meter| {
                let mut context =
                    AnalysisContext::for_entries(&configuration, vec![load_source.clone()]);
                let loaded = loader
                    .load(&load_source, &mut context)
                    .map_err(Fault::from)?;
                Ok(Some(loaded))
            })
            .map_err(|spawn| spawn_failure(source, &spawn.to_string()))?;
        let RunResult {
            identifier,
            output,
            costs,
            fault,
            ..
        } = result;
        match fault {
            Some(raised) => Err(SandboxError::new(
                raised,
                identifier,
                source.clone(),
                ExecutionSummary::new(costs),
            )),
            None => output.ok_or_else(|| {
                SandboxError::new(
                    Fault::EntryNotFound {
                        class_name: source.binary_name().to_owned(),
                        reason: "loader produced no class".to_owned(),
                    },
                    identifier,
                    source.clone(),
                    ExecutionSummary::new(costs),
                )
            }),
        }
    }

    /// Validates the reference closure of `sources` inside an isolated
    /// run.
    ///
    /// Nothing is executed, but validation still benefits from the same
    /// isolation as a run.
    ///
    /// # Errors
    ///
    /// Re-raises the validator's aggregated class-loading fault as a
    /// [`SandboxError`].
    pub fn validate(&self, sources: &[ClassSource]) -> Result<ValidationSummary, SandboxError> {
        let representative = sources
            .first()
            .cloned()
            .unwrap_or_else(|| ClassSource::from_class_name("<none>"));
        let configuration = Arc::clone(&self.configuration);
        let loader = Arc::clone(&self.loader);
        let extractor = Arc::clone(&self.extractor);
        let entries = sources.to_vec();
        let result = self
            .task("cordon-validate")
            .run(move |_meter| {
                let mut context = AnalysisContext::for_entries(&configuration, entries);
                let validator =
                    ReferenceValidator::new(&configuration, loader.as_ref(), extractor.as_ref());
                validator.validate(&mut context).map_err(Fault::from)?;
                Ok(Some(ValidationSummary::from_context(context)))
            })
            .map_err(|spawn| spawn_failure(&representative, &spawn.to_string()))?;
        let RunResult {
            identifier,
            output,
            costs,
            fault,
            ..
        } = result;
        match fault {
            Some(raised) => Err(SandboxError::new(
                raised,
                identifier,
                representative,
                ExecutionSummary::new(costs),
            )),
            None => output.ok_or_else(|| {
                SandboxError::new(
                    Fault::Worker {
                        message: "validation produced no summary".to_owned(),
                    },
                    identifier,
                    representative,
                    ExecutionSummary::new(costs),
                )
            }),
        }
    }

    fn task(&self, label: &str) -> IsolatedTask {
        let mut task = IsolatedTask::new(label, self.profile);
        if let Some(deadline) = self.deadline {
            task = task.with_deadline(deadline);
        }
        task
    }
}

fn conclude(
    entry: &ClassSource,
    result: RunResult<Value>,
) -> Result<ExecutionSummaryWithResult, SandboxError> {
    let RunResult {
        identifier,
        output,
        costs,
        fault,
        ..
    } = result;
    match fault {
        Some(raised) => Err(SandboxError::new(
            raised,
            identifier,
            entry.clone(),
            ExecutionSummary::new(costs),
        )),
        None => {
            info!(
                target: EXECUTOR_TARGET,
                entry = %entry,
                run = %identifier,
                "sandboxed run succeeded"
            );
            Ok(ExecutionSummaryWithResult::new(output, costs))
        }
    }
}

fn spawn_failure(entry: &ClassSource, message: &str) -> SandboxError {
    SandboxError::new(
        Fault::Worker {
            message: message.to_owned(),
        },
        "unspawned",
        entry.clone(),
        ExecutionSummary::default(),
    )
}

fn conversion_failure(entry: &ClassSource, error: &serde_json::Error) -> SandboxError {
    SandboxError::new(
        Fault::Worker {
            message: format!("input/output conversion failed: {error}"),
        },
        "caller",
        entry.clone(),
        ExecutionSummary::default(),
    )
}

/// Maps an invocation fault to its caller-facing form.
///
/// Stack-overflow faults are re-minted with only the first message line,
/// since the raised message may carry instrumentation frames unsuitable
/// for the caller.
fn translate_fault(fault: InvocationFault) -> Fault {
    match fault {
        InvocationFault::StackOverflow { message } => Fault::StackOverflow {
            message: message.lines().next().unwrap_or_default().to_owned(),
        },
        other => Fault::from(other),
    }
}
