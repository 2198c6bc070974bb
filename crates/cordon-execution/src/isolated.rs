//! Thread-per-run isolation with one-shot result publication.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use cordon_analysis::MessageCollection;
use cordon_costing::{CostMeter, CostSnapshot, ExecutionProfile};
use thiserror::Error;
use tracing::{debug, warn};

use crate::fault::Fault;

/// Tracing target for isolation operations.
const ISOLATED_TARGET: &str = "cordon_execution::isolated";

/// Source of unique worker identifiers.
static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(0);

/// Raised when the operating system refuses to create a worker thread.
#[derive(Debug, Error)]
#[error("failed to spawn isolated worker thread: {0}")]
pub struct IsolationError(#[from] std::io::Error);

/// Outcome of one isolated run.
///
/// Produced exactly once per run by the worker thread before the
/// completion signal fires, and read only afterwards by the initiating
/// thread.
#[derive(Debug)]
pub struct RunResult<T> {
    /// Name of the worker thread that executed the run.
    pub identifier: String,
    /// Output of the action, when it completed with a value.
    pub output: Option<T>,
    /// Cost totals snapshotted at the end of the run.
    pub costs: CostSnapshot,
    /// Diagnostics embedded in a captured class-loading fault.
    pub messages: MessageCollection,
    /// Fault captured at the isolation boundary, when the action failed.
    pub fault: Option<Fault>,
}

/// Runs units of work on dedicated, uniquely named worker threads.
///
/// Each run establishes a fresh cost-accounting scope, handed to the
/// action as an explicit meter so counters start at zero and parallel
/// runs never observe each other. The initiating thread blocks until the
/// worker publishes its result exactly once; with a deadline configured
/// the wait stops at the deadline, the partial costs are snapshotted, and
/// the worker is left to finish detached.
#[derive(Debug, Clone)]
pub struct IsolatedTask {
    label: String,
    profile: ExecutionProfile,
    deadline: Option<Duration>,
}

impl IsolatedTask {
    /// Creates a task factory with the given thread label and profile.
    #[must_use]
    pub fn new(label: impl Into<String>, profile: ExecutionProfile) -> Self {
        Self {
            label: label.into(),
            profile,
            deadline: None,
        }
    }

    /// Bounds how long the initiating thread waits for each run.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Executes `action` on a fresh worker thread and waits for its
    /// result.
    ///
    /// Every fault — including a worker panic — is captured into the
    /// returned [`RunResult`] rather than unwound across the thread
    /// boundary; one level of fault wrapping is removed and diagnostics
    /// embedded in a class-loading fault are extracted. Costs are
    /// snapshotted whatever the outcome.
    ///
    /// # Errors
    ///
    /// Fails with [`IsolationError`] only when the operating system
    /// refuses to create the worker thread.
    pub fn run<T, F>(&self, action: F) -> Result<RunResult<T>, IsolationError>
    where
        T: Send + 'static,
        F: FnOnce(&CostMeter) -> Result<Option<T>, Fault> + Send + 'static,
    {
        let identifier = format!(
            "{}-{}",
            self.label,
            NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed)
        );
        let meter = Arc::new(CostMeter::new(self.profile));
        let worker_meter = Arc::clone(&meter);
        let (sender, receiver) = mpsc::sync_channel::<Result<Option<T>, Fault>>(1);

        let handle = thread::Builder::new()
            .name(identifier.clone())
            .spawn(move || {
                let outcome =
                    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        action(&worker_meter)
                    }))
                    .unwrap_or_else(|panic| {
                        Err(Fault::Worker {
                            message: panic_message(panic.as_ref()),
                        })
                    });
                // The receiver may have abandoned the wait at its
                // deadline; an undeliverable result is simply dropped.
                drop(sender.send(outcome));
            })?;
        let outcome = self.wait(&identifier, &receiver);
        drop(handle);

        let costs = meter.snapshot();
        let (output, fault) = match outcome {
            Ok(output) => (output, None),
            Err(raw) => (None, Some(raw.unwrapped())),
        };
        let messages = fault
            .as_ref()
            .and_then(Fault::embedded_messages)
            .cloned()
            .unwrap_or_default();
        debug!(
            target: ISOLATED_TARGET,
            run = %identifier,
            faulted = fault.is_some(),
            "isolated run completed"
        );
        Ok(RunResult {
            identifier,
            output,
            costs,
            messages,
            fault,
        })
    }

    fn wait<T>(
        &self,
        identifier: &str,
        receiver: &mpsc::Receiver<Result<Option<T>, Fault>>,
    ) -> Result<Option<T>, Fault> {
        let published = match self.deadline {
            Some(deadline) => receiver.recv_timeout(deadline).map_err(|reason| match reason {
                mpsc::RecvTimeoutError::Timeout => {
                    warn!(
                        target: ISOLATED_TARGET,
                        run = %identifier,
                        ?deadline,
                        "deadline expired; detaching worker"
                    );
                    Fault::TimedOut { waited: deadline }
                }
                mpsc::RecvTimeoutError::Disconnected => disconnected_fault(),
            }),
            None => receiver.recv().map_err(|_| disconnected_fault()),
        };
        published.unwrap_or_else(Err)
    }
}

/// The worker always publishes before exiting; a disconnect without a
/// publication means it was torn down externally.
fn disconnected_fault() -> Fault {
    Fault::Worker {
        message: "worker exited without publishing a result".to_owned(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic.downcast_ref::<&str>().map_or_else(
        || {
            panic
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_else(|| "worker panicked".to_owned())
        },
        |message| (*message).to_owned(),
    )
}
