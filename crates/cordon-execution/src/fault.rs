//! Fault taxonomy and the caller-facing sandbox error.

use std::time::Duration;

use cordon_analysis::{ClassLoadingError, ClassSource, InvocationFault, LoadError, MessageCollection};
use cordon_costing::ThresholdError;
use thiserror::Error;

use crate::summary::ExecutionSummary;

/// Every failure kind a sandboxed run can produce.
///
/// Faults form a closed set so orchestration code can match on the kind
/// instead of probing concrete types. One level of wrapping is permitted
/// for faults relayed through an outer layer; [`Fault::unwrapped`] removes
/// exactly that level.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    /// Reference validation or class loading failed.
    #[error(transparent)]
    Loading(Box<ClassLoadingError>),
    /// A disallowed code construct was reached at run time.
    #[error("disallowed reference to API; {reason}")]
    Rule {
        /// The reference that violated the rules.
        reason: String,
    },
    /// A cost budget was exhausted.
    #[error(transparent)]
    Threshold(ThresholdError),
    /// The sandboxed call stack overflowed.
    #[error("stack overflow: {message}")]
    StackOverflow {
        /// Message carried by the overflow.
        message: String,
    },
    /// The sandboxed code raised one of its own throwable types.
    #[error("{class_name}: {message}")]
    Thrown {
        /// Sandboxed throwable class that was raised.
        class_name: String,
        /// Message carried by the throwable.
        message: String,
    },
    /// The loader yielded no usable entry for the requested class.
    #[error("entry class {class_name} unavailable: {reason}")]
    EntryNotFound {
        /// Binary name of the requested entry class.
        class_name: String,
        /// Why no entry was available.
        reason: String,
    },
    /// The initiating thread stopped waiting at its deadline.
    #[error("run exceeded its deadline of {waited:?}")]
    TimedOut {
        /// How long the initiating thread waited.
        waited: Duration,
    },
    /// The worker thread failed outside sandboxed code.
    #[error("isolated worker failed: {message}")]
    Worker {
        /// Description of the worker failure.
        message: String,
    },
    /// A fault relayed through an outer layer.
    #[error(transparent)]
    Wrapped(Box<Fault>),
}

impl Fault {
    /// Removes one level of wrapping, when present.
    #[must_use]
    pub fn unwrapped(self) -> Self {
        match self {
            Self::Wrapped(inner) => *inner,
            other => other,
        }
    }

    /// Wraps the fault one level deeper.
    #[must_use]
    pub fn wrapped(self) -> Self {
        Self::Wrapped(Box::new(self))
    }

    /// Diagnostics embedded in a loading fault, looking through at most
    /// one level of wrapping.
    #[must_use]
    pub fn embedded_messages(&self) -> Option<&MessageCollection> {
        match self {
            Self::Loading(failure) => Some(failure.messages()),
            Self::Wrapped(inner) => match inner.as_ref() {
                Self::Loading(failure) => Some(failure.messages()),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<ClassLoadingError> for Fault {
    fn from(failure: ClassLoadingError) -> Self {
        Self::Loading(Box::new(failure))
    }
}

impl From<ThresholdError> for Fault {
    fn from(violation: ThresholdError) -> Self {
        Self::Threshold(violation)
    }
}

impl From<InvocationFault> for Fault {
    fn from(fault: InvocationFault) -> Self {
        match fault {
            InvocationFault::Rule { reason } => Self::Rule { reason },
            InvocationFault::Threshold(violation) => Self::Threshold(violation),
            InvocationFault::StackOverflow { message } => Self::StackOverflow { message },
            InvocationFault::Thrown {
                class_name,
                message,
            } => Self::Thrown {
                class_name,
                message,
            },
        }
    }
}

impl From<LoadError> for Fault {
    fn from(failure: LoadError) -> Self {
        let reason = failure.to_string();
        match failure {
            LoadError::NotFound { binary_name } | LoadError::Malformed { binary_name, .. } => {
                Self::EntryNotFound {
                    class_name: binary_name,
                    reason,
                }
            }
            LoadError::Supply(supply) => Self::Worker {
                message: supply.to_string(),
            },
        }
    }
}

/// The only fault type a run caller observes.
///
/// Always carries an execution summary built from the captured costs, so
/// resource usage stays observable even when the run failed.
#[derive(Debug, Error)]
#[error("sandboxed run of {entry} failed in {thread_name}: {fault}")]
pub struct SandboxError {
    fault: Box<Fault>,
    thread_name: String,
    entry: ClassSource,
    summary: ExecutionSummary,
}

impl SandboxError {
    /// Creates a caller-facing error from a captured fault.
    #[must_use]
    pub fn new(
        fault: Fault,
        thread_name: impl Into<String>,
        entry: ClassSource,
        summary: ExecutionSummary,
    ) -> Self {
        Self {
            fault: Box::new(fault),
            thread_name: thread_name.into(),
            entry,
            summary,
        }
    }

    /// The underlying fault.
    #[must_use]
    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    /// Name of the worker thread that executed the run.
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// The entry source the run targeted.
    #[must_use]
    pub const fn entry(&self) -> &ClassSource {
        &self.entry
    }

    /// Resource usage accrued up to the fault.
    #[must_use]
    pub const fn summary(&self) -> &ExecutionSummary {
        &self.summary
    }

    /// Consumes the error, yielding the fault.
    #[must_use]
    pub fn into_fault(self) -> Fault {
        *self.fault
    }
}
