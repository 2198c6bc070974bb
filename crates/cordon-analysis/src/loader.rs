//! Collaborator seams at the engine boundary.
//!
//! The engine performs no byte-code rewriting, class loading, or low-level
//! instrumentation itself; those concerns live behind the traits in this
//! module and are supplied by the embedder. The engine only depends on the
//! contracts documented here.

use cordon_costing::ThresholdError;
use thiserror::Error;

use crate::class::LoadedClass;
use crate::context::AnalysisContext;
use crate::source::ClassSource;

/// Loads compiled class units on behalf of the analysis.
pub trait ClassLoader: Send + Sync {
    /// Loads `source`, recording the result in `context`.
    ///
    /// Implementations must record the loaded class via
    /// [`AnalysisContext::record_class`] so the validator can inspect
    /// already-loaded classes without re-loading them.
    ///
    /// # Errors
    ///
    /// Fails with [`LoadError::NotFound`] when the unit does not exist in
    /// any configured supply, and with [`LoadError::Malformed`] when its
    /// byte code cannot be used.
    fn load(
        &self,
        source: &ClassSource,
        context: &mut AnalysisContext,
    ) -> Result<LoadedClass, LoadError>;
}

/// Extracts the distinct class names a loaded class references.
pub trait ReferenceExtractor: Send + Sync {
    /// Binary names referenced by `class`: supertypes, field, parameter
    /// and return types, instantiated types, and invocation targets.
    ///
    /// Annotation-only references are omitted unless
    /// `analyze_annotations` is set.
    fn references_of(&self, class: &LoadedClass, analyze_annotations: bool) -> Vec<String>;
}

/// Closeable provider of foundational code units, shared read-only across
/// a configuration family.
pub trait CodeSupply: Send + Sync {
    /// Raw bytes of `binary_name`, when the supply contains it.
    ///
    /// # Errors
    ///
    /// Fails with [`SupplyError`] when the supply cannot be read.
    fn class_bytes(&self, binary_name: &str) -> Result<Option<Vec<u8>>, SupplyError>;

    /// Releases the supply. Called once, by the family root.
    ///
    /// # Errors
    ///
    /// Fails with [`SupplyError`] when the underlying resource cannot be
    /// released.
    fn close(&self) -> Result<(), SupplyError>;
}

/// Failure in a bootstrap code supply.
#[derive(Debug, Clone, Error)]
#[error("code supply failure: {message}")]
pub struct SupplyError {
    /// Description of the failure.
    pub message: String,
}

/// Failure to load a single class unit.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The unit does not exist in any configured supply.
    #[error("Class file not found; {binary_name}.class")]
    NotFound {
        /// Binary name of the missing class.
        binary_name: String,
    },
    /// The unit exists but its byte code was rejected.
    #[error("Class file malformed; {binary_name}.class: {reason}")]
    Malformed {
        /// Binary name of the malformed class.
        binary_name: String,
        /// Why the byte code was rejected.
        reason: String,
    },
    /// The supply backing the load failed.
    #[error(transparent)]
    Supply(#[from] SupplyError),
}

/// Fault raised while invoking a sandboxed entry point.
#[derive(Debug, Clone, Error)]
pub enum InvocationFault {
    /// A disallowed code construct was reached at run time.
    #[error("disallowed reference to API; {reason}")]
    Rule {
        /// The reference that violated the rules.
        reason: String,
    },
    /// A cost budget was exhausted.
    #[error(transparent)]
    Threshold(#[from] ThresholdError),
    /// The sandboxed call stack overflowed.
    #[error("stack overflow: {message}")]
    StackOverflow {
        /// Message carried by the overflow, possibly including
        /// instrumentation frames.
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
}
