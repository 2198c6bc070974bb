//! Static reference analysis for the cordon sandbox.
//!
//! This crate decides whether a unit of untrusted compiled code may run:
//! it computes the transitive closure of classes reachable from one or
//! more entry points, checks every reachable class against a configurable
//! policy, and aggregates the findings into diagnostics that either pass
//! the run on to execution or fail it closed.
//!
//! # Core types
//!
//! - [`ClassSource`] and [`LoadedClass`] — the units flowing through the
//!   analysis, produced by the external [`ClassLoader`].
//! - [`AnalysisConfiguration`] — the immutable rule set of a sandbox
//!   family: whitelist, pinned classes, namespace prefix, severity
//!   filtering, and the shared bootstrap [`CodeSupply`]. Roots derive
//!   children that share the family's rules but scope their own code
//!   paths.
//! - [`ClassResolver`] and [`ExceptionResolver`] — the bidirectional
//!   naming scheme between original and sandboxed class identities, with
//!   the carve-out for exception types the runtime throws natively.
//! - [`Worklist`] — the deduplicating queue driving closure traversal.
//! - [`ReferenceValidator`] — the closure-plus-holistic validation pass,
//!   producing a [`ValidationSummary`] or an aggregated
//!   [`ClassLoadingError`].
//!
//! The external collaborators — loading, reference extraction, bootstrap
//! code supply, and the instrumented entry points themselves — are trait
//! seams; the engine never reaches for ambient state and passes its
//! context explicitly.

mod class;
mod config;
mod context;
mod loader;
mod messages;
mod resolver;
mod source;
mod stitched;
mod validator;
mod whitelist;
mod worklist;

pub use class::{EntryPoint, LoadedClass};
pub use config::{
    AnalysisConfiguration, ConfigurationError, DEFAULT_SANDBOX_PREFIX, MANDATORY_PINNED_CLASSES,
};
pub use context::AnalysisContext;
pub use loader::{
    ClassLoader, CodeSupply, InvocationFault, LoadError, ReferenceExtractor, SupplyError,
};
pub use messages::{Message, MessageCollection, Severity, SourceLocation};
pub use resolver::{
    ClassResolver, ExceptionResolver, THROWABLE_WRAPPER_SUFFIX, is_native_exception,
    native_exception_super, native_exceptions, wrapped_name,
};
pub use source::ClassSource;
pub use stitched::{StitchedMember, is_stitched, stitched_members, stitched_names};
pub use validator::{ClassLoadingError, ReferenceValidator, ValidationSummary};
pub use whitelist::Whitelist;
pub use worklist::{Worklist, WorklistExhausted};

#[cfg(test)]
mod tests;
