//! Immutable analysis rule sets shared across a sandbox family.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::loader::{CodeSupply, SupplyError};
use crate::messages::Severity;
use crate::resolver::{ClassResolver, ExceptionResolver, is_native_exception};
use crate::stitched;
use crate::whitelist::Whitelist;

/// Binary names of the enforcement-fault classes.
///
/// The rule-violation and threshold-violation paths construct these types
/// while a sandboxed run is being torn down, so they must always resolve
/// to the shared definitions; they are pinned in every configuration.
pub const MANDATORY_PINNED_CLASSES: &[&str] = &[
    "sandbox/cordon/rules/RuleViolation",
    "sandbox/cordon/costing/ThresholdViolation",
];

/// Default namespace prefix for sandboxed classes.
pub const DEFAULT_SANDBOX_PREFIX: &str = "sandbox/";

/// Raised by configuration lifecycle operations.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The root was closed while derived configurations still share the
    /// bootstrap supply.
    #[error("bootstrap supply is still shared by {holders} derived configuration(s)")]
    SupplyStillShared {
        /// Number of derived configurations still holding the supply.
        holders: usize,
    },
    /// The bootstrap supply failed to release.
    #[error("failed to release bootstrap code supply: {0}")]
    SupplyClose(#[source] SupplyError),
}

/// Immutable rule set governing one sandbox analysis family.
///
/// A root configuration is constructed once per family and may derive any
/// number of children; a child shares the family's whitelist, pinned
/// classes, and bootstrap supply, but owns its own code-supply scope and
/// may narrow the surfaced severity. Only the root may release the shared
/// bootstrap supply. Configurations are never mutated after construction,
/// so they are safe to read from concurrent runs without synchronisation.
pub struct AnalysisConfiguration {
    whitelist: Whitelist,
    pinned_classes: BTreeSet<String>,
    minimum_severity: Severity,
    analyze_annotations: bool,
    prefix_filters: Vec<String>,
    sandbox_prefix: String,
    code_paths: Vec<Utf8PathBuf>,
    bootstrap: Arc<dyn CodeSupply>,
    is_root: bool,
}

impl AnalysisConfiguration {
    /// Creates the root configuration of a sandbox family.
    ///
    /// The pinned-class set starts from [`MANDATORY_PINNED_CLASSES`];
    /// additions are supplied through
    /// [`AnalysisConfiguration::with_pinned_classes`].
    #[must_use]
    pub fn root(whitelist: Whitelist, bootstrap: Arc<dyn CodeSupply>) -> Self {
        Self {
            whitelist,
            pinned_classes: MANDATORY_PINNED_CLASSES
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            minimum_severity: Severity::Warning,
            analyze_annotations: false,
            prefix_filters: Vec::new(),
            sandbox_prefix: DEFAULT_SANDBOX_PREFIX.to_owned(),
            code_paths: Vec::new(),
            bootstrap,
            is_root: true,
        }
    }

    /// Unions additional pinned classes into the mandatory set.
    #[must_use]
    pub fn with_pinned_classes<I, S>(mut self, additions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned_classes
            .extend(additions.into_iter().map(Into::into));
        self
    }

    /// Sets the minimum severity surfaced by this configuration.
    #[must_use]
    pub const fn with_minimum_severity(mut self, minimum_severity: Severity) -> Self {
        self.minimum_severity = minimum_severity;
        self
    }

    /// Enables analysis of annotation references.
    #[must_use]
    pub const fn with_annotation_analysis(mut self) -> Self {
        self.analyze_annotations = true;
        self
    }

    /// Restricts surfaced diagnostics to origins under the given binary
    /// name prefixes.
    #[must_use]
    pub fn with_prefix_filters(mut self, prefix_filters: Vec<String>) -> Self {
        self.prefix_filters = prefix_filters;
        self
    }

    /// Derives a child configuration.
    ///
    /// The child shares this family's whitelist, pinned classes, and
    /// bootstrap supply; it obtains its own code-supply scope over
    /// `extra_code_paths` and may narrow the surfaced severity. A child is
    /// not a root and must not release the shared bootstrap supply.
    #[must_use]
    pub fn child(
        &self,
        extra_code_paths: Vec<Utf8PathBuf>,
        minimum_severity: Option<Severity>,
    ) -> Self {
        Self {
            whitelist: self.whitelist.clone(),
            pinned_classes: self.pinned_classes.clone(),
            minimum_severity: minimum_severity.unwrap_or(self.minimum_severity),
            analyze_annotations: self.analyze_annotations,
            prefix_filters: self.prefix_filters.clone(),
            sandbox_prefix: self.sandbox_prefix.clone(),
            code_paths: extra_code_paths,
            bootstrap: Arc::clone(&self.bootstrap),
            is_root: false,
        }
    }

    /// True when `binary_name` must resolve to its shared definition.
    #[must_use]
    pub fn is_pinned_class(&self, binary_name: &str) -> bool {
        self.pinned_classes.contains(binary_name)
    }

    /// True when `binary_name` lives in the sandbox namespace.
    #[must_use]
    pub fn is_sandbox_class(&self, binary_name: &str) -> bool {
        binary_name.starts_with(self.sandbox_prefix.as_str())
    }

    /// True when `binary_name` denotes an exception type the runtime
    /// throws natively, in either its sandboxed or original spelling.
    #[must_use]
    pub fn is_jvm_exception(&self, binary_name: &str) -> bool {
        let original = binary_name
            .strip_prefix(self.sandbox_prefix.as_str())
            .unwrap_or(binary_name);
        is_native_exception(original)
    }

    /// True when `binary_name` has a stitched template, in either its
    /// sandboxed or original spelling.
    #[must_use]
    pub fn is_template_class(&self, binary_name: &str) -> bool {
        stitched::is_stitched(binary_name)
            || stitched::is_stitched(&format!("{}{binary_name}", self.sandbox_prefix))
    }

    /// The configured whitelist.
    #[must_use]
    pub const fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Minimum severity surfaced by this configuration.
    #[must_use]
    pub const fn minimum_severity(&self) -> Severity {
        self.minimum_severity
    }

    /// Whether annotation references are analysed.
    #[must_use]
    pub const fn analyze_annotations(&self) -> bool {
        self.analyze_annotations
    }

    /// Origin prefixes whose diagnostics are retained.
    #[must_use]
    pub fn prefix_filters(&self) -> &[String] {
        &self.prefix_filters
    }

    /// The sandbox namespace prefix.
    #[must_use]
    pub fn sandbox_prefix(&self) -> &str {
        &self.sandbox_prefix
    }

    /// Code paths scoped to this configuration.
    #[must_use]
    pub fn code_paths(&self) -> &[Utf8PathBuf] {
        &self.code_paths
    }

    /// True for the family root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }

    /// The shared bootstrap code supply.
    #[must_use]
    pub fn bootstrap(&self) -> &dyn CodeSupply {
        self.bootstrap.as_ref()
    }

    /// Class-name resolver for this configuration.
    #[must_use]
    pub fn class_resolver(&self) -> ClassResolver {
        ClassResolver::new(self.pinned_classes.clone(), self.sandbox_prefix.clone())
    }

    /// Exception resolver for this configuration.
    #[must_use]
    pub fn exception_resolver(&self) -> ExceptionResolver {
        ExceptionResolver::new(self.class_resolver())
    }

    /// Releases this configuration's code-supply scope; the root also
    /// releases the shared bootstrap supply.
    ///
    /// # Errors
    ///
    /// A root close fails fast with
    /// [`ConfigurationError::SupplyStillShared`] while derived
    /// configurations still hold the supply — a child's hold is released
    /// when the child itself is dropped — and propagates supply release
    /// failures. Child closes only release the child's own scope.
    pub fn close(&self) -> Result<(), ConfigurationError> {
        if !self.is_root {
            return Ok(());
        }
        let holders = Arc::strong_count(&self.bootstrap).saturating_sub(1);
        if holders > 0 {
            return Err(ConfigurationError::SupplyStillShared { holders });
        }
        self.bootstrap
            .close()
            .map_err(ConfigurationError::SupplyClose)
    }
}

impl fmt::Debug for AnalysisConfiguration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AnalysisConfiguration")
            .field("pinned_classes", &self.pinned_classes.len())
            .field("minimum_severity", &self.minimum_severity)
            .field("analyze_annotations", &self.analyze_annotations)
            .field("sandbox_prefix", &self.sandbox_prefix)
            .field("code_paths", &self.code_paths)
            .field("is_root", &self.is_root)
            .finish_non_exhaustive()
    }
}
