//! Reference-closure computation and policy validation.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::class::LoadedClass;
use crate::config::{AnalysisConfiguration, MANDATORY_PINNED_CLASSES};
use crate::context::AnalysisContext;
use crate::loader::{ClassLoader, ReferenceExtractor};
use crate::messages::{Message, MessageCollection, SourceLocation};
use crate::resolver::ClassResolver;
use crate::source::ClassSource;
use crate::worklist::Worklist;

/// Tracing target for validator operations.
const VALIDATOR_TARGET: &str = "cordon_analysis::validator";

/// Successful outcome of a validation run: the discovered classes and
/// every surfaced diagnostic, warnings included.
#[derive(Debug)]
pub struct ValidationSummary {
    classes: BTreeMap<String, LoadedClass>,
    messages: MessageCollection,
}

impl ValidationSummary {
    /// Builds a summary from a validated context.
    #[must_use]
    pub fn from_context(context: AnalysisContext) -> Self {
        let (classes, messages) = context.into_parts();
        Self { classes, messages }
    }

    /// The discovered classes, keyed by binary name.
    #[must_use]
    pub const fn classes(&self) -> &BTreeMap<String, LoadedClass> {
        &self.classes
    }

    /// Diagnostics surfaced by the run.
    #[must_use]
    pub const fn messages(&self) -> &MessageCollection {
        &self.messages
    }
}

/// Aggregated failure of a validation run.
///
/// Carries every diagnostic collected during the closure and holistic
/// passes together with the partial class map, so callers see all
/// problems at once rather than the first.
#[derive(Debug, Clone, Error)]
#[error("class loading failed with {} error(s)", .messages.error_count())]
pub struct ClassLoadingError {
    messages: MessageCollection,
    classes: BTreeMap<String, LoadedClass>,
}

impl ClassLoadingError {
    /// Creates an aggregated failure from a run's diagnostics and partial
    /// class map.
    #[must_use]
    pub const fn new(
        messages: MessageCollection,
        classes: BTreeMap<String, LoadedClass>,
    ) -> Self {
        Self { messages, classes }
    }

    /// Every diagnostic the run collected.
    #[must_use]
    pub const fn messages(&self) -> &MessageCollection {
        &self.messages
    }

    /// The classes discovered before the failure.
    #[must_use]
    pub const fn classes(&self) -> &BTreeMap<String, LoadedClass> {
        &self.classes
    }
}

/// Walks the reference closure of one or more entry sources and validates
/// every reachable class against the configured policy.
///
/// The traversal is two-phase: a cheap per-class pass that skips
/// whitelisted names and records local load failures without aborting,
/// then one holistic pass over the entire discovered set for properties
/// that can only be judged once the whole graph is known.
pub struct ReferenceValidator<'a> {
    configuration: &'a AnalysisConfiguration,
    loader: &'a dyn ClassLoader,
    extractor: &'a dyn ReferenceExtractor,
}

impl<'a> ReferenceValidator<'a> {
    /// Creates a validator over the given collaborators.
    #[must_use]
    pub const fn new(
        configuration: &'a AnalysisConfiguration,
        loader: &'a dyn ClassLoader,
        extractor: &'a dyn ReferenceExtractor,
    ) -> Self {
        Self {
            configuration,
            loader,
            extractor,
        }
    }

    /// Computes the reference closure of the context's entries and
    /// validates the discovered class set.
    ///
    /// Per-class load failures are recorded as ERROR diagnostics and do
    /// not abort the traversal; the remaining classes are still
    /// processed.
    ///
    /// # Errors
    ///
    /// Fails with [`ClassLoadingError`] carrying every diagnostic and the
    /// partial class map when any ERROR-severity diagnostic was recorded.
    pub fn validate(&self, context: &mut AnalysisContext) -> Result<(), ClassLoadingError> {
        let resolver = self.configuration.class_resolver();
        let mut worklist =
            Worklist::new(|source: &ClassSource| resolver.reverse(source.binary_name()));
        for entry in context.entries().to_vec() {
            worklist.enqueue(entry);
        }
        worklist.process(|list, source| self.visit(context, list, &resolver, &source));
        self.holistic_pass(context, &resolver);

        if context.messages().error_count() > 0 {
            return Err(ClassLoadingError::new(
                context.messages().clone(),
                context.classes().clone(),
            ));
        }
        debug!(
            target: VALIDATOR_TARGET,
            discovered = context.classes().len(),
            "reference closure validated"
        );
        Ok(())
    }

    fn visit<F>(
        &self,
        context: &mut AnalysisContext,
        worklist: &mut Worklist<ClassSource, String, F>,
        resolver: &ClassResolver,
        source: &ClassSource,
    ) where
        F: Fn(&ClassSource) -> String,
    {
        let binary_name = resolver.reverse(source.binary_name());
        if self.configuration.whitelist().matches(&binary_name) {
            debug!(target: VALIDATOR_TARGET, class = %binary_name, "skipping whitelisted class");
            return;
        }

        let loaded = match self.loader.load(source, context) {
            Ok(class) => class,
            Err(failure) => {
                // Local failure, global continue: the rest of the closure
                // must still be processed.
                warn!(
                    target: VALIDATOR_TARGET,
                    class = %binary_name,
                    error = %failure,
                    "failed to load referenced class"
                );
                let location = source.requested_from().map_or_else(
                    || SourceLocation::class(binary_name.clone()),
                    SourceLocation::class,
                );
                context
                    .messages_mut()
                    .add(Message::error(failure.to_string(), location));
                return;
            }
        };

        let mut references = self
            .extractor
            .references_of(&loaded, self.configuration.analyze_annotations());
        references.sort_unstable();
        references.dedup();
        let reference_count = references.len();
        for reference in references {
            worklist.enqueue(ClassSource::requested_by(&reference, loaded.binary_name()));
        }
        debug!(
            target: VALIDATOR_TARGET,
            class = %binary_name,
            references = reference_count,
            "visited class"
        );
    }

    /// Judges properties that need the whole discovered graph.
    fn holistic_pass(&self, context: &mut AnalysisContext, resolver: &ClassResolver) {
        let mut findings = Vec::new();
        for (name, class) in context.classes() {
            if let Some(super_name) = class.super_name() {
                if is_enforcement_class(resolver, super_name) {
                    findings.push(Message::error(
                        format!(
                            "extends enforcement type {super_name}; budget faults must stay uncatchable"
                        ),
                        SourceLocation::class(name.clone()),
                    ));
                }
                if self.configuration.is_jvm_exception(name)
                    && !self.configuration.is_jvm_exception(super_name)
                {
                    findings.push(Message::error(
                        format!(
                            "native exception type extends {super_name}, which is not native"
                        ),
                        SourceLocation::class(name.clone()),
                    ));
                }
            }
            if self.configuration.is_template_class(name)
                && !self.configuration.is_sandbox_class(name)
            {
                findings.push(Message::error(
                    "stitched template must live in the sandbox namespace",
                    SourceLocation::class(name.clone()),
                ));
            }
        }
        for finding in findings {
            context.messages_mut().add(finding);
        }
    }
}

/// True when `binary_name` names one of the enforcement-fault classes, in
/// either its pinned or to-be-resolved spelling.
fn is_enforcement_class(resolver: &ClassResolver, binary_name: &str) -> bool {
    MANDATORY_PINNED_CLASSES.contains(&binary_name)
        || MANDATORY_PINNED_CLASSES.contains(&resolver.resolve(binary_name).as_str())
}
