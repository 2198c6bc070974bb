//! Per-run mutable analysis state.

use std::collections::BTreeMap;

use crate::class::LoadedClass;
use crate::config::AnalysisConfiguration;
use crate::messages::MessageCollection;
use crate::source::ClassSource;

/// Mutable state of one validation or execution run.
///
/// A context is created per run, owned by the traversal that drives it,
/// and discarded afterwards; nothing in it is shared between runs.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    classes: BTreeMap<String, LoadedClass>,
    messages: MessageCollection,
    entries: Vec<ClassSource>,
}

impl AnalysisContext {
    /// Creates a context for the given entry sources, with message
    /// filtering taken from `configuration`.
    #[must_use]
    pub fn for_entries(
        configuration: &AnalysisConfiguration,
        entries: Vec<ClassSource>,
    ) -> Self {
        Self {
            classes: BTreeMap::new(),
            messages: MessageCollection::new(
                configuration.minimum_severity(),
                configuration.prefix_filters().to_vec(),
            ),
            entries,
        }
    }

    /// Records a loaded class under its binary name.
    ///
    /// Classes are unique by name; recording a name twice replaces the
    /// earlier entry.
    pub fn record_class(&mut self, class: LoadedClass) {
        self.classes.insert(class.binary_name().to_owned(), class);
    }

    /// The class recorded under `binary_name`, when discovered.
    #[must_use]
    pub fn class(&self, binary_name: &str) -> Option<&LoadedClass> {
        self.classes.get(binary_name)
    }

    /// Every discovered class, keyed by binary name.
    #[must_use]
    pub const fn classes(&self) -> &BTreeMap<String, LoadedClass> {
        &self.classes
    }

    /// Diagnostics accumulated by this run.
    #[must_use]
    pub const fn messages(&self) -> &MessageCollection {
        &self.messages
    }

    /// Mutable access to the run's diagnostics.
    pub const fn messages_mut(&mut self) -> &mut MessageCollection {
        &mut self.messages
    }

    /// The entry sources seeding this run.
    #[must_use]
    pub fn entries(&self) -> &[ClassSource] {
        &self.entries
    }

    /// Consumes the context, yielding the discovered classes and
    /// diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (BTreeMap<String, LoadedClass>, MessageCollection) {
        (self.classes, self.messages)
    }
}
