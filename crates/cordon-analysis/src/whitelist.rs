//! Trusted-name predicates that exempt classes from analysis.

use std::collections::BTreeSet;

use crate::source::binary_form;

/// Predicate over binary class names identifying code trusted enough to
/// bypass sandbox analysis.
///
/// A name matches when it equals an exact entry or falls under one of the
/// namespace prefixes. Whitelisted classes are never loaded or traversed
/// by the reference validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: BTreeSet<String>,
    namespaces: Vec<String>,
}

impl Whitelist {
    /// The minimal trusted surface: the core `java/lang` namespace every
    /// compiled class transitively references.
    #[must_use]
    pub fn minimal() -> Self {
        Self::default().with_namespace("java/lang/")
    }

    /// Matches every name; analysis trusts everything. Intended for test
    /// configurations.
    #[must_use]
    pub fn everything() -> Self {
        // The empty namespace prefixes every name.
        Self::default().with_namespace("")
    }

    /// Adds exact entries, in dotted or slashed form.
    #[must_use]
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries
            .extend(entries.into_iter().map(|entry| binary_form(entry.as_ref())));
        self
    }

    /// Adds a trusted namespace prefix, in dotted or slashed form.
    #[must_use]
    pub fn with_namespace(mut self, prefix: &str) -> Self {
        self.namespaces.push(binary_form(prefix));
        self
    }

    /// Union with another whitelist.
    #[must_use]
    pub fn extend(mut self, other: Self) -> Self {
        self.entries.extend(other.entries);
        self.namespaces.extend(other.namespaces);
        self
    }

    /// True when `binary_name` is trusted.
    #[must_use]
    pub fn matches(&self, binary_name: &str) -> bool {
        self.entries.contains(binary_name)
            || self
                .namespaces
                .iter()
                .any(|namespace| binary_name.starts_with(namespace.as_str()))
    }
}
