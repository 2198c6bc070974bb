//! Identification of compiled class units requested for analysis.

use std::fmt;

/// Identifies a compiled class unit to load into the sandbox.
///
/// Sources are immutable values. The binary name uses slash separators
/// (`com/example/Job`); [`ClassSource::dotted_name`] renders the dotted
/// spelling used in operator-facing messages. When a class is discovered
/// through another class's references, the referrer is recorded as the
/// origin so diagnostics can point at the class that caused the load.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassSource {
    binary_name: String,
    requested_from: Option<String>,
}

impl ClassSource {
    /// Creates a source from a class name in dotted or slashed form.
    #[must_use]
    pub fn from_class_name(name: &str) -> Self {
        Self {
            binary_name: binary_form(name),
            requested_from: None,
        }
    }

    /// Creates a source discovered through `origin`'s references.
    #[must_use]
    pub fn requested_by(name: &str, origin: &str) -> Self {
        Self {
            binary_name: binary_form(name),
            requested_from: Some(binary_form(origin)),
        }
    }

    /// Binary (slash-separated) name of the class.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Dotted name used in operator-facing messages.
    #[must_use]
    pub fn dotted_name(&self) -> String {
        self.binary_name.replace('/', ".")
    }

    /// Binary name of the class whose references led here, if any.
    #[must_use]
    pub fn requested_from(&self) -> Option<&str> {
        self.requested_from.as_deref()
    }
}

impl fmt::Display for ClassSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.dotted_name())
    }
}

/// Normalises a class name to its binary (slash-separated) spelling.
pub(crate) fn binary_form(name: &str) -> String {
    name.replace('.', "/")
}
