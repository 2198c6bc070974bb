//! Severity-levelled diagnostics and their aggregation.

use std::fmt;

use serde::Serialize;
use strum::Display;

/// Severity of a diagnostic message.
///
/// The ordering is significant: a [`MessageCollection`] surfaces only
/// messages at or above its configured minimum severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Progress detail with no bearing on the outcome.
    #[default]
    Informational,
    /// Suspicious but tolerable; the run may proceed.
    Warning,
    /// A policy or loading failure; validation must fail.
    Error,
}

/// Where a diagnostic originated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    class_name: String,
    member_name: Option<String>,
}

impl SourceLocation {
    /// Location naming a class as a whole.
    #[must_use]
    pub fn class(binary_name: impl Into<String>) -> Self {
        Self {
            class_name: binary_name.into(),
            member_name: None,
        }
    }

    /// Location naming a member of a class.
    #[must_use]
    pub fn member(binary_name: impl Into<String>, member_name: impl Into<String>) -> Self {
        Self {
            class_name: binary_name.into(),
            member_name: Some(member_name.into()),
        }
    }

    /// Binary name of the originating class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Name of the originating member, when the diagnostic names one.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted = self.class_name.replace('/', ".");
        match &self.member_name {
            Some(member) => write!(formatter, "{dotted}::{member}"),
            None => formatter.write_str(&dotted),
        }
    }
}

/// A single diagnostic produced during analysis or validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    severity: Severity,
    description: String,
    location: SourceLocation,
}

impl Message {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(severity: Severity, description: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity,
            description: description.into(),
            location,
        }
    }

    /// Creates an ERROR-severity diagnostic.
    #[must_use]
    pub fn error(description: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(Severity::Error, description, location)
    }

    /// Creates a WARNING-severity diagnostic.
    #[must_use]
    pub fn warning(description: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(Severity::Warning, description, location)
    }

    /// Severity of the diagnostic.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Free-text description of the problem.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the diagnostic originated.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl fmt::Display for Message {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}: {} [{}]",
            self.severity, self.description, self.location
        )
    }
}

/// Aggregates diagnostics for one analysis run.
///
/// Messages below the minimum severity, or originating outside the
/// configured prefixes, are suppressed from the surfaced list. ERROR
/// messages still count towards [`MessageCollection::error_count`] even
/// when suppressed, so validation fails closed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageCollection {
    minimum_severity: Severity,
    prefix_filters: Vec<String>,
    messages: Vec<Message>,
    error_count: usize,
}

impl MessageCollection {
    /// Creates a collection surfacing messages at or above
    /// `minimum_severity` whose origins match one of `prefix_filters`
    /// (an empty filter list retains every origin).
    #[must_use]
    pub const fn new(minimum_severity: Severity, prefix_filters: Vec<String>) -> Self {
        Self {
            minimum_severity,
            prefix_filters,
            messages: Vec::new(),
            error_count: 0,
        }
    }

    /// Records a diagnostic, applying severity and origin filtering.
    pub fn add(&mut self, message: Message) {
        if message.severity() == Severity::Error {
            self.error_count += 1;
        }
        if message.severity() >= self.minimum_severity && self.origin_retained(&message) {
            self.messages.push(message);
        }
    }

    fn origin_retained(&self, message: &Message) -> bool {
        self.prefix_filters.is_empty()
            || self
                .prefix_filters
                .iter()
                .any(|prefix| message.location().class_name().starts_with(prefix.as_str()))
    }

    /// Number of ERROR-severity diagnostics recorded, filtered or not.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    /// True when no diagnostic was surfaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of surfaced diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Iterates the surfaced diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Renders the surfaced diagnostics as a sorted, deterministic report.
    #[must_use]
    pub fn rendered(&self) -> String {
        let mut sorted: Vec<&Message> = self.messages.iter().collect();
        sorted.sort_by(|left, right| {
            left.location()
                .cmp(right.location())
                .then(left.severity().cmp(&right.severity()))
                .then(left.description().cmp(right.description()))
        });
        let lines: Vec<String> = sorted.iter().map(|message| message.to_string()).collect();
        lines.join("\n")
    }
}
