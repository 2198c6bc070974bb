//! Loaded class units and the sandboxed entry-point contract.

use std::fmt;
use std::sync::Arc;

use cordon_costing::CostMeter;
use serde_json::Value;

use crate::loader::InvocationFault;

/// The single operation a sandboxed entry class exposes.
///
/// An entry class must expose exactly one operation taking a single
/// argument and returning an optional result; the loader materialises that
/// operation as an `EntryPoint` handle on the [`LoadedClass`]. Instrumented
/// implementations report their activity through the supplied meter and
/// fail with an [`InvocationFault`] when a rule or budget is violated.
pub trait EntryPoint: Send + Sync {
    /// Invokes the entry operation with `input`.
    ///
    /// # Errors
    ///
    /// Fails when the sandboxed code reaches a disallowed construct,
    /// exhausts a cost budget, overflows its call stack, or raises one of
    /// its own throwable types.
    fn invoke(&self, input: Value, meter: &CostMeter) -> Result<Option<Value>, InvocationFault>;
}

/// A compiled class unit produced by the loader.
///
/// Carries the unit's binary name, its immediate superclass when known,
/// the raw byte code, and — for entry classes — the invocable handle of
/// the entry operation. The engine only ever reads loaded classes; the
/// loader owns their production.
#[derive(Clone)]
pub struct LoadedClass {
    binary_name: String,
    super_name: Option<String>,
    byte_code: Vec<u8>,
    entry: Option<Arc<dyn EntryPoint>>,
}

impl LoadedClass {
    /// Creates a class unit with no invocable entry operation.
    #[must_use]
    pub fn new(
        binary_name: impl Into<String>,
        super_name: Option<String>,
        byte_code: Vec<u8>,
    ) -> Self {
        Self {
            binary_name: binary_name.into(),
            super_name,
            byte_code,
            entry: None,
        }
    }

    /// Attaches the handle of the class's entry operation.
    #[must_use]
    pub fn with_entry_point(mut self, entry: Arc<dyn EntryPoint>) -> Self {
        self.entry = Some(entry);
        self
    }

    /// Binary name of the class.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Binary name of the immediate superclass, when the class has one.
    #[must_use]
    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    /// Raw byte code of the unit.
    #[must_use]
    pub fn byte_code(&self) -> &[u8] {
        &self.byte_code
    }

    /// Handle of the entry operation, when the class exposes one.
    #[must_use]
    pub fn entry_point(&self) -> Option<Arc<dyn EntryPoint>> {
        self.entry.clone()
    }
}

impl fmt::Debug for LoadedClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoadedClass")
            .field("binary_name", &self.binary_name)
            .field("super_name", &self.super_name)
            .field("byte_code_len", &self.byte_code.len())
            .field("has_entry_point", &self.entry.is_some())
            .finish()
    }
}
