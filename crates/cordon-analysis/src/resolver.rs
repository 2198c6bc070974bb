//! Bidirectional mapping between original and sandboxed class identities.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;

use crate::class::LoadedClass;

/// Suffix appended to a user exception class to name its synthetic
/// throwable wrapper.
pub const THROWABLE_WRAPPER_SUFFIX: &str = "$Thrown";

/// Exception types the underlying runtime constructs and throws itself,
/// mapped to their immediate superclasses.
///
/// The set is closed under the superclass relation: every superclass of a
/// listed type is itself listed, so resolving up the hierarchy never
/// leaves the table.
static NATIVE_EXCEPTIONS: Lazy<BTreeMap<&'static str, Option<&'static str>>> = Lazy::new(|| {
    BTreeMap::from([
        ("java/lang/Throwable", None),
        ("java/lang/Exception", Some("java/lang/Throwable")),
        ("java/lang/RuntimeException", Some("java/lang/Exception")),
        (
            "java/lang/IllegalArgumentException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/IllegalStateException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/NullPointerException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/IndexOutOfBoundsException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/ArithmeticException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/ClassCastException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/UnsupportedOperationException",
            Some("java/lang/RuntimeException"),
        ),
        (
            "java/lang/ReflectiveOperationException",
            Some("java/lang/Exception"),
        ),
        (
            "java/lang/ClassNotFoundException",
            Some("java/lang/ReflectiveOperationException"),
        ),
        ("java/lang/Error", Some("java/lang/Throwable")),
        ("java/lang/VirtualMachineError", Some("java/lang/Error")),
        (
            "java/lang/StackOverflowError",
            Some("java/lang/VirtualMachineError"),
        ),
        (
            "java/lang/OutOfMemoryError",
            Some("java/lang/VirtualMachineError"),
        ),
        ("java/lang/ThreadDeath", Some("java/lang/Error")),
        ("java/lang/LinkageError", Some("java/lang/Error")),
        (
            "java/lang/NoClassDefFoundError",
            Some("java/lang/LinkageError"),
        ),
        (
            "java/lang/IncompatibleClassChangeError",
            Some("java/lang/LinkageError"),
        ),
        (
            "java/lang/NoSuchMethodError",
            Some("java/lang/IncompatibleClassChangeError"),
        ),
    ])
});

/// True when `binary_name` (without sandbox prefix) is an exception type
/// the underlying runtime can construct and throw itself.
#[must_use]
pub fn is_native_exception(binary_name: &str) -> bool {
    NATIVE_EXCEPTIONS.contains_key(binary_name)
}

/// The immediate superclass of a native exception type, when it has one.
#[must_use]
pub fn native_exception_super(binary_name: &str) -> Option<&'static str> {
    NATIVE_EXCEPTIONS.get(binary_name).copied().flatten()
}

/// Iterates the native exception table as (name, superclass) pairs.
pub fn native_exceptions() -> impl Iterator<Item = (&'static str, Option<&'static str>)> {
    NATIVE_EXCEPTIONS
        .iter()
        .map(|(name, super_name)| (*name, *super_name))
}

/// Maps class names into and out of the sandbox namespace.
///
/// For any name not in the pinned set, the sandboxed name is the prefix
/// followed by the original name, and resolving back strips the prefix
/// again; the mapping round-trips.
#[derive(Debug, Clone)]
pub struct ClassResolver {
    pinned_classes: BTreeSet<String>,
    sandbox_prefix: String,
}

impl ClassResolver {
    /// Creates a resolver over the pinned set and namespace prefix.
    #[must_use]
    pub const fn new(pinned_classes: BTreeSet<String>, sandbox_prefix: String) -> Self {
        Self {
            pinned_classes,
            sandbox_prefix,
        }
    }

    /// Sandbox name for `binary_name`.
    ///
    /// Pinned classes resolve to themselves and already-prefixed names are
    /// returned unchanged; every other name gains the sandbox prefix.
    #[must_use]
    pub fn resolve(&self, binary_name: &str) -> String {
        if self.pinned_classes.contains(binary_name) || self.is_sandbox_name(binary_name) {
            binary_name.to_owned()
        } else {
            format!("{}{binary_name}", self.sandbox_prefix)
        }
    }

    /// Original name for `name`, stripping the sandbox prefix if present.
    #[must_use]
    pub fn reverse(&self, name: &str) -> String {
        name.strip_prefix(self.sandbox_prefix.as_str())
            .unwrap_or(name)
            .to_owned()
    }

    /// True when `name` carries the sandbox prefix.
    #[must_use]
    pub fn is_sandbox_name(&self, name: &str) -> bool {
        name.starts_with(self.sandbox_prefix.as_str())
    }

    /// The namespace prefix this resolver applies.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.sandbox_prefix
    }
}

/// Resolves exception-class identities at the sandbox boundary.
///
/// The runtime can only construct and throw its native exception types
/// under their original identities, while user exception types defined in
/// sandboxed code must stay catchable by sandboxed handlers. Each user
/// exception class is therefore paired with a synthetic wrapper that the
/// instrumentation throws instead; this resolver is the single source of
/// truth for that pairing in both directions.
#[derive(Debug, Clone)]
pub struct ExceptionResolver {
    resolver: ClassResolver,
}

impl ExceptionResolver {
    /// Creates an exception resolver over a class-name resolver.
    #[must_use]
    pub const fn new(resolver: ClassResolver) -> Self {
        Self { resolver }
    }

    /// In-sandbox wrapper name for the exception type `class` defines.
    #[must_use]
    pub fn throwable_name(&self, class: &LoadedClass) -> String {
        let resolved = self.resolver.resolve(class.binary_name());
        format!("{resolved}{THROWABLE_WRAPPER_SUFFIX}")
    }

    /// Resolved owner name of `class`'s immediate superclass, when it has
    /// one.
    #[must_use]
    pub fn throwable_super_name(&self, class: &LoadedClass) -> Option<String> {
        class
            .super_name()
            .map(|super_name| self.throwable_owner_name(&self.resolver.resolve(super_name)))
    }

    /// Owner name to use when the runtime itself raises `name`.
    ///
    /// Native exception types resolve to their un-sandboxed form, pinned
    /// classes to themselves, and everything else to the synthetic wrapper
    /// name.
    #[must_use]
    pub fn throwable_owner_name(&self, name: &str) -> String {
        let original = self.resolver.reverse(name);
        if is_native_exception(&original) {
            original
        } else if self.resolver.resolve(name) == name && !self.resolver.is_sandbox_name(name) {
            // Pinned classes keep their shared identity.
            name.to_owned()
        } else {
            format!("{name}{THROWABLE_WRAPPER_SUFFIX}")
        }
    }
}

/// Original exception-class name paired with a wrapper name, when `name`
/// is a synthetic wrapper.
#[must_use]
pub fn wrapped_name(name: &str) -> Option<&str> {
    name.strip_suffix(THROWABLE_WRAPPER_SUFFIX)
}
