//! Built-in tables backing sandbox namespace stitching.
//!
//! A handful of structural container and utility types need synthetic
//! members injected when they are mapped into the sandbox namespace, so
//! sandboxed instances keep the capability surface code compiled against
//! the original types expects. The tables are constant data keyed by
//! sandboxed class name; they are initialised once, never mutated, and
//! consulted by the external rewriter when it emits a stitched type.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Description of one synthetic member injected into a stitched class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchedMember {
    /// Name of the injected member.
    pub name: &'static str,
    /// Type descriptor of the injected member.
    pub descriptor: &'static str,
}

static STITCHED_INTERFACES: Lazy<BTreeMap<&'static str, Vec<StitchedMember>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "sandbox/java/util/List",
            vec![StitchedMember {
                name: "subList",
                descriptor: "(II)Lsandbox/java/util/List;",
            }],
        ),
        (
            "sandbox/java/lang/CharSequence",
            vec![
                StitchedMember {
                    name: "subSequence",
                    descriptor: "(II)Lsandbox/java/lang/CharSequence;",
                },
                StitchedMember {
                    name: "toString",
                    descriptor: "()Ljava/lang/String;",
                },
            ],
        ),
        (
            "sandbox/java/lang/Iterable",
            vec![StitchedMember {
                name: "iterator",
                descriptor: "()Lsandbox/java/util/Iterator;",
            }],
        ),
        (
            "sandbox/java/util/Comparator",
            vec![StitchedMember {
                name: "reversed",
                descriptor: "()Lsandbox/java/util/Comparator;",
            }],
        ),
    ])
});

static STITCHED_CLASSES: Lazy<BTreeMap<&'static str, Vec<StitchedMember>>> = Lazy::new(|| {
    BTreeMap::from([
        (
            "sandbox/java/lang/Enum",
            vec![StitchedMember {
                name: "compareTo",
                descriptor: "(Lsandbox/java/lang/Enum;)I",
            }],
        ),
        (
            "sandbox/java/lang/String",
            vec![StitchedMember {
                name: "toString",
                descriptor: "()Ljava/lang/String;",
            }],
        ),
    ])
});

/// Synthetic members injected for `sandboxed_name`, when it is stitched.
#[must_use]
pub fn stitched_members(sandboxed_name: &str) -> Option<&'static [StitchedMember]> {
    STITCHED_INTERFACES
        .get(sandboxed_name)
        .or_else(|| STITCHED_CLASSES.get(sandboxed_name))
        .map(Vec::as_slice)
}

/// True when `sandboxed_name` has a stitched template.
#[must_use]
pub fn is_stitched(sandboxed_name: &str) -> bool {
    stitched_members(sandboxed_name).is_some()
}

/// Iterates every stitched class name.
pub fn stitched_names() -> impl Iterator<Item = &'static str> {
    STITCHED_INTERFACES
        .keys()
        .chain(STITCHED_CLASSES.keys())
        .copied()
}
