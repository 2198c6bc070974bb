//! Deduplicating worklist used for reference-closure traversal.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use thiserror::Error;

/// Raised when an empty worklist is dequeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("worklist is empty")]
pub struct WorklistExhausted;

/// A deduplicating queue over elements of type `T`.
///
/// Elements are keyed by an extraction function. A key is only ever
/// admitted once and the seen-set is never forgotten, so re-enqueueing an
/// already-processed element is a no-op. Every distinct key is therefore
/// dequeued and processed at most once per worklist, and traversals of
/// cyclic reference graphs terminate.
///
/// ```
/// use cordon_analysis::Worklist;
///
/// let mut worklist = Worklist::new(|value: &u32| *value);
/// assert!(worklist.enqueue(7));
/// assert!(!worklist.enqueue(7));
///
/// let mut processed = Vec::new();
/// worklist.process(|_, value| processed.push(value));
/// assert_eq!(processed, vec![7]);
/// ```
#[derive(Debug)]
pub struct Worklist<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    pending: VecDeque<T>,
    seen: HashSet<K>,
    key_of: F,
}

impl<T, K, F> Worklist<T, K, F>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    /// Creates a worklist keyed by `key_of`.
    #[must_use]
    pub fn new(key_of: F) -> Self {
        Self {
            pending: VecDeque::new(),
            seen: HashSet::new(),
            key_of,
        }
    }

    /// Enqueues `element` unless its key has been seen before.
    ///
    /// Returns whether the element was admitted.
    pub fn enqueue(&mut self, element: T) -> bool {
        let key = (self.key_of)(&element);
        if self.seen.insert(key) {
            self.pending.push_back(element);
            true
        } else {
            false
        }
    }

    /// Removes and returns one queued element.
    ///
    /// # Errors
    ///
    /// Fails with [`WorklistExhausted`] when nothing is queued.
    pub fn dequeue(&mut self) -> Result<T, WorklistExhausted> {
        self.pending.pop_front().ok_or(WorklistExhausted)
    }

    /// True when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct keys admitted so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Repeatedly dequeues and applies `action` until the queue drains.
    ///
    /// The action may enqueue newly discovered elements; deduplication
    /// still applies, so processing reaches a fixed point even over
    /// cyclic graphs.
    pub fn process(&mut self, mut action: impl FnMut(&mut Self, T)) {
        while let Some(element) = self.pending.pop_front() {
            action(self, element);
        }
    }
}
