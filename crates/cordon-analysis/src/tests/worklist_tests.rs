//! Tests for the deduplicating worklist.

use rstest::rstest;

use crate::worklist::{Worklist, WorklistExhausted};

#[rstest]
#[case(1)]
#[case(2)]
#[case(100)]
fn a_key_is_processed_once_no_matter_how_often_enqueued(#[case] attempts: u32) {
    let mut worklist = Worklist::new(|value: &u32| *value);
    for _ in 0..attempts {
        worklist.enqueue(7);
    }
    let mut processed = 0;
    worklist.process(|_, _| processed += 1);
    assert_eq!(processed, 1);
}

#[test]
fn dequeue_fails_on_an_empty_worklist() {
    let mut worklist = Worklist::new(|value: &u32| *value);
    assert!(worklist.is_empty());
    assert_eq!(worklist.dequeue(), Err(WorklistExhausted));
}

#[test]
fn enqueue_reports_whether_the_element_was_admitted() {
    let mut worklist = Worklist::new(|value: &&str| (*value).to_owned());
    assert!(worklist.enqueue("a"));
    assert!(!worklist.enqueue("a"));
    assert_eq!(worklist.seen_count(), 1);
}

#[test]
fn processing_a_cyclic_graph_terminates() {
    // a -> b -> c -> a: the cycle must not re-admit visited keys.
    let mut worklist = Worklist::new(|value: &char| *value);
    worklist.enqueue('a');
    let mut order = Vec::new();
    worklist.process(|list, node| {
        order.push(node);
        let successor = match node {
            'a' => 'b',
            'b' => 'c',
            _ => 'a',
        };
        list.enqueue(successor);
    });
    assert_eq!(order, vec!['a', 'b', 'c']);
    assert_eq!(worklist.seen_count(), 3);
}

#[test]
fn seen_keys_survive_the_drain() {
    let mut worklist = Worklist::new(|value: &u32| *value);
    worklist.enqueue(1);
    worklist.process(|_, _| ());
    // Re-adding a drained key is still a no-op.
    assert!(!worklist.enqueue(1));
    assert!(worklist.is_empty());
}
