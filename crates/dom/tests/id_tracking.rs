//! Tests for `getElementById` bookkeeping.
//!
//! The id index must list exactly the connected elements carrying an id,
//! across every structural and attribute mutation.

use std::sync::{Arc, Mutex};

use bridge::NativeTree;
use dom::{Document, NodeId};

fn document() -> Document {
    let _ = env_logger::builder().is_test(true).try_init();
    Document::new(Box::new(Arc::new(Mutex::new(NativeTree::new()))))
}

/// Every element of the document that claims `id`, checked against the index.
fn assert_index_matches(document: &Document, id: &str) {
    let mut expected: Vec<NodeId> = Vec::new();
    let mut stack = vec![document.body()];
    while let Some(node) = stack.pop() {
        if document.id(node) == id {
            expected.push(node);
        }
        stack.extend(document.children(node));
    }
    let mut claimants = document.elements_with_id(id).to_vec();
    claimants.sort();
    expected.sort();
    assert_eq!(claimants, expected, "index out of step for '{id}'");
    for node in claimants {
        assert!(document.is_connected(node));
    }
}

/// Attaching a subtree indexes its ids; detaching it unindexes them.
#[test]
fn subtree_connectedness_drives_the_index() {
    let mut document = document();
    let body = document.body();
    let wrapper = document.create_element("div").unwrap();
    let inner = document.create_element("span").unwrap();
    document.set_attribute(inner, "id", "x").unwrap();
    document.append_child(wrapper, inner).unwrap();

    assert!(!document.is_connected(inner));
    assert_eq!(document.get_element_by_id("x"), None);

    document.append_child(body, wrapper).unwrap();
    assert!(document.is_connected(wrapper));
    assert!(document.is_connected(inner));
    assert_eq!(document.get_element_by_id("x"), Some(inner));

    document.remove_child(body, wrapper).unwrap();
    assert!(!document.is_connected(inner));
    assert_eq!(document.get_element_by_id("x"), None);
    assert_eq!(document.id(inner), "x");
}

/// Changing or removing the id of a connected element moves its index slot.
#[test]
fn id_changes_on_connected_elements_follow_the_attribute() {
    let mut document = document();
    let body = document.body();
    let node = document.create_element("div").unwrap();
    document.append_child(body, node).unwrap();

    document.set_attribute(node, "id", "first").unwrap();
    assert_eq!(document.get_element_by_id("first"), Some(node));

    document.set_id(node, "second").unwrap();
    assert_eq!(document.get_element_by_id("first"), None);
    assert_eq!(document.get_element_by_id("second"), Some(node));

    document.remove_attribute(node, "id").unwrap();
    assert_eq!(document.get_element_by_id("second"), None);

    document.set_attribute(node, "id", "").unwrap();
    assert_eq!(document.get_element_by_id(""), None);
}

/// Detached elements never appear, whatever happens to their id.
#[test]
fn detached_elements_are_never_indexed() {
    let mut document = document();
    let node = document.create_element("div").unwrap();
    document.set_attribute(node, "id", "ghost").unwrap();
    document.set_attribute(node, "id", "ghost2").unwrap();
    document.remove_attribute(node, "id").unwrap();
    assert_eq!(document.get_element_by_id("ghost"), None);
    assert_eq!(document.get_element_by_id("ghost2"), None);
}

/// The most recent claimant answers; removing it reveals the earlier one.
#[test]
fn colliding_ids_answer_with_the_latest_claimant() {
    let mut document = document();
    let body = document.body();
    let first = document.create_element("div").unwrap();
    let second = document.create_element("div").unwrap();
    document.set_attribute(first, "id", "dup").unwrap();
    document.set_attribute(second, "id", "dup").unwrap();
    document.append_child(body, first).unwrap();
    document.append_child(body, second).unwrap();

    assert_eq!(document.get_element_by_id("dup"), Some(second));
    assert_eq!(document.elements_with_id("dup"), &[first, second]);

    document.remove_child(body, second).unwrap();
    assert_eq!(document.get_element_by_id("dup"), Some(first));
}

/// Moving a connected subtree keeps each id indexed exactly once.
#[test]
fn moves_within_the_document_keep_one_slot() {
    let mut document = document();
    let body = document.body();
    let left = document.create_element("section").unwrap();
    let right = document.create_element("section").unwrap();
    let item = document.create_element("p").unwrap();
    document.set_attribute(item, "id", "item").unwrap();
    document.append_child(body, left).unwrap();
    document.append_child(body, right).unwrap();
    document.append_child(left, item).unwrap();

    document.append_child(right, item).unwrap();
    assert_eq!(document.parent(item), Some(right));
    assert_eq!(document.elements_with_id("item"), &[item]);
    assert_index_matches(&document, "item");
}

/// A scripted sequence of mutations never leaves the index stale.
#[test]
fn index_stays_consistent_over_a_mutation_sequence() {
    let mut document = document();
    let body = document.body();
    let nodes: Vec<NodeId> = (0..6).map(|_| document.create_element("div").unwrap()).collect();
    for (index, node) in nodes.iter().enumerate() {
        let id = if index % 2 == 0 { "even" } else { "odd" };
        document.set_attribute(*node, "id", id).unwrap();
    }

    document.append_child(body, nodes[0]).unwrap();
    document.append_child(nodes[0], nodes[1]).unwrap();
    document.append_child(nodes[1], nodes[2]).unwrap();
    document.append_child(nodes[3], nodes[4]).unwrap();
    document.append_child(body, nodes[3]).unwrap();
    assert_index_matches(&document, "even");
    assert_index_matches(&document, "odd");

    document.set_attribute(nodes[2], "id", "odd").unwrap();
    document.remove_child(nodes[0], nodes[1]).unwrap();
    assert_index_matches(&document, "even");
    assert_index_matches(&document, "odd");

    document.insert_before(body, nodes[1], Some(nodes[0])).unwrap();
    document.remove_attribute(nodes[4], "id").unwrap();
    document.append_child(nodes[4], nodes[5]).unwrap();
    assert_index_matches(&document, "even");
    assert_index_matches(&document, "odd");
    assert_eq!(document.children(body), vec![nodes[1], nodes[0], nodes[3]]);
}
