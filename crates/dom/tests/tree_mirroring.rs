//! Tests that the native tree mirrors the local tree: creation, insertion,
//! moves, removal and disposal, in both immediate and batched delivery.

use std::sync::{Arc, Mutex};

use bridge::{
    BridgeConfig, BridgeError, NativeBridge, NativeNodeKind, NativeTree, NativeValue, TargetId, UiCommand,
};
use dom::{Document, DomError, ElementOptions, NodeType, RectProperty};

fn document(config: &BridgeConfig) -> (Document, Arc<Mutex<NativeTree>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = Arc::new(Mutex::new(NativeTree::new()));
    (Document::with_config(Box::new(Arc::clone(&tree)), config), tree)
}

/// Each element is created natively exactly once, with its upper-case tag.
#[test]
fn elements_are_created_once() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let node = document.create_element("div").unwrap();
    let target = document.target_of(node).unwrap();
    document.set_attribute(node, "title", "t").unwrap();
    document.append_child(document.body(), node).unwrap();

    let tree = tree.lock().unwrap();
    let creations: Vec<_> = tree
        .commands()
        .iter()
        .filter(|command| matches!(command, UiCommand::CreateElement { .. }))
        .collect();
    assert_eq!(
        creations,
        vec![&UiCommand::CreateElement {
            target,
            tag: String::from("DIV")
        }]
    );
    assert_eq!(document.tag_name(node), Some("DIV"));
    assert!(!target.is_reserved());
}

/// Structure, including insertBefore and moves, is reproduced natively.
#[test]
fn native_children_follow_local_children() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let body = document.body();
    let list = document.create_element("ul").unwrap();
    let first = document.create_element("li").unwrap();
    let second = document.create_element("li").unwrap();
    let text = document.create_text_node("label").unwrap();
    let note = document.create_comment("note").unwrap();

    document.append_child(body, list).unwrap();
    document.append_child(list, second).unwrap();
    document.insert_before(list, first, Some(second)).unwrap();
    document.append_child(first, text).unwrap();
    document.append_child(body, note).unwrap();
    document.append_child(second, text).unwrap();

    let target = |node| document.target_of(node).unwrap();
    let tree = tree.lock().unwrap();
    assert_eq!(tree.children_of(TargetId::BODY), &[target(list), target(note)]);
    assert_eq!(tree.children_of(target(list)), &[target(first), target(second)]);
    assert!(tree.children_of(target(first)).is_empty());
    assert_eq!(tree.children_of(target(second)), &[target(text)]);
    assert_eq!(
        tree.node(target(note)).map(|node| node.kind.clone()),
        Some(NativeNodeKind::Comment { data: String::from("note") })
    );
    assert_eq!(document.node_type(text), Some(NodeType::Text));
    assert_eq!(document.node_name(note).as_deref(), Some("#comment"));
}

/// Removal detaches natively but keeps the node alive for reinsertion.
#[test]
fn removed_nodes_can_be_reinserted() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let body = document.body();
    let node = document.create_element("div").unwrap();
    let target = document.target_of(node).unwrap();
    document.append_child(body, node).unwrap();
    document.remove_child(body, node).unwrap();
    assert_eq!(tree.lock().unwrap().parent_of(target), None);
    assert!(tree.lock().unwrap().contains(target));

    document.append_child(body, node).unwrap();
    assert_eq!(tree.lock().unwrap().parent_of(target), Some(TargetId::BODY));
}

/// Structural errors leave both trees untouched.
#[test]
fn structural_errors_are_reported() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let body = document.body();
    let parent = document.create_element("div").unwrap();
    let stranger = document.create_element("div").unwrap();
    let child = document.create_element("span").unwrap();
    let sent = tree.lock().unwrap().commands().len();

    assert!(matches!(
        document.insert_before(parent, child, Some(stranger)),
        Err(DomError::NotFound(_))
    ));
    assert!(matches!(document.remove_child(parent, child), Err(DomError::NotFound(_))));
    assert!(matches!(document.append_child(parent, body), Err(DomError::HierarchyRequest(_))));
    let text = document.create_text_node("x").unwrap();
    assert!(matches!(document.append_child(text, child), Err(DomError::HierarchyRequest(_))));

    assert_eq!(document.parent(child), None);
    assert_eq!(tree.lock().unwrap().commands().len(), sent + 1);
}

/// Disposal releases handles; fresh handles are never reused.
#[test]
fn disposal_releases_handles_without_reuse() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let body = document.body();
    let outer = document.create_element("div").unwrap();
    let inner = document.create_element("span").unwrap();
    document.append_child(outer, inner).unwrap();
    let targets = [document.target_of(outer).unwrap(), document.target_of(inner).unwrap()];

    document.append_child(body, outer).unwrap();
    assert!(matches!(document.dispose(outer), Err(DomError::NotDetached(_))));
    assert!(matches!(document.dispose(body), Err(DomError::NotDetached(_))));
    document.remove_child(body, outer).unwrap();
    document.dispose(outer).unwrap();

    assert!(!document.contains(inner));
    for target in targets {
        assert!(!tree.lock().unwrap().contains(target));
    }
    let fresh = document.create_element("div").unwrap();
    let fresh_target = document.target_of(fresh).unwrap();
    assert!(!targets.contains(&fresh_target));
}

/// In batched mode nothing reaches native until a flush or a read.
#[test]
fn batched_mode_defers_until_flush() {
    let config = BridgeConfig::default().with_batch_updates(true);
    let (mut document, tree) = document(&config);
    let body = document.body();
    let node = document.create_element("div").unwrap();
    document.set_attribute(node, "id", "later").unwrap();
    document.append_child(body, node).unwrap();

    assert_eq!(document.pending_commands(), 3);
    assert_eq!(tree.lock().unwrap().batch_count(), 0);
    // Local state is already complete.
    assert_eq!(document.get_element_by_id("later"), Some(node));

    document.flush().unwrap();
    assert_eq!(document.pending_commands(), 0);
    let tree = tree.lock().unwrap();
    assert_eq!(tree.batch_count(), 1);
    assert_eq!(tree.commands().len(), 3);
}

/// A read in batched mode flushes first so native answers from the current tree.
#[test]
fn batched_reads_flush_first() {
    let config = BridgeConfig::default().with_batch_updates(true);
    let (mut document, tree) = document(&config);
    let node = document.create_element("div").unwrap();
    document.set_attribute(node, "title", "t").unwrap();
    document.remove_attribute(node, "title").unwrap();

    assert_eq!(document.get_attribute(node, "title"), Ok(None));
    assert_eq!(document.pending_commands(), 0);
    assert_eq!(tree.lock().unwrap().batch_count(), 1);
}

/// Explicit handles are honoured.
#[test]
fn explicit_target_ids_are_used_natively() {
    let (mut document, tree) = document(&BridgeConfig::default());
    let node = document
        .create_element_with(
            "div",
            ElementOptions {
                target: Some(TargetId(77)),
                ..ElementOptions::default()
            },
        )
        .unwrap();
    assert_eq!(document.node_for_target(TargetId(77)), Some(node));
    assert!(tree.lock().unwrap().contains(TargetId(77)));
}

/// Native side that is unreachable for its first `outages` batches.
struct Restarting {
    outages: usize,
    tree: NativeTree,
}

impl NativeBridge for Restarting {
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError> {
        if self.outages > 0 {
            self.outages -= 1;
            return Err(BridgeError::Unavailable(String::from("native side restarting")));
        }
        self.tree.apply(batch)
    }

    fn method(&mut self, target: TargetId, name: &str, args: Vec<NativeValue>) -> Result<NativeValue, BridgeError> {
        self.tree.method(target, name, args)
    }

    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        self.tree.get_property(target, name)
    }
}

/// A batch that cannot be delivered fails the read that flushed it and is
/// handed over again by the next flush.
#[test]
fn undelivered_batch_surfaces_and_is_retried() {
    let _ = env_logger::builder().is_test(true).try_init();
    let native = Arc::new(Mutex::new(Restarting {
        outages: 1,
        tree: NativeTree::new(),
    }));
    let config = BridgeConfig::default().with_batch_updates(true);
    let mut document = Document::with_config(Box::new(Arc::clone(&native)), &config);
    let node = document.create_element("div").unwrap();
    document.append_child(document.body(), node).unwrap();
    document.set_attribute(node, "title", "kept").unwrap();
    let target = document.target_of(node).unwrap();

    assert!(matches!(
        document.get_attribute(node, "missing"),
        Err(DomError::Bridge(BridgeError::Unavailable(_)))
    ));
    assert_eq!(document.pending_commands(), 3);
    assert!(!native.lock().unwrap().tree.contains(target));

    document.flush().unwrap();
    assert_eq!(document.pending_commands(), 0);
    let native = native.lock().unwrap();
    assert_eq!(native.tree.children_of(TargetId::BODY), &[target]);
    assert_eq!(native.tree.property(target, "title"), Some("kept"));
}

/// Methods surface a flush failure instead of running against a stale tree.
#[test]
fn methods_surface_undelivered_batches() {
    let _ = env_logger::builder().is_test(true).try_init();
    let native = Arc::new(Mutex::new(Restarting {
        outages: 2,
        tree: NativeTree::new(),
    }));
    let config = BridgeConfig::default().with_batch_updates(true);
    let mut document = Document::with_config(Box::new(Arc::clone(&native)), &config);
    let node = document.create_element("div").unwrap();

    assert!(document.get_bounding_client_rect(node).is_err());
    assert!(document.rect_property(node, RectProperty::OffsetTop).is_err());
    assert_eq!(document.pending_commands(), 1);
    assert_eq!(document.rect_property(node, RectProperty::OffsetTop), Ok(Some(0.0)));
    assert_eq!(document.pending_commands(), 0);
}
