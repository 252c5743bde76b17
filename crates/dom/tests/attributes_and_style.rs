//! Tests for the attribute store and the inline style proxy as seen through
//! the document, including what reaches the native tree.

use std::sync::{Arc, Mutex};

use bridge::{NativeTree, UiCommand};
use dom::{CamelCache, Document};

fn document_over(tree: NativeTree) -> (Document, Arc<Mutex<NativeTree>>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = Arc::new(Mutex::new(tree));
    (Document::new(Box::new(Arc::clone(&tree))), tree)
}

/// A set attribute reads back locally without a native round trip.
#[test]
fn set_then_get_is_answered_locally() {
    let (mut document, tree) = document_over(NativeTree::new());
    let node = document.create_element("div").unwrap();
    document.set_attribute(node, "Title", "hello").unwrap();

    assert_eq!(document.get_attribute(node, "title").unwrap().as_deref(), Some("hello"));
    assert_eq!(document.get_attribute(node, "TITLE").unwrap().as_deref(), Some("hello"));
    assert!(document.has_attribute(node, "title"));

    let tree = tree.lock().unwrap();
    assert_eq!(tree.read_count(), 0);
    assert_eq!(tree.property(document.target_of(node).unwrap(), "title"), Some("hello"));
}

/// Overwriting keeps the original position; names come back lower-cased.
#[test]
fn attributes_keep_insertion_order() {
    let (mut document, _tree) = document_over(NativeTree::new());
    let node = document.create_element("a").unwrap();
    document.set_attribute(node, "href", "/one").unwrap();
    document.set_attribute(node, "CLASS", "link").unwrap();
    document.set_attribute(node, "href", "/two").unwrap();
    assert_eq!(
        document.attributes(node),
        vec![
            (String::from("href"), String::from("/two")),
            (String::from("class"), String::from("link")),
        ]
    );
}

/// After removal the local store no longer answers and reads fall through to native.
#[test]
fn removal_falls_through_to_native_reads() {
    let (mut document, tree) = document_over(NativeTree::new().with_default_property("input", "type", "text"));
    let node = document.create_element("input").unwrap();
    let target = document.target_of(node).unwrap();

    assert!(!document.has_attribute(node, "type"));
    assert_eq!(document.get_attribute(node, "type").unwrap().as_deref(), Some("text"));

    document.set_attribute(node, "type", "checkbox").unwrap();
    document.remove_attribute(node, "type").unwrap();
    assert!(!document.has_attribute(node, "type"));
    assert_eq!(document.get_attribute(node, "type"), Ok(None));
    assert_eq!(document.get_attribute(node, "placeholder"), Ok(None));

    let tree = tree.lock().unwrap();
    assert_eq!(tree.read_count(), 3);
    assert!(tree.commands().contains(&UiCommand::RemoveProperty {
        target,
        name: String::from("type"),
    }));
}

/// Removing an attribute that was never set is silent.
#[test]
fn removing_an_unset_attribute_sends_nothing() {
    let (mut document, tree) = document_over(NativeTree::new());
    let node = document.create_element("div").unwrap();
    let before = tree.lock().unwrap().commands().len();
    document.remove_attribute(node, "missing").unwrap();
    assert_eq!(tree.lock().unwrap().commands().len(), before);
}

/// Style entries accept either spelling and reach native in camelCase.
#[test]
fn style_round_trips_between_spellings() {
    let (mut document, tree) = document_over(NativeTree::new());
    let node = document.create_element("div").unwrap();
    let target = document.target_of(node).unwrap();

    document.set_style(node, "background-color", "red").unwrap();
    assert_eq!(document.get_style(node, "backgroundColor").as_deref(), Some("red"));
    assert_eq!(tree.lock().unwrap().style(target, "backgroundColor"), Some("red"));

    assert_eq!(document.remove_style(node, "background-color").unwrap().as_deref(), Some("red"));
    assert_eq!(document.get_style(node, "backgroundColor"), None);
    assert_eq!(tree.lock().unwrap().style(target, "backgroundColor"), None);
    assert_eq!(document.remove_style(node, "background-color").unwrap(), None);
}

/// The typed accessors are thin wrappers over get/set.
#[test]
fn typed_style_accessors() {
    let (mut document, _tree) = document_over(NativeTree::new());
    let node = document.create_element("div").unwrap();
    {
        let mut style = document.style_mut(node).unwrap();
        style.set_border_top_width("2px").unwrap();
        style.set_display("flex").unwrap();
        assert_eq!(style.display().as_deref(), Some("flex"));
    }
    let style = document.style(node).unwrap();
    assert_eq!(style.border_top_width().as_deref(), Some("2px"));
    assert_eq!(style.get("borderTopWidth").as_deref(), Some("2px"));
}

/// Documents sharing a cache share its translations.
#[test]
fn camel_cache_is_injected_and_resettable() {
    let cache = CamelCache::new();
    let tree = Arc::new(Mutex::new(NativeTree::new()));
    let mut document = Document::with_camel_cache(
        Box::new(Arc::clone(&tree)),
        &bridge::BridgeConfig::default(),
        cache.clone(),
    );
    let node = document.create_element("div").unwrap();
    document.set_style(node, "border-top-width", "1px").unwrap();
    assert!(!cache.is_empty());
    assert_eq!(cache.camelize("border-top-width"), "borderTopWidth");

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(document.get_style(node, "border-top-width").as_deref(), Some("1px"));
}

/// Element-only operations refuse text nodes.
#[test]
fn text_nodes_have_no_attributes_or_style() {
    let (mut document, _tree) = document_over(NativeTree::new());
    let text = document.create_text_node("hi").unwrap();
    assert!(matches!(
        document.set_attribute(text, "id", "x"),
        Err(dom::DomError::NotAnElement(_))
    ));
    assert!(document.style(text).is_err());
    assert_eq!(document.get_attribute(text, "id"), Ok(None));
    assert_eq!(document.character_data(text), Some("hi"));
}
