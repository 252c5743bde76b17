//! `document` namespace.
//!
//! - Creation: createElement, createTextNode
//! - Structure: appendChild, insertBefore, removeChild
//! - Attributes: setAttribute, getAttribute, hasAttribute, removeAttribute
//! - Inline style: setStyle, getStyle, removeStyle
//! - Queries and element methods: getElementById, getBoundingClientRect, click

use std::sync::Arc;

use bridge::TargetId;
use indextree::NodeId;
use log::trace;

use crate::Document;
use crate::bindings::{HostContext, HostError, HostFnSync, HostNamespace, HostValue};

/// Helper to parse a string argument.
fn parse_string(args: &[HostValue], index: usize, name: &str) -> Result<String, HostError> {
    match args.get(index) {
        Some(HostValue::String(value)) => Ok(value.clone()),
        _ => Err(HostError::TypeError(format!("{name} must be a string"))),
    }
}

/// Helper to coerce any present argument to a string (attribute and style values).
fn coerce_string(args: &[HostValue], index: usize, name: &str) -> Result<String, HostError> {
    args.get(index)
        .map(HostValue::to_js_string)
        .ok_or_else(|| HostError::TypeError(format!("{name} is required")))
}

/// Helper to parse a `TargetId` from a decimal string.
fn parse_target(args: &[HostValue], index: usize, name: &str) -> Result<TargetId, HostError> {
    match args.get(index) {
        Some(HostValue::String(value)) => value
            .parse::<u64>()
            .map(TargetId)
            .map_err(|_| HostError::TypeError(format!("{name} must be a decimal string (targetId)"))),
        _ => Err(HostError::TypeError(format!("{name} must be a decimal string (targetId)"))),
    }
}

/// Resolve a target argument to a node of `document`.
fn resolve(document: &Document, args: &[HostValue], index: usize, name: &str) -> Result<NodeId, HostError> {
    let target = parse_target(args, index, name)?;
    document
        .node_for_target(target)
        .ok_or_else(|| HostError::TypeError(format!("{name} {target} does not name a node")))
}

fn target_value(document: &Document, node: NodeId) -> HostValue {
    document
        .target_of(node)
        .map_or(HostValue::Null, |target| HostValue::String(target.to_string()))
}

fn optional_string(value: Option<String>) -> HostValue {
    value.map_or(HostValue::Null, HostValue::String)
}

/// Build the `document` namespace.
pub fn build_document_namespace() -> HostNamespace {
    HostNamespace::new()
        .with_sync_fn("createElement", build_create_element())
        .with_sync_fn("createTextNode", build_create_text_node())
        .with_sync_fn("appendChild", build_append_child())
        .with_sync_fn("insertBefore", build_insert_before())
        .with_sync_fn("removeChild", build_remove_child())
        .with_sync_fn("setAttribute", build_set_attribute())
        .with_sync_fn("getAttribute", build_get_attribute())
        .with_sync_fn("hasAttribute", build_has_attribute())
        .with_sync_fn("removeAttribute", build_remove_attribute())
        .with_sync_fn("setStyle", build_set_style())
        .with_sync_fn("getStyle", build_get_style())
        .with_sync_fn("removeStyle", build_remove_style())
        .with_sync_fn("getElementById", build_get_element_by_id())
        .with_sync_fn("getBoundingClientRect", build_get_bounding_client_rect())
        .with_sync_fn("click", build_click())
        .with_property("body", HostValue::String(TargetId::BODY.to_string()))
}

/// createElement(tag) -> targetId
fn build_create_element() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let tag = parse_string(&args, 0, "tag")?;
        let mut document = context.document()?;
        let node = document.create_element(&tag)?;
        Ok(target_value(&document, node))
    })
}

/// createTextNode(data) -> targetId
fn build_create_text_node() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let data = coerce_string(&args, 0, "data")?;
        let mut document = context.document()?;
        let node = document.create_text_node(&data)?;
        Ok(target_value(&document, node))
    })
}

/// appendChild(parent, child)
fn build_append_child() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let mut document = context.document()?;
        let parent = resolve(&document, &args, 0, "parent")?;
        let child = resolve(&document, &args, 1, "child")?;
        document.append_child(parent, child)?;
        Ok(HostValue::Undefined)
    })
}

/// insertBefore(parent, child, reference | null)
fn build_insert_before() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let mut document = context.document()?;
        let parent = resolve(&document, &args, 0, "parent")?;
        let child = resolve(&document, &args, 1, "child")?;
        let reference = match args.get(2) {
            None | Some(HostValue::Null | HostValue::Undefined) => None,
            Some(_) => Some(resolve(&document, &args, 2, "reference")?),
        };
        document.insert_before(parent, child, reference)?;
        Ok(HostValue::Undefined)
    })
}

/// removeChild(parent, child) -> child
fn build_remove_child() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let mut document = context.document()?;
        let parent = resolve(&document, &args, 0, "parent")?;
        let child = resolve(&document, &args, 1, "child")?;
        let removed = document.remove_child(parent, child)?;
        Ok(target_value(&document, removed))
    })
}

/// setAttribute(node, name, value)
fn build_set_attribute() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let name = coerce_string(&args, 1, "name")?;
        let value = coerce_string(&args, 2, "value")?;
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        trace!("setAttribute({name}, {value})");
        document.set_attribute(node, &name, &value)?;
        Ok(HostValue::Undefined)
    })
}

/// getAttribute(node, name) -> string | null
fn build_get_attribute() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let name = coerce_string(&args, 1, "name")?;
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        Ok(optional_string(document.get_attribute(node, &name)?))
    })
}

/// hasAttribute(node, name) -> boolean
fn build_has_attribute() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let name = coerce_string(&args, 1, "name")?;
        let document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        Ok(HostValue::Boolean(document.has_attribute(node, &name)))
    })
}

/// removeAttribute(node, name)
fn build_remove_attribute() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let name = coerce_string(&args, 1, "name")?;
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        document.remove_attribute(node, &name)?;
        Ok(HostValue::Undefined)
    })
}

/// setStyle(node, property, value)
fn build_set_style() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let property = parse_string(&args, 1, "property")?;
        let value = coerce_string(&args, 2, "value")?;
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        document.set_style(node, &property, &value)?;
        Ok(HostValue::Undefined)
    })
}

/// getStyle(node, property) -> string | null
fn build_get_style() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let property = parse_string(&args, 1, "property")?;
        let document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        Ok(optional_string(document.get_style(node, &property)))
    })
}

/// removeStyle(node, property) -> previous value | null
fn build_remove_style() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let property = parse_string(&args, 1, "property")?;
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        Ok(optional_string(document.remove_style(node, &property)?))
    })
}

/// getElementById(id) -> targetId | null
fn build_get_element_by_id() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let id = coerce_string(&args, 0, "id")?;
        let document = context.document()?;
        let found = document.get_element_by_id(&id);
        trace!("getElementById('{id}') -> {found:?}");
        Ok(found.map_or(HostValue::Null, |node| target_value(&document, node)))
    })
}

/// getBoundingClientRect(node) -> JSON string | null
fn build_get_bounding_client_rect() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        let Some(rect) = document.get_bounding_client_rect(node)? else {
            return Ok(HostValue::Null);
        };
        serde_json::to_string(&rect)
            .map(HostValue::String)
            .map_err(|error| HostError::InternalError(format!("failed to encode rect: {error}")))
    })
}

/// click(node)
fn build_click() -> Arc<HostFnSync> {
    Arc::new(|context: &HostContext, args: Vec<HostValue>| -> Result<HostValue, HostError> {
        let mut document = context.document()?;
        let node = resolve(&document, &args, 0, "node")?;
        document.click(node)?;
        Ok(HostValue::Undefined)
    })
}
