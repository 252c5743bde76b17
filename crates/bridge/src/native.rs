//! A headless native tree.
//!
//! `NativeTree` plays the native side of the command bridge without any
//! rendering: it keeps the node structure, properties and inline styles the
//! object model pushed, answers the handful of methods elements call, and
//! counts round trips so callers can check which operations reached it.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde_json::{Value, json};

use crate::{BridgeError, NativeBridge, NativeValue, TargetId, UiCommand};

/// What a native node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeNodeKind {
    Element { tag: String },
    Text { data: String },
    Comment { data: String },
}

/// Native state of a single node.
#[derive(Clone, Debug)]
pub struct NativeNode {
    pub kind: NativeNodeKind,
    pub parent: Option<TargetId>,
    pub children: Vec<TargetId>,
    pub properties: BTreeMap<String, String>,
    pub styles: BTreeMap<String, String>,
    /// Layout box as `[x, y, width, height]`.
    pub rect: [f64; 4],
    /// Scroll offset as `[left, top]`.
    pub scroll: [f64; 2],
    pub clicks: u32,
}

impl NativeNode {
    fn new(kind: NativeNodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            properties: BTreeMap::new(),
            styles: BTreeMap::new(),
            rect: [0.0; 4],
            scroll: [0.0; 2],
            clicks: 0,
        }
    }
}

/// In-memory native tree rooted at the pre-existing body.
#[derive(Clone, Debug)]
pub struct NativeTree {
    nodes: HashMap<TargetId, NativeNode>,
    /// Properties the platform sets on freshly created elements, by lower-case tag.
    defaults: HashMap<String, Vec<(String, String)>>,
    commands: Vec<UiCommand>,
    batches: usize,
    reads: usize,
    method_calls: Vec<(TargetId, String)>,
}

impl NativeTree {
    /// Create a tree holding only the body.
    pub fn new() -> Self {
        let body = NativeNode::new(NativeNodeKind::Element {
            tag: String::from("BODY"),
        });
        Self {
            nodes: HashMap::from([(TargetId::BODY, body)]),
            defaults: HashMap::new(),
            commands: Vec::new(),
            batches: 0,
            reads: 0,
            method_calls: Vec::new(),
        }
    }

    /// Register a property the platform sets on every new element with `tag`.
    pub fn with_default_property(mut self, tag: &str, name: &str, value: &str) -> Self {
        self.defaults
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .push((name.to_owned(), value.to_owned()));
        self
    }

    /// Set the layout box a node reports.
    pub fn set_rect(&mut self, target: TargetId, x: f64, y: f64, width: f64, height: f64) -> Result<(), BridgeError> {
        self.node_mut(target)?.rect = [x, y, width, height];
        Ok(())
    }

    /// Set a property natively, bypassing the object model.
    pub fn set_native_property(&mut self, target: TargetId, name: &str, value: &str) -> Result<(), BridgeError> {
        self.node_mut(target)?
            .properties
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    pub fn node(&self, target: TargetId) -> Option<&NativeNode> {
        self.nodes.get(&target)
    }

    pub fn contains(&self, target: TargetId) -> bool {
        self.nodes.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a node in native order; empty for unknown nodes.
    pub fn children_of(&self, target: TargetId) -> &[TargetId] {
        self.nodes
            .get(&target)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, target: TargetId) -> Option<TargetId> {
        self.nodes.get(&target).and_then(|node| node.parent)
    }

    /// Native property (attribute) value.
    pub fn property(&self, target: TargetId, name: &str) -> Option<&str> {
        self.nodes
            .get(&target)
            .and_then(|node| node.properties.get(name))
            .map(String::as_str)
    }

    /// Inline style value by camelCase name.
    pub fn style(&self, target: TargetId, name: &str) -> Option<&str> {
        self.nodes
            .get(&target)
            .and_then(|node| node.styles.get(name))
            .map(String::as_str)
    }

    /// Number of `click` calls a node received.
    pub fn clicks(&self, target: TargetId) -> u32 {
        self.nodes.get(&target).map_or(0, |node| node.clicks)
    }

    /// Current `[left, top]` scroll offset.
    pub fn scroll_offset(&self, target: TargetId) -> Option<[f64; 2]> {
        self.nodes.get(&target).map(|node| node.scroll)
    }

    /// Every command applied so far, in order.
    pub fn commands(&self) -> &[UiCommand] {
        &self.commands
    }

    /// Number of `apply` calls received.
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    /// Number of `get_property` round trips received.
    pub fn read_count(&self) -> usize {
        self.reads
    }

    /// Every method call received, in order.
    pub fn method_calls(&self) -> &[(TargetId, String)] {
        &self.method_calls
    }

    fn node_mut(&mut self, target: TargetId) -> Result<&mut NativeNode, BridgeError> {
        self.nodes
            .get_mut(&target)
            .ok_or(BridgeError::UnknownTarget(target))
    }

    fn create(&mut self, target: TargetId, kind: NativeNodeKind) -> Result<(), BridgeError> {
        if self.nodes.contains_key(&target) {
            return Err(BridgeError::TargetInUse(target));
        }
        let mut node = NativeNode::new(kind);
        if let NativeNodeKind::Element { tag } = &node.kind {
            if let Some(defaults) = self.defaults.get(&tag.to_ascii_lowercase()) {
                node.properties.extend(defaults.iter().cloned());
            }
        }
        self.nodes.insert(target, node);
        Ok(())
    }

    fn unlink(&mut self, target: TargetId) -> Result<(), BridgeError> {
        let parent = self.node_mut(target)?.parent.take();
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != target);
            }
        }
        Ok(())
    }

    fn insert(&mut self, parent: TargetId, child: TargetId, before: Option<TargetId>) -> Result<(), BridgeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(BridgeError::UnknownTarget(parent));
        }
        self.unlink(child)?;
        let parent_node = self.node_mut(parent)?;
        let position = before
            .and_then(|reference| parent_node.children.iter().position(|child| *child == reference))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn dispose(&mut self, target: TargetId) -> Result<(), BridgeError> {
        self.unlink(target)?;
        if let Some(node) = self.nodes.remove(&target) {
            for child in node.children {
                if let Some(child_node) = self.nodes.get_mut(&child) {
                    child_node.parent = None;
                }
            }
        }
        Ok(())
    }

    fn apply_one(&mut self, command: &UiCommand) -> Result<(), BridgeError> {
        match command {
            UiCommand::CreateElement { target, tag } => {
                self.create(*target, NativeNodeKind::Element { tag: tag.clone() })
            }
            UiCommand::CreateTextNode { target, data } => {
                self.create(*target, NativeNodeKind::Text { data: data.clone() })
            }
            UiCommand::CreateComment { target, data } => {
                self.create(*target, NativeNodeKind::Comment { data: data.clone() })
            }
            UiCommand::InsertChild {
                parent,
                child,
                before,
            } => self.insert(*parent, *child, *before),
            UiCommand::RemoveNode { target } => self.unlink(*target),
            UiCommand::SetProperty {
                target,
                name,
                value,
            } => {
                self.node_mut(*target)?
                    .properties
                    .insert(name.clone(), value.clone());
                Ok(())
            }
            UiCommand::RemoveProperty { target, name } => {
                self.node_mut(*target)?.properties.remove(name);
                Ok(())
            }
            UiCommand::SetStyle {
                target,
                name,
                value,
            } => {
                let styles = &mut self.node_mut(*target)?.styles;
                if value.is_empty() {
                    styles.remove(name);
                } else {
                    styles.insert(name.clone(), value.clone());
                }
                Ok(())
            }
            UiCommand::DisposeNode { target } => self.dispose(*target),
        }
    }
}

impl Default for NativeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the `{"left": .., "top": ..}` options scroll methods receive.
/// An absent or null axis comes back as `None`.
fn scroll_args(args: &[NativeValue]) -> Result<[Option<f64>; 2], BridgeError> {
    let Some(json) = args.first().and_then(NativeValue::as_str) else {
        return Err(BridgeError::InvalidArgument(String::from("scroll options must be a JSON string")));
    };
    let options: Value = serde_json::from_str(json)
        .map_err(|error| BridgeError::InvalidArgument(format!("malformed scroll options: {error}")))?;
    Ok([
        options.get("left").and_then(Value::as_f64),
        options.get("top").and_then(Value::as_f64),
    ])
}

impl NativeBridge for NativeTree {
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError> {
        self.batches += 1;
        for command in batch {
            if let Err(error) = self.apply_one(&command) {
                warn!("native tree rejected {command:?}: {error}");
                return Err(error);
            }
            self.commands.push(command);
        }
        Ok(())
    }

    fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        self.method_calls.push((target, name.to_owned()));
        let node = self.node_mut(target)?;
        let [x, y, width, height] = node.rect;
        let value = match name {
            "getBoundingClientRect" => NativeValue::String(
                json!({
                    "x": x,
                    "y": y,
                    "width": width,
                    "height": height,
                    "top": y,
                    "left": x,
                    "right": x + width,
                    "bottom": y + height,
                })
                .to_string(),
            ),
            "click" => {
                node.clicks += 1;
                NativeValue::Undefined
            }
            "scroll" => {
                for (offset, requested) in node.scroll.iter_mut().zip(scroll_args(&args)?) {
                    if let Some(position) = requested {
                        *offset = position;
                    }
                }
                NativeValue::Undefined
            }
            "scrollBy" => {
                for (offset, delta) in node.scroll.iter_mut().zip(scroll_args(&args)?) {
                    *offset += delta.unwrap_or(0.0);
                }
                NativeValue::Undefined
            }
            "offsetTop" => NativeValue::Number(y),
            "offsetLeft" => NativeValue::Number(x),
            "offsetWidth" | "clientWidth" | "scrollWidth" => NativeValue::Number(width),
            "offsetHeight" | "clientHeight" | "scrollHeight" => NativeValue::Number(height),
            "clientTop" | "clientLeft" => NativeValue::Number(0.0),
            "scrollLeft" => NativeValue::Number(node.scroll[0]),
            "scrollTop" => NativeValue::Number(node.scroll[1]),
            _ => {
                return Err(BridgeError::UnknownAction {
                    module: String::from("Element"),
                    action: name.to_owned(),
                });
            }
        };
        Ok(value)
    }

    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        self.reads += 1;
        let node = self
            .nodes
            .get(&target)
            .ok_or(BridgeError::UnknownTarget(target))?;
        Ok(node
            .properties
            .get(name)
            .map_or(NativeValue::Undefined, |value| NativeValue::String(value.clone())))
    }
}
