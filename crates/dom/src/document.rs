//! The node tree.
//!
//! Nodes live in an [`indextree::Arena`]; children are owned through the arena
//! and parents are plain indices. Every structural change updates the local
//! tree first, then connectedness and the id index for the whole moved subtree
//! in one pass, and only then forwards the matching command to native. A
//! bridge failure therefore never leaves the local tree half updated.

use std::collections::HashMap;

use bridge::{BridgeConfig, CommandBuffer, NativeBridge, TargetId, TargetRegistry, UiCommand};
use indextree::{Arena, NodeId};
use log::{debug, trace};

use crate::attributes::normalize_name;
use crate::id_index::IdIndex;
use crate::node::{DomNode, ElementData, ElementOptions, NodeKind, NodeType};
use crate::style::{CamelCache, Style, StyleMut};
use crate::DomError;

/// The local node tree mirrored onto a native tree.
///
/// Nodes are [`NodeId`]s into an arena. The document node is the root and
/// its only child is the body. Every mutation updates local state first and
/// is then handed to the [`CommandBuffer`] in front of the native bridge.
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    body: NodeId,
    targets: HashMap<TargetId, NodeId>,
    registry: TargetRegistry,
    ids: IdIndex,
    pub(crate) commands: CommandBuffer,
    camel: CamelCache,
}

impl Document {
    /// Document with default configuration over `bridge`.
    pub fn new(bridge: Box<dyn NativeBridge>) -> Self {
        Self::with_config(bridge, &BridgeConfig::default())
    }

    /// Document over `bridge`; `config` selects immediate or batched delivery.
    pub fn with_config(bridge: Box<dyn NativeBridge>, config: &BridgeConfig) -> Self {
        Self::with_camel_cache(bridge, config, CamelCache::new())
    }

    /// Document using a caller-provided style-name cache.
    pub fn with_camel_cache(bridge: Box<dyn NativeBridge>, config: &BridgeConfig, camel: CamelCache) -> Self {
        let mut arena = Arena::new();
        let mut document = DomNode::new(TargetId::DOCUMENT, NodeKind::Document);
        document.connected = true;
        let root = arena.new_node(document);
        let mut body = DomNode::new(
            TargetId::BODY,
            NodeKind::Element(ElementData::new("body", Vec::new(), Vec::new())),
        );
        body.connected = true;
        let body = arena.new_node(body);
        root.append(body, &mut arena);
        let targets = HashMap::from([(TargetId::DOCUMENT, root), (TargetId::BODY, body)]);
        Self {
            arena,
            root,
            body,
            targets,
            registry: TargetRegistry::new(),
            ids: IdIndex::new(),
            commands: CommandBuffer::new(bridge, config.batch_updates),
            camel,
        }
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        self.root
    }

    /// The body element. It exists natively from the start.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// The style-name cache shared by this document's style views.
    pub fn camel_cache(&self) -> &CamelCache {
        &self.camel
    }

    // ============================
    // Node access
    // ============================

    pub(crate) fn node(&self, node: NodeId) -> Result<&DomNode, DomError> {
        let data = self
            .arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .map(indextree::Node::get)
            .ok_or(DomError::UnknownNode(node))?;
        // Disposed slots can be reused by the arena; the handle map is authoritative.
        if self.targets.get(&data.target) != Some(&node) {
            return Err(DomError::UnknownNode(node));
        }
        Ok(data)
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut DomNode, DomError> {
        self.node(node)?;
        self.arena
            .get_mut(node)
            .map(indextree::Node::get_mut)
            .ok_or(DomError::UnknownNode(node))
    }

    pub(crate) fn element(&self, node: NodeId) -> Result<&ElementData, DomError> {
        self.node(node)?
            .kind
            .as_element()
            .ok_or(DomError::NotAnElement(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        self.node_mut(node)?
            .kind
            .as_element_mut()
            .ok_or(DomError::NotAnElement(node))
    }

    pub(crate) fn target(&self, node: NodeId) -> Result<TargetId, DomError> {
        Ok(self.node(node)?.target)
    }

    /// Whether `node` belongs to this document.
    pub fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    /// Native handle of `node`.
    pub fn target_of(&self, node: NodeId) -> Option<TargetId> {
        self.target(node).ok()
    }

    /// Node answering for a native handle.
    pub fn node_for_target(&self, target: TargetId) -> Option<NodeId> {
        self.targets.get(&target).copied()
    }

    /// Parent of `node`; `None` for detached nodes and the document.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?;
        self.arena.get(node).and_then(indextree::Node::parent)
    }

    /// Children in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.node(node).is_err() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Whether `node` is reachable from the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_ok_and(DomNode::is_connected)
    }

    pub fn node_type(&self, node: NodeId) -> Option<NodeType> {
        self.node(node).ok().map(|data| data.kind.node_type())
    }

    /// Kind and payload of `node`.
    pub fn node_kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.node(node).ok().map(DomNode::kind)
    }

    /// Upper-case tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(ElementData::tag)
    }

    /// `nodeName`: the tag for elements, `#text`, `#comment` or `#document` otherwise.
    pub fn node_name(&self, node: NodeId) -> Option<String> {
        let name = match &self.node(node).ok()?.kind {
            NodeKind::Document => String::from("#document"),
            NodeKind::Element(element) => element.tag.clone(),
            NodeKind::Text(_) => String::from("#text"),
            NodeKind::Comment(_) => String::from("#comment"),
        };
        Some(name)
    }

    /// Character data of a text or comment node.
    pub fn character_data(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).ok()?.kind {
            NodeKind::Text(data) | NodeKind::Comment(data) => Some(data),
            NodeKind::Document | NodeKind::Element(_) => None,
        }
    }

    /// The connected element currently answering for `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.lookup(id)
    }

    /// Every connected element claiming `id`, oldest first.
    pub fn elements_with_id(&self, id: &str) -> &[NodeId] {
        self.ids.claimants(id)
    }

    // ============================
    // Creation
    // ============================

    /// Create a detached element with a fresh handle and default options.
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        self.create_element_with(tag, ElementOptions::default())
    }

    /// Create a detached element and its native counterpart.
    pub fn create_element_with(&mut self, tag: &str, options: ElementOptions) -> Result<NodeId, DomError> {
        let ElementOptions {
            target,
            events,
            reflected,
        } = options;
        let element = ElementData::new(tag, events, reflected);
        let tag = element.tag.clone();
        let (node, target) = self.insert_node(target, NodeKind::Element(element))?;
        debug!("createElement {tag} -> {target}");
        self.commands.push(UiCommand::CreateElement { target, tag })?;
        Ok(node)
    }

    /// Create a detached text node and its native counterpart.
    pub fn create_text_node(&mut self, data: &str) -> Result<NodeId, DomError> {
        let (node, target) = self.insert_node(None, NodeKind::Text(data.to_owned()))?;
        self.commands.push(UiCommand::CreateTextNode {
            target,
            data: data.to_owned(),
        })?;
        Ok(node)
    }

    /// Create a detached comment and its native counterpart.
    pub fn create_comment(&mut self, data: &str) -> Result<NodeId, DomError> {
        let (node, target) = self.insert_node(None, NodeKind::Comment(data.to_owned()))?;
        self.commands.push(UiCommand::CreateComment {
            target,
            data: data.to_owned(),
        })?;
        Ok(node)
    }

    fn insert_node(&mut self, target: Option<TargetId>, kind: NodeKind) -> Result<(NodeId, TargetId), DomError> {
        let target = match target {
            Some(explicit) => {
                self.registry.claim(explicit)?;
                explicit
            }
            None => self.registry.allocate(),
        };
        let node = self.arena.new_node(DomNode::new(target, kind));
        self.targets.insert(target, node);
        Ok((node, target))
    }

    // ============================
    // Structure
    // ============================

    /// Insert `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or last when `None`.
    /// A child that already has a parent is moved.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<(), DomError> {
        let parent_target = self.target(parent)?;
        let child_target = self.target(child)?;
        match self.node(parent)?.kind {
            NodeKind::Element(_) => {}
            NodeKind::Document => {
                return Err(DomError::HierarchyRequest(String::from(
                    "the document only holds the body",
                )));
            }
            NodeKind::Text(_) | NodeKind::Comment(_) => {
                return Err(DomError::HierarchyRequest(String::from(
                    "character data nodes cannot have children",
                )));
            }
        }
        if child == self.root || child == self.body {
            return Err(DomError::HierarchyRequest(String::from(
                "the document and the body cannot be moved",
            )));
        }
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == child) {
            return Err(DomError::HierarchyRequest(String::from(
                "a node cannot be inserted into itself or its descendants",
            )));
        }
        let mut reference = reference;
        if let Some(before) = reference {
            if self.parent(before) != Some(parent) {
                return Err(DomError::NotFound(String::from(
                    "the reference node is not a child of the parent",
                )));
            }
            if before == child {
                reference = self.arena.get(child).and_then(indextree::Node::next_sibling);
            }
        }

        if self.arena.get(child).and_then(indextree::Node::parent).is_some() {
            self.detach_subtree(child);
        }
        match reference {
            Some(before) => before.insert_before(child, &mut self.arena),
            None => parent.append(child, &mut self.arena),
        }
        if self.node(parent)?.connected {
            self.set_subtree_connected(child, true);
        }

        let before = reference.map(|before| self.target(before)).transpose()?;
        trace!("insert {child_target} under {parent_target} before {before:?}");
        self.commands.push(UiCommand::InsertChild {
            parent: parent_target,
            child: child_target,
            before,
        })?;
        Ok(())
    }

    /// Detach `child` from `parent`. The node stays alive and can be reinserted.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.node(parent)?;
        let child_target = self.target(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound(String::from(
                "the node to remove is not a child of the parent",
            )));
        }
        if child == self.body {
            return Err(DomError::HierarchyRequest(String::from("the body cannot be removed")));
        }
        self.detach_subtree(child);
        trace!("remove {child_target}");
        self.commands.push(UiCommand::RemoveNode { target: child_target })?;
        Ok(child)
    }

    /// Unlink `node` from its parent, clearing connectedness first when needed.
    fn detach_subtree(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.set_subtree_connected(node, false);
        }
        node.detach(&mut self.arena);
    }

    /// Flip `connected` over the subtree rooted at `node`, keeping the id index
    /// in step. Attach sets the flag before indexing; detach unindexes first.
    fn set_subtree_connected(&mut self, node: NodeId, connected: bool) {
        let subtree: Vec<NodeId> = node.descendants(&self.arena).collect();
        for member in subtree {
            let Some(entry) = self.arena.get_mut(member) else {
                continue;
            };
            let data = entry.get_mut();
            if connected {
                data.connected = true;
            }
            if let Some(element) = data.kind.as_element() {
                let id = element.id();
                if connected {
                    self.ids.insert(id, member);
                } else {
                    self.ids.remove(id, member);
                }
            }
            if !connected {
                data.connected = false;
            }
        }
    }

    /// Drop a detached subtree for good, releasing every native handle in it.
    pub fn dispose(&mut self, node: NodeId) -> Result<(), DomError> {
        self.node(node)?;
        if node == self.root || node == self.body || self.parent(node).is_some() {
            return Err(DomError::NotDetached(node));
        }
        let subtree: Vec<TargetId> = node
            .descendants(&self.arena)
            .filter_map(|member| self.arena.get(member).map(|entry| entry.get().target))
            .collect();
        node.remove_subtree(&mut self.arena);
        for target in &subtree {
            self.targets.remove(target);
            self.registry.release(*target);
        }
        debug!("disposed {} nodes", subtree.len());
        for target in subtree {
            self.commands.push(UiCommand::DisposeNode { target })?;
        }
        Ok(())
    }

    // ============================
    // Attributes
    // ============================

    /// Set an attribute and mirror it to native.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = normalize_name(name);
        let target = self.target(node)?;
        let connected = self.is_connected(node);
        let previous = self.element_mut(node)?.attributes.set(&name, value.to_owned());
        if name == "id" && connected {
            let old = previous.unwrap_or_default();
            if old != value {
                self.ids.update(&old, value, node);
            }
        }
        self.commands.push(UiCommand::SetProperty {
            target,
            name,
            value: value.to_owned(),
        })?;
        Ok(())
    }

    /// Local value, falling back to a native read for attributes the
    /// platform set itself. `Ok(None)` when neither side has one or the
    /// native read fails; `Err` only when queued mutations could not be
    /// flushed ahead of the read.
    pub fn get_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let Ok(element) = self.element(node) else {
            return Ok(None);
        };
        if let Some(value) = element.attributes.get(name) {
            return Ok(Some(value.to_owned()));
        }
        let target = self.target(node)?;
        self.commands.flush()?;
        match self.commands.get_property(target, &normalize_name(name)) {
            Ok(value) => Ok(value.into_attribute_value()),
            Err(error) => {
                debug!("getAttribute({name}) on {target} failed natively: {error}");
                Ok(None)
            }
        }
    }

    /// Local check only.
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.element(node)
            .is_ok_and(|element| element.attributes.contains(name))
    }

    /// Remove an attribute. Nothing is forwarded when it was not set locally.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let name = normalize_name(name);
        let target = self.target(node)?;
        let connected = self.is_connected(node);
        let Some(previous) = self.element_mut(node)?.attributes.remove(&name) else {
            return Ok(());
        };
        if name == "id" && connected {
            self.ids.update(&previous, "", node);
        }
        self.commands.push(UiCommand::RemoveProperty { target, name })?;
        Ok(())
    }

    /// Local attributes in insertion order.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.element(node).map_or_else(
            |_| Vec::new(),
            |element| {
                element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect()
            },
        )
    }

    // ============================
    // Style
    // ============================

    /// Read view of an element's inline style.
    pub fn style(&self, node: NodeId) -> Result<Style<'_>, DomError> {
        let element = self.element(node)?;
        Ok(Style {
            declaration: &element.style,
            camel: &self.camel,
        })
    }

    /// Write view of an element's inline style; writes are forwarded.
    pub fn style_mut(&mut self, node: NodeId) -> Result<StyleMut<'_>, DomError> {
        let target = self.target(node)?;
        self.element(node)?;
        let Self {
            arena,
            commands,
            camel,
            ..
        } = self;
        let element = arena
            .get_mut(node)
            .and_then(|entry| entry.get_mut().kind.as_element_mut())
            .ok_or(DomError::NotAnElement(node))?;
        Ok(StyleMut {
            declaration: &mut element.style,
            camel,
            commands,
            target,
        })
    }

    /// Shorthand for `style_mut(node)?.set(property, value)`.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.style_mut(node)?.set(property, value)
    }

    /// Local inline style value; never asks native.
    pub fn get_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.style(node).ok()?.get(property)
    }

    /// Clear a style property and return the value it held.
    pub fn remove_style(&mut self, node: NodeId, property: &str) -> Result<Option<String>, DomError> {
        self.style_mut(node)?.remove(property)
    }

    // ============================
    // Commands
    // ============================

    /// Hand queued commands to native. A no-op in immediate mode.
    pub fn flush(&mut self) -> Result<(), DomError> {
        self.commands.flush()?;
        Ok(())
    }

    /// Commands waiting for the next flush.
    pub fn pending_commands(&self) -> usize {
        self.commands.pending()
    }
}
