use bridge::TargetId;

use crate::attributes::AttributeStore;
use crate::style::StyleDeclaration;

/// Event names every element supports out of the box.
pub const DEFAULT_BUILT_IN_EVENTS: [&str; 7] = [
    "click",
    "appear",
    "disappear",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
];

/// Node type as reported to scripts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
}

impl NodeType {
    /// Numeric `nodeType` value.
    pub const fn code(self) -> u16 {
        match self {
            NodeType::Element => 1,
            NodeType::Text => 3,
            NodeType::Comment => 8,
            NodeType::Document => 9,
        }
    }
}

/// Element payload: tag, attributes, inline style and per-element metadata.
#[derive(Clone, Debug)]
pub struct ElementData {
    pub(crate) tag: String,
    pub(crate) attributes: AttributeStore,
    pub(crate) style: StyleDeclaration,
    pub(crate) events: Vec<String>,
    pub(crate) reflected: Vec<String>,
}

impl ElementData {
    pub(crate) fn new(tag: &str, extra_events: Vec<String>, reflected: Vec<String>) -> Self {
        let mut events: Vec<String> = DEFAULT_BUILT_IN_EVENTS.iter().map(|name| (*name).to_owned()).collect();
        for event in extra_events {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        Self {
            tag: tag.to_uppercase(),
            attributes: AttributeStore::new(),
            style: StyleDeclaration::default(),
            events,
            reflected,
        }
    }

    /// Upper-case tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn style(&self) -> &StyleDeclaration {
        &self.style
    }

    /// Built-in event names.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Properties routed through the attribute store.
    pub fn reflected(&self) -> &[String] {
        &self.reflected
    }

    /// Current `id` attribute, empty when unset.
    pub(crate) fn id(&self) -> &str {
        self.attributes.get("id").unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
/// What a node is, with its payload.
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    /// Element payload, if this is an element.
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Arena payload of one node.
#[derive(Clone, Debug)]
pub struct DomNode {
    pub(crate) target: TargetId,
    pub(crate) kind: NodeKind,
    /// True iff the node is reachable from the document.
    pub(crate) connected: bool,
}

impl DomNode {
    pub(crate) fn new(target: TargetId, kind: NodeKind) -> Self {
        Self {
            target,
            kind,
            connected: false,
        }
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether the node is reachable from the document node.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Construction options for [`Document::create_element_with`].
///
/// [`Document::create_element_with`]: crate::Document::create_element_with
#[derive(Clone, Debug, Default)]
pub struct ElementOptions {
    /// Use this handle instead of allocating one. It must not be live.
    pub target: Option<TargetId>,
    /// Event names supported in addition to the defaults.
    pub events: Vec<String>,
    /// Properties whose reads and writes go through the attribute store.
    pub reflected: Vec<String>,
}
