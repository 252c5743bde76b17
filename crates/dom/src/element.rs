//! Element operations answered by the native side: layout boxes, clicks,
//! scrolling and rect properties, plus the element-level conveniences built
//! on the attribute store.

use bridge::{BridgeError, NativeValue, TargetId};
use indextree::NodeId;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Document, DomError};

/// Layout box reported by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Scroll target. A missing coordinate leaves that axis where it is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollToOptions {
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl ScrollToOptions {
    /// Both axes given.
    pub fn new(left: f64, top: f64) -> Self {
        Self {
            top: Some(top),
            left: Some(left),
        }
    }

    /// Only the vertical offset.
    pub fn top(top: f64) -> Self {
        Self {
            top: Some(top),
            left: None,
        }
    }

    /// Only the horizontal offset.
    pub fn left(left: f64) -> Self {
        Self {
            top: None,
            left: Some(left),
        }
    }

    /// Native scroll methods take the options object as one JSON argument.
    fn into_args(self) -> Result<Vec<NativeValue>, DomError> {
        let json = serde_json::to_string(&self)
            .map_err(|error| BridgeError::InvalidArgument(format!("unencodable scroll options: {error}")))?;
        Ok(vec![NativeValue::String(json)])
    }
}

/// Layout metrics readable as numbers from the native element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RectProperty {
    OffsetTop,
    OffsetLeft,
    OffsetWidth,
    OffsetHeight,
    ClientWidth,
    ClientHeight,
    ClientLeft,
    ClientTop,
    ScrollTop,
    ScrollLeft,
    ScrollHeight,
    ScrollWidth,
}

impl RectProperty {
    /// Every rect property, offsets first.
    pub const ALL: [RectProperty; 12] = [
        RectProperty::OffsetTop,
        RectProperty::OffsetLeft,
        RectProperty::OffsetWidth,
        RectProperty::OffsetHeight,
        RectProperty::ClientWidth,
        RectProperty::ClientHeight,
        RectProperty::ClientLeft,
        RectProperty::ClientTop,
        RectProperty::ScrollTop,
        RectProperty::ScrollLeft,
        RectProperty::ScrollHeight,
        RectProperty::ScrollWidth,
    ];

    /// Name of the native method answering this metric.
    pub const fn name(self) -> &'static str {
        match self {
            RectProperty::OffsetTop => "offsetTop",
            RectProperty::OffsetLeft => "offsetLeft",
            RectProperty::OffsetWidth => "offsetWidth",
            RectProperty::OffsetHeight => "offsetHeight",
            RectProperty::ClientWidth => "clientWidth",
            RectProperty::ClientHeight => "clientHeight",
            RectProperty::ClientLeft => "clientLeft",
            RectProperty::ClientTop => "clientTop",
            RectProperty::ScrollTop => "scrollTop",
            RectProperty::ScrollLeft => "scrollLeft",
            RectProperty::ScrollHeight => "scrollHeight",
            RectProperty::ScrollWidth => "scrollWidth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }
}

impl Document {
    /// Layout box of an element, or `Ok(None)` when native has none to
    /// report. Fails only when queued mutations cannot be flushed first.
    pub fn get_bounding_client_rect(&mut self, node: NodeId) -> Result<Option<DomRect>, DomError> {
        let Some(target) = self.element_target(node) else {
            return Ok(None);
        };
        self.commands.flush()?;
        match self.commands.method(target, "getBoundingClientRect", Vec::new()) {
            Ok(NativeValue::String(json)) => match serde_json::from_str(&json) {
                Ok(rect) => Ok(Some(rect)),
                Err(error) => {
                    debug!("unreadable rect from {target}: {error}");
                    Ok(None)
                }
            },
            Ok(_) => Ok(None),
            Err(error) => {
                debug!("getBoundingClientRect on {target} failed: {error}");
                Ok(None)
            }
        }
    }

    fn element_target(&self, node: NodeId) -> Option<TargetId> {
        self.element(node).ok()?;
        self.target(node).ok()
    }

    /// Dispatch a native click. Queued commands are flushed first.
    pub fn click(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element(node)?;
        let target = self.target(node)?;
        self.commands.method(target, "click", Vec::new())?;
        Ok(())
    }

    /// Scroll to an absolute position.
    pub fn scroll(&mut self, node: NodeId, options: ScrollToOptions) -> Result<(), DomError> {
        self.scroll_method(node, "scroll", options)
    }

    /// Same as [`Document::scroll`].
    pub fn scroll_to(&mut self, node: NodeId, options: ScrollToOptions) -> Result<(), DomError> {
        self.scroll(node, options)
    }

    /// Scroll relative to the current position.
    pub fn scroll_by(&mut self, node: NodeId, options: ScrollToOptions) -> Result<(), DomError> {
        self.scroll_method(node, "scrollBy", options)
    }

    fn scroll_method(&mut self, node: NodeId, method: &str, options: ScrollToOptions) -> Result<(), DomError> {
        self.element(node)?;
        let target = self.target(node)?;
        self.commands.method(target, method, options.into_args()?)?;
        Ok(())
    }

    /// Numeric layout metric read from native.
    pub fn rect_property(&mut self, node: NodeId, property: RectProperty) -> Result<Option<f64>, DomError> {
        let Some(target) = self.element_target(node) else {
            return Ok(None);
        };
        self.commands.flush()?;
        Ok(self
            .commands
            .method(target, property.name(), Vec::new())
            .map_err(|error| debug!("{} on {target} failed: {error}", property.name()))
            .ok()
            .and_then(|value| value.as_number()))
    }

    // ============================
    // Reflected properties and built-in events
    // ============================

    /// Read a reflected property through the attribute store.
    /// `Ok(None)` when `name` is not reflected on this element.
    pub fn reflected_property(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let reflected = self
            .element(node)
            .is_ok_and(|element| element.reflected.iter().any(|prop| prop == name));
        if !reflected {
            return Ok(None);
        }
        self.get_attribute(node, name)
    }

    /// Write a reflected property through the attribute store.
    /// Returns `false` without doing anything when `name` is not reflected.
    pub fn set_reflected_property(&mut self, node: NodeId, name: &str, value: &str) -> Result<bool, DomError> {
        if !self.element(node)?.reflected.iter().any(|prop| prop == name) {
            return Ok(false);
        }
        self.set_attribute(node, name, value)?;
        Ok(true)
    }

    /// Events the native element dispatches itself; empty for non-elements.
    pub fn built_in_events(&self, node: NodeId) -> &[String] {
        self.element(node)
            .map(|element| element.events.as_slice())
            .unwrap_or_default()
    }

    pub fn has_built_in_event(&self, node: NodeId, event: &str) -> bool {
        self.built_in_events(node).iter().any(|name| name == event)
    }

    // ============================
    // Attribute conveniences
    // ============================

    /// Local `id` attribute, empty when unset.
    pub fn id(&self, node: NodeId) -> String {
        self.element(node)
            .map(|element| element.id().to_owned())
            .unwrap_or_default()
    }

    /// Same as `set_attribute(node, "id", id)`.
    pub fn set_id(&mut self, node: NodeId, id: &str) -> Result<(), DomError> {
        self.set_attribute(node, "id", id)
    }

    /// Local `class` attribute, empty when unset.
    pub fn class_name(&self, node: NodeId) -> String {
        self.element(node)
            .ok()
            .and_then(|element| element.attributes.get("class"))
            .unwrap_or_default()
            .to_owned()
    }

    pub fn set_class_name(&mut self, node: NodeId, class_name: &str) -> Result<(), DomError> {
        self.set_attribute(node, "class", class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_property_names_round_trip() {
        for property in RectProperty::ALL {
            assert_eq!(RectProperty::from_name(property.name()), Some(property));
        }
        assert_eq!(RectProperty::from_name("innerWidth"), None);
    }

    #[test]
    fn missing_scroll_coordinates_stay_absent() {
        let args = ScrollToOptions::top(5.0).into_args().unwrap();
        assert_eq!(args.len(), 1);
        let decoded: ScrollToOptions = serde_json::from_str(args[0].as_str().unwrap()).unwrap();
        assert_eq!(decoded, ScrollToOptions::top(5.0));
        assert_eq!(decoded.left, None);
    }

    #[test]
    fn partial_rect_json_fills_defaults() {
        let rect: DomRect = serde_json::from_str(r#"{"width": 10, "height": 4}"#).unwrap();
        assert_eq!(rect.width, 10.0);
        assert_eq!(rect.left, 0.0);
    }
}
