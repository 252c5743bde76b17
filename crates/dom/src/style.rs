//! Inline style.
//!
//! Style properties may be addressed in hyphenated (`background-color`) or
//! camelCase (`backgroundColor`) form; entries are stored under the camelCase
//! name and mirrored to native under that name. Reads are local only.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use bridge::{CommandBuffer, TargetId, UiCommand};
use log::trace;

use crate::DomError;

/// Turn a hyphenated property name into camelCase.
///
/// Every `-` followed by an ASCII word character (`[A-Za-z0-9_]`) is dropped and the character
/// upper-cased; other characters are kept as-is.
pub fn camelize(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut chars = property.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '-'
            && let Some(next) = chars.peek().copied().filter(|next| next.is_ascii_alphanumeric() || *next == '_')
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}

/// Memo table for [`camelize`].
///
/// Clones share one table. A document takes its cache at construction, so
/// several documents (or a test suite) can share one and reset it.
#[derive(Clone, Debug, Default)]
pub struct CamelCache {
    table: Arc<Mutex<HashMap<String, String>>>,
}

impl CamelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camelize through the table.
    pub fn camelize(&self, property: &str) -> String {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = table.get(property) {
            return hit.clone();
        }
        let camel = camelize(property);
        table.insert(property.to_owned(), camel.clone());
        camel
    }

    /// Number of memoized translations.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every memoized translation.
    pub fn clear(&self) {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Inline style entries of one element, keyed by camelCase name.
#[derive(Clone, Debug, Default)]
pub struct StyleDeclaration {
    entries: BTreeMap<String, String>,
}

impl StyleDeclaration {
    pub fn get(&self, camel: &str) -> Option<&str> {
        self.entries.get(camel).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only view of an element's inline style.
pub struct Style<'doc> {
    pub(crate) declaration: &'doc StyleDeclaration,
    pub(crate) camel: &'doc CamelCache,
}

impl Style<'_> {
    /// Local value of `property`, in either spelling.
    pub fn get(&self, property: &str) -> Option<String> {
        self.declaration
            .get(&self.camel.camelize(property))
            .map(str::to_owned)
    }
}

/// Mutable view of an element's inline style. Writes are mirrored to native.
pub struct StyleMut<'doc> {
    pub(crate) declaration: &'doc mut StyleDeclaration,
    pub(crate) camel: &'doc CamelCache,
    pub(crate) commands: &'doc mut CommandBuffer,
    pub(crate) target: TargetId,
}

impl StyleMut<'_> {
    pub fn get(&self, property: &str) -> Option<String> {
        self.declaration
            .get(&self.camel.camelize(property))
            .map(str::to_owned)
    }

    /// Store `value` under `property` and forward it.
    pub fn set(&mut self, property: &str, value: &str) -> Result<(), DomError> {
        let name = self.camel.camelize(property);
        trace!("style {}.{name} = {value}", self.target);
        self.declaration
            .entries
            .insert(name.clone(), value.to_owned());
        self.commands.push(UiCommand::SetStyle {
            target: self.target,
            name,
            value: value.to_owned(),
        })?;
        Ok(())
    }

    /// Clear `property` natively and drop the local entry, returning the
    /// value it held.
    pub fn remove(&mut self, property: &str) -> Result<Option<String>, DomError> {
        let name = self.camel.camelize(property);
        let previous = self.declaration.entries.remove(&name);
        self.commands.push(UiCommand::SetStyle {
            target: self.target,
            name,
            value: String::new(),
        })?;
        Ok(previous)
    }
}

// Typed accessors for common properties.
macro_rules! style_property {
    ($getter:ident, $setter:ident, $property:expr) => {
        impl Style<'_> {
            #[doc = concat!("Local value of `", $property, "`.")]
            pub fn $getter(&self) -> Option<String> {
                self.get($property)
            }
        }

        impl StyleMut<'_> {
            #[doc = concat!("Local value of `", $property, "`.")]
            pub fn $getter(&self) -> Option<String> {
                self.get($property)
            }

            #[doc = concat!("Set `", $property, "`.")]
            pub fn $setter(&mut self, value: &str) -> Result<(), DomError> {
                self.set($property, value)
            }
        }
    };
}

// Box
style_property!(display, set_display, "display");
style_property!(position, set_position, "position");
style_property!(width, set_width, "width");
style_property!(height, set_height, "height");
style_property!(margin, set_margin, "margin");
style_property!(padding, set_padding, "padding");
style_property!(overflow, set_overflow, "overflow");

// Paint
style_property!(color, set_color, "color");
style_property!(background_color, set_background_color, "background-color");
style_property!(opacity, set_opacity, "opacity");
style_property!(border_top_width, set_border_top_width, "border-top-width");

// Text
style_property!(font_size, set_font_size, "font-size");
style_property!(font_weight, set_font_weight, "font-weight");
style_property!(line_height, set_line_height, "line-height");

// Flexbox
style_property!(flex_direction, set_flex_direction, "flex-direction");
style_property!(justify_content, set_justify_content, "justify-content");
style_property!(align_items, set_align_items, "align-items");
