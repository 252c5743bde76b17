//! A DOM-like object model mirrored onto an opaque native tree.
//!
//! The [`Document`] owns the local node tree and is the source of truth for
//! local reads. Every mutation is applied locally first and then forwarded to
//! the native side through the command bridge from the `bridge` crate.
//! Native-owned objects such as [`FormData`] go through the module bridge and
//! never touch the tree.

#![allow(clippy::missing_errors_doc, reason = "Internal crate")]
#![allow(
    clippy::min_ident_chars,
    reason = "`f` is the conventional Formatter name in Display impls"
)]
#![allow(
    clippy::module_name_repetitions,
    reason = "Type names mirror the DOM and bridge vocabulary they model"
)]

pub use indextree::NodeId;

mod error;
pub use error::DomError;

pub mod attributes;
pub use attributes::{Attribute, AttributeStore};

/// Inline style, camelCase translation and its memo table.
pub mod style;
pub use style::{CamelCache, Style, StyleDeclaration, StyleMut, camelize};

pub mod id_index;
pub use id_index::IdIndex;

pub mod node;
pub use node::{DEFAULT_BUILT_IN_EVENTS, DomNode, ElementData, ElementOptions, NodeKind, NodeType};

mod document;
pub use document::Document;

pub mod element;
pub use element::{DomRect, RectProperty, ScrollToOptions};

pub mod form_data;
pub use form_data::{FormData, FormDataPart, FormDataValue};

/// Engine-agnostic host bindings facade.
pub mod bindings;
pub use bindings::{
    HostBindings, HostContext, HostError, HostFnKind, HostFnSync, HostNamespace, HostValue,
    build_console_namespace, build_default_bindings, build_document_namespace,
};
