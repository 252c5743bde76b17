use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use bridge::BridgeError;
use indextree::NodeId;

/// Failures of object-model operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    /// The native bridge refused or could not take the command.
    /// Local state has already been updated when this is returned.
    Bridge(BridgeError),
    /// The node does not belong to this document (or was disposed).
    UnknownNode(NodeId),
    /// An element-only operation was applied to another node kind.
    NotAnElement(NodeId),
    /// The insertion would break the tree shape.
    HierarchyRequest(String),
    /// A reference node is not where the operation expects it.
    NotFound(String),
    /// Disposal was asked for a node still attached to a parent.
    NotDetached(NodeId),
}

impl Display for DomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomError::Bridge(error) => write!(f, "native bridge: {error}"),
            DomError::UnknownNode(node) => write!(f, "unknown node {node:?}"),
            DomError::NotAnElement(node) => write!(f, "node {node:?} is not an element"),
            DomError::HierarchyRequest(message) => write!(f, "HierarchyRequestError: {message}"),
            DomError::NotFound(message) => write!(f, "NotFoundError: {message}"),
            DomError::NotDetached(node) => write!(f, "node {node:?} is still attached"),
        }
    }
}

impl Error for DomError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DomError::Bridge(error) => Some(error),
            _ => None,
        }
    }
}

impl From<BridgeError> for DomError {
    fn from(error: BridgeError) -> Self {
        DomError::Bridge(error)
    }
}
