//! Native-side plumbing shared by the object model and its hosts.
//! This crate centralizes the handle types, the command model and the two
//! call primitives (native command bridge, module bridge) that connect a
//! DOM-like object model to an opaque native rendering tree.

#![allow(clippy::missing_errors_doc, reason = "Internal crate")]
#![allow(
    clippy::min_ident_chars,
    reason = "`f` is the conventional Formatter name in Display impls"
)]
#![allow(
    clippy::module_name_repetitions,
    reason = "Type names mirror the DOM and bridge vocabulary they model"
)]

use std::collections::HashSet;
use std::fmt;

pub mod values;
pub use values::{BridgeError, NativeValue};

/// UI command model, the native command bridge and its command buffer.
pub mod command;
pub use command::{CommandBuffer, NativeBridge, UiCommand};

/// Module bridge for native-owned objects addressed by opaque handles.
pub mod module;
pub use module::{ModuleBridge, ModuleRegistry, NativeModule, SharedModuleBridge};

pub mod form_data;
pub use form_data::FormDataModule;

/// Headless in-memory native tree.
pub mod native;
pub use native::{NativeNode, NativeNodeKind, NativeTree};

/// Channel transport between the object model and the native side.
pub mod mirror;
pub use mirror::{ChannelBridge, NativeHost, NativeMirror, NativeRequest, NativeSubscriber, channel};

pub mod config;
pub use config::BridgeConfig;

pub mod logger;
pub use logger::{HostLogger, LogHostLogger, LogLevel};

// ============================
// Native handles
// ============================

/// Integer handle addressing a node's counterpart in the native tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl TargetId {
    /// The document body. It exists natively before any script runs and is never created.
    pub const BODY: TargetId = TargetId(0);
    /// The document node. It has no native counterpart of its own.
    pub const DOCUMENT: TargetId = TargetId(1);
    /// First handle handed out by [`TargetRegistry::allocate`].
    const FIRST_DYNAMIC: u64 = 2;

    /// Whether this handle is one of the reserved constants.
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token naming a native-owned stateful object (for example a form-data builder).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModuleHandle(String);

impl ModuleHandle {
    /// Wrap a raw token received from the native side.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allocator for [`TargetId`]s.
///
/// Handles are minted monotonically and never reused, so a handle stays
/// unique for the lifetime of the native object it names. The reserved
/// body and document handles are live from construction and cannot be
/// released.
#[derive(Clone, Debug)]
pub struct TargetRegistry {
    next: u64,
    live: HashSet<TargetId>,
}

impl TargetRegistry {
    /// Create a registry with only the reserved handles live.
    pub fn new() -> Self {
        let live = HashSet::from([TargetId::BODY, TargetId::DOCUMENT]);
        Self {
            next: TargetId::FIRST_DYNAMIC,
            live,
        }
    }

    /// Mint a fresh handle distinct from every live handle.
    pub fn allocate(&mut self) -> TargetId {
        loop {
            let candidate = TargetId(self.next);
            self.next = self.next.wrapping_add(1).max(TargetId::FIRST_DYNAMIC);
            if self.live.insert(candidate) {
                return candidate;
            }
        }
    }

    /// Claim an explicit handle chosen by the caller.
    pub fn claim(&mut self, target: TargetId) -> Result<(), BridgeError> {
        if self.live.insert(target) {
            Ok(())
        } else {
            Err(BridgeError::TargetInUse(target))
        }
    }

    /// Release a handle once its native object is gone. Reserved handles stay live.
    pub fn release(&mut self, target: TargetId) -> bool {
        if target.is_reserved() {
            return false;
        }
        self.live.remove(&target)
    }

    /// Whether the handle currently names a live object.
    #[inline]
    pub fn is_live(&self, target: TargetId) -> bool {
        self.live.contains(&target)
    }

    /// Number of live handles, reserved ones included.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_handles_are_live_and_never_allocated() {
        let mut registry = TargetRegistry::new();
        assert!(registry.is_live(TargetId::BODY));
        assert!(registry.is_live(TargetId::DOCUMENT));
        let first = registry.allocate();
        assert!(!first.is_reserved());
        assert_ne!(first, TargetId::BODY);
        assert!(!registry.release(TargetId::BODY));
        assert!(registry.is_live(TargetId::BODY));
    }

    #[test]
    fn allocation_skips_claimed_handles() {
        let mut registry = TargetRegistry::new();
        registry.claim(TargetId(2)).unwrap();
        registry.claim(TargetId(3)).unwrap();
        assert_eq!(registry.allocate(), TargetId(4));
        assert!(matches!(
            registry.claim(TargetId(4)),
            Err(BridgeError::TargetInUse(TargetId(4)))
        ));
    }

    #[test]
    fn released_handles_are_not_reused() {
        let mut registry = TargetRegistry::new();
        let first = registry.allocate();
        assert!(registry.release(first));
        let second = registry.allocate();
        assert_ne!(first, second);
        assert!(!registry.is_live(first));
    }
}
