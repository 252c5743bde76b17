//! The native command bridge.
//!
//! Mutations of the object model travel to the native tree as [`UiCommand`]s.
//! They are fire-and-forget: the caller only learns whether the command could
//! be handed over. Reads (`method`, `get_property`) block until the native
//! side answers. [`CommandBuffer`] sits in front of a bridge and decides
//! whether commands are applied one by one or queued and flushed as a batch.

use std::sync::{Arc, Mutex};

use log::{debug, trace, warn};

use crate::{BridgeError, NativeValue, TargetId};

/// A mutation forwarded to the native tree.
#[derive(Clone, Debug, PartialEq)]
pub enum UiCommand {
    /// Create the native counterpart of an element.
    CreateElement { target: TargetId, tag: String },
    /// Create the native counterpart of a text node.
    CreateTextNode { target: TargetId, data: String },
    /// Create the native counterpart of a comment.
    CreateComment { target: TargetId, data: String },
    /// Insert `child` under `parent`, before `before` or at the end.
    InsertChild {
        parent: TargetId,
        child: TargetId,
        before: Option<TargetId>,
    },
    /// Detach a node from its native parent. The node stays alive.
    RemoveNode { target: TargetId },
    /// Set a property (attribute) on a native node.
    SetProperty {
        target: TargetId,
        name: String,
        value: String,
    },
    /// Remove a property (attribute) from a native node.
    RemoveProperty { target: TargetId, name: String },
    /// Set an inline style property; an empty value clears it.
    SetStyle {
        target: TargetId,
        name: String,
        value: String,
    },
    /// Drop a native node for good; its handle is released.
    DisposeNode { target: TargetId },
}

impl UiCommand {
    /// The native node this command addresses.
    pub fn target(&self) -> TargetId {
        match self {
            UiCommand::CreateElement { target, .. }
            | UiCommand::CreateTextNode { target, .. }
            | UiCommand::CreateComment { target, .. }
            | UiCommand::RemoveNode { target }
            | UiCommand::SetProperty { target, .. }
            | UiCommand::RemoveProperty { target, .. }
            | UiCommand::SetStyle { target, .. }
            | UiCommand::DisposeNode { target } => *target,
            UiCommand::InsertChild { child, .. } => *child,
        }
    }
}

/// Synchronous call primitive into the native tree.
pub trait NativeBridge: Send {
    /// Apply a batch of mutations in order.
    ///
    /// [`BridgeError::Unavailable`] means none of the batch was delivered.
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError>;
    /// Invoke a native method on a node (`click`, `scroll`, `getBoundingClientRect`, ...).
    fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError>;
    /// Read a property from a native node.
    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError>;
}

/// Shared bridges (for example a native tree inspected by tests) forward through the lock.
impl<T: NativeBridge> NativeBridge for Arc<Mutex<T>> {
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError> {
        self.lock()
            .map_err(|_| BridgeError::Unavailable(String::from("native bridge poisoned")))?
            .apply(batch)
    }

    fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        self.lock()
            .map_err(|_| BridgeError::Unavailable(String::from("native bridge poisoned")))?
            .method(target, name, args)
    }

    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        self.lock()
            .map_err(|_| BridgeError::Unavailable(String::from("native bridge poisoned")))?
            .get_property(target, name)
    }
}

/// Front of a [`NativeBridge`] that owns command ordering.
///
/// In immediate mode every command is applied as it is pushed. In batched
/// mode commands are queued and handed over as one batch on [`flush`],
/// which also runs before every read so the native side never answers from
/// a stale tree.
///
/// [`flush`]: CommandBuffer::flush
pub struct CommandBuffer {
    bridge: Box<dyn NativeBridge>,
    queue: Vec<UiCommand>,
    batched: bool,
}

impl CommandBuffer {
    /// Wrap a bridge. `batched` selects queueing over immediate application.
    pub fn new(bridge: Box<dyn NativeBridge>, batched: bool) -> Self {
        Self {
            bridge,
            queue: Vec::new(),
            batched,
        }
    }

    /// Issue a mutation.
    pub fn push(&mut self, command: UiCommand) -> Result<(), BridgeError> {
        trace!("ui command: {command:?}");
        if self.batched {
            self.queue.push(command);
            return Ok(());
        }
        self.bridge.apply(vec![command])
    }

    /// Hand every queued command to the bridge in issue order.
    ///
    /// Errors always reach the caller. When the bridge was unavailable the
    /// batch never arrived, so it stays queued and the next flush hands the
    /// same commands over again. Any other error means native consumed the
    /// batch and rejected part of it; those commands are not replayed.
    pub fn flush(&mut self) -> Result<(), BridgeError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        debug!("flushing {} ui commands", self.queue.len());
        let result = self.bridge.apply(self.queue.clone());
        match &result {
            Err(error @ BridgeError::Unavailable(_)) => {
                warn!("keeping {} ui commands queued: {error}", self.queue.len());
            }
            Err(error) => {
                warn!("native rejected a batch of {} ui commands: {error}", self.queue.len());
                self.queue.clear();
            }
            Ok(()) => self.queue.clear(),
        }
        result
    }

    /// Flush, then invoke a native method.
    pub fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        self.flush()?;
        self.bridge.method(target, name, args)
    }

    /// Flush, then read a native property.
    pub fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        self.flush()?;
        self.bridge.get_property(target, name)
    }

    /// Number of commands waiting for the next flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether commands are queued rather than applied immediately.
    #[inline]
    pub fn is_batched(&self) -> bool {
        self.batched
    }
}
