//! Channel transport between the object model and a native host.
//!
//! The object model talks to a [`ChannelBridge`]; the native side runs a
//! [`NativeMirror`] that drains requests in arrival order and applies them to
//! its host. Mutations are posted and forgotten. Reads and module calls wait
//! on a oneshot reply, so they must be issued from a thread that is not
//! driving the mirror itself (and not from inside an async runtime).

use anyhow::{Result, anyhow};
use log::{debug, warn};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::{
    BridgeConfig, BridgeError, ModuleBridge, ModuleRegistry, NativeBridge, NativeTree, NativeValue,
    TargetId, UiCommand,
};

type Reply = oneshot::Sender<Result<NativeValue, BridgeError>>;

/// A request travelling from the object model to the native side.
#[derive(Debug)]
pub enum NativeRequest {
    Apply(Vec<UiCommand>),
    Method {
        target: TargetId,
        name: String,
        args: Vec<NativeValue>,
        reply: Reply,
    },
    GetProperty {
        target: TargetId,
        name: String,
        reply: Reply,
    },
    Module {
        module: String,
        action: String,
        args: Vec<NativeValue>,
        reply: Reply,
    },
}

/// A native host able to answer both bridges.
pub trait NativeSubscriber: NativeBridge + ModuleBridge {}

impl<T: NativeBridge + ModuleBridge> NativeSubscriber for T {}

/// The stock native host: a headless tree plus the module registry.
pub struct NativeHost {
    tree: NativeTree,
    modules: ModuleRegistry,
}

impl NativeHost {
    /// Host with an empty tree and the default modules.
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_parts(NativeTree::new(), ModuleRegistry::with_defaults(config))
    }

    /// Host over a prepared tree and module set.
    pub fn with_parts(tree: NativeTree, modules: ModuleRegistry) -> Self {
        Self { tree, modules }
    }

    /// The native tree, for inspection.
    pub fn tree(&self) -> &NativeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NativeTree {
        &mut self.tree
    }

    pub fn modules_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.modules
    }
}

impl NativeBridge for NativeHost {
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError> {
        self.tree.apply(batch)
    }

    fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        self.tree.method(target, name, args)
    }

    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        self.tree.get_property(target, name)
    }
}

impl ModuleBridge for NativeHost {
    fn invoke_module(
        &mut self,
        module: &str,
        action: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        self.modules.invoke_module(module, action, args)
    }
}

/// Object-model end of the channel. Cheap to clone; every clone feeds the same mirror.
#[derive(Clone, Debug)]
pub struct ChannelBridge {
    sender: mpsc::UnboundedSender<NativeRequest>,
}

impl ChannelBridge {
    fn post(&self, request: NativeRequest) -> Result<(), BridgeError> {
        self.sender
            .send(request)
            .map_err(|_| BridgeError::Unavailable(String::from("native mirror has shut down")))
    }

    fn call<F>(&self, build: F) -> Result<NativeValue, BridgeError>
    where
        F: FnOnce(Reply) -> NativeRequest,
    {
        let (reply, response) = oneshot::channel();
        self.post(build(reply))?;
        response
            .blocking_recv()
            .map_err(|_| BridgeError::Unavailable(String::from("native mirror dropped the request")))?
    }

    /// Whether the mirror end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl NativeBridge for ChannelBridge {
    fn apply(&mut self, batch: Vec<UiCommand>) -> Result<(), BridgeError> {
        self.post(NativeRequest::Apply(batch))
    }

    fn method(
        &mut self,
        target: TargetId,
        name: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        let name = name.to_owned();
        self.call(|reply| NativeRequest::Method {
            target,
            name,
            args,
            reply,
        })
    }

    fn get_property(&mut self, target: TargetId, name: &str) -> Result<NativeValue, BridgeError> {
        let name = name.to_owned();
        self.call(|reply| NativeRequest::GetProperty { target, name, reply })
    }
}

impl ModuleBridge for ChannelBridge {
    fn invoke_module(
        &mut self,
        module: &str,
        action: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        let module = module.to_owned();
        let action = action.to_owned();
        self.call(|reply| NativeRequest::Module {
            module,
            action,
            args,
            reply,
        })
    }
}

/// Native end of the channel: applies incoming requests to a host.
pub struct NativeMirror<T: NativeSubscriber> {
    requests: mpsc::UnboundedReceiver<NativeRequest>,
    host: T,
}

/// Connect a host to a fresh channel.
pub fn channel<T: NativeSubscriber>(host: T) -> (ChannelBridge, NativeMirror<T>) {
    let (sender, requests) = mpsc::unbounded_channel();
    (ChannelBridge { sender }, NativeMirror { requests, host })
}

impl<T: NativeSubscriber> NativeMirror<T> {
    fn handle(&mut self, request: NativeRequest) {
        match request {
            NativeRequest::Apply(batch) => {
                let size = batch.len();
                if let Err(error) = self.host.apply(batch) {
                    warn!("native host failed to apply {size} commands: {error}");
                }
            }
            NativeRequest::Method {
                target,
                name,
                args,
                reply,
            } => {
                let result = self.host.method(target, &name, args);
                if reply.send(result).is_err() {
                    debug!("caller of {name} on {target} went away");
                }
            }
            NativeRequest::GetProperty {
                target,
                name,
                reply,
            } => {
                let result = self.host.get_property(target, &name);
                if reply.send(result).is_err() {
                    debug!("caller reading {name} on {target} went away");
                }
            }
            NativeRequest::Module {
                module,
                action,
                args,
                reply,
            } => {
                let result = self.host.invoke_module(&module, &action, args);
                if reply.send(result).is_err() {
                    debug!("caller of {module}.{action} went away");
                }
            }
        }
    }

    /// Drain and apply every pending request without blocking.
    /// Fails once all bridges are gone and nothing is left to drain.
    pub fn try_update_sync(&mut self) -> Result<usize> {
        let mut handled = 0;
        loop {
            match self.requests.try_recv() {
                Ok(request) => {
                    self.handle(request);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if handled == 0 {
                        return Err(anyhow!("every bridge to the native mirror was dropped"));
                    }
                    break;
                }
            }
        }
        Ok(handled)
    }

    /// Serve requests on the current thread until every bridge is dropped.
    pub fn serve_blocking(&mut self) {
        while let Some(request) = self.requests.blocking_recv() {
            self.handle(request);
        }
        debug!("native mirror stopped: all bridges dropped");
    }

    /// Serve requests asynchronously until every bridge is dropped.
    pub async fn serve(&mut self) {
        while let Some(request) = self.requests.recv().await {
            self.handle(request);
        }
        debug!("native mirror stopped: all bridges dropped");
    }

    /// Access the host immutably (read-only access).
    pub fn host(&self) -> &T {
        &self.host
    }

    /// Access the host mutably.
    pub fn host_mut(&mut self) -> &mut T {
        &mut self.host
    }

    /// Stop serving and hand the host back.
    pub fn into_host(self) -> T {
        self.host
    }
}
