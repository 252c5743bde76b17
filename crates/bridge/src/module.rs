use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::trace;

use crate::{BridgeConfig, BridgeError, FormDataModule, NativeValue};

/// Call primitive addressed by `(module, action)` instead of a node handle.
///
/// Construction actions return a fresh opaque handle; every later action on
/// that object takes the handle as its first argument. Calls on one handle are
/// observed by the native side in issue order.
pub trait ModuleBridge: Send {
    fn invoke_module(
        &mut self,
        module: &str,
        action: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError>;
}

/// A module bridge shared by every object it backs.
pub type SharedModuleBridge = Arc<Mutex<dyn ModuleBridge>>;

/// A native-side module answering actions for the objects it owns.
pub trait NativeModule: Send {
    /// Name the module is registered under.
    fn name(&self) -> &str;
    /// Run one action.
    fn invoke(&mut self, action: &str, args: Vec<NativeValue>) -> Result<NativeValue, BridgeError>;
}

/// Routes module calls to registered [`NativeModule`]s by name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Box<dyn NativeModule>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in modules (currently `FormData`).
    pub fn with_defaults(config: &BridgeConfig) -> Self {
        Self::new().with_module(FormDataModule::new(config.form_data_boundary_prefix.clone()))
    }

    /// Add or replace a module.
    pub fn with_module<M: NativeModule + 'static>(mut self, module: M) -> Self {
        self.register(module);
        self
    }

    /// Add or replace a module in place.
    pub fn register<M: NativeModule + 'static>(&mut self, module: M) {
        self.modules.insert(module.name().to_owned(), Box::new(module));
    }

    /// Whether a module is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }
}

impl ModuleBridge for ModuleRegistry {
    fn invoke_module(
        &mut self,
        module: &str,
        action: &str,
        args: Vec<NativeValue>,
    ) -> Result<NativeValue, BridgeError> {
        trace!("module call {module}.{action} ({} args)", args.len());
        let Some(target) = self.modules.get_mut(module) else {
            return Err(BridgeError::UnknownModule(module.to_owned()));
        };
        target.invoke(action, args)
    }
}

/// Read the handle argument every non-construction action starts with.
pub(crate) fn handle_arg(args: &[NativeValue]) -> Result<&str, BridgeError> {
    args.first()
        .and_then(NativeValue::as_str)
        .ok_or_else(|| BridgeError::InvalidArgument(String::from("first argument must be a handle")))
}

/// Read a string argument at `index`.
pub(crate) fn string_arg<'args>(
    args: &'args [NativeValue],
    index: usize,
    what: &str,
) -> Result<&'args str, BridgeError> {
    args.get(index)
        .and_then(NativeValue::as_str)
        .ok_or_else(|| BridgeError::InvalidArgument(format!("{what} must be a string")))
}
