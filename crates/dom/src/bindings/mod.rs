//! Engine-agnostic host bindings.
//!
//! A script engine adapter installs [`HostNamespace`]s on its global object.
//! Every function receives the [`HostContext`] (the shared document and a
//! logger) plus its arguments as [`HostValue`]s. Nodes cross this boundary as
//! decimal `targetId` strings.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::{Arc, Mutex, MutexGuard};

use bridge::{HostLogger, LogLevel, NativeValue};

use crate::{Document, DomError};

mod document;
pub use document::build_document_namespace;

/// Values passed to and returned from host functions.
pub type HostValue = NativeValue;

/// Error type used by host callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Wrong argument count or types.
    TypeError(String),
    /// The operation itself failed.
    InternalError(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HostError::TypeError(message) => write!(f, "TypeError: {message}"),
            HostError::InternalError(message) => write!(f, "InternalError: {message}"),
        }
    }
}

impl Error for HostError {}

impl From<DomError> for HostError {
    fn from(error: DomError) -> Self {
        match error {
            DomError::UnknownNode(_) | DomError::NotAnElement(_) => HostError::TypeError(error.to_string()),
            other => HostError::InternalError(other.to_string()),
        }
    }
}

/// Execution context passed to host callbacks.
#[derive(Clone)]
pub struct HostContext {
    /// The document every `document.*` function operates on.
    pub document: Arc<Mutex<Document>>,
    /// Logger used by host functions such as `console.*`.
    pub logger: Arc<dyn HostLogger>,
}

impl HostContext {
    pub fn new(document: Arc<Mutex<Document>>, logger: Arc<dyn HostLogger>) -> Self {
        Self { document, logger }
    }

    /// Lock the document for the duration of one host call.
    pub fn document(&self) -> Result<MutexGuard<'_, Document>, HostError> {
        self.document
            .lock()
            .map_err(|_| HostError::InternalError(String::from("document mutex poisoned")))
    }
}

/// A synchronous host function signature.
pub type HostFnSync = dyn Fn(&HostContext, Vec<HostValue>) -> Result<HostValue, HostError> + Send + Sync + 'static;

/// A single function descriptor the engine adapter can install.
#[derive(Clone)]
pub enum HostFnKind {
    Sync(Arc<HostFnSync>),
}

/// A namespaced set of functions and properties (for example, `document`).
#[derive(Default)]
pub struct HostNamespace {
    pub functions: BTreeMap<String, HostFnKind>,
    pub properties: BTreeMap<String, HostValue>,
}

impl HostNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous function.
    pub fn with_sync_fn(mut self, name: &str, function: Arc<HostFnSync>) -> Self {
        self.functions.insert(name.to_owned(), HostFnKind::Sync(function));
        self
    }

    /// Register a constant property.
    pub fn with_property(mut self, name: &str, value: HostValue) -> Self {
        self.properties.insert(name.to_owned(), value);
        self
    }

    /// Invoke a function by name.
    pub fn call(&self, name: &str, context: &HostContext, args: Vec<HostValue>) -> Result<HostValue, HostError> {
        match self.functions.get(name) {
            Some(HostFnKind::Sync(function)) => function(context, args),
            None => Err(HostError::TypeError(format!("{name} is not a function"))),
        }
    }
}

/// A collection of namespaces to be installed on the global object.
#[derive(Default)]
pub struct HostBindings {
    pub namespaces: BTreeMap<String, HostNamespace>,
}

impl HostBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a namespace.
    pub fn with_namespace(mut self, name: &str, namespace: HostNamespace) -> Self {
        self.namespaces.insert(name.to_owned(), namespace);
        self
    }

    pub fn namespace(&self, name: &str) -> Option<&HostNamespace> {
        self.namespaces.get(name)
    }
}

/// Join arguments the way `console.log` prints them.
pub fn stringify_arguments(arguments: Vec<HostValue>) -> String {
    arguments
        .iter()
        .map(NativeValue::to_js_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn make_log_fn(level: LogLevel) -> Arc<HostFnSync> {
    Arc::new(move |context: &HostContext, arguments: Vec<HostValue>| -> Result<HostValue, HostError> {
        context.logger.log(level, &stringify_arguments(arguments));
        Ok(HostValue::Undefined)
    })
}

/// Build the `console` namespace routing to the context logger.
pub fn build_console_namespace() -> HostNamespace {
    let methods: [(&str, LogLevel); 5] = [
        ("debug", LogLevel::Debug),
        ("log", LogLevel::Info),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("error", LogLevel::Error),
    ];
    methods
        .iter()
        .fold(HostNamespace::new(), |namespace, (name, level)| {
            namespace.with_sync_fn(name, make_log_fn(*level))
        })
}

/// Default bindings: `console` and `document`.
pub fn build_default_bindings() -> HostBindings {
    HostBindings::new()
        .with_namespace("console", build_console_namespace())
        .with_namespace("document", build_document_namespace())
}
