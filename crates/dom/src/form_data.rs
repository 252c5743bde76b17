//! Script-facing multipart form-data builder.
//!
//! The builder itself lives on the native side; a [`FormData`] only holds the
//! opaque handle returned at construction and forwards every call through the
//! module bridge. The handle never leaves this type.

use bridge::{BridgeError, ModuleHandle, NativeValue, SharedModuleBridge};
use log::{debug, warn};

use crate::DomError;

const MODULE: &str = "FormData";

/// Value of one form part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormDataValue {
    Text(String),
    File { data: Vec<u8>, filename: String },
}

impl FormDataValue {
    fn into_native(self) -> NativeValue {
        match self {
            FormDataValue::Text(text) => NativeValue::String(text),
            FormDataValue::File { data, filename } => NativeValue::Blob { data, filename },
        }
    }

    fn from_native(value: NativeValue) -> Option<Self> {
        match value {
            NativeValue::String(text) => Some(FormDataValue::Text(text)),
            NativeValue::Blob { data, filename } => Some(FormDataValue::File { data, filename }),
            _ => None,
        }
    }

    /// Text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormDataValue::Text(text) => Some(text),
            FormDataValue::File { .. } => None,
        }
    }
}

impl From<&str> for FormDataValue {
    fn from(value: &str) -> Self {
        FormDataValue::Text(value.to_owned())
    }
}

impl From<String> for FormDataValue {
    fn from(value: String) -> Self {
        FormDataValue::Text(value)
    }
}

/// A named part as reported by the native builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormDataPart {
    pub name: String,
    pub value: FormDataValue,
}

impl FormDataPart {
    fn from_native(value: NativeValue) -> Option<Self> {
        let NativeValue::Array(items) = value else {
            return None;
        };
        let mut items = items.into_iter();
        let NativeValue::String(name) = items.next()? else {
            return None;
        };
        let value = FormDataValue::from_native(items.next()?)?;
        Some(Self { name, value })
    }
}

impl<N: Into<String>, V: Into<FormDataValue>> From<(N, V)> for FormDataPart {
    fn from((name, value): (N, V)) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Handle-backed form-data builder.
pub struct FormData {
    handle: ModuleHandle,
    bridge: SharedModuleBridge,
    released: bool,
}

impl FormData {
    /// Ask the native side for a fresh builder.
    pub fn new(bridge: SharedModuleBridge) -> Result<Self, DomError> {
        let reply = invoke(&bridge, "init", Vec::new())?;
        let NativeValue::String(token) = reply else {
            return Err(DomError::Bridge(BridgeError::InvalidArgument(String::from(
                "FormData.init did not return a handle",
            ))));
        };
        debug!("FormData created");
        Ok(Self {
            handle: ModuleHandle::new(token),
            bridge,
            released: false,
        })
    }

    fn call(&self, action: &str, mut args: Vec<NativeValue>) -> Result<NativeValue, BridgeError> {
        args.insert(0, NativeValue::String(self.handle.as_str().to_owned()));
        invoke(&self.bridge, action, args)
    }

    /// Reads never fail loudly: problems are logged and read as empty.
    fn read(&self, action: &str, args: Vec<NativeValue>) -> Option<NativeValue> {
        match self.call(action, args) {
            Ok(value) => Some(value),
            Err(error) => {
                debug!("FormData.{action} failed: {error}");
                None
            }
        }
    }

    /// Add a part after every existing one.
    pub fn append<V: Into<FormDataValue>>(&mut self, name: &str, value: V) -> Result<(), DomError> {
        let value = value.into().into_native();
        self.call("append", vec![NativeValue::from(name), value])?;
        Ok(())
    }

    /// Add a binary part with a file name.
    pub fn append_file(&mut self, name: &str, data: Vec<u8>, filename: &str) -> Result<(), DomError> {
        self.append(
            name,
            FormDataValue::File {
                data,
                filename: filename.to_owned(),
            },
        )
    }

    /// Replace every part named `name` with one part at the first one's position.
    pub fn set<V: Into<FormDataValue>>(&mut self, name: &str, value: V) -> Result<(), DomError> {
        let value = value.into().into_native();
        self.call("set", vec![NativeValue::from(name), value])?;
        Ok(())
    }

    /// Drop every part named `name`.
    pub fn delete(&mut self, name: &str) -> Result<(), DomError> {
        self.call("delete", vec![NativeValue::from(name)])?;
        Ok(())
    }

    /// The `multipart/form-data` body.
    pub fn serialize(&self) -> String {
        self.read("toString", Vec::new())
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    /// The `multipart/form-data` body as bytes; binary parts are exact.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.read("toBytes", Vec::new()) {
            Some(NativeValue::Bytes(body)) => body,
            _ => Vec::new(),
        }
    }

    /// `Content-Type` header value naming this body's boundary.
    pub fn content_type(&self) -> Option<String> {
        self.read("contentType", Vec::new())
            .and_then(|value| value.as_str().map(str::to_owned))
    }

    /// Every part in append order.
    pub fn get_all(&self) -> Vec<FormDataPart> {
        self.parts("getAll")
    }

    /// Same as [`FormData::get_all`].
    pub fn entries(&self) -> Vec<FormDataPart> {
        self.parts("entries")
    }

    fn parts(&self, action: &str) -> Vec<FormDataPart> {
        match self.read(action, Vec::new()) {
            Some(NativeValue::Array(parts)) => parts.into_iter().filter_map(FormDataPart::from_native).collect(),
            _ => Vec::new(),
        }
    }

    /// Every part's value in append order.
    pub fn values(&self) -> Vec<FormDataValue> {
        match self.read("values", Vec::new()) {
            Some(NativeValue::Array(values)) => values
                .into_iter()
                .filter_map(FormDataValue::from_native)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Visit every part as `(value, name)`.
    pub fn for_each<F: FnMut(&FormDataValue, &str)>(&self, mut visit: F) {
        for part in self.entries() {
            visit(&part.value, &part.name);
        }
    }

    /// The first part appended, whatever its name.
    pub fn get_first(&self) -> Option<FormDataPart> {
        self.read("getFirst", Vec::new())
            .and_then(FormDataPart::from_native)
    }

    /// Value of the first part named `name`.
    pub fn get(&self, name: &str) -> Option<FormDataValue> {
        self.read("get", vec![NativeValue::from(name)])
            .and_then(FormDataPart::from_native)
            .map(|part| part.value)
    }

    /// Values of every part named `name`, in append order.
    pub fn get_all_named(&self, name: &str) -> Vec<FormDataValue> {
        match self.read("getAllNamed", vec![NativeValue::from(name)]) {
            Some(NativeValue::Array(parts)) => parts
                .into_iter()
                .filter_map(FormDataPart::from_native)
                .map(|part| part.value)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        matches!(
            self.read("has", vec![NativeValue::from(name)]),
            Some(NativeValue::Boolean(true))
        )
    }

    /// Distinct part names in first-appearance order.
    pub fn keys(&self) -> Vec<String> {
        match self.read("keys", Vec::new()) {
            Some(NativeValue::Array(keys)) => keys
                .into_iter()
                .filter_map(|key| match key {
                    NativeValue::String(key) => Some(key),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Free the native builder.
    pub fn release(mut self) -> Result<(), DomError> {
        self.released = true;
        self.call("release", Vec::new())?;
        Ok(())
    }
}

impl Drop for FormData {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(error) = self.call("release", Vec::new()) {
            warn!("failed to release FormData builder: {error}");
        }
    }
}

fn invoke(bridge: &SharedModuleBridge, action: &str, args: Vec<NativeValue>) -> Result<NativeValue, BridgeError> {
    bridge
        .lock()
        .map_err(|_| BridgeError::Unavailable(String::from("module bridge poisoned")))?
        .invoke_module(MODULE, action, args)
}
