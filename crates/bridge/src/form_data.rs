//! Native-side multipart form-data builder.
//!
//! Every `init` creates a builder owned by this module and returns an opaque
//! handle for it. Parts are kept in append order. A part's value is a text
//! field unless it arrives as [`NativeValue::Blob`], in which case it is a
//! binary part with a file name.
//!
//! The encoded body is bytes: `toBytes` returns it exactly, `toString` is a
//! lossy text view for callers that only need a printable form.

use std::collections::HashMap;

use log::debug;

use crate::module::{handle_arg, string_arg};
use crate::{BridgeError, NativeModule, NativeValue};

const MODULE_NAME: &str = "FormData";

#[derive(Clone, Debug, PartialEq)]
enum PartValue {
    Text(String),
    File { data: Vec<u8>, filename: String },
}

impl PartValue {
    fn from_native(value: NativeValue) -> Self {
        match value {
            NativeValue::Blob { data, filename } => PartValue::File { data, filename },
            NativeValue::String(text) => PartValue::Text(text),
            other => PartValue::Text(other.to_js_string()),
        }
    }

    fn to_native(&self) -> NativeValue {
        match self {
            PartValue::Text(text) => NativeValue::String(text.clone()),
            PartValue::File { data, filename } => NativeValue::Blob {
                data: data.clone(),
                filename: filename.clone(),
            },
        }
    }
}

#[derive(Clone, Debug)]
struct FormPart {
    name: String,
    value: PartValue,
}

impl FormPart {
    /// Parts travel as a two-element array: `[name, value]`.
    fn to_native(&self) -> NativeValue {
        NativeValue::Array(vec![
            NativeValue::String(self.name.clone()),
            self.value.to_native(),
        ])
    }
}

#[derive(Debug, Default)]
struct FormState {
    serial: u64,
    parts: Vec<FormPart>,
}

/// The `FormData` native module.
#[derive(Debug)]
pub struct FormDataModule {
    boundary_prefix: String,
    next_serial: u64,
    forms: HashMap<String, FormState>,
}

impl FormDataModule {
    /// Create the module; `boundary_prefix` starts every multipart boundary.
    pub fn new(boundary_prefix: String) -> Self {
        Self {
            boundary_prefix,
            next_serial: 1,
            forms: HashMap::new(),
        }
    }

    /// Number of builders currently alive.
    pub fn live_count(&self) -> usize {
        self.forms.len()
    }

    fn form(&self, args: &[NativeValue]) -> Result<&FormState, BridgeError> {
        let handle = handle_arg(args)?;
        self.forms
            .get(handle)
            .ok_or_else(|| BridgeError::UnknownHandle(handle.to_owned()))
    }

    fn form_mut(&mut self, args: &[NativeValue]) -> Result<&mut FormState, BridgeError> {
        let handle = handle_arg(args)?;
        self.forms
            .get_mut(handle)
            .ok_or_else(|| BridgeError::UnknownHandle(handle.to_owned()))
    }

    fn init(&mut self) -> NativeValue {
        let serial = self.next_serial;
        self.next_serial += 1;
        let handle = format!("{MODULE_NAME}#{serial}");
        self.forms.insert(
            handle.clone(),
            FormState {
                serial,
                parts: Vec::new(),
            },
        );
        debug!("form-data builder {handle} created");
        NativeValue::String(handle)
    }

    fn boundary(&self, form: &FormState) -> String {
        format!("{}{:016x}", self.boundary_prefix, form.serial)
    }

    /// The `multipart/form-data` body. Binary parts are copied byte for byte.
    fn encode(&self, form: &FormState) -> Vec<u8> {
        let boundary = self.boundary(form);
        let mut body = Vec::new();
        for part in &form.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            let name = escape_header_value(&part.name);
            match &part.value {
                PartValue::Text(text) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                    );
                    body.extend_from_slice(text.as_bytes());
                }
                PartValue::File { data, filename } => {
                    let filename = escape_header_value(filename);
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }
}

/// Percent-encode the characters that would end a quoted header parameter
/// or the header line itself.
fn escape_header_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("%22"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl NativeModule for FormDataModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn invoke(&mut self, action: &str, args: Vec<NativeValue>) -> Result<NativeValue, BridgeError> {
        match action {
            "init" => Ok(self.init()),
            "append" => {
                let name = string_arg(&args, 1, "name")?.to_owned();
                let value = PartValue::from_native(args.get(2).cloned().unwrap_or(NativeValue::Undefined));
                self.form_mut(&args)?.parts.push(FormPart { name, value });
                Ok(NativeValue::Undefined)
            }
            "set" => {
                let name = string_arg(&args, 1, "name")?.to_owned();
                let value = PartValue::from_native(args.get(2).cloned().unwrap_or(NativeValue::Undefined));
                let form = self.form_mut(&args)?;
                match form.parts.iter().position(|part| part.name == name) {
                    Some(first) => {
                        form.parts[first].value = value;
                        let mut index = 0;
                        form.parts.retain(|part| {
                            let keep = index <= first || part.name != name;
                            index += 1;
                            keep
                        });
                    }
                    None => form.parts.push(FormPart { name, value }),
                }
                Ok(NativeValue::Undefined)
            }
            "delete" => {
                let name = string_arg(&args, 1, "name")?.to_owned();
                self.form_mut(&args)?.parts.retain(|part| part.name != name);
                Ok(NativeValue::Undefined)
            }
            "toString" => {
                let form = self.form(&args)?;
                Ok(NativeValue::String(String::from_utf8_lossy(&self.encode(form)).into_owned()))
            }
            "toBytes" => {
                let form = self.form(&args)?;
                Ok(NativeValue::Bytes(self.encode(form)))
            }
            "contentType" => {
                let form = self.form(&args)?;
                Ok(NativeValue::String(format!(
                    "multipart/form-data; boundary={}",
                    self.boundary(form)
                )))
            }
            "getAll" | "entries" => {
                let form = self.form(&args)?;
                Ok(NativeValue::Array(form.parts.iter().map(FormPart::to_native).collect()))
            }
            "getFirst" => {
                let form = self.form(&args)?;
                Ok(form
                    .parts
                    .first()
                    .map_or(NativeValue::Null, FormPart::to_native))
            }
            "get" => {
                let name = string_arg(&args, 1, "name")?;
                let form = self.form(&args)?;
                Ok(form
                    .parts
                    .iter()
                    .find(|part| part.name == name)
                    .map_or(NativeValue::Null, FormPart::to_native))
            }
            "getAllNamed" => {
                let name = string_arg(&args, 1, "name")?;
                let form = self.form(&args)?;
                Ok(NativeValue::Array(
                    form.parts
                        .iter()
                        .filter(|part| part.name == name)
                        .map(FormPart::to_native)
                        .collect(),
                ))
            }
            "values" => {
                let form = self.form(&args)?;
                Ok(NativeValue::Array(
                    form.parts.iter().map(|part| part.value.to_native()).collect(),
                ))
            }
            "has" => {
                let name = string_arg(&args, 1, "name")?;
                let form = self.form(&args)?;
                Ok(NativeValue::Boolean(form.parts.iter().any(|part| part.name == name)))
            }
            "keys" => {
                let form = self.form(&args)?;
                let mut keys: Vec<NativeValue> = Vec::new();
                for part in &form.parts {
                    let key = NativeValue::String(part.name.clone());
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                Ok(NativeValue::Array(keys))
            }
            "release" => {
                let handle = handle_arg(&args)?;
                if self.forms.remove(handle).is_none() {
                    return Err(BridgeError::UnknownHandle(handle.to_owned()));
                }
                debug!("form-data builder {handle} released");
                Ok(NativeValue::Undefined)
            }
            _ => Err(BridgeError::UnknownAction {
                module: MODULE_NAME.to_owned(),
                action: action.to_owned(),
            }),
        }
    }
}
