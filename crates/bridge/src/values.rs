use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::TargetId;

/// Values exchanged with the native side.
/// Small on purpose; it only carries what the bridges need.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    /// The `undefined` value (no result).
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean primitive.
    Boolean(bool),
    /// A number (IEEE 754 double precision).
    Number(f64),
    /// A string value (UTF-8).
    String(String),
    /// An ordered list of values.
    Array(Vec<NativeValue>),
    /// A binary part with its file name.
    Blob { data: Vec<u8>, filename: String },
    /// Raw bytes (an `ArrayBuffer`).
    Bytes(Vec<u8>),
}

impl NativeValue {
    /// Borrow the string payload, if this is a string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is `null` or `undefined`.
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Numeric view: numbers as-is, numeric strings parsed, booleans as 0/1.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::String(text) => text.trim().parse::<f64>().ok(),
            Self::Boolean(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String coercion with script semantics (`String(value)`).
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => String::from("undefined"),
            Self::Null => String::from("null"),
            Self::Boolean(flag) => flag.to_string(),
            Self::Number(number) => format_number(*number),
            Self::String(text) => text.clone(),
            Self::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Blob { .. } => String::from("[object Blob]"),
            Self::Bytes(_) => String::from("[object ArrayBuffer]"),
        }
    }

    /// Interpret a native property read as an attribute value.
    /// `null`, `undefined` and binary values mean "no value".
    pub fn into_attribute_value(self) -> Option<String> {
        match self {
            Self::Undefined | Self::Null | Self::Blob { .. } | Self::Bytes(_) => None,
            Self::String(text) => Some(text),
            other => Some(other.to_js_string()),
        }
    }
}

/// Format a double the way script engines print numbers.
fn format_number(number: f64) -> String {
    if number.is_nan() {
        return String::from("NaN");
    }
    if number.is_infinite() {
        return String::from(if number > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if number.fract() == 0.0 && number.abs() < 1e21 {
        return format!("{}", number as i64);
    }
    format!("{number}")
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// Failures reported by the native command bridge or the module bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeError {
    /// The native counterpart cannot be reached (torn down, channel closed, lock poisoned).
    Unavailable(String),
    /// No native node exists for this handle.
    UnknownTarget(TargetId),
    /// The handle is already live and cannot be claimed again.
    TargetInUse(TargetId),
    /// No native object exists for this module handle.
    UnknownHandle(String),
    /// No module is registered under this name.
    UnknownModule(String),
    /// The module does not understand this action.
    UnknownAction { module: String, action: String },
    /// Arguments of the wrong shape.
    InvalidArgument(String),
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BridgeError::Unavailable(message) => write!(f, "bridge unavailable: {message}"),
            BridgeError::UnknownTarget(target) => write!(f, "unknown native target {target}"),
            BridgeError::TargetInUse(target) => write!(f, "native target {target} is already in use"),
            BridgeError::UnknownHandle(handle) => write!(f, "unknown module handle '{handle}'"),
            BridgeError::UnknownModule(module) => write!(f, "unknown module '{module}'"),
            BridgeError::UnknownAction { module, action } => {
                write!(f, "module '{module}' has no action '{action}'")
            }
            BridgeError::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for BridgeError {}
