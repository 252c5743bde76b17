//! Host-side logging sink.
//!
//! Bindings report through a [`HostLogger`] so embedders can route messages
//! wherever they like. [`LogHostLogger`] forwards to the `log` facade.

use log::{debug, error, info, trace, warn};

/// Logging levels for host-side logging.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Host-provided logger used by bindings.
pub trait HostLogger: Send + Sync {
    /// Log a message with a given level.
    fn log(&self, level: LogLevel, message: &str);
}

/// A `HostLogger` that routes to the `log` crate.
pub struct LogHostLogger;

impl HostLogger for LogHostLogger {
    #[inline]
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => trace!("[host]: {message}"),
            LogLevel::Debug => debug!("[host]: {message}"),
            LogLevel::Info => info!("[host]: {message}"),
            LogLevel::Warn => warn!("[host]: {message}"),
            LogLevel::Error => error!("[host]: {message}"),
        }
    }
}
