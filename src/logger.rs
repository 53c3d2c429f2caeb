// Logger shim used at the fetch boundary.
// Forwards a failure plus a small context map to a pluggable sink.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::FetchError;

/// Key/value context attached to a logged failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    fields: BTreeMap<&'static str, String>,
}

impl LogContext {
    /// Start a context naming the failing operation.
    pub fn new(operation: &str) -> Self {
        Self::default().with("context", operation)
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Name of the operation that failed, if recorded.
    pub fn operation(&self) -> Option<&str> {
        self.get("context")
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Destination for fetch failures. Fire-and-forget.
pub trait LogSink: Send + Sync {
    fn log(&self, error: &FetchError, context: &LogContext);
}

/// Default sink: emits a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, error: &FetchError, context: &LogContext) {
        tracing::error!(
            error = %error,
            operation = context.operation().unwrap_or("unknown"),
            context = %context,
            "[Logger]"
        );
    }
}

/// Sink that keeps every entry in memory for later inspection.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<(FetchError, LogContext)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(FetchError, LogContext)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn log(&self, error: &FetchError, context: &LogContext) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((error.clone(), context.clone()));
        }
    }
}
