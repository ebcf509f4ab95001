//! Backend seam.
//!
//! The facade never persists anything itself; it hands leveled messages to a
//! [`LogBackend`]. `TracingBackend` bridges to the `tracing` ecosystem, whose
//! subscriber decides where the text ends up (see [`crate::init`]).

use crate::category::{Level, Priority};
use crate::redact::redact_sensitive_data;

/// Destination for leveled messages.
///
/// Calls are synchronous and assumed infallible from the facade's side.
pub trait LogBackend: Send + Sync {
    fn write(&self, level: Level, message: &str);

    /// Write with a caller priority. Backends without structured fields
    /// ignore it.
    fn write_with_priority(&self, level: Level, message: &str, priority: Priority) {
        let _ = priority;
        self.write(level, message);
    }
}

// ---------------------------------------------------------------------------
// Tracing adapter
// ---------------------------------------------------------------------------

/// Forwards messages to `tracing` events.
///
/// `tracing` has no fatal level, so fatal messages are emitted as errors
/// carrying `severity = "fatal"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBackend {
    redact: bool,
}

impl TracingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask secrets in every message before it is emitted.
    pub fn with_redaction(mut self, redact: bool) -> Self {
        self.redact = redact;
        self
    }

    pub fn redacts(&self) -> bool {
        self.redact
    }

    fn emit(&self, level: Level, message: &str, priority: Priority) {
        let message = if self.redact {
            redact_sensitive_data(message)
        } else {
            message.into()
        };

        match level {
            Level::Trace => tracing::trace!(%priority, "{}", message),
            Level::Debug => tracing::debug!(%priority, "{}", message),
            Level::Info => tracing::info!(%priority, "{}", message),
            Level::Warn => tracing::warn!(%priority, "{}", message),
            Level::Error => tracing::error!(%priority, "{}", message),
            Level::Fatal => tracing::error!(severity = "fatal", %priority, "{}", message),
        }
    }
}

impl LogBackend for TracingBackend {
    fn write(&self, level: Level, message: &str) {
        self.emit(level, message, Priority::None);
    }

    fn write_with_priority(&self, level: Level, message: &str, priority: Priority) {
        self.emit(level, message, priority);
    }
}

// ---------------------------------------------------------------------------
// No-op
// ---------------------------------------------------------------------------

/// Discards everything. Useful for benchmarks and silent modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpBackend;

impl LogBackend for NoOpBackend {
    #[inline]
    fn write(&self, _level: Level, _message: &str) {}
}
