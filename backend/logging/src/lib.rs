//! Logging facade for relaylog.
//!
//! Decouples application code from the logging backend:
//! - Category to backend-level mapping and direct severity entry points
//! - Exception reports rendered by `relaylog-report`, dispatched at fatal level
//! - Exception and error notification channels
//! - `tracing` subscriber setup from YAML config, secret redaction, panic reports

pub mod backend;
pub mod category;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod init;
pub mod panic;
pub mod redact;

pub use backend::{LogBackend, NoOpBackend, TracingBackend};
pub use category::{Category, Level, Priority};
pub use config::{ConfigError, LoggingConfig, Rotation, ValidationReport, load_config};
pub use error::FacadeError;
pub use events::{Channel, ErrorListener, ExceptionListener, SubscriptionId};
pub use facade::{Logger, LoggerBuilder, LoggerFacade, Renderer};
pub use init::{LoggingGuard, init_logging};
pub use panic::install_panic_hook;
pub use redact::redact_sensitive_data;

pub use relaylog_report::{ExceptionNode, StackFrame};

use once_cell::sync::OnceCell;
use std::sync::Arc;

static GLOBAL_LOGGER: OnceCell<Arc<Logger>> = OnceCell::new();

/// Install the process-wide logger. Fails if one is already installed.
pub fn init_global(logger: Logger) -> Result<Arc<Logger>, FacadeError> {
    let logger = Arc::new(logger);
    GLOBAL_LOGGER
        .set(Arc::clone(&logger))
        .map_err(|_| FacadeError::AlreadyInitialized)?;
    Ok(logger)
}

/// The process-wide logger, if installed.
pub fn global() -> Option<Arc<Logger>> {
    GLOBAL_LOGGER.get().cloned()
}
