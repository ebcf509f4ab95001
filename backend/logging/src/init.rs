//! Subscriber initialisation.
//!
//! Wires the `tracing` stack that [`TracingBackend`](crate::backend::TracingBackend)
//! emits into:
//! - an env filter (`RUST_LOG` wins over the configured level)
//! - an optional stdout layer
//! - an optional file layer, plain text or JSON lines, behind a non-blocking
//!   writer with rolling rotation

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{DEFAULT_LEVEL, LoggingConfig, Rotation};

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Keeps the background file writer alive.
///
/// Dropping it flushes and closes the log file.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn writes_file(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Install the global subscriber described by `config`.
///
/// If a global subscriber is already set, the existing one is kept and the
/// returned guard still owns the file writer created here.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(&config.level);

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_ansi(true)
                .boxed(),
        );
    }

    let file_guard = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let appender = file_appender(config.rotation, dir, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            layers.push(if config.json {
                file_layer.json().boxed()
            } else {
                file_layer.boxed()
            });
            Some(guard)
        }
        None => None,
    };

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(LoggingGuard { file_guard })
}

/// `RUST_LOG` if set and valid, else `level`, else `info`.
fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

fn file_appender(
    rotation: Rotation,
    dir: &std::path::Path,
    file_name: &str,
) -> RollingFileAppender {
    match rotation {
        Rotation::Daily => rolling::daily(dir, file_name),
        Rotation::Hourly => rolling::hourly(dir, file_name),
        Rotation::Never => rolling::never(dir, file_name),
    }
}
