//! The logging facade.
//!
//! [`Logger`] maps caller categories onto backend levels, renders exception
//! reports and, after a failure has been dispatched, notifies the exception
//! and error listeners.
//!
//! Two paths must not be confused:
//! - `log(msg, Category::Exception)` sends `msg` unchanged at error level
//! - `log_exception(ex)` sends the rendered report at fatal level

use std::sync::Arc;

use relaylog_report::{ExceptionNode, HostEnvironment, ReportFormatter, SystemHost};
use tracing::debug;

use crate::backend::{LogBackend, TracingBackend};
use crate::category::{Category, Level, Priority};
use crate::config::LoggingConfig;
use crate::error::FacadeError;
use crate::events::{Channel, ErrorListener, ExceptionListener, SubscriptionId};
use crate::panic::ReportingScope;

/// Caller-supplied replacement for the built-in report renderer.
pub type Renderer<'a> = &'a dyn Fn(&ExceptionNode) -> String;

/// Operations every facade offers.
pub trait LoggerFacade: Send + Sync {
    /// Dispatch `message` at the level implied by `category`.
    fn log(&self, message: &str, category: Category);

    /// Render `exception`, dispatch it at fatal level and notify exception
    /// listeners.
    fn log_exception(&self, exception: &ExceptionNode) -> Result<(), FacadeError>;

    /// Dispatch at error level and notify error listeners.
    fn log_error(&self, message: &str) -> Result<(), FacadeError>;

    fn trace(&self, message: &str);
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    backend: Arc<dyn LogBackend>,
    formatter: ReportFormatter<Box<dyn HostEnvironment>>,
    exception_listeners: Channel<ExceptionListener>,
    error_listeners: Channel<ErrorListener>,
}

impl Logger {
    /// A logger writing to `tracing` with the host's environment header.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Build from config: redaction and report depth.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::builder()
            .backend(TracingBackend::new().with_redaction(config.redact_sensitive))
            .max_report_depth(config.max_report_depth)
            .build()
    }

    pub fn log_with_priority(&self, message: &str, category: Category, priority: Priority) {
        self.backend
            .write_with_priority(category.level(), message, priority);
    }

    /// `log` for callers holding an untyped category value.
    pub fn log_raw(&self, message: &str, category: i32) -> Result<(), FacadeError> {
        let category = Category::try_from(category)?;
        self.log(message, category);
        Ok(())
    }

    /// Render `exception` with the built-in formatter, without dispatching.
    pub fn render(&self, exception: &ExceptionNode) -> String {
        self.formatter.format(exception)
    }

    /// `log_exception` with an optional custom renderer and notification
    /// switch.
    ///
    /// The text is dispatched before any listener runs. A failing listener
    /// stops the notification and its error is returned.
    pub fn log_exception_with(
        &self,
        exception: &ExceptionNode,
        renderer: Option<Renderer<'_>>,
        notify: bool,
    ) -> Result<(), FacadeError> {
        let _scope = ReportingScope::enter();
        let text = match renderer {
            Some(render) => render(exception),
            None => self.render(exception),
        };

        self.backend.write(Level::Fatal, &text);

        if notify {
            debug!(
                listeners = self.exception_listeners.len(),
                "Notifying exception listeners"
            );
            self.exception_listeners.notify(exception, &text)?;
        }
        Ok(())
    }

    /// `log_error` with a notification switch.
    pub fn log_error_with(&self, message: &str, notify: bool) -> Result<(), FacadeError> {
        let _scope = ReportingScope::enter();
        self.backend.write(Level::Error, message);

        if notify {
            self.error_listeners.notify(message)?;
        }
        Ok(())
    }

    /// Register an exception listener. Listeners fire in registration order.
    pub fn on_exception<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ExceptionNode, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.exception_listeners.subscribe(Arc::new(listener))
    }

    /// Register an error listener. Listeners fire in registration order.
    pub fn on_error<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.error_listeners.subscribe(Arc::new(listener))
    }

    pub fn remove_exception_listener(&self, id: SubscriptionId) -> bool {
        self.exception_listeners.unsubscribe(id)
    }

    pub fn remove_error_listener(&self, id: SubscriptionId) -> bool {
        self.error_listeners.unsubscribe(id)
    }

    pub fn exception_listeners(&self) -> &Channel<ExceptionListener> {
        &self.exception_listeners
    }

    pub fn error_listeners(&self) -> &Channel<ErrorListener> {
        &self.error_listeners
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("max_report_depth", &self.formatter.max_depth())
            .field("exception_listeners", &self.exception_listeners)
            .field("error_listeners", &self.error_listeners)
            .finish_non_exhaustive()
    }
}

impl LoggerFacade for Logger {
    fn log(&self, message: &str, category: Category) {
        self.backend.write(category.level(), message);
    }

    fn log_exception(&self, exception: &ExceptionNode) -> Result<(), FacadeError> {
        self.log_exception_with(exception, None, true)
    }

    fn log_error(&self, message: &str) -> Result<(), FacadeError> {
        self.log_error_with(message, true)
    }

    fn trace(&self, message: &str) {
        self.backend.write(Level::Trace, message);
    }

    fn debug(&self, message: &str) {
        self.backend.write(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.backend.write(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.backend.write(Level::Warn, message);
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct LoggerBuilder {
    backend: Option<Arc<dyn LogBackend>>,
    host: Option<Box<dyn HostEnvironment>>,
    max_report_depth: usize,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            host: None,
            max_report_depth: relaylog_report::DEFAULT_MAX_DEPTH,
        }
    }
}

impl LoggerBuilder {
    pub fn backend(mut self, backend: impl LogBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Share a backend with other owners.
    pub fn shared_backend(mut self, backend: Arc<dyn LogBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn host(mut self, host: impl HostEnvironment + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    pub fn max_report_depth(mut self, depth: usize) -> Self {
        self.max_report_depth = depth;
        self
    }

    pub fn build(self) -> Logger {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(TracingBackend::new()));
        let host = self
            .host
            .unwrap_or_else(|| Box::new(SystemHost));

        Logger {
            backend,
            formatter: ReportFormatter::new(host).with_max_depth(self.max_report_depth),
            exception_listeners: Channel::new("exception"),
            error_listeners: Channel::new("error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaylog_report::FixedHost;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        entries: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingBackend {
        fn entries(&self) -> Vec<(Level, String)> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl LogBackend for RecordingBackend {
        fn write(&self, level: Level, message: &str) {
            self.entries.lock().unwrap().push((level, message.to_string()));
        }
    }

    fn logger() -> (Logger, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::default());
        let logger = Logger::builder()
            .shared_backend(backend.clone())
            .host(FixedHost::new("TestOS 10.0", true))
            .build();
        (logger, backend)
    }

    fn sample() -> ExceptionNode {
        ExceptionNode::new("outer failure")
            .with_source("app")
            .with_type_name("app::Error")
            .with_inner(ExceptionNode::new("root cause"))
    }

    #[test]
    fn log_maps_categories() {
        let (logger, backend) = logger();
        logger.log("d", Category::Debug);
        logger.log("i", Category::Info);
        logger.log("w", Category::Warn);
        logger.log("e", Category::Exception);

        assert_eq!(
            backend.entries(),
            vec![
                (Level::Trace, "d".to_string()),
                (Level::Info, "i".to_string()),
                (Level::Warn, "w".to_string()),
                (Level::Error, "e".to_string()),
            ]
        );
    }

    #[test]
    fn empty_message_is_dispatched() {
        let (logger, backend) = logger();
        logger.log("", Category::Info);
        assert_eq!(backend.entries(), vec![(Level::Info, String::new())]);
    }

    #[test]
    fn direct_entry_points() {
        let (logger, backend) = logger();
        logger.trace("t");
        logger.debug("d");
        logger.info("i");
        logger.warn("w");

        let levels: Vec<_> = backend.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![Level::Trace, Level::Debug, Level::Info, Level::Warn]);
    }

    #[test]
    fn log_raw_rejects_unknown_category() {
        let (logger, backend) = logger();
        assert!(logger.log_raw("ok", 2).is_ok());
        let err = logger.log_raw("nope", 9).unwrap_err();
        assert!(matches!(err, FacadeError::InvalidCategory(_)));
        assert_eq!(backend.entries(), vec![(Level::Info, "ok".to_string())]);
    }

    #[test]
    fn log_exception_dispatches_report_at_fatal() {
        let (logger, backend) = logger();
        let ex = sample();
        logger.log_exception(&ex).unwrap();

        let entries = backend.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Level::Fatal);
        assert_eq!(entries[0].1, logger.render(&ex));
        assert!(entries[0].1.contains("OS Version: TestOS 10.0"));
        assert!(entries[0].1.contains("    InnerException:\n    Source: \n    Message: root cause\n"));
    }

    #[test]
    fn exception_category_and_exception_report_stay_distinct() {
        let (logger, backend) = logger();
        logger.log("plain", Category::Exception);
        logger.log_exception(&sample()).unwrap();

        let entries = backend.entries();
        assert_eq!(entries[0], (Level::Error, "plain".to_string()));
        assert_eq!(entries[1].0, Level::Fatal);
        assert_ne!(entries[1].1, "plain");
    }

    #[test]
    fn exception_listeners_fire_in_order_with_same_text() {
        let (logger, backend) = logger();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["L1", "L2"] {
            let seen = Arc::clone(&seen);
            logger.on_exception(move |ex: &ExceptionNode, text: &str| {
                seen.lock()
                    .unwrap()
                    .push((tag, ex.message.clone(), text.to_string()));
                Ok(())
            });
        }

        logger.log_exception(&sample()).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "L1");
        assert_eq!(seen[1].0, "L2");
        assert_eq!(seen[0].1, "outer failure");
        assert_eq!(seen[0].2, seen[1].2);
        assert_eq!(seen[0].2, backend.entries()[0].1);
    }

    #[test]
    fn notify_false_skips_listeners() {
        let (logger, backend) = logger();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        logger.on_exception(move |_: &ExceptionNode, _: &str| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        logger.log_exception_with(&sample(), None, false).unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(backend.entries().len(), 1);
    }

    #[test]
    fn custom_renderer_replaces_report() {
        let (logger, backend) = logger();
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        logger.on_exception(move |_: &ExceptionNode, text: &str| {
            *sink.lock().unwrap() = text.to_string();
            Ok(())
        });

        let render = |ex: &ExceptionNode| format!("custom: {}", ex.message);
        logger
            .log_exception_with(&sample(), Some(&render), true)
            .unwrap();

        assert_eq!(
            backend.entries(),
            vec![(Level::Fatal, "custom: outer failure".to_string())]
        );
        assert_eq!(*seen.lock().unwrap(), "custom: outer failure");
    }

    #[test]
    fn log_error_notifies_error_listeners() {
        let (logger, backend) = logger();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            logger.on_error(move |msg: &str| {
                seen.lock().unwrap().push(format!("{tag}:{msg}"));
                Ok(())
            });
        }

        logger.log_error("quota exceeded").unwrap();
        logger.log_error_with("silent", false).unwrap();

        assert_eq!(
            backend.entries(),
            vec![
                (Level::Error, "quota exceeded".to_string()),
                (Level::Error, "silent".to_string()),
            ]
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:quota exceeded", "second:quota exceeded"]
        );
    }

    #[test]
    fn listener_failure_propagates_after_dispatch() {
        let (logger, backend) = logger();
        let later = Arc::new(Mutex::new(false));
        logger.on_exception(|_: &ExceptionNode, _: &str| anyhow::bail!("listener down"));
        let flag = Arc::clone(&later);
        logger.on_exception(move |_: &ExceptionNode, _: &str| {
            *flag.lock().unwrap() = true;
            Ok(())
        });

        let err = logger.log_exception(&sample()).unwrap_err();
        assert!(matches!(err, FacadeError::Listener { channel: "exception", index: 0, .. }));
        assert_eq!(backend.entries().len(), 1);
        assert!(!*later.lock().unwrap());
    }

    #[test]
    fn removed_listener_no_longer_fires() {
        let (logger, _backend) = logger();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let id = logger.on_error(move |_: &str| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        logger.log_error("one").unwrap();
        assert!(logger.remove_error_listener(id));
        logger.log_error("two").unwrap();

        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(logger.error_listeners().is_empty());
    }

    #[test]
    fn from_config_applies_depth() {
        let config = LoggingConfig {
            max_report_depth: 1,
            ..Default::default()
        };
        let logger = Logger::from_config(&config);
        let ex = ExceptionNode::new("a")
            .with_inner(ExceptionNode::new("b").with_inner(ExceptionNode::new("c")));
        let report = logger.render(&ex);
        assert!(report.contains("Message: b"));
        assert!(!report.contains("Message: c"));
        assert!(report.contains("<1 more nested exceptions omitted>"));
    }

    #[test]
    fn usable_as_trait_object() {
        let (logger, backend) = logger();
        let facade: Arc<dyn LoggerFacade> = Arc::new(logger);
        facade.info("via trait");
        facade.log_error("err").unwrap();
        assert_eq!(backend.entries().len(), 2);
    }
}
