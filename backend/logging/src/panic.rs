//! Panic reporting.
//!
//! Installs a panic hook that turns the panic into an exception report and
//! logs it through [`Logger::log_exception`], so panics reach the same
//! backend and listeners as handled failures. The previous hook runs
//! afterwards, keeping the default stderr output.
//!
//! A panic raised while the same thread is already reporting (a panicking
//! listener, renderer or backend) is passed straight to the previous hook.
//! Reporting it again would panic inside the hook, which aborts the process.

use std::any::Any;
use std::cell::Cell;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;

use relaylog_report::ExceptionNode;

use crate::facade::Logger;

/// Runtime type recorded for panic reports.
pub const PANIC_TYPE_NAME: &str = "panic";

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as dispatching a report until dropped.
///
/// Restores the previous state on drop, including during unwinding.
pub(crate) struct ReportingScope {
    was_reporting: bool,
}

impl ReportingScope {
    pub(crate) fn enter() -> Self {
        Self {
            was_reporting: REPORTING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for ReportingScope {
    fn drop(&mut self) {
        let was_reporting = self.was_reporting;
        REPORTING.with(|flag| flag.set(was_reporting));
    }
}

/// Whether the current thread is inside an exception or error dispatch.
pub(crate) fn is_reporting() -> bool {
    REPORTING.with(Cell::get)
}

/// Install the reporting hook, chaining to the hook that was active before.
pub fn install_panic_hook(logger: Arc<Logger>) {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
        if is_reporting() {
            previous(info);
            return;
        }

        let _scope = ReportingScope::enter();
        let report = exception_from_panic(info, &Backtrace::force_capture());
        if let Err(e) = logger.log_exception_with(&report, None, true) {
            // Nothing else is safe to call from inside a panic hook.
            eprintln!("panic report listener failed: {e:#}");
        }
        previous(info);
    }));
}

/// Snapshot a panic as an exception node.
///
/// The panicking thread becomes the source and the panic location the
/// target site.
pub fn exception_from_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> ExceptionNode {
    let location = info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_default();

    ExceptionNode::new(panic_message(info.payload()))
        .with_source(thread_label())
        .with_target_site(location)
        .with_type_name(PANIC_TYPE_NAME)
        .with_backtrace(backtrace)
}

/// Text of a panic payload; non-string payloads get a placeholder.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

fn thread_label() -> String {
    let thread = std::thread::current();
    format!("thread '{}'", thread.name().unwrap_or("<unnamed>"))
}
