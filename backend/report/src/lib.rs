//! `relaylog-report` — exception cause-chain reports.
//!
//! Provides:
//! - An owned exception model (`ExceptionNode`, `StackFrame`) with conversions
//!   from `std::error::Error` and `anyhow::Error`
//! - Stack-frame enumeration from captured backtraces
//! - Host environment inspection for the report header
//! - The deterministic `ReportFormatter`

pub mod formatter;
pub mod frames;
pub mod host;
pub mod model;

pub use formatter::{DEFAULT_MAX_DEPTH, INDENT_STEP, ReportFormatter};
pub use frames::{capture_frames, parse_backtrace};
pub use host::{FixedHost, HostEnvironment, SystemHost};
pub use model::{Chain, ExceptionNode, StackFrame};
