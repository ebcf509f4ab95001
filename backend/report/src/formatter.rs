//! Exception report formatter.
//!
//! Renders an [`ExceptionNode`] chain as a single text block:
//!
//! ```text
//!
//! OS Version: Linux 6.1 Debian 12
//! System Type: 64-bit
//! Source: app
//! Message: failed to open config
//! TargetSite: app::config::load
//! Type: app::ConfigError
//! StackTrace:
//!     File: config.rs | Line: 42 | Col: 17 | Offset: 0 | Method: app::config::load
//!
//!     InnerException:
//!     Source:
//!     Message: No such file or directory (os error 2)
//!     TargetSite:
//!     Type:
//!
//! ```
//!
//! Each nesting level is indented by four more spaces. The layout, blank lines
//! included, is stable so reports can be diffed across runs.

use std::fmt::Write;

use tracing::warn;

use crate::frames::capture_frames;
use crate::host::{HostEnvironment, SystemHost};
use crate::model::ExceptionNode;

/// Indentation added per nesting level.
pub const INDENT_STEP: usize = 4;

/// Default bound on rendered nested causes.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Deterministic renderer for exception cause chains.
#[derive(Debug, Clone)]
pub struct ReportFormatter<H = SystemHost> {
    host: H,
    max_depth: usize,
}

impl Default for ReportFormatter<SystemHost> {
    fn default() -> Self {
        Self::new(SystemHost)
    }
}

impl<H: HostEnvironment> ReportFormatter<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how many nested causes are rendered below the root.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Render the full report for `exception`.
    pub fn format(&self, exception: &ExceptionNode) -> String {
        let mut out = String::new();
        self.write_node(&mut out, exception, 0);
        out
    }

    fn write_node(&self, out: &mut String, node: &ExceptionNode, level: usize) {
        let indent = " ".repeat(level * INDENT_STEP);

        // `write!` into a String cannot fail.
        if level == 0 {
            let _ = writeln!(out);
            let _ = writeln!(out, "OS Version: {}", self.host.os_version());
            let _ = writeln!(out, "System Type: {}", self.host.system_type());
        } else {
            let _ = writeln!(out);
            let _ = writeln!(out, "{indent}InnerException:");
        }

        let _ = writeln!(out, "{indent}Source: {}", node.source);
        let _ = writeln!(out, "{indent}Message: {}", node.message);
        let _ = writeln!(out, "{indent}TargetSite: {}", node.target_site);
        let _ = writeln!(out, "{indent}Type: {}", node.type_name);

        // Explicit frames stand in for trace text.
        let has_trace = node.stack_trace.as_deref().is_some_and(|t| !t.is_empty())
            || !node.frames.is_empty();
        if has_trace {
            let frames = capture_frames(node);
            if !frames.is_empty() {
                let frame_indent = " ".repeat(indent.len() + INDENT_STEP);
                let _ = writeln!(out, "{indent}StackTrace:");
                for frame in &frames {
                    let _ = writeln!(
                        out,
                        "{frame_indent}File: {} | Line: {} | Col: {} | Offset: {} | Method: {}",
                        frame.file_name(),
                        frame.line,
                        frame.column,
                        frame.offset,
                        frame.method,
                    );
                }
            }
        }

        match node.inner() {
            Some(inner) if level < self.max_depth => self.write_node(out, inner, level + 1),
            Some(inner) => {
                let omitted = inner.depth() + 1;
                warn!(
                    max_depth = self.max_depth,
                    omitted, "Exception chain exceeds report depth; truncating"
                );
                let child_indent = " ".repeat(indent.len() + INDENT_STEP);
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "{child_indent}InnerException: <{omitted} more nested exceptions omitted>"
                );
                let _ = writeln!(out);
            }
            None => {
                let _ = writeln!(out);
            }
        }
    }
}
