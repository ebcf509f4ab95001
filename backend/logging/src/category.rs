//! Severity categories and backend levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FacadeError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Caller-facing severity category.
///
/// Raw discriminants are stable: `Debug = 0`, `Exception = 1`, `Info = 2`,
/// `Warn = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Debug = 0,
    Exception = 1,
    Info = 2,
    Warn = 3,
}

impl Category {
    /// Backend level a plain `log` call with this category dispatches at.
    pub fn level(self) -> Level {
        match self {
            Category::Debug => Level::Trace,
            Category::Info => Level::Info,
            Category::Warn => Level::Warn,
            Category::Exception => Level::Error,
        }
    }
}

impl TryFrom<i32> for Category {
    type Error = FacadeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Category::Debug),
            1 => Ok(Category::Exception),
            2 => Ok(Category::Info),
            3 => Ok(Category::Warn),
            other => Err(FacadeError::InvalidCategory(other.to_string())),
        }
    }
}

impl FromStr for Category {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Category::Debug),
            "info" => Ok(Category::Info),
            "warn" | "warning" => Ok(Category::Warn),
            "exception" | "fatal" => Ok(Category::Exception),
            _ => Err(FacadeError::InvalidCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Debug => "debug",
            Category::Exception => "exception",
            Category::Info => "info",
            Category::Warn => "warn",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Severity level understood by a [`LogBackend`](crate::backend::LogBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Optional caller priority attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    None,
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::None => "none",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}
