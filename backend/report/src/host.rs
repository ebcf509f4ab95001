//! Host environment inspection for the report header.

use once_cell::sync::Lazy;
use sysinfo::System;

/// Read-only view of the host the report is generated on.
pub trait HostEnvironment: Send + Sync {
    /// Human-readable OS version string.
    fn os_version(&self) -> String;

    /// Whether the process runs as 64-bit.
    fn is_64_bit(&self) -> bool;

    /// `64-bit` or `32-bit`.
    fn system_type(&self) -> &'static str {
        if self.is_64_bit() { "64-bit" } else { "32-bit" }
    }
}

static OS_VERSION: Lazy<String> = Lazy::new(|| {
    System::long_os_version()
        .or_else(|| match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => Some(format!("{name} {version}")),
            (Some(name), None) => Some(name),
            _ => None,
        })
        .unwrap_or_default()
});

/// The machine this process is running on.
///
/// The OS version is read once per process, so every report produced in the
/// same process carries the same header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn os_version(&self) -> String {
        OS_VERSION.clone()
    }

    fn is_64_bit(&self) -> bool {
        cfg!(target_pointer_width = "64")
    }
}

/// A host with fixed, caller-supplied values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHost {
    pub os_version: String,
    pub is_64_bit: bool,
}

impl FixedHost {
    pub fn new(os_version: impl Into<String>, is_64_bit: bool) -> Self {
        Self {
            os_version: os_version.into(),
            is_64_bit,
        }
    }
}

impl HostEnvironment for FixedHost {
    fn os_version(&self) -> String {
        self.os_version.clone()
    }

    fn is_64_bit(&self) -> bool {
        self.is_64_bit
    }
}

impl<H: HostEnvironment + ?Sized> HostEnvironment for Box<H> {
    fn os_version(&self) -> String {
        (**self).os_version()
    }

    fn is_64_bit(&self) -> bool {
        (**self).is_64_bit()
    }
}
