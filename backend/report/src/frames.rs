//! Stack-frame enumeration.
//!
//! Frames are recovered from the text rendering of `std::backtrace::Backtrace`
//! (both the short `{}` and the full `{:#}` layouts). Text that carries no
//! recognizable frame, such as `disabled backtrace`, enumerates to nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ExceptionNode, StackFrame};

/// `  12: 0x55d0c1a2 - crate::module::function`
static FRAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+):\s+(?:(0x[0-9a-fA-F]+)\s+-\s+)?(.*\S)\s*$").unwrap()
});

/// Additional symbol for an inlined call, printed without an index.
static INLINED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{6,}(?:(0x[0-9a-fA-F]+)\s+-\s+)?(\S.*?)\s*$").unwrap()
});

/// `             at ./src/main.rs:3:5`
static LOCATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*at\s+(.+?)(?::(\d+))?(?::(\d+))?\s*$").unwrap()
});

/// Frames for a node, innermost call first.
///
/// Explicit frames take precedence; otherwise they are enumerated from the
/// stack-trace text. No text means no frames.
pub fn capture_frames(node: &ExceptionNode) -> Vec<StackFrame> {
    if !node.frames.is_empty() {
        return node.frames.clone();
    }
    match node.stack_trace.as_deref() {
        Some(text) if !text.trim().is_empty() => parse_backtrace(text),
        _ => Vec::new(),
    }
}

/// Enumerate frames from backtrace text, in the order they appear.
pub fn parse_backtrace(text: &str) -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = LOCATION_LINE.captures(line) {
            // A location only means something directly under a symbol line.
            if let Some(frame) = frames.last_mut() {
                frame.file = Some(caps[1].to_string());
                frame.line = parse_number(caps.get(2).map(|m| m.as_str()));
                frame.column = parse_number(caps.get(3).map(|m| m.as_str()));
            }
            continue;
        }

        if let Some(caps) = FRAME_LINE.captures(line) {
            frames.push(frame_from(caps.get(2).map(|m| m.as_str()), &caps[3]));
            continue;
        }

        if !frames.is_empty() {
            if let Some(caps) = INLINED_LINE.captures(line) {
                frames.push(frame_from(caps.get(1).map(|m| m.as_str()), &caps[2]));
            }
        }
    }

    frames
}

fn frame_from(address: Option<&str>, method: &str) -> StackFrame {
    let offset = address
        .and_then(|addr| u64::from_str_radix(addr.trim_start_matches("0x"), 16).ok())
        .unwrap_or(0);
    StackFrame::new(method).with_offset(offset)
}

fn parse_number(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}
