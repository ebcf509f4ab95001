//! Exception cause-chain model.
//!
//! An [`ExceptionNode`] is a snapshot of one failure plus its owned chain of
//! nested causes. Nodes are plain data: they can be built by hand, converted
//! from any `std::error::Error`, or from an `anyhow::Error` with its captured
//! backtrace.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

// ---------------------------------------------------------------------------
// Stack frame
// ---------------------------------------------------------------------------

/// One captured call-stack frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    /// Source file path, absent when no debug info was available.
    pub file: Option<String>,
    /// 1-based line number, 0 when unknown.
    pub line: u32,
    /// 1-based column number, 0 when unknown.
    pub column: u32,
    /// Instruction position for the frame, 0 when unknown.
    pub offset: u64,
    /// Method (symbol) signature.
    pub method: String,
}

impl StackFrame {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Final path segment of [`StackFrame::file`], or `""` when absent.
    ///
    /// Both `/` and `\` count as separators so Windows paths reduce the same
    /// way on every host.
    pub fn file_name(&self) -> &str {
        match self.file.as_deref() {
            Some(path) if !path.is_empty() => path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(path),
            _ => "",
        }
    }
}

// ---------------------------------------------------------------------------
// Exception node
// ---------------------------------------------------------------------------

/// One throwable in a cause chain.
///
/// `Clone`, `PartialEq`, `Debug` and `Drop` walk the chain iteratively, so
/// chains of any length are safe to copy, compare and destroy.
#[derive(Default)]
pub struct ExceptionNode {
    /// Application or component that raised the failure. May be empty.
    pub source: String,
    pub message: String,
    /// Signature of the throwing site. Empty when it cannot be determined.
    pub target_site: String,
    /// Runtime type name. Empty when it cannot be determined.
    pub type_name: String,
    /// Raw stack-trace text as captured at throw time.
    pub stack_trace: Option<String>,
    /// Explicitly supplied frames. When empty, frames are enumerated from
    /// `stack_trace` at format time.
    pub frames: Vec<StackFrame>,
    pub inner: Option<Box<ExceptionNode>>,
}

impl ExceptionNode {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            source: String::new(),
            message: message.into(),
            target_site: String::new(),
            type_name: String::new(),
            stack_trace: None,
            frames: Vec::new(),
            inner: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_target_site(mut self, target_site: impl Into<String>) -> Self {
        self.target_site = target_site.into();
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Record the text of a backtrace if it was actually captured.
    pub fn with_backtrace(mut self, backtrace: &Backtrace) -> Self {
        if backtrace.status() == BacktraceStatus::Captured {
            self.stack_trace = Some(backtrace.to_string());
        }
        self
    }

    pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_inner(mut self, inner: ExceptionNode) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    pub fn inner(&self) -> Option<&ExceptionNode> {
        self.inner.as_deref()
    }

    /// Number of nested causes below this node.
    pub fn depth(&self) -> usize {
        self.chain().count() - 1
    }

    /// Iterate the chain root-first, this node included.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Snapshot a typed error and its `source()` chain.
    ///
    /// The root carries the concrete type name and its crate as source; nested
    /// causes are only known as `dyn Error`, so their type and source are empty.
    pub fn from_error<E: Error + 'static>(error: &E) -> Self {
        let type_name = std::any::type_name::<E>();
        let node = Self::new(error.to_string())
            .with_type_name(type_name)
            .with_source(crate_of(type_name));

        match error.source() {
            Some(cause) => node.with_inner(Self::from_dyn_chain(cause)),
            None => node,
        }
    }

    /// Snapshot an `anyhow::Error`, outermost context first.
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let mut links = error.chain();
        let root = links
            .next()
            .map(ToString::to_string)
            .unwrap_or_default();

        let mut node = Self::new(root)
            .with_type_name("anyhow::Error")
            .with_source("anyhow")
            .with_backtrace(error.backtrace());

        if let Some(cause) = links.next() {
            node = node.with_inner(Self::from_dyn_chain(cause));
        }
        node
    }

    fn from_dyn_chain(error: &(dyn Error + 'static)) -> Self {
        let mut messages = Vec::new();
        let mut current = Some(error);
        while let Some(err) = current {
            messages.push(err.to_string());
            current = err.source();
        }

        // Build innermost-first so each node owns the one below it.
        let mut node: Option<ExceptionNode> = None;
        for message in messages.into_iter().rev() {
            let mut outer = ExceptionNode::new(message);
            outer.inner = node.map(Box::new);
            node = Some(outer);
        }
        node.unwrap_or_default()
    }
}

/// Root-first iterator over an exception chain.
pub struct Chain<'a> {
    next: Option<&'a ExceptionNode>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ExceptionNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.inner();
        Some(current)
    }
}

impl ExceptionNode {
    /// Copy of this node's own fields, without its cause.
    fn detached(&self) -> Self {
        Self {
            source: self.source.clone(),
            message: self.message.clone(),
            target_site: self.target_site.clone(),
            type_name: self.type_name.clone(),
            stack_trace: self.stack_trace.clone(),
            frames: self.frames.clone(),
            inner: None,
        }
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.source == other.source
            && self.message == other.message
            && self.target_site == other.target_site
            && self.type_name == other.type_name
            && self.stack_trace == other.stack_trace
            && self.frames == other.frames
    }
}

impl Clone for ExceptionNode {
    fn clone(&self) -> Self {
        let mut copies: Vec<ExceptionNode> = self.chain().map(Self::detached).collect();
        let mut node = copies.pop().unwrap_or_default();
        while let Some(mut outer) = copies.pop() {
            outer.inner = Some(Box::new(node));
            node = outer;
        }
        node
    }
}

impl PartialEq for ExceptionNode {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.chain();
        let mut right = other.chain();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) if a.same_fields(b) => continue,
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for ExceptionNode {}

impl std::fmt::Debug for ExceptionNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionNode")
            .field("source", &self.source)
            .field("message", &self.message)
            .field("target_site", &self.target_site)
            .field("type_name", &self.type_name)
            .field("stack_trace", &self.stack_trace)
            .field("frames", &self.frames)
            .field("nested", &self.depth())
            .finish()
    }
}

impl Drop for ExceptionNode {
    fn drop(&mut self) {
        // Unlink one level at a time so dropping never recurses.
        let mut next = self.inner.take();
        while let Some(mut node) = next {
            next = node.inner.take();
        }
    }
}

fn crate_of(type_name: &str) -> &str {
    type_name.split("::").next().unwrap_or_default()
}
