// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Call-stack snapshots attached to outgoing bridge calls.
//!
//! Hosts embedding a script engine supply a [`StackProvider`] that returns the
//! engine's current call stack. [`BacktraceStackProvider`] is the fallback: it
//! walks the native stack and renders it in the familiar
//! `Error\n    at function (file:line:col)` layout.

use std::sync::Arc;

use rustc_demangle::demangle;

/// Upper bound on frames walked per snapshot.
const MAX_FRAMES: usize = 64;

/// Source of call-stack snapshots.
pub trait StackProvider: Send + Sync + 'static {
	/// Capture the current call stack as a string.
	fn capture(&self) -> String;
}

impl<F> StackProvider for F
where
	F: Fn() -> String + Send + Sync + 'static,
{
	fn capture(&self) -> String {
		self()
	}
}

/// Type alias for a shared stack provider.
pub type SharedStackProvider = Arc<dyn StackProvider>;

/// A resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
	pub function: String,
	pub module: Option<String>,
	pub file: Option<String>,
	pub line: Option<u32>,
	pub column: Option<u32>,
	pub in_app: bool,
}

impl StackFrame {
	fn from_symbol_name(raw: &str) -> Self {
		let function = format!("{:#}", demangle(raw));
		let module = function.rfind("::").map(|idx| function[..idx].to_string());
		let in_app = is_in_app_frame(&function);
		Self {
			function,
			module,
			file: None,
			line: None,
			column: None,
			in_app,
		}
	}

	fn location(&self) -> Option<String> {
		let file = self.file.as_deref()?;
		Some(match (self.line, self.column) {
			(Some(line), Some(column)) => format!("{file}:{line}:{column}"),
			(Some(line), None) => format!("{file}:{line}"),
			_ => file.to_string(),
		})
	}
}

/// Stack provider backed by the native call stack.
#[derive(Debug, Clone, Copy)]
pub struct BacktraceStackProvider {
	in_app_only: bool,
}

impl BacktraceStackProvider {
	pub fn new() -> Self {
		Self { in_app_only: true }
	}

	/// Render every frame, including runtime and standard library frames.
	pub fn all_frames() -> Self {
		Self { in_app_only: false }
	}
}

impl Default for BacktraceStackProvider {
	fn default() -> Self {
		Self::new()
	}
}

impl StackProvider for BacktraceStackProvider {
	fn capture(&self) -> String {
		render_frames(&capture_frames(), self.in_app_only)
	}
}

/// Walk the current stack and resolve symbols.
pub fn capture_frames() -> Vec<StackFrame> {
	let mut frames = Vec::new();
	backtrace::trace(|frame| {
		backtrace::resolve_frame(frame, |symbol| {
			let Some(name) = symbol.name() else {
				return;
			};
			let mut resolved = match name.as_str() {
				Some(raw) => StackFrame::from_symbol_name(raw),
				None => StackFrame::from_symbol_name(&name.to_string()),
			};
			if is_capture_frame(&resolved.function) {
				return;
			}
			resolved.file = symbol.filename().map(|path| path.display().to_string());
			resolved.line = symbol.lineno();
			resolved.column = symbol.colno();
			frames.push(resolved);
		});
		frames.len() < MAX_FRAMES
	});
	frames
}

/// Render frames as an `Error` stack string.
///
/// With `in_app_only`, runtime frames are dropped unless nothing else is
/// left.
pub fn render_frames(frames: &[StackFrame], in_app_only: bool) -> String {
	let in_app: Vec<&StackFrame> = frames.iter().filter(|f| f.in_app).collect();
	let selected: Vec<&StackFrame> = if in_app_only && !in_app.is_empty() {
		in_app
	} else {
		frames.iter().collect()
	};

	let mut rendered = String::from("Error");
	for frame in selected {
		rendered.push_str("\n    at ");
		rendered.push_str(&frame.function);
		if let Some(location) = frame.location() {
			rendered.push_str(" (");
			rendered.push_str(&location);
			rendered.push(')');
		}
	}
	rendered
}

/// Frames belonging to the capture machinery itself.
fn is_capture_frame(function: &str) -> bool {
	function.starts_with("backtrace::") || function.starts_with("loom_crash_bridge::stack::")
}

/// Whether a frame comes from application code rather than the runtime.
fn is_in_app_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"futures::",
		"<futures::",
		"futures_executor::",
		"parking_lot::",
		"backtrace::",
		"<backtrace::",
		"rust_begin_unwind",
		"__rust_",
		"_rust_",
		"__libc_start",
		"_start",
	];
	const SYSTEM_CONTAINS: &[&str] = &[
		"::panicking::",
		"::thread::",
		"::rt::",
		"::runtime::",
		"::sys_common::",
	];

	!SYSTEM_PREFIXES.iter().any(|prefix| function.starts_with(prefix))
		&& !SYSTEM_CONTAINS.iter().any(|needle| function.contains(needle))
}
