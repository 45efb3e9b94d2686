// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The bridge's own leveled diagnostic output.
//!
//! Diagnostics go to the host's output sink, never through a reporting
//! backend; a backend that logs through its own facade would otherwise recurse.

use std::fmt;
use std::sync::Arc;

use loom_crash_bridge_core::LogLevel;

/// Tracing target used by [`TracingSink`].
pub const DIAGNOSTICS_TARGET: &str = "loom_crash_bridge::diagnostics";

/// The host's diagnostic output channel.
pub trait DiagnosticSink: Send + Sync + 'static {
	fn log(&self, message: &str);
	fn error(&self, message: &str);
}

/// Type alias for a shared diagnostic sink.
pub type SharedDiagnosticSink = Arc<dyn DiagnosticSink>;

/// Sink that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn log(&self, message: &str) {
		tracing::info!(target: DIAGNOSTICS_TARGET, "{message}");
	}

	fn error(&self, message: &str) {
		tracing::error!(target: DIAGNOSTICS_TARGET, "{message}");
	}
}

/// Threshold-gated writer to a [`DiagnosticSink`].
#[derive(Clone)]
pub struct DiagnosticLogger {
	threshold: LogLevel,
	sink: SharedDiagnosticSink,
}

impl DiagnosticLogger {
	pub fn new(threshold: LogLevel, sink: SharedDiagnosticSink) -> Self {
		Self { threshold, sink }
	}

	/// A logger that drops everything.
	pub fn disabled(sink: SharedDiagnosticSink) -> Self {
		Self::new(LogLevel::None, sink)
	}

	pub fn threshold(&self) -> LogLevel {
		self.threshold
	}

	/// Write `message` if `level` passes the threshold.
	pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
		if self.threshold.allows(level) {
			self.sink.log(message.as_ref());
		}
	}

	/// Like [`DiagnosticLogger::log`], but only formats the message when it
	/// will be written.
	pub fn log_with<F>(&self, level: LogLevel, message: F)
	where
		F: FnOnce() -> String,
	{
		if self.threshold.allows(level) {
			self.sink.log(&message());
		}
	}

	/// Write to the sink's error channel regardless of the threshold.
	pub fn error(&self, message: impl AsRef<str>) {
		self.sink.error(message.as_ref());
	}
}

impl fmt::Debug for DiagnosticLogger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiagnosticLogger")
			.field("threshold", &self.threshold)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemorySink;

	fn logger(threshold: LogLevel) -> (DiagnosticLogger, Arc<MemorySink>) {
		let sink = Arc::new(MemorySink::new());
		(DiagnosticLogger::new(threshold, sink.clone()), sink)
	}

	#[test]
	fn debug_threshold_drops_verbose() {
		let (logger, sink) = logger(LogLevel::Debug);
		logger.log(LogLevel::Verbose, "verbose");
		logger.log(LogLevel::Error, "error");
		assert_eq!(sink.logs(), vec!["error"]);
	}

	#[test]
	fn none_threshold_drops_everything() {
		let (logger, sink) = logger(LogLevel::None);
		for level in LogLevel::ALL {
			logger.log(level, "message");
		}
		assert!(sink.logs().is_empty());
	}

	#[test]
	fn log_with_skips_formatting_when_filtered() {
		let (logger, sink) = logger(LogLevel::Error);
		logger.log_with(LogLevel::Debug, || panic!("should not be formatted"));
		logger.log_with(LogLevel::Error, || "formatted".to_string());
		assert_eq!(sink.logs(), vec!["formatted"]);
	}

	#[test]
	fn error_channel_ignores_threshold() {
		let (logger, sink) = logger(LogLevel::None);
		logger.error("unsupported");
		assert_eq!(sink.errors(), vec!["unsupported"]);
	}
}
