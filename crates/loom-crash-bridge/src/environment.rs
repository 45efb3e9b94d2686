// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host capabilities the facade is wired against.

use std::fmt;
use std::sync::Arc;

use crate::bridge::Bridge;
use crate::diagnostics::{SharedDiagnosticSink, TracingSink};
use crate::native::SharedNativeReporter;
use crate::scripted::SharedScriptReporter;
use crate::stack::{BacktraceStackProvider, SharedStackProvider};

/// The native reporter (if linked), the script reporter, the message bridge,
/// a stack provider and a diagnostic sink.
#[derive(Clone)]
pub struct Environment {
	native: Option<SharedNativeReporter>,
	script: SharedScriptReporter,
	bridge: Arc<Bridge>,
	stack: SharedStackProvider,
	diagnostics: SharedDiagnosticSink,
}

impl Environment {
	/// Start building an environment. The script reporter and the bridge are
	/// always present; the native reporter is optional.
	pub fn builder(script: SharedScriptReporter, bridge: Arc<Bridge>) -> EnvironmentBuilder {
		EnvironmentBuilder::new(script, bridge)
	}

	pub fn native(&self) -> Option<&SharedNativeReporter> {
		self.native.as_ref()
	}

	pub fn script(&self) -> &SharedScriptReporter {
		&self.script
	}

	pub fn bridge(&self) -> &Arc<Bridge> {
		&self.bridge
	}

	pub fn stack_provider(&self) -> &SharedStackProvider {
		&self.stack
	}

	pub fn diagnostics(&self) -> &SharedDiagnosticSink {
		&self.diagnostics
	}

	/// True when a native reporter is linked and reports itself usable.
	pub fn native_client_available(&self) -> bool {
		self
			.native
			.as_ref()
			.is_some_and(|native| native.native_client_available())
	}
}

impl fmt::Debug for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Environment")
			.field("native", &self.native.is_some())
			.field("bridge", &self.bridge)
			.finish_non_exhaustive()
	}
}

/// Builder for [`Environment`].
pub struct EnvironmentBuilder {
	native: Option<SharedNativeReporter>,
	script: SharedScriptReporter,
	bridge: Arc<Bridge>,
	stack: Option<SharedStackProvider>,
	diagnostics: Option<SharedDiagnosticSink>,
}

impl EnvironmentBuilder {
	fn new(script: SharedScriptReporter, bridge: Arc<Bridge>) -> Self {
		Self {
			native: None,
			script,
			bridge,
			stack: None,
			diagnostics: None,
		}
	}

	/// Link a native crash reporter.
	pub fn native(mut self, native: SharedNativeReporter) -> Self {
		self.native = Some(native);
		self
	}

	/// Override the stack provider. Defaults to [`BacktraceStackProvider`].
	pub fn stack_provider(mut self, stack: SharedStackProvider) -> Self {
		self.stack = Some(stack);
		self
	}

	/// Override the diagnostic sink. Defaults to [`TracingSink`].
	pub fn diagnostics(mut self, sink: SharedDiagnosticSink) -> Self {
		self.diagnostics = Some(sink);
		self
	}

	pub fn build(self) -> Environment {
		Environment {
			native: self.native,
			script: self.script,
			bridge: self.bridge,
			stack: self
				.stack
				.unwrap_or_else(|| Arc::new(BacktraceStackProvider::new())),
			diagnostics: self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink)),
		}
	}
}
