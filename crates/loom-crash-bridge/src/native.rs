// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The native crash reporter and the backend that delegates to it.

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_bridge_core::{
	ContextMap, CrashBridgeError, Dsn, LogLevel, MessageOptions, ModuleDescriptor, NativeOptions,
	Options, Result, Severity,
};
use tracing::{debug, info};

use crate::diagnostics::DiagnosticLogger;
use crate::environment::Environment;
use crate::merging::StacktraceMerging;

/// Capability set of the platform's native crash reporter.
///
/// Calls are fire-and-forget; delivery failures are the reporter's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NativeReporter: Send + Sync + 'static {
	/// Whether the native client is linked and usable.
	fn native_client_available(&self) -> bool;

	/// Register the process with the reporting service.
	fn start_with_dsn(&self, dsn: &str);

	/// Terminate the process immediately.
	fn crash(&self);

	fn set_user(&self, user: ContextMap);

	fn set_tags(&self, tags: ContextMap);

	fn set_extras(&self, extras: ContextMap);

	/// Capture a message; `severity` is a [`Severity`] ordinal.
	fn capture_message(&self, message: &str, severity: u8);

	/// Enable stack-trace merging on the native side. Resolves once active.
	async fn activate_stacktrace_merging(&self);

	/// The bridge's remote module table, indexed by module id. `None` entries
	/// are holes.
	fn remote_modules(&self) -> Vec<Option<ModuleDescriptor>>;
}

/// Type alias for a shared native reporter.
pub type SharedNativeReporter = Arc<dyn NativeReporter>;

/// Backend that delegates to the native crash reporter.
pub struct NativeBackend {
	dsn: Dsn,
	options: NativeOptions,
	native: SharedNativeReporter,
	merging: Option<Arc<StacktraceMerging>>,
	logger: DiagnosticLogger,
}

impl NativeBackend {
	/// Build the backend and register the DSN with the native reporter.
	///
	/// Unless `deactivateStacktraceMerging` is set, stack-trace merging starts
	/// in the background. Bridge calls issued before it completes go untagged.
	pub fn new(
		dsn: &str,
		options: &Options,
		env: &Environment,
		logger: DiagnosticLogger,
	) -> Result<Self> {
		let dsn = Dsn::parse(dsn)?;
		let native = env
			.native()
			.cloned()
			.ok_or(CrashBridgeError::BackendUnavailable)?;
		let options = options.native()?;

		native.start_with_dsn(dsn.as_str());
		info!(dsn = %dsn, "Native crash reporter started");

		let merging = if options.deactivate_stacktrace_merging {
			debug!("Stack-trace merging deactivated by options");
			None
		} else {
			logger.log(
				LogLevel::Debug,
				"loom-crash-bridge: native backend: activating stack-trace merging",
			);
			let merging = Arc::new(StacktraceMerging::new(
				Arc::clone(&native),
				Arc::clone(env.bridge()),
				Arc::clone(env.stack_provider()),
				&options,
			));
			merging.start();
			Some(merging)
		};

		Ok(Self {
			dsn,
			options,
			native,
			merging,
			logger,
		})
	}

	pub fn dsn(&self) -> &Dsn {
		&self.dsn
	}

	pub fn options(&self) -> &NativeOptions {
		&self.options
	}

	/// The merging activation, if merging was not deactivated.
	pub fn stacktrace_merging(&self) -> Option<&Arc<StacktraceMerging>> {
		self.merging.as_ref()
	}

	/// Raise a local fault. Diagnostic hook for testing the reporting pipeline.
	pub fn crash(&self) -> ! {
		self.logger
			.log(LogLevel::Debug, "loom-crash-bridge: native backend: call crash");
		panic!("loom-crash-bridge: native backend: TEST crash");
	}

	/// Ask the native reporter to terminate the process.
	pub fn native_crash(&self) {
		self.logger.log(
			LogLevel::Debug,
			"loom-crash-bridge: native backend: call native_crash",
		);
		self.native.crash();
	}

	pub fn set_user_context(&self, user: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: native backend: call set_user_context {user:?}")
		});
		self.native.set_user(user);
	}

	pub fn set_tags_context(&self, tags: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: native backend: call set_tags_context {tags:?}")
		});
		self.native.set_tags(tags);
	}

	pub fn set_extra_context(&self, extras: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: native backend: call set_extra_context {extras:?}")
		});
		self.native.set_extras(extras);
	}

	/// Forward a message with its severity ordinal; defaults to `Error`.
	pub fn capture_message(&self, message: &str, options: Option<MessageOptions>) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: native backend: call capture_message {message:?} {options:?}")
		});
		let severity = options.and_then(|o| o.level).unwrap_or(Severity::Error);
		self.native.capture_message(message, severity.ordinal());
	}
}
