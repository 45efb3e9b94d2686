// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The script-level exception reporter and the backend that delegates to it.

use std::sync::Arc;

use async_trait::async_trait;
use loom_crash_bridge_core::{
	ContextMap, CrashBridgeError, Dsn, LogLevel, MessageOptions, Options, Result, ScriptedOptions,
	Severity,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::diagnostics::DiagnosticLogger;
use crate::environment::Environment;
use crate::plugin::BridgeContextPlugin;
use crate::task::spawn_detached;

/// Event processor registered with the script reporter.
pub trait ScriptPlugin: Send + Sync + 'static {
	fn name(&self) -> &'static str;

	/// Enrich or normalize an outgoing event in place.
	fn process_event(&self, event: &mut Value);
}

/// Type alias for a shared script plugin.
pub type SharedScriptPlugin = Arc<dyn ScriptPlugin>;

/// Options forwarded with a script-level message capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScriptMessageOptions {
	/// One of `"error"`, `"warning"` or `"info"`.
	pub level: &'static str,
}

/// Capability set of the script-level exception reporter library.
#[async_trait]
pub trait ScriptReporter: Send + Sync + 'static {
	fn add_plugin(&self, plugin: SharedScriptPlugin);

	/// Configure the library with a DSN and its merged options.
	fn config(&self, dsn: &str, options: &ContextMap);

	/// Install the library's global exception hooks.
	fn install(&self);

	fn set_user_context(&self, user: ContextMap);

	fn set_tags_context(&self, tags: ContextMap);

	fn set_extra_context(&self, extras: ContextMap);

	async fn capture_message(&self, message: &str, options: ScriptMessageOptions);
}

/// Type alias for a shared script reporter.
pub type SharedScriptReporter = Arc<dyn ScriptReporter>;

/// Translate a facade severity to the script reporter's level vocabulary.
///
/// The mapping is lossy: `Fatal` and `Debug` both become `"error"`, as does a
/// missing level.
pub fn script_level(level: Option<Severity>) -> &'static str {
	match level {
		Some(Severity::Warning) => "warning",
		Some(Severity::Info) => "info",
		_ => "error",
	}
}

/// Backend that delegates to the script-level exception reporter.
pub struct ScriptedBackend {
	dsn: Dsn,
	options: ScriptedOptions,
	script: SharedScriptReporter,
	logger: DiagnosticLogger,
}

impl ScriptedBackend {
	/// Register the context plugin, then configure and install the library.
	pub fn new(
		dsn: &str,
		options: &Options,
		env: &Environment,
		logger: DiagnosticLogger,
	) -> Result<Self> {
		let dsn = Dsn::parse(dsn)?;
		let options = options.scripted()?;
		let script = Arc::clone(env.script());

		script.add_plugin(Arc::new(BridgeContextPlugin::new()));
		script.config(dsn.as_str(), &options.to_map()?);
		script.install();
		info!(dsn = %dsn, "Script exception reporter installed");

		Ok(Self {
			dsn,
			options,
			script,
			logger,
		})
	}

	pub fn dsn(&self) -> &Dsn {
		&self.dsn
	}

	pub fn options(&self) -> &ScriptedOptions {
		&self.options
	}

	/// Raise a local fault. Diagnostic hook for testing the reporting pipeline.
	pub fn crash(&self) -> ! {
		self.logger
			.log(LogLevel::Debug, "loom-crash-bridge: scripted backend: call crash");
		panic!("loom-crash-bridge: scripted backend: TEST crash");
	}

	/// Not available without a native reporter; reported and ignored.
	pub fn native_crash(&self) {
		let err = CrashBridgeError::UnsupportedOperation("nativeCrash");
		warn!(error = %err, "Ignoring native crash request");
		self.logger
			.error("nativeCrash is not supported with the scripted client");
	}

	pub fn set_user_context(&self, user: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: scripted backend: call set_user_context {user:?}")
		});
		self.script.set_user_context(user);
	}

	pub fn set_tags_context(&self, tags: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: scripted backend: call set_tags_context {tags:?}")
		});
		self.script.set_tags_context(tags);
	}

	pub fn set_extra_context(&self, extras: ContextMap) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: scripted backend: call set_extra_context {extras:?}")
		});
		self.script.set_extra_context(extras);
	}

	/// Translate the level and hand the message to the library without
	/// waiting for delivery.
	pub fn capture_message(&self, message: &str, options: Option<MessageOptions>) {
		self.logger.log_with(LogLevel::Debug, || {
			format!("loom-crash-bridge: scripted backend: call capture_message {message:?} {options:?}")
		});
		let translated = ScriptMessageOptions {
			level: script_level(options.and_then(|o| o.level)),
		};
		let script = Arc::clone(&self.script);
		let message = message.to_string();
		spawn_detached("script-capture", async move {
			script.capture_message(&message, translated).await;
		});
	}
}
