// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The reporting facade.

use std::sync::Arc;

use loom_crash_bridge_core::{
	ContextKind, ContextMap, CrashBridgeError, LogLevel, MessageOptions, Options, Result,
};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::{Backend, BackendKind};
use crate::config::Configuration;
use crate::diagnostics::DiagnosticLogger;
use crate::environment::Environment;
use crate::native::NativeBackend;
use crate::scripted::ScriptedBackend;

struct FacadeState {
	config: Option<Configuration>,
	logger: DiagnosticLogger,
	backend: Option<Arc<Backend>>,
}

/// Crash reporting facade over a native and a scripted backend.
///
/// Call [`CrashBridge::configure`] then [`CrashBridge::install`]; every other
/// reporting call forwards to the backend chosen at install time.
///
/// # Example
///
/// ```ignore
/// use loom_crash_bridge::{CrashBridge, Environment, Options};
///
/// let bridge = CrashBridge::new(env);
/// bridge
///     .configure("https://public@sentry.example.com/1", Options::default())?
///     .install()?;
///
/// bridge.set_tags_context(context_map(json!({"screen": "checkout"}))?)?;
/// bridge.capture_message("payment declined", None)?;
/// ```
pub struct CrashBridge {
	env: Environment,
	state: RwLock<FacadeState>,
}

impl CrashBridge {
	pub fn new(env: Environment) -> Self {
		let logger = DiagnosticLogger::disabled(Arc::clone(env.diagnostics()));
		Self {
			env,
			state: RwLock::new(FacadeState {
				config: None,
				logger,
				backend: None,
			}),
		}
	}

	pub fn environment(&self) -> &Environment {
		&self.env
	}

	/// Validate and store the DSN and options.
	///
	/// Calling again replaces the stored configuration; an installed backend
	/// keeps running with the configuration it was built from.
	pub fn configure(&self, dsn: impl Into<String>, options: Options) -> Result<&Self> {
		Ok(self.configure_with(Configuration::new(dsn, options)?))
	}

	/// Like [`CrashBridge::configure`], for values from a dynamic source.
	/// `dsn` must be a non-empty string and `options` an object or `null`.
	pub fn configure_value(&self, dsn: &Value, options: Value) -> Result<&Self> {
		Ok(self.configure_with(Configuration::from_value(dsn, options)?))
	}

	/// Store an already validated configuration.
	pub fn configure_with(&self, config: Configuration) -> &Self {
		let logger = DiagnosticLogger::new(
			config.options.log_level,
			Arc::clone(self.env.diagnostics()),
		);
		debug!(
			dsn = %config.dsn,
			log_level = %config.options.log_level,
			"Crash bridge configured"
		);

		let mut state = self.state.write();
		state.config = Some(config);
		state.logger = logger;
		self
	}

	pub fn configuration(&self) -> Option<Configuration> {
		self.state.read().config.clone()
	}

	/// Select and construct the backend.
	///
	/// The native backend is used when a native reporter is linked, reports
	/// itself available and `forceRavenClient` is not set. Otherwise the
	/// scripted backend is used.
	///
	/// Install once per facade. A second call is a precondition violation: it
	/// is logged and the new backend replaces the old one, but the old
	/// backend's side effects (a registered DSN, a decorated bridge) remain.
	pub fn install(&self) -> Result<()> {
		let (config, logger) = {
			let state = self.state.read();
			let config = state.config.clone().ok_or_else(|| {
				CrashBridgeError::configuration("configure must be called before install")
			})?;
			(config, state.logger.clone())
		};

		let use_native = self.env.native_client_available() && !config.options.force_raven_client;
		let backend = if use_native {
			Backend::Native(NativeBackend::new(
				config.dsn.as_str(),
				&config.options,
				&self.env,
				logger,
			)?)
		} else {
			Backend::Scripted(ScriptedBackend::new(
				config.dsn.as_str(),
				&config.options,
				&self.env,
				logger,
			)?)
		};
		let kind = backend.kind();

		let previous = self.state.write().backend.replace(Arc::new(backend));
		if let Some(previous) = previous {
			warn!(
				previous = %previous.kind(),
				backend = %kind,
				"Crash bridge installed twice, replacing backend"
			);
		}
		info!(backend = %kind, "Crash bridge installed");
		Ok(())
	}

	pub fn backend_kind(&self) -> Option<BackendKind> {
		self.state.read().backend.as_ref().map(|b| b.kind())
	}

	/// The installed backend, for inspection.
	pub fn backend(&self) -> Option<Arc<Backend>> {
		self.state.read().backend.clone()
	}

	fn installed(&self) -> Result<Arc<Backend>> {
		self.backend().ok_or(CrashBridgeError::NotInstalled)
	}

	/// Raise a local fault through the backend. Does not return once installed.
	pub fn crash(&self) -> Result<()> {
		self.installed()?.crash()
	}

	/// Ask the native reporter to terminate the process. The scripted backend
	/// reports that this is unsupported and returns.
	pub fn native_crash(&self) -> Result<()> {
		self.installed()?.native_crash();
		Ok(())
	}

	pub fn set_user_context(&self, user: ContextMap) -> Result<()> {
		self.set_context(ContextKind::User, user)
	}

	pub fn set_tags_context(&self, tags: ContextMap) -> Result<()> {
		self.set_context(ContextKind::Tags, tags)
	}

	pub fn set_extra_context(&self, extras: ContextMap) -> Result<()> {
		self.set_context(ContextKind::Extras, extras)
	}

	pub fn set_context(&self, kind: ContextKind, values: ContextMap) -> Result<()> {
		self.installed()?.set_context(kind, values);
		Ok(())
	}

	pub fn capture_message(&self, message: &str, options: Option<MessageOptions>) -> Result<()> {
		self.installed()?.capture_message(message, options);
		Ok(())
	}

	/// Write to the host diagnostic sink if `level` passes the configured
	/// threshold. Nothing is written before `configure`.
	pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
		let logger = self.state.read().logger.clone();
		logger.log(level, message);
	}
}
