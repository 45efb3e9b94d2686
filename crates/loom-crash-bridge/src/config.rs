// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading a DSN and options from the environment or a TOML file.
//!
//! Environment variables:
//!
//! - `LOOM_CRASH_BRIDGE_DSN`, or `LOOM_CRASH_BRIDGE_DSN_FILE` naming a file
//!   whose trimmed contents are the DSN
//! - `LOOM_CRASH_BRIDGE_LOG_LEVEL`: `none`, `error`, `debug`, `verbose` or an
//!   ordinal
//! - `LOOM_CRASH_BRIDGE_FORCE_RAVEN_CLIENT`: `true`/`false`/`1`/`0`
//!
//! TOML layout:
//!
//! ```toml
//! dsn = "https://public@sentry.example.com/1"
//!
//! [options]
//! logLevel = 2
//! ignoreModulesInclude = ["CameraModule"]
//! ```

use std::path::Path;

use loom_crash_bridge_core::{CrashBridgeError, Dsn, LogLevel, Options, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DSN_ENV: &str = "LOOM_CRASH_BRIDGE_DSN";
pub const DSN_FILE_ENV: &str = "LOOM_CRASH_BRIDGE_DSN_FILE";
pub const LOG_LEVEL_ENV: &str = "LOOM_CRASH_BRIDGE_LOG_LEVEL";
pub const FORCE_RAVEN_CLIENT_ENV: &str = "LOOM_CRASH_BRIDGE_FORCE_RAVEN_CLIENT";

/// A validated DSN with its options; what `configure` stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
	pub dsn: Dsn,
	#[serde(default)]
	pub options: Options,
}

impl Configuration {
	pub fn new(dsn: impl Into<String>, options: Options) -> Result<Self> {
		Ok(Self {
			dsn: Dsn::parse(dsn)?,
			options,
		})
	}

	/// Dynamic form: `dsn` must be a non-empty string, `options` an object or
	/// `null`.
	pub fn from_value(dsn: &Value, options: Value) -> Result<Self> {
		Ok(Self {
			dsn: Dsn::from_value(dsn)?,
			options: Options::from_value(options)?,
		})
	}

	/// Load from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_env_with(|key| std::env::var(key).ok())
	}

	/// Load using `lookup` in place of the process environment.
	pub fn from_env_with<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let dsn = match lookup(DSN_ENV) {
			Some(dsn) => dsn,
			None => match lookup(DSN_FILE_ENV) {
				Some(path) => read_dsn_file(Path::new(&path))?,
				None => {
					return Err(CrashBridgeError::config_load(format!(
						"{DSN_ENV} or {DSN_FILE_ENV} must be set"
					)))
				}
			},
		};

		let mut options = Options::default();
		if let Some(level) = lookup(LOG_LEVEL_ENV) {
			options.log_level = level.trim().parse::<LogLevel>().map_err(|e| {
				CrashBridgeError::config_load(format!("{LOG_LEVEL_ENV}: {e}"))
			})?;
		}
		if let Some(force) = lookup(FORCE_RAVEN_CLIENT_ENV) {
			options.force_raven_client = parse_bool(&force).ok_or_else(|| {
				CrashBridgeError::config_load(format!(
					"{FORCE_RAVEN_CLIENT_ENV}: expected a boolean, got {force:?}"
				))
			})?;
		}

		debug!(
			log_level = %options.log_level,
			force_raven_client = options.force_raven_client,
			"Loaded crash bridge configuration from environment"
		);
		Self::new(dsn, options)
	}

	pub fn from_toml_str(source: &str) -> Result<Self> {
		let raw: RawConfiguration = toml::from_str(source)
			.map_err(|e| CrashBridgeError::config_load(format!("invalid TOML: {e}")))?;
		let options = serde_json::to_value(raw.options)?;
		Self::from_value(&Value::String(raw.dsn), options)
	}

	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|e| {
			CrashBridgeError::config_load(format!("failed to read {}: {e}", path.display()))
		})?;
		debug!(path = %path.display(), "Loaded crash bridge configuration file");
		Self::from_toml_str(&source)
	}
}

#[derive(Deserialize)]
struct RawConfiguration {
	dsn: String,
	#[serde(default)]
	options: Option<toml::Table>,
}

fn read_dsn_file(path: &Path) -> Result<String> {
	let contents = std::fs::read_to_string(path).map_err(|e| {
		CrashBridgeError::config_load(format!("failed to read {}: {e}", path.display()))
	})?;
	Ok(contents.trim().to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Some(true),
		"false" | "0" | "no" => Some(false),
		_ => None,
	}
}
