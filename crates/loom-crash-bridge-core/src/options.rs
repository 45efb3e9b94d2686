// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Facade options and the per-backend option subsets derived from them.
//!
//! Options are an open key-value map. The facade recognizes `logLevel` and
//! `forceRavenClient`; every other key is kept verbatim and each backend
//! merges the keys it understands over its own defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::ContextMap;
use crate::error::{CrashBridgeError, Result};
use crate::level::LogLevel;

/// Options passed to `configure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
	/// Threshold for the bridge's own diagnostic output.
	#[serde(default)]
	pub log_level: LogLevel,
	/// Use the scripted backend even when a native reporter is available.
	#[serde(default)]
	pub force_raven_client: bool,
	/// Backend-specific keys, kept verbatim.
	#[serde(flatten)]
	pub backend: ContextMap,
}

impl Options {
	pub fn builder() -> OptionsBuilder {
		OptionsBuilder::default()
	}

	/// Parse options from a JSON object. `null` yields the defaults.
	pub fn from_value(value: Value) -> Result<Self> {
		match value {
			Value::Null => Ok(Self::default()),
			Value::Object(_) => serde_json::from_value(value).map_err(|e| {
				CrashBridgeError::configuration(format!("invalid options: {e}"))
			}),
			other => Err(CrashBridgeError::configuration(format!(
				"options must be a JSON object, got {other}"
			))),
		}
	}

	/// The full option map, recognized keys included.
	pub fn to_map(&self) -> Result<ContextMap> {
		match serde_json::to_value(self)? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}

	/// Native backend options merged over their defaults.
	pub fn native(&self) -> Result<NativeOptions> {
		self.subset("native backend")
	}

	/// Scripted backend options merged over their defaults.
	pub fn scripted(&self) -> Result<ScriptedOptions> {
		self.subset("scripted backend")
	}

	fn subset<T: serde::de::DeserializeOwned>(&self, which: &str) -> Result<T> {
		serde_json::from_value(Value::Object(self.to_map()?))
			.map_err(|e| CrashBridgeError::configuration(format!("invalid {which} options: {e}")))
	}
}

/// Builder for [`Options`].
#[derive(Debug, Default)]
pub struct OptionsBuilder {
	options: Options,
}

impl OptionsBuilder {
	pub fn log_level(mut self, level: LogLevel) -> Self {
		self.options.log_level = level;
		self
	}

	pub fn force_raven_client(mut self, force: bool) -> Self {
		self.options.force_raven_client = force;
		self
	}

	/// Module names to exclude from stack tagging, on top of the built-in list.
	pub fn ignore_modules_include<I, S>(self, modules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.string_list("ignoreModulesInclude", modules)
	}

	/// Module names that are always tagged, even if the built-in list names them.
	pub fn ignore_modules_exclude<I, S>(self, modules: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.string_list("ignoreModulesExclude", modules)
	}

	pub fn deactivate_stacktrace_merging(self, deactivate: bool) -> Self {
		self.option("deactivateStacktraceMerging", deactivate)
	}

	pub fn allow_secret_key(self, allow: bool) -> Self {
		self.option("allowSecretKey", allow)
	}

	/// Set an arbitrary backend-specific option.
	pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.options.backend.insert(key.into(), value.into());
		self
	}

	pub fn build(self) -> Options {
		self.options
	}

	fn string_list<I, S>(self, key: &str, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();
		self.option(key, Value::Array(values))
	}
}

/// Options understood by the native backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeOptions {
	#[serde(default)]
	pub ignore_modules_exclude: Vec<String>,
	#[serde(default)]
	pub ignore_modules_include: Vec<String>,
	#[serde(default)]
	pub deactivate_stacktrace_merging: bool,
}

/// Options understood by the scripted backend.
///
/// Everything besides `allowSecretKey` passes through to the script
/// reporter's own `config` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedOptions {
	#[serde(default = "default_allow_secret_key")]
	pub allow_secret_key: bool,
	#[serde(flatten)]
	pub passthrough: ContextMap,
}

impl ScriptedOptions {
	/// The merged map handed to the script reporter.
	pub fn to_map(&self) -> Result<ContextMap> {
		match serde_json::to_value(self)? {
			Value::Object(map) => Ok(map),
			_ => Ok(Map::new()),
		}
	}
}

impl Default for ScriptedOptions {
	fn default() -> Self {
		Self {
			allow_secret_key: default_allow_secret_key(),
			passthrough: Map::new(),
		}
	}
}

fn default_allow_secret_key() -> bool {
	true
}
