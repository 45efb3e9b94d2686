// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash bridge.

use thiserror::Error;

/// Errors that can occur while configuring or driving the crash bridge.
#[derive(Debug, Error)]
pub enum CrashBridgeError {
	/// The DSN is missing, not a string, or empty, or the options are malformed.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// The native backend was requested but no native reporter is present.
	#[error("no native crash reporter is installed")]
	BackendUnavailable,

	/// A public call was issued before `install`.
	#[error("crash bridge is not installed; call install() after configure()")]
	NotInstalled,

	/// A process-wide free function was called before the global facade existed.
	#[error("global crash bridge is not initialized; call global::init() first")]
	NotInitialized,

	/// The active backend does not implement this operation.
	#[error("{0} is not supported by the active backend")]
	UnsupportedOperation(&'static str),

	/// Loading configuration from the environment or a file failed.
	#[error("failed to load configuration: {0}")]
	ConfigLoad(String),

	/// Options could not be converted to or from JSON.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl CrashBridgeError {
	/// Create a configuration error.
	pub fn configuration(msg: impl Into<String>) -> Self {
		Self::Configuration(msg.into())
	}

	/// Create a configuration-loading error.
	pub fn config_load(msg: impl Into<String>) -> Self {
		Self::ConfigLoad(msg.into())
	}

	/// Returns true for errors that must abort configure/install.
	///
	/// Only [`CrashBridgeError::UnsupportedOperation`] is non-fatal; it is logged
	/// and swallowed by the backend that raises it.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Self::UnsupportedOperation(_))
	}
}

/// Result type alias for crash bridge operations.
pub type Result<T> = std::result::Result<T, CrashBridgeError>;
