// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Message severity and diagnostic log levels.
//!
//! Both enums are ordinal-ordered and serialize as their ordinal, which is what
//! the native reporter consumes. Deserialization also accepts the lowercase
//! name so config files can say `logLevel = "debug"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrashBridgeError;

/// Severity of a captured message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "LevelRepr", into = "u8")]
#[repr(u8)]
pub enum Severity {
	Fatal = 0,
	Error = 1,
	Warning = 2,
	Info = 3,
	Debug = 4,
}

impl Severity {
	pub const ALL: [Severity; 5] = [
		Severity::Fatal,
		Severity::Error,
		Severity::Warning,
		Severity::Info,
		Severity::Debug,
	];

	/// Ordinal handed to the native reporter.
	pub fn ordinal(self) -> u8 {
		self as u8
	}

	pub fn from_ordinal(ordinal: u8) -> Option<Self> {
		Self::ALL.get(usize::from(ordinal)).copied()
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Fatal => "fatal",
			Self::Error => "error",
			Self::Warning => "warning",
			Self::Info => "info",
			Self::Debug => "debug",
		}
	}
}

impl Default for Severity {
	fn default() -> Self {
		Self::Error
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Severity {
	type Err = CrashBridgeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase();
		let parsed = match normalized.parse::<u8>() {
			Ok(ordinal) => Self::from_ordinal(ordinal),
			Err(_) => Self::ALL
				.into_iter()
				.find(|level| level.as_str() == normalized),
		};
		parsed.ok_or_else(|| CrashBridgeError::configuration(format!("invalid severity: {s}")))
	}
}

impl From<Severity> for u8 {
	fn from(level: Severity) -> Self {
		level.ordinal()
	}
}

impl TryFrom<LevelRepr> for Severity {
	type Error = CrashBridgeError;

	fn try_from(repr: LevelRepr) -> Result<Self, CrashBridgeError> {
		match repr {
			LevelRepr::Ordinal(ordinal) => Self::from_ordinal(ordinal).ok_or_else(|| {
				CrashBridgeError::configuration(format!("invalid severity: {ordinal}"))
			}),
			LevelRepr::Name(name) => name.parse(),
		}
	}
}

/// Threshold for the bridge's own diagnostic output.
///
/// Lower ordinals are higher priority. `None` suppresses everything.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "LevelRepr", into = "u8")]
#[repr(u8)]
pub enum LogLevel {
	#[default]
	None = 0,
	Error = 1,
	Debug = 2,
	Verbose = 3,
}

impl LogLevel {
	pub const ALL: [LogLevel; 4] = [
		LogLevel::None,
		LogLevel::Error,
		LogLevel::Debug,
		LogLevel::Verbose,
	];

	pub fn ordinal(self) -> u8 {
		self as u8
	}

	pub fn from_ordinal(ordinal: u8) -> Option<Self> {
		Self::ALL.get(usize::from(ordinal)).copied()
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Error => "error",
			Self::Debug => "debug",
			Self::Verbose => "verbose",
		}
	}

	/// Whether a message at `level` passes this threshold.
	pub fn allows(self, level: LogLevel) -> bool {
		self != LogLevel::None && level <= self
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = CrashBridgeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if let Ok(ordinal) = s.parse::<u8>() {
			return Self::from_ordinal(ordinal)
				.ok_or_else(|| CrashBridgeError::configuration(format!("invalid log level: {s}")));
		}
		let lower = s.to_ascii_lowercase();
		Self::ALL
			.into_iter()
			.find(|level| level.as_str() == lower)
			.ok_or_else(|| CrashBridgeError::configuration(format!("invalid log level: {s}")))
	}
}

impl From<LogLevel> for u8 {
	fn from(level: LogLevel) -> Self {
		level.ordinal()
	}
}

impl TryFrom<LevelRepr> for LogLevel {
	type Error = CrashBridgeError;

	fn try_from(repr: LevelRepr) -> Result<Self, CrashBridgeError> {
		match repr {
			LevelRepr::Ordinal(ordinal) => Self::from_ordinal(ordinal).ok_or_else(|| {
				CrashBridgeError::configuration(format!("invalid log level: {ordinal}"))
			}),
			LevelRepr::Name(name) => name.parse(),
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
	Ordinal(u8),
	Name(String),
}

/// Options accepted by `captureMessage`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOptions {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub level: Option<Severity>,
}

impl MessageOptions {
	pub fn with_level(level: Severity) -> Self {
		Self { level: Some(level) }
	}
}
