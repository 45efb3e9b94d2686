// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validated DSN (data source name) strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{CrashBridgeError, Result};

/// Placeholder used wherever DSN credentials would be printed.
pub const REDACTED: &str = "[REDACTED]";

const MISSING_DSN: &str = "a DSN must be provided";

/// A non-empty DSN string.
///
/// `Debug` and `Display` redact the credential part (`user:secret@`) so a DSN
/// can be logged safely. Use [`Dsn::as_str`] to hand the full value to a
/// reporter.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dsn(String);

impl Dsn {
	/// Validate a DSN. Empty and whitespace-only strings are rejected.
	pub fn parse(dsn: impl Into<String>) -> Result<Self> {
		let dsn = dsn.into();
		if dsn.trim().is_empty() {
			return Err(CrashBridgeError::configuration(MISSING_DSN));
		}
		Ok(Self(dsn))
	}

	/// Validate a dynamically typed DSN; anything but a non-empty string fails.
	pub fn from_value(value: &Value) -> Result<Self> {
		match value {
			Value::String(s) => Self::parse(s.as_str()),
			_ => Err(CrashBridgeError::configuration(MISSING_DSN)),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The DSN with any `userinfo@` section replaced by [`REDACTED`].
	pub fn redacted(&self) -> String {
		let Some(scheme_end) = self.0.find("://") else {
			return self.0.clone();
		};
		let authority_start = scheme_end + 3;
		let rest = &self.0[authority_start..];
		let authority_len = rest.find('/').unwrap_or(rest.len());
		match rest[..authority_len].rfind('@') {
			Some(at) => format!(
				"{}{}{}",
				&self.0[..authority_start],
				REDACTED,
				&rest[at..]
			),
			None => self.0.clone(),
		}
	}
}

impl fmt::Debug for Dsn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Dsn").field(&self.redacted()).finish()
	}
}

impl fmt::Display for Dsn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.redacted())
	}
}

impl FromStr for Dsn {
	type Err = CrashBridgeError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl TryFrom<String> for Dsn {
	type Error = CrashBridgeError;

	fn try_from(value: String) -> Result<Self> {
		Self::parse(value)
	}
}

impl From<Dsn> for String {
	fn from(dsn: Dsn) -> Self {
		dsn.0
	}
}
