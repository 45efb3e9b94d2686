// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context maps (user, tags, extras) attached to reports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{CrashBridgeError, Result};

/// A flat, schema-less key-value map forwarded verbatim to the active backend.
pub type ContextMap = Map<String, Value>;

/// Build a [`ContextMap`] from a JSON object value.
pub fn context_map(value: Value) -> Result<ContextMap> {
	match value {
		Value::Object(map) => Ok(map),
		other => Err(CrashBridgeError::configuration(format!(
			"context must be a JSON object, got {other}"
		))),
	}
}

/// The three independent context maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
	User,
	Tags,
	Extras,
}

impl fmt::Display for ContextKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::User => write!(f, "user"),
			Self::Tags => write!(f, "tags"),
			Self::Extras => write!(f, "extra"),
		}
	}
}

/// Last-write-wins holder for the three context maps.
///
/// Setting user context replaces the whole user map. Tags and extras merge
/// key by key, with the newest value winning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextStore {
	#[serde(default)]
	pub user: ContextMap,
	#[serde(default)]
	pub tags: ContextMap,
	#[serde(default)]
	pub extra: ContextMap,
}

impl ContextStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, kind: ContextKind, values: ContextMap) {
		match kind {
			ContextKind::User => self.user = values,
			ContextKind::Tags => self.tags.extend(values),
			ContextKind::Extras => self.extra.extend(values),
		}
	}

	pub fn get(&self, kind: ContextKind) -> &ContextMap {
		match kind {
			ContextKind::User => &self.user,
			ContextKind::Tags => &self.tags,
			ContextKind::Extras => &self.extra,
		}
	}

	/// Write non-empty maps into `event` under `user`, `tags` and `extra`.
	pub fn apply_to(&self, event: &mut ContextMap) {
		for kind in [ContextKind::User, ContextKind::Tags, ContextKind::Extras] {
			let values = self.get(kind);
			if !values.is_empty() {
				event.insert(kind.to_string(), Value::Object(values.clone()));
			}
		}
	}

	pub fn clear(&mut self) {
		self.user.clear();
		self.tags.clear();
		self.extra.clear();
	}
}
