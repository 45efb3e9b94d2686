// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event plugin the scripted backend registers with the script reporter.

use serde_json::{json, Map, Value};

use crate::scripted::ScriptPlugin;

/// SDK name reported in `contexts.bridge`.
pub const SDK_NAME: &str = "loom-crash-bridge";
/// SDK version reported in `contexts.bridge`.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scheme prefix for normalized frame filenames.
const APP_PREFIX: &str = "app:///";

/// Normalizes script events so reports from different devices group together.
///
/// - `platform` defaults to `"javascript"`
/// - frame filenames are rewritten to `app:///<basename>`
/// - `contexts.bridge` records the SDK name and version
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeContextPlugin;

impl BridgeContextPlugin {
	pub fn new() -> Self {
		Self
	}
}

impl ScriptPlugin for BridgeContextPlugin {
	fn name(&self) -> &'static str {
		"bridge-context"
	}

	fn process_event(&self, event: &mut Value) {
		let Some(event) = event.as_object_mut() else {
			return;
		};

		event
			.entry("platform")
			.or_insert_with(|| json!("javascript"));

		if let Some(values) = event
			.get_mut("exception")
			.and_then(|e| e.get_mut("values"))
			.and_then(Value::as_array_mut)
		{
			for exception in values {
				if let Some(stacktrace) = exception.get_mut("stacktrace") {
					normalize_frames(stacktrace);
				}
			}
		}
		if let Some(stacktrace) = event.get_mut("stacktrace") {
			normalize_frames(stacktrace);
		}

		let contexts = event
			.entry("contexts")
			.or_insert_with(|| Value::Object(Map::new()));
		if let Some(contexts) = contexts.as_object_mut() {
			contexts.insert(
				"bridge".to_string(),
				json!({ "sdk": SDK_NAME, "version": SDK_VERSION }),
			);
		}
	}
}

fn normalize_frames(stacktrace: &mut Value) {
	let Some(frames) = stacktrace.get_mut("frames").and_then(Value::as_array_mut) else {
		return;
	};
	for frame in frames {
		let Some(filename) = frame.get_mut("filename") else {
			continue;
		};
		if let Some(normalized) = filename.as_str().map(app_filename) {
			*filename = Value::String(normalized);
		}
	}
}

/// `app:///` followed by the last path segment of `filename`.
pub fn app_filename(filename: &str) -> String {
	let trimmed = filename.split(['?', '#']).next().unwrap_or(filename);
	let basename = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
	format!("{APP_PREFIX}{basename}")
}
