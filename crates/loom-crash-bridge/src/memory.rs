// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory collaborators for dry runs and tests.
//!
//! Each records what it is asked to do instead of talking to a real reporter
//! or bridge.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use loom_crash_bridge_core::{ContextKind, ContextMap, ContextStore, ModuleDescriptor};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::bridge::{Dispatch, NativeCall};
use crate::diagnostics::DiagnosticSink;
use crate::native::NativeReporter;
use crate::scripted::{ScriptMessageOptions, ScriptReporter, SharedScriptPlugin};

/// Diagnostic sink that keeps every line.
#[derive(Debug, Default)]
pub struct MemorySink {
	logs: Mutex<Vec<String>>,
	errors: Mutex<Vec<String>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn logs(&self) -> Vec<String> {
		self.logs.lock().clone()
	}

	pub fn errors(&self) -> Vec<String> {
		self.errors.lock().clone()
	}
}

impl DiagnosticSink for MemorySink {
	fn log(&self, message: &str) {
		self.logs.lock().push(message.to_string());
	}

	fn error(&self, message: &str) {
		self.errors.lock().push(message.to_string());
	}
}

/// Bridge dispatch that records calls instead of sending them.
#[derive(Default)]
pub struct RecordingDispatch {
	calls: Mutex<Vec<NativeCall>>,
}

impl RecordingDispatch {
	pub fn new() -> Self {
		Self::default()
	}

	/// A copy of every call recorded so far.
	pub fn calls(&self) -> Vec<NativeCall> {
		self.calls.lock().clone()
	}

	/// Move the recorded calls out, leaving the log empty.
	pub fn take_calls(&self) -> Vec<NativeCall> {
		std::mem::take(&mut *self.calls.lock())
	}
}

impl Dispatch for RecordingDispatch {
	fn enqueue_native_call(&self, call: NativeCall) {
		self.calls.lock().push(call);
	}
}

/// What a [`MemoryNativeReporter`] has been asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeRecord {
	pub dsn: Option<String>,
	pub crashes: usize,
	pub context: ContextStore,
	/// `(message, severity ordinal)` pairs in capture order.
	pub messages: Vec<(String, u8)>,
}

/// Native reporter that records calls. Its `crash` is recorded, not executed.
pub struct MemoryNativeReporter {
	available: bool,
	modules: Vec<Option<ModuleDescriptor>>,
	record: Mutex<NativeRecord>,
	merging_activations: AtomicUsize,
}

impl MemoryNativeReporter {
	pub fn new() -> Self {
		Self {
			available: true,
			modules: Vec::new(),
			record: Mutex::new(NativeRecord::default()),
			merging_activations: AtomicUsize::new(0),
		}
	}

	/// A reporter that is linked but reports itself unusable.
	pub fn unavailable() -> Self {
		Self {
			available: false,
			..Self::new()
		}
	}

	/// Set the bridge's remote module table.
	pub fn with_modules(mut self, modules: Vec<Option<ModuleDescriptor>>) -> Self {
		self.modules = modules;
		self
	}

	pub fn records(&self) -> NativeRecord {
		self.record.lock().clone()
	}

	/// How many times merging activation was requested.
	pub fn merging_activations(&self) -> usize {
		self.merging_activations.load(Ordering::Acquire)
	}
}

impl Default for MemoryNativeReporter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl NativeReporter for MemoryNativeReporter {
	fn native_client_available(&self) -> bool {
		self.available
	}

	fn start_with_dsn(&self, dsn: &str) {
		self.record.lock().dsn = Some(dsn.to_string());
	}

	fn crash(&self) {
		self.record.lock().crashes += 1;
	}

	fn set_user(&self, user: ContextMap) {
		self.record.lock().context.set(ContextKind::User, user);
	}

	fn set_tags(&self, tags: ContextMap) {
		self.record.lock().context.set(ContextKind::Tags, tags);
	}

	fn set_extras(&self, extras: ContextMap) {
		self.record.lock().context.set(ContextKind::Extras, extras);
	}

	fn capture_message(&self, message: &str, severity: u8) {
		self
			.record
			.lock()
			.messages
			.push((message.to_string(), severity));
	}

	async fn activate_stacktrace_merging(&self) {
		self.merging_activations.fetch_add(1, Ordering::AcqRel);
	}

	fn remote_modules(&self) -> Vec<Option<ModuleDescriptor>> {
		self.modules.clone()
	}
}

/// A message as delivered to a [`MemoryScriptReporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedMessage {
	pub message: String,
	pub level: String,
	/// The event after context was applied and every plugin ran.
	pub event: Value,
}

#[derive(Default)]
struct ScriptState {
	plugins: Vec<SharedScriptPlugin>,
	config: Option<(String, ContextMap)>,
	installed: bool,
	context: ContextStore,
	messages: Vec<CapturedMessage>,
}

/// Script reporter that builds events in memory and runs registered plugins
/// over them.
#[derive(Default)]
pub struct MemoryScriptReporter {
	state: Mutex<ScriptState>,
	captured: Notify,
}

impl MemoryScriptReporter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn plugin_names(&self) -> Vec<&'static str> {
		self.state.lock().plugins.iter().map(|p| p.name()).collect()
	}

	/// The DSN and option map passed to `config`, if it was called.
	pub fn configuration(&self) -> Option<(String, ContextMap)> {
		self.state.lock().config.clone()
	}

	pub fn is_installed(&self) -> bool {
		self.state.lock().installed
	}

	pub fn context(&self) -> ContextStore {
		self.state.lock().context.clone()
	}

	pub fn messages(&self) -> Vec<CapturedMessage> {
		self.state.lock().messages.clone()
	}

	/// Wait until at least `count` messages have been captured.
	pub async fn wait_for_messages(&self, count: usize) -> Vec<CapturedMessage> {
		loop {
			let notified = self.captured.notified();
			{
				let state = self.state.lock();
				if state.messages.len() >= count {
					return state.messages.clone();
				}
			}
			notified.await;
		}
	}

	fn set_context(&self, kind: ContextKind, values: ContextMap) {
		self.state.lock().context.set(kind, values);
	}
}

#[async_trait]
impl ScriptReporter for MemoryScriptReporter {
	fn add_plugin(&self, plugin: SharedScriptPlugin) {
		self.state.lock().plugins.push(plugin);
	}

	fn config(&self, dsn: &str, options: &ContextMap) {
		self.state.lock().config = Some((dsn.to_string(), options.clone()));
	}

	fn install(&self) {
		self.state.lock().installed = true;
	}

	fn set_user_context(&self, user: ContextMap) {
		self.set_context(ContextKind::User, user);
	}

	fn set_tags_context(&self, tags: ContextMap) {
		self.set_context(ContextKind::Tags, tags);
	}

	fn set_extra_context(&self, extras: ContextMap) {
		self.set_context(ContextKind::Extras, extras);
	}

	async fn capture_message(&self, message: &str, options: ScriptMessageOptions) {
		let (plugins, mut event) = {
			let state = self.state.lock();
			let mut event = ContextMap::new();
			event.insert("message".to_string(), json!(message));
			event.insert("level".to_string(), json!(options.level));
			state.context.apply_to(&mut event);
			(state.plugins.clone(), Value::Object(event))
		};
		for plugin in &plugins {
			plugin.process_event(&mut event);
		}

		self.state.lock().messages.push(CapturedMessage {
			message: message.to_string(),
			level: options.level.to_string(),
			event,
		});
		self.captured.notify_waiters();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scripted::ScriptPlugin;

	struct Marker;

	impl ScriptPlugin for Marker {
		fn name(&self) -> &'static str {
			"marker"
		}

		fn process_event(&self, event: &mut Value) {
			if let Some(event) = event.as_object_mut() {
				event.insert("marked".to_string(), json!(true));
			}
		}
	}

	#[tokio::test]
	async fn script_reporter_applies_context_and_plugins() {
		let reporter = MemoryScriptReporter::new();
		reporter.add_plugin(std::sync::Arc::new(Marker));
		reporter.set_tags_context(loom_crash_bridge_core::context_map(json!({"env": "qa"})).unwrap());

		reporter
			.capture_message("hello", ScriptMessageOptions { level: "info" })
			.await;

		let captured = reporter.wait_for_messages(1).await;
		assert_eq!(captured[0].level, "info");
		assert_eq!(captured[0].event["tags"]["env"], json!("qa"));
		assert_eq!(captured[0].event["marked"], json!(true));
	}

	#[test]
	fn native_reporter_records_context_semantics() {
		let reporter = MemoryNativeReporter::new();
		reporter.set_user(loom_crash_bridge_core::context_map(json!({"id": "1", "email": "a@b"})).unwrap());
		reporter.set_user(loom_crash_bridge_core::context_map(json!({"id": "2"})).unwrap());
		reporter.set_extras(loom_crash_bridge_core::context_map(json!({"a": 1})).unwrap());
		reporter.set_extras(loom_crash_bridge_core::context_map(json!({"b": 2})).unwrap());

		let record = reporter.records();
		assert_eq!(record.context.user.len(), 1);
		assert_eq!(record.context.extra.len(), 2);
	}

	#[test]
	fn sink_keeps_channels_apart() {
		let sink = MemorySink::new();
		sink.log("one");
		sink.error("two");
		assert_eq!(sink.logs(), vec!["one"]);
		assert_eq!(sink.errors(), vec!["two"]);
	}
}
