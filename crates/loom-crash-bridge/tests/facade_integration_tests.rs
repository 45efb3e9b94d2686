// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the crash bridge facade.
//!
//! Tests cover:
//! - Backend selection (native availability x forceRavenClient)
//! - Native backend: DSN registration, severity ordinals, stack-trace merging
//! - Scripted backend: plugin registration, severity translation, nativeCrash
//! - Re-installation replacing the backend

use std::sync::Arc;

use loom_crash_bridge::memory::{
	MemoryNativeReporter, MemoryScriptReporter, MemorySink, RecordingDispatch,
};
use loom_crash_bridge::{
	context_map, tagged_stack, BackendKind, Bridge, CrashBridge, CrashBridgeError, Environment,
	LogLevel, MessageOptions, MethodId, ModuleDescriptor, ModuleId, NativeCall, Options, Severity,
};
use proptest::prelude::*;
use serde_json::json;

const DSN: &str = "https://public@sentry.example.com/1";

struct Harness {
	bridge: CrashBridge,
	native: Arc<MemoryNativeReporter>,
	script: Arc<MemoryScriptReporter>,
	dispatch: Arc<RecordingDispatch>,
	sink: Arc<MemorySink>,
}

fn harness(native: Option<MemoryNativeReporter>) -> Harness {
	let native = native.map(Arc::new);
	let script = Arc::new(MemoryScriptReporter::new());
	let dispatch = Arc::new(RecordingDispatch::new());
	let sink = Arc::new(MemorySink::new());

	let mut builder = Environment::builder(
		script.clone(),
		Arc::new(Bridge::from_shared(dispatch.clone())),
	)
	.stack_provider(Arc::new(|| "Error\n    at onPress (App.js:10:3)".to_string()))
	.diagnostics(sink.clone());
	if let Some(native) = &native {
		builder = builder.native(native.clone());
	}

	Harness {
		bridge: CrashBridge::new(builder.build()),
		native: native.unwrap_or_else(|| Arc::new(MemoryNativeReporter::unavailable())),
		script,
		dispatch,
		sink,
	}
}

fn modules() -> Vec<Option<ModuleDescriptor>> {
	vec![
		Some(ModuleDescriptor::new("Timing")),
		None,
		Some(ModuleDescriptor::new("CameraModule")),
		Some(ModuleDescriptor::new("UIManager")),
	]
}

// ============================================================================
// Backend selection
// ============================================================================

#[tokio::test]
async fn native_selected_when_available() {
	let h = harness(Some(MemoryNativeReporter::new()));
	h.bridge.configure(DSN, Options::default()).unwrap().install().unwrap();

	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Native));
	assert_eq!(h.native.records().dsn.as_deref(), Some(DSN));
	assert!(!h.script.is_installed());
}

#[tokio::test]
async fn force_raven_client_selects_scripted() {
	let h = harness(Some(MemoryNativeReporter::new()));
	h.bridge
		.configure(DSN, Options::builder().force_raven_client(true).build())
		.unwrap()
		.install()
		.unwrap();

	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Scripted));
	assert!(h.native.records().dsn.is_none());
	assert!(h.script.is_installed());
}

#[test]
fn unavailable_native_selects_scripted() {
	let h = harness(Some(MemoryNativeReporter::unavailable()));
	h.bridge.configure(DSN, Options::default()).unwrap().install().unwrap();
	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Scripted));
}

#[test]
fn missing_native_selects_scripted() {
	let h = harness(None);
	h.bridge.configure(DSN, Options::default()).unwrap().install().unwrap();
	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Scripted));
}

proptest! {
	#[test]
	fn selection_matrix(linked in any::<bool>(), available in any::<bool>(), force in any::<bool>()) {
		let native = linked.then(|| {
			if available {
				MemoryNativeReporter::new()
			} else {
				MemoryNativeReporter::unavailable()
			}
		});
		let h = harness(native);
		let options = Options::builder()
			.force_raven_client(force)
			.deactivate_stacktrace_merging(true)
			.build();
		h.bridge.configure(DSN, options).unwrap().install().unwrap();

		let expected = if linked && available && !force {
			BackendKind::Native
		} else {
			BackendKind::Scripted
		};
		prop_assert_eq!(h.bridge.backend_kind(), Some(expected));
	}
}

// ============================================================================
// Native backend
// ============================================================================

#[tokio::test]
async fn native_forwards_context_and_ordinals() {
	let h = harness(Some(MemoryNativeReporter::new()));
	h.bridge
		.configure(DSN, Options::builder().deactivate_stacktrace_merging(true).build())
		.unwrap()
		.install()
		.unwrap();

	h.bridge
		.set_user_context(context_map(json!({"id": "42"})).unwrap())
		.unwrap();
	h.bridge
		.set_tags_context(context_map(json!({"screen": "checkout"})).unwrap())
		.unwrap();
	h.bridge.capture_message("declined", None).unwrap();
	h.bridge
		.capture_message("retrying", Some(MessageOptions::with_level(Severity::Info)))
		.unwrap();
	h.bridge
		.capture_message("no level", Some(MessageOptions::default()))
		.unwrap();
	h.bridge.native_crash().unwrap();

	let records = h.native.records();
	assert_eq!(records.context.user.get("id"), Some(&json!("42")));
	assert_eq!(records.context.tags.get("screen"), Some(&json!("checkout")));
	assert_eq!(
		records.messages,
		vec![
			("declined".to_string(), 1),
			("retrying".to_string(), 3),
			("no level".to_string(), 1),
		]
	);
	assert_eq!(records.crashes, 1);
}

#[tokio::test]
async fn native_merging_tags_non_excluded_bridge_calls() {
	let h = harness(Some(MemoryNativeReporter::new().with_modules(modules())));
	h.bridge
		.configure(
			DSN,
			Options::builder()
				.ignore_modules_include(["CameraModule"])
				.ignore_modules_exclude(["UIManager"])
				.build(),
		)
		.unwrap()
		.install()
		.unwrap();

	let backend = h.bridge.backend().unwrap();
	let merging = backend
		.as_native()
		.and_then(|n| n.stacktrace_merging())
		.cloned()
		.unwrap();
	merging.wait_until_activated().await;
	assert_eq!(h.native.merging_activations(), 1);

	let bridge = h.bridge.environment().bridge();
	for module in [0, 2, 3, 9] {
		bridge.enqueue_native_call(NativeCall::new(
			ModuleId(module),
			MethodId(1),
			vec![json!("arg")],
		));
	}

	let calls = h.dispatch.take_calls();
	let tagged: Vec<bool> = calls
		.iter()
		.map(|call| tagged_stack(&call.params).is_some())
		.collect();
	// Timing is deny-listed, CameraModule included; UIManager is exempted and
	// module 9 is unknown to the registry.
	assert_eq!(tagged, vec![false, false, true, true]);
	assert_eq!(
		tagged_stack(&calls[2].params),
		Some("Error\n    at onPress (App.js:10:3)")
	);
	assert_eq!(calls[0].params, vec![json!("arg")]);
}

#[tokio::test]
async fn deactivated_merging_leaves_bridge_untouched() {
	let h = harness(Some(MemoryNativeReporter::new().with_modules(modules())));
	h.bridge
		.configure(DSN, Options::builder().deactivate_stacktrace_merging(true).build())
		.unwrap()
		.install()
		.unwrap();
	tokio::task::yield_now().await;

	h.bridge
		.environment()
		.bridge()
		.enqueue_native_call(NativeCall::new(ModuleId(2), MethodId(0), vec![]));

	assert_eq!(h.native.merging_activations(), 0);
	assert!(h.dispatch.calls()[0].params.is_empty());
}

// ============================================================================
// Scripted backend
// ============================================================================

#[tokio::test]
async fn scripted_translates_severity_and_runs_plugin() {
	let h = harness(None);
	h.bridge
		.configure(DSN, Options::builder().option("environment", "staging").build())
		.unwrap()
		.install()
		.unwrap();

	let (dsn, config) = h.script.configuration().unwrap();
	assert_eq!(dsn, DSN);
	assert_eq!(config.get("allowSecretKey"), Some(&json!(true)));
	assert_eq!(config.get("environment"), Some(&json!("staging")));

	h.bridge
		.set_extra_context(context_map(json!({"cart": 3})).unwrap())
		.unwrap();
	for level in Severity::ALL {
		h.bridge
			.capture_message(level.as_str(), Some(MessageOptions::with_level(level)))
			.unwrap();
	}
	h.bridge.capture_message("bare", None).unwrap();

	let mut captured = h.script.wait_for_messages(6).await;
	captured.sort_by(|a, b| a.message.cmp(&b.message));
	let levels: Vec<(&str, &str)> = captured
		.iter()
		.map(|m| (m.message.as_str(), m.level.as_str()))
		.collect();
	assert_eq!(
		levels,
		vec![
			("bare", "error"),
			(Severity::Debug.as_str(), "error"),
			(Severity::Error.as_str(), "error"),
			(Severity::Fatal.as_str(), "error"),
			(Severity::Info.as_str(), "info"),
			(Severity::Warning.as_str(), "warning"),
		]
	);
	let event = &captured[0].event;
	assert_eq!(event["platform"], "javascript");
	assert_eq!(event["contexts"]["bridge"]["sdk"], "loom-crash-bridge");
	assert_eq!(event["extra"]["cart"], 3);
}

#[test]
fn scripted_native_crash_is_reported_not_raised() {
	let h = harness(None);
	h.bridge.configure(DSN, Options::default()).unwrap().install().unwrap();

	h.bridge.native_crash().unwrap();

	assert_eq!(
		h.sink.errors(),
		vec!["nativeCrash is not supported with the scripted client"]
	);
}

#[test]
fn backend_debug_lines_respect_log_level() {
	let h = harness(None);
	h.bridge
		.configure(DSN, Options::builder().log_level(LogLevel::Debug).build())
		.unwrap()
		.install()
		.unwrap();
	h.bridge
		.set_tags_context(context_map(json!({"a": "b"})).unwrap())
		.unwrap();

	assert!(h
		.sink
		.logs()
		.iter()
		.any(|line| line.contains("set_tags_context")));
}

// ============================================================================
// Re-installation
// ============================================================================

#[tokio::test]
async fn reinstall_replaces_backend() {
	let h = harness(Some(MemoryNativeReporter::new()));
	h.bridge
		.configure(DSN, Options::builder().deactivate_stacktrace_merging(true).build())
		.unwrap()
		.install()
		.unwrap();
	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Native));

	h.bridge
		.configure(DSN, Options::builder().force_raven_client(true).build())
		.unwrap()
		.install()
		.unwrap();
	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Scripted));

	h.bridge.capture_message("after", None).unwrap();
	let captured = h.script.wait_for_messages(1).await;
	assert_eq!(captured[0].message, "after");
	assert!(h.native.records().messages.is_empty());
}

#[test]
fn failed_install_keeps_previous_backend() {
	let h = harness(Some(MemoryNativeReporter::new()));
	h.bridge
		.configure(DSN, Options::builder().deactivate_stacktrace_merging(true).build())
		.unwrap()
		.install()
		.unwrap();

	h.bridge
		.configure(DSN, Options::builder().option("ignoreModulesInclude", "Timing").build())
		.unwrap();
	let result = h.bridge.install();

	assert!(matches!(result, Err(CrashBridgeError::Configuration(_))));
	assert_eq!(h.bridge.backend_kind(), Some(BackendKind::Native));
}
