// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: drive the crash bridge against in-memory collaborators.
//!
//! Run with:
//!   cargo run --example dry_run -p loom-crash-bridge
//!
//! Set `LOOM_CRASH_BRIDGE_FORCE_RAVEN_CLIENT=true` to exercise the scripted
//! backend instead of the native one.

use std::sync::Arc;

use loom_crash_bridge::memory::{MemoryNativeReporter, MemoryScriptReporter, RecordingDispatch};
use loom_crash_bridge::{
	context_map, tagged_stack, Bridge, Configuration, CrashBridge, Environment, MessageOptions,
	MethodId, ModuleDescriptor, ModuleId, NativeCall, Severity,
};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "loom_crash_bridge=debug".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let native = Arc::new(MemoryNativeReporter::new().with_modules(vec![
		Some(ModuleDescriptor::new("Timing")),
		Some(ModuleDescriptor::new("CameraModule")),
	]));
	let script = Arc::new(MemoryScriptReporter::new());
	let dispatch = Arc::new(RecordingDispatch::new());
	let env = Environment::builder(script.clone(), Arc::new(Bridge::from_shared(dispatch.clone())))
		.native(native.clone())
		.build();

	let config = Configuration::from_env_with(|key| {
		std::env::var(key).ok().or_else(|| match key {
			loom_crash_bridge::config::DSN_ENV => {
				Some("https://public@sentry.example.com/1".to_string())
			}
			_ => None,
		})
	})?;

	let bridge = CrashBridge::new(env);
	bridge.configure_with(config).install()?;
	let backend = bridge.backend().ok_or("crash bridge not installed")?;
	println!("Installed {} backend", backend.kind());

	if let Some(merging) = backend.as_native().and_then(|n| n.stacktrace_merging()) {
		merging.wait_until_activated().await;
	}

	bridge.set_user_context(context_map(json!({"id": "user_example_123"}))?)?;
	bridge.set_tags_context(context_map(json!({"example": "true"}))?)?;
	bridge.capture_message(
		"Example message from loom-crash-bridge",
		Some(MessageOptions::with_level(Severity::Warning)),
	)?;

	bridge.environment().bridge().enqueue_native_call(NativeCall::new(
		ModuleId(1),
		MethodId(0),
		vec![json!({"quality": 0.8})],
	));
	for call in dispatch.calls() {
		println!(
			"Bridge call {:?}.{:?} tagged: {}",
			call.module_id,
			call.method_id,
			tagged_stack(&call.params).is_some()
		);
	}

	println!("Native records: {:?}", native.records());
	tokio::task::yield_now().await;
	println!("Script messages: {:?}", script.messages());
	Ok(())
}
