// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bridge interceptor that tags outgoing calls with a call-stack snapshot.
//!
//! For a call to a module outside the exclusion set, one trailing parameter
//! `{"__sentry_stack": "<stack>"}` is appended before delegating. Module and
//! method ids and both callbacks pass through untouched, so the native side
//! sees the same call with one extra argument it can strip and record.

use std::fmt;

use loom_crash_bridge_core::ModuleExclusionSet;
use serde_json::{Map, Value};

use crate::bridge::{Dispatch, NativeCall, SharedDispatch};
use crate::stack::SharedStackProvider;

/// Key of the stack parameter read by the native reporter.
pub const STACK_PARAM_KEY: &str = "__sentry_stack";

/// Build the trailing stack parameter.
pub fn stack_param(stack: String) -> Value {
	let mut entry = Map::with_capacity(1);
	entry.insert(STACK_PARAM_KEY.to_string(), Value::String(stack));
	Value::Object(entry)
}

/// Extract the stack snapshot from a tagged call's trailing parameter.
pub fn tagged_stack(params: &[Value]) -> Option<&str> {
	params.last()?.as_object()?.get(STACK_PARAM_KEY)?.as_str()
}

/// Dispatch wrapper that appends a stack snapshot to non-excluded calls.
pub struct StackTaggingDispatch {
	inner: SharedDispatch,
	excluded: ModuleExclusionSet,
	stack: SharedStackProvider,
}

impl StackTaggingDispatch {
	pub fn new(
		inner: SharedDispatch,
		excluded: ModuleExclusionSet,
		stack: SharedStackProvider,
	) -> Self {
		Self {
			inner,
			excluded,
			stack,
		}
	}

	pub fn excluded(&self) -> &ModuleExclusionSet {
		&self.excluded
	}
}

impl Dispatch for StackTaggingDispatch {
	fn enqueue_native_call(&self, mut call: NativeCall) {
		if !self.excluded.contains(call.module_id) {
			call.params.push(stack_param(self.stack.capture()));
		}
		self.inner.enqueue_native_call(call);
	}
}

impl fmt::Debug for StackTaggingDispatch {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StackTaggingDispatch")
			.field("excluded", &self.excluded)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bridge::BridgeCallback;
	use crate::memory::RecordingDispatch;
	use loom_crash_bridge_core::{MethodId, ModuleId};
	use serde_json::json;
	use std::sync::Arc;

	fn interceptor(recorder: &Arc<RecordingDispatch>, excluded: &[u32]) -> StackTaggingDispatch {
		StackTaggingDispatch::new(
			recorder.clone(),
			excluded.iter().map(|id| ModuleId(*id)).collect(),
			Arc::new(|| "Error\n    at onPress (App.js:10:3)".to_string()),
		)
	}

	#[test]
	fn excluded_module_params_pass_through_unchanged() {
		let recorder = Arc::new(RecordingDispatch::new());
		let dispatch = interceptor(&recorder, &[7]);
		let params = vec![json!(1), json!("two")];
		let buffer = params.as_ptr();

		dispatch.enqueue_native_call(NativeCall::new(ModuleId(7), MethodId(2), params));

		let calls = recorder.take_calls();
		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].params, vec![json!(1), json!("two")]);
		assert_eq!(calls[0].params.as_ptr(), buffer);
		assert_eq!(tagged_stack(&calls[0].params), None);
	}

	#[test]
	fn other_modules_get_one_trailing_stack_entry() {
		let recorder = Arc::new(RecordingDispatch::new());
		let dispatch = interceptor(&recorder, &[7]);
		let on_fail: BridgeCallback = Arc::new(|_args: Vec<Value>| {});
		let on_success: BridgeCallback = Arc::new(|_args: Vec<Value>| {});

		dispatch.enqueue_native_call(
			NativeCall::new(ModuleId(3), MethodId(9), vec![json!({"uri": "file:///a.png"})])
				.with_callbacks(Some(on_fail.clone()), Some(on_success.clone())),
		);

		let calls = recorder.calls();
		let call = &calls[0];
		assert_eq!(call.module_id, ModuleId(3));
		assert_eq!(call.method_id, MethodId(9));
		assert_eq!(call.params.len(), 2);
		assert_eq!(call.params[0], json!({"uri": "file:///a.png"}));
		assert_eq!(
			tagged_stack(&call.params),
			Some("Error\n    at onPress (App.js:10:3)")
		);
		assert!(Arc::ptr_eq(call.on_fail.as_ref().unwrap(), &on_fail));
		assert!(Arc::ptr_eq(call.on_success.as_ref().unwrap(), &on_success));
	}

	#[test]
	fn empty_exclusion_set_tags_everything() {
		let recorder = Arc::new(RecordingDispatch::new());
		let dispatch = interceptor(&recorder, &[]);

		dispatch.enqueue_native_call(NativeCall::new(ModuleId(0), MethodId(0), vec![]));

		let calls = recorder.calls();
		assert_eq!(calls[0].params.len(), 1);
		assert!(tagged_stack(&calls[0].params).is_some());
	}

	#[test]
	fn stack_param_shape() {
		assert_eq!(
			stack_param("trace".to_string()),
			json!({"__sentry_stack": "trace"})
		);
	}
}
