// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The script-to-native call bridge.
//!
//! The bridge exposes a single dispatch slot through which every outgoing
//! script-to-native call is enqueued. [`Bridge::decorate`] is the one place the
//! slot may be wrapped; the stack-trace interceptor uses it exactly once.

use std::fmt;
use std::sync::Arc;

use loom_crash_bridge_core::{MethodId, ModuleId};
use parking_lot::RwLock;
use serde_json::Value;

/// Callback invoked by the native side with the call's result arguments.
pub type BridgeCallback = Arc<dyn Fn(Vec<Value>) + Send + Sync>;

/// One outgoing call from script to native code.
#[derive(Clone)]
pub struct NativeCall {
	pub module_id: ModuleId,
	pub method_id: MethodId,
	pub params: Vec<Value>,
	pub on_fail: Option<BridgeCallback>,
	pub on_success: Option<BridgeCallback>,
}

impl NativeCall {
	pub fn new(module_id: ModuleId, method_id: MethodId, params: Vec<Value>) -> Self {
		Self {
			module_id,
			method_id,
			params,
			on_fail: None,
			on_success: None,
		}
	}

	pub fn with_callbacks(
		mut self,
		on_fail: Option<BridgeCallback>,
		on_success: Option<BridgeCallback>,
	) -> Self {
		self.on_fail = on_fail;
		self.on_success = on_success;
		self
	}
}

impl fmt::Debug for NativeCall {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NativeCall")
			.field("module_id", &self.module_id)
			.field("method_id", &self.method_id)
			.field("params", &self.params)
			.field("on_fail", &self.on_fail.is_some())
			.field("on_success", &self.on_success.is_some())
			.finish()
	}
}

/// The bridge's call-enqueuing entry point.
pub trait Dispatch: Send + Sync + 'static {
	fn enqueue_native_call(&self, call: NativeCall);
}

impl<F> Dispatch for F
where
	F: Fn(NativeCall) + Send + Sync + 'static,
{
	fn enqueue_native_call(&self, call: NativeCall) {
		self(call)
	}
}

/// Type alias for a shared dispatch function.
pub type SharedDispatch = Arc<dyn Dispatch>;

/// Holder of the bridge's mutable dispatch slot.
pub struct Bridge {
	slot: RwLock<SharedDispatch>,
}

impl Bridge {
	pub fn new(dispatch: impl Dispatch) -> Self {
		Self::from_shared(Arc::new(dispatch))
	}

	pub fn from_shared(dispatch: SharedDispatch) -> Self {
		Self {
			slot: RwLock::new(dispatch),
		}
	}

	/// Enqueue a call through whatever dispatch currently occupies the slot.
	pub fn enqueue_native_call(&self, call: NativeCall) {
		// Release the lock before dispatching so a dispatch may call back into
		// the bridge.
		let dispatch = Arc::clone(&self.slot.read());
		dispatch.enqueue_native_call(call);
	}

	/// Replace the slot with a wrapper around its current occupant.
	pub fn decorate<F>(&self, wrap: F)
	where
		F: FnOnce(SharedDispatch) -> SharedDispatch,
	{
		let mut slot = self.slot.write();
		let current = Arc::clone(&slot);
		*slot = wrap(current);
	}

	/// The dispatch currently occupying the slot.
	pub fn current(&self) -> SharedDispatch {
		Arc::clone(&self.slot.read())
	}
}

impl fmt::Debug for Bridge {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bridge").finish_non_exhaustive()
	}
}
