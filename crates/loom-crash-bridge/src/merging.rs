// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack-trace merging activation for the native backend.
//!
//! Native crash reports carry no script call stack. Once the native reporter
//! confirms merging is active, every outgoing bridge call to a module outside
//! the exclusion set is tagged with a stack snapshot, so a later native crash
//! can be correlated with the script frame that caused it.
//!
//! Activation is asynchronous. Calls enqueued before it completes go out
//! untagged; they are not buffered.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use loom_crash_bridge_core::{ModuleExclusionSet, ModuleFilter, NativeOptions};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::bridge::{Bridge, SharedDispatch};
use crate::interceptor::StackTaggingDispatch;
use crate::native::SharedNativeReporter;
use crate::stack::SharedStackProvider;
use crate::task::spawn_detached;

/// One-shot activation of stack-trace merging.
pub struct StacktraceMerging {
	native: SharedNativeReporter,
	bridge: Arc<Bridge>,
	stack: SharedStackProvider,
	filter: ModuleFilter,
	claimed: AtomicBool,
	excluded: RwLock<ModuleExclusionSet>,
	state: watch::Sender<bool>,
}

impl StacktraceMerging {
	pub fn new(
		native: SharedNativeReporter,
		bridge: Arc<Bridge>,
		stack: SharedStackProvider,
		options: &NativeOptions,
	) -> Self {
		let (state, _) = watch::channel(false);
		Self {
			native,
			bridge,
			stack,
			filter: ModuleFilter::new(
				options.ignore_modules_include.iter().cloned(),
				options.ignore_modules_exclude.iter().cloned(),
			),
			claimed: AtomicBool::new(false),
			excluded: RwLock::new(ModuleExclusionSet::default()),
			state,
		}
	}

	/// Run [`StacktraceMerging::activate`] as a detached task.
	pub fn start(self: &Arc<Self>) {
		let merging = Arc::clone(self);
		spawn_detached("stacktrace-merging", async move {
			merging.activate().await;
		});
	}

	/// Ask the native reporter to activate merging, then install the
	/// interceptor.
	pub async fn activate(&self) {
		debug!("Requesting stack-trace merging from native reporter");
		self.native.activate_stacktrace_merging().await;
		self.on_activated();
	}

	/// Completion handler for the native activation.
	///
	/// Installs the interceptor the first time it runs and returns `true`;
	/// later calls are no-ops returning `false`.
	pub fn on_activated(&self) -> bool {
		if self
			.claimed
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			debug!("Stack-trace merging already activated");
			return false;
		}

		let modules = self.native.remote_modules();
		let excluded = self.filter.exclusion_set(&modules);
		*self.excluded.write() = excluded.clone();

		let stack = Arc::clone(&self.stack);
		let excluded_count = excluded.len();
		self.bridge.decorate(move |inner| {
			let tagging: SharedDispatch = Arc::new(StackTaggingDispatch::new(inner, excluded, stack));
			tagging
		});
		self.state.send_replace(true);

		info!(
			modules = modules.len(),
			excluded_modules = excluded_count,
			"Stack-trace merging activated"
		);
		true
	}

	/// True once the interceptor is installed. Every call enqueued after this
	/// returns `true` is tagged.
	pub fn is_activated(&self) -> bool {
		*self.state.borrow()
	}

	/// Module ids exempt from tagging; empty until activated.
	pub fn excluded_modules(&self) -> ModuleExclusionSet {
		self.excluded.read().clone()
	}

	/// Resolve once the interceptor is installed.
	pub async fn wait_until_activated(&self) {
		let mut state = self.state.subscribe();
		// The sender lives in `self`, so the channel cannot close while we wait.
		let _ = state.wait_for(|activated| *activated).await;
	}
}

impl fmt::Debug for StacktraceMerging {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StacktraceMerging")
			.field("filter", &self.filter)
			.field("activated", &self.is_activated())
			.finish_non_exhaustive()
	}
}
