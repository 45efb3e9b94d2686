// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fire-and-forget execution of the bridge's asynchronous steps.
//!
//! Nothing here is awaited by the caller: no completion signal, ordering,
//! backpressure, cancellation or timeout is provided. A context update issued
//! after a capture may reach the backend before that capture does.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error};

/// Runtime for callers that are not inside one. Built on first use and kept
/// for the life of the process; `None` if it could not be built.
static FALLBACK: OnceLock<Option<Runtime>> = OnceLock::new();

fn fallback_runtime() -> Option<&'static Runtime> {
	FALLBACK
		.get_or_init(|| {
			debug!("No tokio runtime, starting crash bridge fallback runtime");
			match Builder::new_multi_thread()
				.worker_threads(1)
				.thread_name("loom-crash-bridge")
				.enable_all()
				.build()
			{
				Ok(rt) => Some(rt),
				Err(e) => {
					error!(error = %e, "Failed to start crash bridge fallback runtime");
					None
				}
			}
		})
		.as_ref()
}

/// Run `future` to completion without blocking the caller.
///
/// Uses the current tokio runtime when there is one, otherwise a shared
/// single-worker runtime owned by this crate. Either way the future has
/// tokio's reactor and timers available.
pub(crate) fn spawn_detached<F>(name: &'static str, future: F)
where
	F: Future<Output = ()> + Send + 'static,
{
	let handle = match Handle::try_current() {
		Ok(handle) => handle,
		Err(_) => match fallback_runtime() {
			Some(rt) => rt.handle().clone(),
			None => {
				error!(task = name, "No runtime available, dropping task");
				return;
			}
		},
	};
	// The join handle is dropped: the task runs detached.
	drop(handle.spawn(future));
}
