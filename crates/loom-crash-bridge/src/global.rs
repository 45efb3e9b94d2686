// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide facade.
//!
//! Hosts that want a single reachable facade call [`init`] once with their
//! [`Environment`], then use the free functions. Everything else can hold a
//! [`CrashBridge`] directly.

use std::sync::OnceLock;

use loom_crash_bridge_core::{ContextMap, CrashBridgeError, LogLevel, MessageOptions, Options, Result};
use tracing::warn;

use crate::environment::Environment;
use crate::facade::CrashBridge;

static GLOBAL: OnceLock<CrashBridge> = OnceLock::new();

/// Create the process-wide facade. Later calls keep the first facade, drop
/// `env`, and return the existing one.
pub fn init(env: Environment) -> &'static CrashBridge {
	let mut created = false;
	let bridge = GLOBAL.get_or_init(|| {
		created = true;
		CrashBridge::new(env)
	});
	if !created {
		warn!("Global crash bridge already initialized, keeping the existing one");
	}
	bridge
}

pub fn get() -> Option<&'static CrashBridge> {
	GLOBAL.get()
}

fn global() -> Result<&'static CrashBridge> {
	get().ok_or(CrashBridgeError::NotInitialized)
}

pub fn configure(dsn: impl Into<String>, options: Options) -> Result<&'static CrashBridge> {
	global()?.configure(dsn, options)
}

pub fn install() -> Result<()> {
	global()?.install()
}

pub fn crash() -> Result<()> {
	global()?.crash()
}

pub fn native_crash() -> Result<()> {
	global()?.native_crash()
}

pub fn set_user_context(user: ContextMap) -> Result<()> {
	global()?.set_user_context(user)
}

pub fn set_tags_context(tags: ContextMap) -> Result<()> {
	global()?.set_tags_context(tags)
}

pub fn set_extra_context(extras: ContextMap) -> Result<()> {
	global()?.set_extra_context(extras)
}

pub fn capture_message(message: &str, options: Option<MessageOptions>) -> Result<()> {
	global()?.capture_message(message, options)
}

/// No-op until [`init`] and `configure` have run.
pub fn log(level: LogLevel, message: impl AsRef<str>) {
	if let Some(bridge) = get() {
		bridge.log(level, message);
	}
}
