// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use loom_crash_bridge_core::{ContextKind, ContextMap, MessageOptions};
use serde::{Deserialize, Serialize};

use crate::native::NativeBackend;
use crate::scripted::ScriptedBackend;

/// Which backend variant a facade selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
	Native,
	Scripted,
}

impl fmt::Display for BackendKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BackendKind::Native => write!(f, "native"),
			BackendKind::Scripted => write!(f, "scripted"),
		}
	}
}

/// The reporting backend chosen at install time.
pub enum Backend {
	Native(NativeBackend),
	Scripted(ScriptedBackend),
}

impl Backend {
	pub fn kind(&self) -> BackendKind {
		match self {
			Backend::Native(_) => BackendKind::Native,
			Backend::Scripted(_) => BackendKind::Scripted,
		}
	}

	pub fn as_native(&self) -> Option<&NativeBackend> {
		match self {
			Backend::Native(backend) => Some(backend),
			Backend::Scripted(_) => None,
		}
	}

	pub fn as_scripted(&self) -> Option<&ScriptedBackend> {
		match self {
			Backend::Scripted(backend) => Some(backend),
			Backend::Native(_) => None,
		}
	}

	pub fn crash(&self) -> ! {
		match self {
			Backend::Native(backend) => backend.crash(),
			Backend::Scripted(backend) => backend.crash(),
		}
	}

	pub fn native_crash(&self) {
		match self {
			Backend::Native(backend) => backend.native_crash(),
			Backend::Scripted(backend) => backend.native_crash(),
		}
	}

	pub fn set_context(&self, kind: ContextKind, values: ContextMap) {
		match (self, kind) {
			(Backend::Native(backend), ContextKind::User) => backend.set_user_context(values),
			(Backend::Native(backend), ContextKind::Tags) => backend.set_tags_context(values),
			(Backend::Native(backend), ContextKind::Extras) => backend.set_extra_context(values),
			(Backend::Scripted(backend), ContextKind::User) => backend.set_user_context(values),
			(Backend::Scripted(backend), ContextKind::Tags) => backend.set_tags_context(values),
			(Backend::Scripted(backend), ContextKind::Extras) => backend.set_extra_context(values),
		}
	}

	pub fn capture_message(&self, message: &str, options: Option<MessageOptions>) {
		match self {
			Backend::Native(backend) => backend.capture_message(message, options),
			Backend::Scripted(backend) => backend.capture_message(message, options),
		}
	}
}

impl fmt::Debug for Backend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Backend").field(&self.kind()).finish()
	}
}
