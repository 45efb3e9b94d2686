// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting facade for hybrid apps.
//!
//! A hybrid app runs script code that talks to native code over a message
//! bridge. [`CrashBridge`] fronts two interchangeable backends:
//!
//! - [`NativeBackend`] delegates to the platform's native crash reporter and,
//!   once the reporter confirms stack-trace merging, tags every outgoing bridge
//!   call with a script stack snapshot ([`StackTaggingDispatch`]) so native
//!   crashes can be traced to the script frame that caused them
//! - [`ScriptedBackend`] delegates to a script-level exception reporter
//!
//! The backend is chosen once, at [`CrashBridge::install`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use loom_crash_bridge::{Bridge, CrashBridge, Environment, Options};
//!
//! let env = Environment::builder(script_reporter, Arc::new(Bridge::new(dispatch)))
//!     .native(native_reporter)
//!     .build();
//!
//! let bridge = CrashBridge::new(env);
//! bridge
//!     .configure("https://public@sentry.example.com/1", Options::default())?
//!     .install()?;
//! bridge.capture_message("checkout failed", None)?;
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod facade;
pub mod global;
pub mod interceptor;
pub mod memory;
pub mod merging;
pub mod native;
pub mod plugin;
pub mod scripted;
pub mod stack;
mod task;

pub use backend::{Backend, BackendKind};
pub use bridge::{Bridge, BridgeCallback, Dispatch, NativeCall, SharedDispatch};
pub use config::Configuration;
pub use diagnostics::{DiagnosticLogger, DiagnosticSink, SharedDiagnosticSink, TracingSink};
pub use environment::{Environment, EnvironmentBuilder};
pub use facade::CrashBridge;
pub use interceptor::{stack_param, tagged_stack, StackTaggingDispatch, STACK_PARAM_KEY};
pub use merging::StacktraceMerging;
pub use native::{NativeBackend, NativeReporter, SharedNativeReporter};
pub use plugin::BridgeContextPlugin;
pub use scripted::{
	script_level, ScriptMessageOptions, ScriptPlugin, ScriptReporter, ScriptedBackend,
	SharedScriptPlugin, SharedScriptReporter,
};
pub use stack::{BacktraceStackProvider, SharedStackProvider, StackFrame, StackProvider};

pub use loom_crash_bridge_core::{
	context_map, ContextKind, ContextMap, CrashBridgeError, Dsn, LogLevel, MessageOptions,
	ModuleDescriptor, ModuleFilter, ModuleId, MethodId, NativeOptions, Options, Result,
	ScriptedOptions, Severity,
};
