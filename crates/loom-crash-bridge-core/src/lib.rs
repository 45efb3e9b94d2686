// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom crash bridge.
//!
//! The crash bridge is a reporting facade for hybrid apps: a script runtime
//! talking to native code over a message bridge. It fronts two interchangeable
//! backends, a native crash reporter and a script-level exception reporter.
//! This crate holds the pure, backend-agnostic pieces shared by both:
//!
//! - [`Severity`] and [`LogLevel`], the facade's severity and diagnostic vocabularies
//! - [`Dsn`] validation
//! - [`Options`] and the [`NativeOptions`] / [`ScriptedOptions`] subsets
//! - [`ContextMap`] / [`ContextStore`] for user, tag and extra context
//! - the bridge module registry and [`ModuleFilter`], which decides which
//!   modules are exempt from stack-trace tagging

pub mod context;
pub mod dsn;
pub mod error;
pub mod level;
pub mod modules;
pub mod options;

pub use context::{context_map, ContextKind, ContextMap, ContextStore};
pub use dsn::{Dsn, REDACTED};
pub use error::{CrashBridgeError, Result};
pub use level::{LogLevel, MessageOptions, Severity};
pub use modules::{
	parse_remote_module_config, MethodId, ModuleDescriptor, ModuleExclusionSet, ModuleFilter,
	ModuleId, DEFAULT_MODULE_IGNORES,
};
pub use options::{NativeOptions, Options, OptionsBuilder, ScriptedOptions};
