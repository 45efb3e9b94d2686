// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bridge module registry and the stack-tagging exclusion filter.
//!
//! Stack-trace merging tags every outgoing bridge call with the script call
//! stack, except calls to modules in the exclusion set. The set is derived
//! from a built-in deny-list of high-frequency modules plus user overrides:
//!
//! ```text
//! excluded(m) = m ∉ ignoreModulesExclude && (m ∈ DEFAULT_MODULE_IGNORES || m ∈ ignoreModulesInclude)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Modules whose bridge calls are never tagged unless the user opts them back in.
pub const DEFAULT_MODULE_IGNORES: &[&str] = &[
	"AccessibilityManager",
	"ActionSheetManager",
	"AlertManager",
	"AppState",
	"AsyncLocalStorage",
	"Clipboard",
	"DevLoadingView",
	"DevMenu",
	"ExceptionsManager",
	"I18nManager",
	"ImageEditingManager",
	"ImageStoreManager",
	"ImageViewManager",
	"IOSConstants",
	"JSCExecutor",
	"JSCSamplingProfiler",
	"KeyboardObserver",
	"LinkingManager",
	"LocationObserver",
	"NativeAnimatedModule",
	"NavigatorManager",
	"NetInfo",
	"Networking",
	"RedBox",
	"ScrollViewManager",
	"SettingsManager",
	"SourceCode",
	"StatusBarManager",
	"Timing",
	"UIManager",
	"Vibration",
	"WebSocketModule",
	"WebViewManager",
];

/// Index of a module in the bridge's remote module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl fmt::Display for ModuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Index of a method within a bridge module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MethodId(pub u32);

impl fmt::Display for MethodId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A registered bridge module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
	pub name: String,
	#[serde(default)]
	pub methods: Vec<String>,
}

impl ModuleDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			methods: Vec::new(),
		}
	}

	/// Parse one entry of a remote module config.
	///
	/// Entries are arrays shaped `[name, constants?, methods?, ...]`; only the
	/// name is required. Anything else yields `None`, matching a hole in the
	/// table.
	pub fn from_config_entry(entry: &Value) -> Option<Self> {
		let items = entry.as_array()?;
		let name = items.first()?.as_str()?;
		let methods = items
			.get(2)
			.and_then(Value::as_array)
			.map(|methods| {
				methods
					.iter()
					.filter_map(Value::as_str)
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();
		Some(Self {
			name: name.to_string(),
			methods,
		})
	}
}

/// Parse a whole remote module config (a JSON array indexed by module id).
pub fn parse_remote_module_config(config: &Value) -> Vec<Option<ModuleDescriptor>> {
	config
		.as_array()
		.map(|entries| entries.iter().map(ModuleDescriptor::from_config_entry).collect())
		.unwrap_or_default()
}

/// Module ids whose bridge calls are not stack-tagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleExclusionSet(HashSet<ModuleId>);

impl ModuleExclusionSet {
	pub fn contains(&self, id: ModuleId) -> bool {
		self.0.contains(&id)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
		self.0.iter().copied()
	}
}

impl FromIterator<ModuleId> for ModuleExclusionSet {
	fn from_iter<I: IntoIterator<Item = ModuleId>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// Decides which module names are exempt from stack tagging.
#[derive(Debug, Clone, Default)]
pub struct ModuleFilter {
	include: HashSet<String>,
	exclude: HashSet<String>,
}

impl ModuleFilter {
	/// `include` adds names to the built-in deny-list; `exclude` removes them
	/// and wins over both.
	pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
	where
		I: IntoIterator<Item = S>,
		E: IntoIterator<Item = T>,
		S: Into<String>,
		T: Into<String>,
	{
		Self {
			include: include.into_iter().map(Into::into).collect(),
			exclude: exclude.into_iter().map(Into::into).collect(),
		}
	}

	pub fn is_excluded(&self, name: &str) -> bool {
		if self.exclude.contains(name) {
			return false;
		}
		DEFAULT_MODULE_IGNORES.contains(&name) || self.include.contains(name)
	}

	/// Compute the exclusion set for a module table. `None` entries are holes
	/// and are skipped.
	pub fn exclusion_set(&self, modules: &[Option<ModuleDescriptor>]) -> ModuleExclusionSet {
		modules
			.iter()
			.enumerate()
			.filter_map(|(index, module)| {
				let module = module.as_ref()?;
				let id = ModuleId(u32::try_from(index).ok()?);
				self.is_excluded(&module.name).then_some(id)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	const NO_NAMES: [&str; 0] = [];

	#[test]
	fn deny_list_has_33_entries_without_duplicates() {
		let unique: HashSet<_> = DEFAULT_MODULE_IGNORES.iter().collect();
		assert_eq!(DEFAULT_MODULE_IGNORES.len(), 33);
		assert_eq!(unique.len(), DEFAULT_MODULE_IGNORES.len());
	}

	#[test]
	fn timing_is_excluded_by_default() {
		let filter = ModuleFilter::default();
		assert!(filter.is_excluded("Timing"));
	}

	#[test]
	fn exclude_override_beats_deny_list() {
		let filter = ModuleFilter::new(NO_NAMES, ["Timing"]);
		assert!(!filter.is_excluded("Timing"));
		assert!(filter.is_excluded("UIManager"));
	}

	#[test]
	fn include_override_extends_deny_list() {
		let filter = ModuleFilter::new(["AnalyticsModule"], NO_NAMES);
		assert!(filter.is_excluded("AnalyticsModule"));
		assert!(!filter.is_excluded("CameraModule"));
	}

	#[test]
	fn exclude_override_beats_include_override() {
		let filter = ModuleFilter::new(["AnalyticsModule"], ["AnalyticsModule"]);
		assert!(!filter.is_excluded("AnalyticsModule"));
	}

	#[test]
	fn exclusion_set_uses_ids_and_skips_holes() {
		let table = vec![
			Some(ModuleDescriptor::new("Timing")),
			None,
			Some(ModuleDescriptor::new("CameraModule")),
			Some(ModuleDescriptor::new("UIManager")),
		];
		let set = ModuleFilter::default().exclusion_set(&table);
		assert_eq!(set.len(), 2);
		assert!(set.contains(ModuleId(0)));
		assert!(!set.contains(ModuleId(1)));
		assert!(!set.contains(ModuleId(2)));
		assert!(set.contains(ModuleId(3)));
	}

	#[test]
	fn parses_remote_module_config() {
		let config = json!([
			["Timing", {}, ["createTimer", "deleteTimer"]],
			null,
			["CameraModule"],
			[42],
		]);
		let table = parse_remote_module_config(&config);
		assert_eq!(table.len(), 4);
		let timing = table[0].as_ref().unwrap();
		assert_eq!(timing.name, "Timing");
		assert_eq!(timing.methods, vec!["createTimer", "deleteTimer"]);
		assert!(table[1].is_none());
		assert_eq!(table[2].as_ref().unwrap().name, "CameraModule");
		assert!(table[3].is_none());
	}

	fn module_name() -> impl Strategy<Value = String> {
		prop_oneof![
			proptest::sample::select(DEFAULT_MODULE_IGNORES).prop_map(str::to_string),
			"[A-Z][a-zA-Z]{2,12}",
		]
	}

	proptest! {
		#[test]
		fn exclusion_is_pure_function_of_lists(
			name in module_name(),
			include in proptest::collection::vec(module_name(), 0..4),
			exclude in proptest::collection::vec(module_name(), 0..4),
		) {
			let filter = ModuleFilter::new(include.clone(), exclude.clone());
			let expected = !exclude.contains(&name)
				&& (DEFAULT_MODULE_IGNORES.contains(&name.as_str()) || include.contains(&name));
			prop_assert_eq!(filter.is_excluded(&name), expected);
		}

		#[test]
		fn exclusion_set_matches_per_name_rule(
			names in proptest::collection::vec(proptest::option::of(module_name()), 0..16),
			include in proptest::collection::vec(module_name(), 0..4),
		) {
			let filter = ModuleFilter::new(include, NO_NAMES);
			let table: Vec<_> = names.iter().map(|n| n.clone().map(ModuleDescriptor::new)).collect();
			let set = filter.exclusion_set(&table);
			for (index, name) in names.iter().enumerate() {
				let id = ModuleId(index as u32);
				let expected = name.as_deref().is_some_and(|n| filter.is_excluded(n));
				prop_assert_eq!(set.contains(id), expected);
			}
		}
	}
}
