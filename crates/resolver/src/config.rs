//! Layered plugin settings.
//!
//! Settings come in three layers (built-in defaults shipped with the host,
//! user settings and project settings). Each [`PluginSettings`] layer leaves
//! unset what it does not override; [`ResolverConfig::layered`] folds them into
//! one resolved configuration.

use std::collections::VecDeque;
use std::path::Path;

use autosyntax_rules::{SyntaxRuleSpec, TrimOptions};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigWarning, Result};

pub const DEFAULT_TRIM_FILE_SIZE: i64 = 20_000;
pub const DEFAULT_TRIM_FIRST_LINE_LENGTH: i64 = 1_000;
pub const DEFAULT_SAMPLE_LENGTH: usize = 2_000;

const SETTING_KEYS: &[&str] = &[
	"syntax_rules",
	"trim_suffixes",
	"trim_suffixes_auto",
	"trim_file_size",
	"trim_first_line_length",
	"syntax_detection_size_limit",
	"new_file_syntax",
	"exec_file_syntax",
	"classifier",
];

const CLASSIFIER_KEYS: &[&str] = &["enabled", "confidence_threshold", "syntax_map", "sample_length"];

/// Classifier part of one settings layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
	pub enabled: Option<bool>,
	pub confidence_threshold: Option<f64>,
	pub syntax_map: Option<HashMap<String, Vec<String>>>,
	pub sample_length: Option<usize>,
}

/// One settings layer; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
	pub syntax_rules: Option<Vec<SyntaxRuleSpec>>,
	pub trim_suffixes: Option<Vec<String>>,
	pub trim_suffixes_auto: Option<bool>,
	pub trim_file_size: Option<i64>,
	pub trim_first_line_length: Option<i64>,
	pub syntax_detection_size_limit: Option<u64>,
	pub new_file_syntax: Option<String>,
	pub exec_file_syntax: Option<String>,
	pub classifier: ClassifierSettings,
}

impl PluginSettings {
	/// Decodes a layer, reporting keys no setting is known under.
	pub fn from_json(json: &str) -> Result<(Self, Vec<ConfigWarning>)> {
		let value: Value = serde_json::from_str(json)?;

		let mut warnings = unknown_keys(&value, SETTING_KEYS, "");
		if let Some(classifier) = value.get("classifier") {
			warnings.extend(unknown_keys(classifier, CLASSIFIER_KEYS, "classifier."));
		}

		Ok((serde_json::from_value(value)?, warnings))
	}

	/// Reads and decodes a layer from disk.
	pub fn load(path: &Path) -> Result<(Self, Vec<ConfigWarning>)> {
		let json = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_json(&json)
	}
}

fn unknown_keys(value: &Value, known: &[&str], prefix: &str) -> Vec<ConfigWarning> {
	let Some(object) = value.as_object() else {
		return Vec::new();
	};
	object
		.keys()
		.filter(|key| !known.contains(&key.as_str()))
		.map(|key| ConfigWarning::UnknownOption {
			key: format!("{prefix}{key}"),
			suggestion: known
				.iter()
				.map(|k| (strsim::levenshtein(key, k), *k))
				.filter(|(distance, _)| *distance <= 3)
				.min_by_key(|(distance, _)| *distance)
				.map(|(_, k)| format!("{prefix}{k}")),
		})
		.collect()
}

/// Resolved classifier settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
	pub enabled: bool,
	/// Minimum confidence of the top prediction. Negative confidences mean
	/// "unknown" and always pass.
	pub confidence_threshold: f64,
	/// Label to syntax-likes. An entry `=other` stands for the entries of
	/// label `other`.
	pub syntax_map: HashMap<String, Vec<String>>,
	/// Head and tail length of the content sample sent for classification.
	pub sample_length: usize,
}

impl Default for ClassifierConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			confidence_threshold: 0.0,
			syntax_map: HashMap::default(),
			sample_length: DEFAULT_SAMPLE_LENGTH,
		}
	}
}

impl ClassifierConfig {
	/// Expands `label` into syntax-likes, following `=label` aliases.
	///
	/// Order follows the map, depth first; every notation is visited once so
	/// alias cycles terminate.
	pub fn syntax_likes(&self, label: &str) -> Vec<String> {
		let mut visited: HashSet<&str> = HashSet::default();
		let mut out = Vec::new();
		let mut queue: VecDeque<&str> = self.entries(label).collect();

		while let Some(notation) = queue.pop_front() {
			if !visited.insert(notation) {
				continue;
			}
			match notation.strip_prefix('=') {
				Some(alias) if !alias.is_empty() => {
					for entry in self.entries(alias).rev() {
						queue.push_front(entry);
					}
				}
				_ => out.push(notation.to_string()),
			}
		}
		out
	}

	fn entries(&self, label: &str) -> impl DoubleEndedIterator<Item = &str> {
		self.syntax_map
			.get(label)
			.into_iter()
			.flatten()
			.map(String::as_str)
	}
}

/// Settings after layering, with built-in defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
	/// Project rules first, then user rules, then default rules.
	pub syntax_rules: Vec<SyntaxRuleSpec>,
	/// Non-empty, deduplicated.
	pub trim_suffixes: Vec<String>,
	pub trim_suffixes_auto: bool,
	/// Negative disables content truncation.
	pub trim_file_size: i64,
	/// Negative disables the first-line cap.
	pub trim_first_line_length: i64,
	/// Documents above this many chars are skipped; `0` is unlimited.
	pub syntax_detection_size_limit: u64,
	pub new_file_syntax: Option<String>,
	pub exec_file_syntax: Option<String>,
	pub classifier: ClassifierConfig,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			syntax_rules: Vec::new(),
			trim_suffixes: Vec::new(),
			trim_suffixes_auto: false,
			trim_file_size: DEFAULT_TRIM_FILE_SIZE,
			trim_first_line_length: DEFAULT_TRIM_FIRST_LINE_LENGTH,
			syntax_detection_size_limit: 0,
			new_file_syntax: None,
			exec_file_syntax: None,
			classifier: ClassifierConfig::default(),
		}
	}
}

impl ResolverConfig {
	/// Folds the three layers; the project layer has the highest precedence.
	pub fn layered(default: &PluginSettings, user: &PluginSettings, project: &PluginSettings) -> Self {
		let layers = [project, user, default];
		let base = Self::default();

		let syntax_rules = layers
			.iter()
			.filter_map(|layer| layer.syntax_rules.as_ref())
			.flatten()
			.cloned()
			.collect();

		let mut trim_suffixes: Vec<String> = Vec::new();
		for suffix in layers.iter().filter_map(|layer| layer.trim_suffixes.as_ref()).flatten() {
			if !suffix.is_empty() && !trim_suffixes.contains(suffix) {
				trim_suffixes.push(suffix.clone());
			}
		}

		let mut syntax_map = HashMap::default();
		for layer in layers.iter().rev() {
			if let Some(map) = &layer.classifier.syntax_map {
				syntax_map.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
			}
		}

		macro_rules! pick {
			($($field:ident).+) => {
				layers.iter().find_map(|layer| layer.$($field).+.clone())
			};
		}

		Self {
			syntax_rules,
			trim_suffixes,
			trim_suffixes_auto: pick!(trim_suffixes_auto).unwrap_or(base.trim_suffixes_auto),
			trim_file_size: pick!(trim_file_size).unwrap_or(base.trim_file_size),
			trim_first_line_length: pick!(trim_first_line_length).unwrap_or(base.trim_first_line_length),
			syntax_detection_size_limit: pick!(syntax_detection_size_limit)
				.unwrap_or(base.syntax_detection_size_limit),
			new_file_syntax: pick!(new_file_syntax),
			exec_file_syntax: pick!(exec_file_syntax),
			classifier: ClassifierConfig {
				enabled: pick!(classifier.enabled).unwrap_or(base.classifier.enabled),
				confidence_threshold: pick!(classifier.confidence_threshold)
					.unwrap_or(base.classifier.confidence_threshold),
				syntax_map,
				sample_length: pick!(classifier.sample_length).unwrap_or(base.classifier.sample_length),
			},
		}
	}

	/// A configuration from a single layer.
	pub fn from_settings(settings: &PluginSettings) -> Self {
		let empty = PluginSettings::default();
		Self::layered(settings, &empty, &empty)
	}

	pub fn trim_options(&self) -> TrimOptions {
		TrimOptions::from_settings(self.trim_file_size, self.trim_first_line_length)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn layer(json: &str) -> PluginSettings {
		PluginSettings::from_json(json).unwrap().0
	}

	#[test]
	fn test_defaults() {
		let config = ResolverConfig::from_settings(&PluginSettings::default());
		assert_eq!(config, ResolverConfig::default());
		assert_eq!(config.classifier.sample_length, 2000);
		assert_eq!(config.trim_options(), TrimOptions::default());
	}

	#[test]
	fn test_scalars_prefer_higher_layers() {
		let default = layer(r#"{"trim_file_size": 10, "trim_first_line_length": 20, "new_file_syntax": "Python"}"#);
		let user = layer(r#"{"trim_file_size": 11}"#);
		let project = layer(r#"{"trim_file_size": -1, "classifier": {"enabled": true}}"#);

		let config = ResolverConfig::layered(&default, &user, &project);
		assert_eq!(config.trim_file_size, -1);
		assert_eq!(config.trim_first_line_length, 20);
		assert_eq!(config.new_file_syntax.as_deref(), Some("Python"));
		assert!(config.classifier.enabled);
		assert_eq!(config.trim_options().content_half, None);
	}

	#[test]
	fn test_rules_concatenate_project_first() {
		let default = layer(r#"{"syntax_rules": [{"comment": "default"}]}"#);
		let user = layer(r#"{"syntax_rules": [{"comment": "user"}]}"#);
		let project = layer(r#"{"syntax_rules": [{"comment": "project a"}, {"comment": "project b"}]}"#);

		let config = ResolverConfig::layered(&default, &user, &project);
		let comments: Vec<_> = config.syntax_rules.iter().map(|r| r.comment.as_str()).collect();
		assert_eq!(comments, ["project a", "project b", "user", "default"]);
	}

	#[test]
	fn test_trim_suffixes_union_without_empties() {
		let default = layer(r#"{"trim_suffixes": [".bak", ""]}"#);
		let user = layer(r#"{"trim_suffixes": [".tmp", ".bak"]}"#);
		let project = layer(r#"{"trim_suffixes": [""]}"#);

		let config = ResolverConfig::layered(&default, &user, &project);
		assert_eq!(config.trim_suffixes, [".tmp", ".bak"]);
	}

	#[test]
	fn test_syntax_map_merges_per_label() {
		let default = layer(r#"{"classifier": {"syntax_map": {"js": ["JavaScript"], "ts": ["TypeScript"]}}}"#);
		let user = layer(r#"{"classifier": {"syntax_map": {"js": ["scope:source.js"]}}}"#);

		let config = ResolverConfig::layered(&default, &user, &PluginSettings::default());
		assert_eq!(config.classifier.syntax_map["js"], ["scope:source.js"]);
		assert_eq!(config.classifier.syntax_map["ts"], ["TypeScript"]);
	}

	#[test]
	fn test_syntax_likes_follow_aliases() {
		let config = ResolverConfig::from_settings(&layer(
			r#"{"classifier": {"syntax_map": {
				"jsx": ["=js", "JSX"],
				"js": ["JavaScript", "=ts"],
				"ts": ["TypeScript", "=js"],
				"loop": ["=loop"]
			}}}"#,
		));

		assert_eq!(config.classifier.syntax_likes("jsx"), ["JavaScript", "TypeScript", "JSX"]);
		assert_eq!(config.classifier.syntax_likes("loop"), Vec::<String>::new());
		assert_eq!(config.classifier.syntax_likes("missing"), Vec::<String>::new());
	}

	#[test]
	fn test_syntax_likes_keep_inner_equals() {
		let config = ResolverConfig::from_settings(&layer(
			r#"{"classifier": {"syntax_map": {
				"ini": ["scope:source.ini=b", "=cfg"],
				"cfg": ["Config"],
				"b": ["Wrong"]
			}}}"#,
		));

		assert_eq!(config.classifier.syntax_likes("ini"), ["scope:source.ini=b", "Config"]);
	}

	#[test]
	fn test_unknown_keys_are_reported() {
		let (_, warnings) = PluginSettings::from_json(r#"{"trim_sufixes": [], "classifier": {"enable": true}}"#).unwrap();
		assert_eq!(
			warnings,
			vec![
				ConfigWarning::UnknownOption {
					key: "trim_sufixes".into(),
					suggestion: Some("trim_suffixes".into()),
				},
				ConfigWarning::UnknownOption {
					key: "classifier.enable".into(),
					suggestion: Some("classifier.enabled".into()),
				},
			]
		);
	}

	#[test]
	fn test_load_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing.json");
		assert!(matches!(PluginSettings::load(&missing), Err(ConfigError::Io { path, .. }) if path == missing));

		let present = dir.path().join("settings.json");
		std::fs::write(&present, r#"{"trim_suffixes_auto": true}"#).unwrap();
		let (settings, warnings) = PluginSettings::load(&present).unwrap();
		assert_eq!(settings.trim_suffixes_auto, Some(true));
		assert!(warnings.is_empty());
	}

	#[test]
	fn test_bad_shape_is_an_error() {
		assert!(matches!(
			PluginSettings::from_json(r#"{"trim_file_size": "big"}"#),
			Err(ConfigError::Json(_))
		));
	}
}
