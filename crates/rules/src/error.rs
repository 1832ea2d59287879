//! Error and diagnostic types for rule compilation and evaluation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort decoding rule data.
#[derive(Debug, Error)]
pub enum RuleError {
	/// The rule data is not valid JSON or does not have the rule shape.
	#[error("invalid rule data: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result type for rule decoding.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Non-fatal diagnostic produced while compiling rules.
///
/// Warnings are collected into the compile report and logged once. The
/// offending node is either dropped or evaluates as always failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
	/// No constraint is registered under this name.
	#[error("unknown constraint '{name}'{}", did_you_mean(suggestion))]
	UnknownConstraint { name: String, suggestion: Option<String> },

	/// No match combinator is known under this name.
	#[error("unknown match '{name}'{}", did_you_mean(suggestion))]
	UnknownMatch { name: String, suggestion: Option<String> },

	/// A regex argument failed to compile.
	#[error("invalid regex in '{constraint}': {error}")]
	InvalidRegex { constraint: String, error: String },

	/// A scope selector failed to parse.
	#[error("invalid selector '{selector}': {error}")]
	InvalidSelector { selector: String, error: String },

	/// None of the target syntax references resolved.
	#[error("no syntax found for {likes:?} (rule '{comment}')")]
	UnresolvedSyntax { comment: String, likes: Vec<String> },

	/// A child of `rules` is neither a constraint nor a nested match.
	#[error("malformed rule node: {node}")]
	MalformedNode { node: String },

	/// A plugin constraint reuses a built-in name.
	#[error("constraint '{name}' is already registered; keeping the first registration")]
	DuplicateConstraint { name: String },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
	suggestion
		.as_ref()
		.map(|s| format!(" (did you mean '{s}'?)"))
		.unwrap_or_default()
}

/// Reasons a constraint is vacuously false regardless of inversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NeverMatches {
	#[error("file not on disk")]
	NotOnDisk,

	#[error("document has no syntax")]
	NoSyntax,

	/// Static configuration is unusable (e.g., a regex that failed to compile).
	#[error("constraint configuration is invalid")]
	InvalidConfig,
}

/// Special evaluation outcomes that bypass the `inverted` flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
	/// The constraint passes no matter whether it is inverted.
	#[error("always true")]
	AlwaysTrue,

	/// The constraint fails no matter whether it is inverted.
	#[error(transparent)]
	Never(#[from] NeverMatches),

	/// A backing resource failed mid-evaluation; treated as `false`.
	#[error("evaluation failed: {0}")]
	Failed(String),
}

/// Result of a single constraint evaluation.
pub type ConstraintResult = std::result::Result<bool, Interrupt>;
