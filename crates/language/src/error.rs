//! Error types for syntax lookups.

use thiserror::Error;

/// Errors produced while parsing a scope selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
	/// A comma-separated alternative has no scope terms.
	#[error("empty alternative in selector '{selector}'")]
	EmptyAlternative { selector: String },

	/// A `-` exclusion is not followed by a scope.
	#[error("exclusion without a scope in selector '{selector}'")]
	DanglingExclusion { selector: String },

	/// Grouping and other operators are not supported.
	#[error("unsupported character '{ch}' in selector '{selector}'")]
	UnsupportedCharacter { ch: char, selector: String },
}
