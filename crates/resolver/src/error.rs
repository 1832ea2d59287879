//! Error types for settings loading and classifier transport.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a settings layer.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a settings file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The settings are not valid JSON or have the wrong shape.
	#[error("invalid settings: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Non-fatal warning produced while reading a settings layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// A key no setting is known under.
	UnknownOption {
		/// The unrecognized key.
		key: String,
		/// A suggested alternative, if one is close enough.
		suggestion: Option<String>,
	},
}

impl std::fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnknownOption { key, suggestion } => {
				write!(f, "unknown option: {key}")?;
				if let Some(s) = suggestion {
					write!(f, " (did you mean '{s}'?)")?;
				}
				Ok(())
			}
		}
	}
}

/// Failures talking to the external classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
	/// The classifier is not running or not connected.
	#[error("classifier unavailable")]
	Unavailable,

	/// The connection closed before a response arrived.
	#[error("classifier connection closed")]
	Closed,

	#[error("classifier transport error: {0}")]
	Transport(String),
}
