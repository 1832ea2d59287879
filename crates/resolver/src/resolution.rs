//! Results of a resolution attempt.

use std::fmt;

use autosyntax_language::SyntaxInfo;
use autosyntax_rules::EventKind;

use crate::host::DocumentId;

/// Cascade state that produced a syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
	ExecOutput,
	NewFile,
	ExplicitMarker,
	RuleEngine,
	ContentHeuristics,
	TrimmedFilename,
	ExternalClassifier,
	BuiltInHeuristics,
}

impl Stage {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ExecOutput => "exec_output",
			Self::NewFile => "new_file",
			Self::ExplicitMarker => "explicit_marker",
			Self::RuleEngine => "rule_engine",
			Self::ContentHeuristics => "content_heuristics",
			Self::TrimmedFilename => "trimmed_filename",
			Self::ExternalClassifier => "external_classifier",
			Self::BuiltInHeuristics => "builtin_heuristics",
		}
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Why an attempt did not run the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
	/// The document closed or could not be read.
	Invalid,
	Transient,
	/// The trigger required plain text and the document has another syntax.
	NotPlainText,
	/// Above `syntax_detection_size_limit`.
	TooLarge,
	/// Another attempt for the same document is running.
	InFlight,
	/// A classifier response no longer belongs to the latest attempt.
	Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Assigned { syntax: SyntaxInfo, stage: Stage },
	/// The resolved syntax is already the current one; nothing was applied.
	Unchanged { syntax: SyntaxInfo, stage: Stage },
	/// Handed to the external classifier; the answer arrives later.
	Pending { attempt: u64 },
	NoMatch,
	Skipped(SkipReason),
}

/// Outcome of one `resolve` or classifier callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
	pub document: DocumentId,
	pub event: EventKind,
	pub outcome: Outcome,
}

impl Resolution {
	pub fn new(document: DocumentId, event: EventKind, outcome: Outcome) -> Self {
		Self {
			document,
			event,
			outcome,
		}
	}

	/// The syntax the document ends up with, if this attempt decided one.
	pub fn syntax(&self) -> Option<&SyntaxInfo> {
		match &self.outcome {
			Outcome::Assigned { syntax, .. } | Outcome::Unchanged { syntax, .. } => Some(syntax),
			_ => None,
		}
	}

	pub fn stage(&self) -> Option<Stage> {
		match self.outcome {
			Outcome::Assigned { stage, .. } | Outcome::Unchanged { stage, .. } => Some(stage),
			_ => None,
		}
	}
}
