//! External classifier protocol.
//!
//! The classifier is a collaborator that guesses a language label from a
//! content sample. Transport (process lifecycle, framing) belongs to the
//! [`Classifier`] implementation; this module owns the request shape and the
//! logic turning ranked predictions into a syntax.

use async_trait::async_trait;
use autosyntax_language::{LookupFilter, SyntaxInfo, SyntaxLookup};
use autosyntax_rules::EventKind;
use autosyntax_rules::snapshot::TRUNCATION_SEPARATOR;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::heuristics::label_fits_content;
use crate::host::DocumentId;

/// Sent to the classifier for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRequest {
	pub document: DocumentId,
	/// Echoed back so stale answers can be told apart.
	pub attempt: u64,
	pub event: EventKind,
	/// Head and tail of the document.
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
	pub label: String,
	/// Negative means the classifier does not know.
	pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
	pub document: DocumentId,
	/// `None` for responses not tied to a dispatched attempt.
	#[serde(default)]
	pub attempt: Option<u64>,
	#[serde(default)]
	pub event: Option<EventKind>,
	pub predictions: Vec<Prediction>,
}

impl ClassifyResponse {
	pub fn new(document: DocumentId, predictions: Vec<Prediction>) -> Self {
		Self {
			document,
			attempt: None,
			event: None,
			predictions,
		}
	}
}

/// A language classifier reachable asynchronously.
#[async_trait]
pub trait Classifier: Send + Sync {
	async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, ClassifierError>;
}

/// Keeps `half` chars from each end of `content`.
pub fn sample(content: &str, half: usize) -> String {
	let len = content.chars().count();
	if len <= half.saturating_mul(2) {
		return content.to_string();
	}
	let head: String = content.chars().take(half).collect();
	let tail: String = content.chars().skip(len - half).collect();
	format!("{head}{TRUNCATION_SEPARATOR}{tail}")
}

/// Picks the syntax for the best prediction, with its confidence.
///
/// Only the top-ranked prediction is considered: it must clear the
/// confidence threshold, map to at least one syntax-like, fit the content
/// shape and resolve to a non-plain syntax.
pub fn resolve_predictions(
	predictions: &[Prediction],
	config: &ClassifierConfig,
	lookup: &dyn SyntaxLookup,
	content: &str,
) -> Option<(SyntaxInfo, f64)> {
	let best = predictions
		.iter()
		.max_by(|a, b| a.confidence.total_cmp(&b.confidence))?;

	if (0.0..config.confidence_threshold).contains(&best.confidence) {
		debug!(label = %best.label, confidence = best.confidence, "prediction confidence too low");
		return None;
	}
	if !label_fits_content(&best.label, content) {
		debug!(label = %best.label, "prediction does not fit the content shape");
		return None;
	}

	let likes = config.syntax_likes(&best.label);
	if likes.is_empty() {
		debug!(label = %best.label, "no syntax mapped for label");
		return None;
	}

	let syntax = lookup.find_first_by_likes(&likes, LookupFilter::default().plaintext(false));
	if syntax.is_none() {
		debug!(label = %best.label, ?likes, "no syntax found for label");
	}
	syntax.map(|syntax| (syntax, best.confidence))
}
