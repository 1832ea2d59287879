//! Per-attempt evaluation state.

use crate::probe::AncestryCache;
use crate::snapshot::Snapshot;

/// Everything a constraint may look at while one resolution attempt runs.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
	pub snapshot: &'a Snapshot,
	/// Shared memo table for project ancestry probes.
	pub ancestry: &'a AncestryCache,
	/// Whether the external classifier is configured and enabled.
	pub classifier_enabled: bool,
}

impl<'a> EvalContext<'a> {
	pub fn new(snapshot: &'a Snapshot, ancestry: &'a AncestryCache) -> Self {
		Self {
			snapshot,
			ancestry,
			classifier_enabled: false,
		}
	}

	pub fn with_classifier(mut self, enabled: bool) -> Self {
		self.classifier_enabled = enabled;
		self
	}
}
