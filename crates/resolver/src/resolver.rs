//! The resolution cascade.
//!
//! [`Resolver`] is the context object hosts keep for a session. It owns the
//! active compiled rules (swapped wholesale on reload), the ancestry memo
//! table, the per-document in-flight markers and attempt counters, and the
//! optional classifier connection.
//!
//! One attempt walks these stages and stops at the first that applies:
//!
//! 1. exec output / new file defaults (for `Exec` and `New` only)
//! 2. explicit syntax test marker
//! 3. compiled syntax rules
//! 4. shebang and modelines
//! 5. trimmed file name
//! 6. external classifier (asynchronous; the cascade continues in the callback)
//! 7. built-in structured-data heuristics

use std::sync::Arc;

use arc_swap::ArcSwap;
use autosyntax_language::{LookupFilter, SyntaxInfo, SyntaxLookup, is_absent_or_plaintext};
use autosyntax_rules::{
	AncestryCache, BuildContext, CompileReport, ConstraintRegistry, DocumentSource, EvalContext, EventKind, Platform,
	Snapshot, SyntaxRuleCollection, compile,
};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

use crate::classifier::{ClassifyRequest, ClassifyResponse, Classifier, resolve_predictions, sample};
use crate::config::ResolverConfig;
use crate::heuristics;
use crate::host::{Document, DocumentId};
use crate::resolution::{Outcome, Resolution, SkipReason, Stage};
use crate::token::{AttemptClock, AttemptToken};
use crate::trigger::Trigger;

/// Configuration together with the rules compiled from it.
#[derive(Debug)]
pub struct ActiveRules {
	pub config: ResolverConfig,
	pub rules: SyntaxRuleCollection,
	pub report: CompileReport,
}

impl ActiveRules {
	fn compile(
		config: ResolverConfig,
		lookup: &dyn SyntaxLookup,
		registry: &ConstraintRegistry,
		platform: Platform,
	) -> Self {
		let cx = BuildContext::new(lookup)
			.with_platform(platform)
			.with_trim_suffixes(config.trim_suffixes.clone());
		let (rules, report) = compile(&config.syntax_rules, registry, cx);
		Self { config, rules, report }
	}
}

struct ClassifierHandle {
	classifier: Arc<dyn Classifier>,
	runtime: Handle,
}

/// Builder for [`Resolver`].
pub struct ResolverBuilder {
	lookup: Arc<dyn SyntaxLookup>,
	registry: Option<ConstraintRegistry>,
	classifier: Option<ClassifierHandle>,
	platform: Platform,
	ancestry_capacity: usize,
}

impl ResolverBuilder {
	/// Replaces the default registry (built-ins plus linked registrations).
	pub fn registry(mut self, registry: ConstraintRegistry) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Attaches a classifier; requests are spawned on `runtime`.
	pub fn classifier(mut self, classifier: Arc<dyn Classifier>, runtime: Handle) -> Self {
		self.classifier = Some(ClassifierHandle { classifier, runtime });
		self
	}

	/// Platform the `is_platform` family of constraints is decided for.
	pub fn platform(mut self, platform: Platform) -> Self {
		self.platform = platform;
		self
	}

	pub fn ancestry_capacity(mut self, capacity: usize) -> Self {
		self.ancestry_capacity = capacity;
		self
	}

	pub fn build(self, config: ResolverConfig) -> Resolver {
		let registry = self.registry.unwrap_or_default();
		let active = ActiveRules::compile(config, &*self.lookup, &registry, self.platform);
		Resolver {
			inner: Arc::new(Inner {
				lookup: self.lookup,
				registry,
				platform: self.platform,
				active: ArcSwap::from_pointee(active),
				ancestry: AncestryCache::new(self.ancestry_capacity),
				in_flight: Mutex::new(HashSet::default()),
				attempts: Mutex::new(HashMap::default()),
				clock: AttemptClock::default(),
				classifier: self.classifier,
			}),
		}
	}
}

struct Inner {
	lookup: Arc<dyn SyntaxLookup>,
	registry: ConstraintRegistry,
	platform: Platform,
	active: ArcSwap<ActiveRules>,
	ancestry: AncestryCache,
	in_flight: Mutex<HashSet<DocumentId>>,
	/// Latest attempt per document.
	attempts: Mutex<HashMap<DocumentId, AttemptToken>>,
	clock: AttemptClock,
	classifier: Option<ClassifierHandle>,
}

/// Marks a document as being resolved until dropped.
struct InFlight<'a> {
	set: &'a Mutex<HashSet<DocumentId>>,
	id: DocumentId,
}

impl<'a> InFlight<'a> {
	fn acquire(set: &'a Mutex<HashSet<DocumentId>>, id: DocumentId) -> Option<Self> {
		set.lock().insert(id).then_some(Self { set, id })
	}
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.set.lock().remove(&self.id);
	}
}

/// Session context deciding syntaxes for documents.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Resolver {
	inner: Arc<Inner>,
}

impl std::fmt::Debug for Resolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Resolver")
			.field("rules", &self.inner.active.load().report.rule_count)
			.field("classifier", &self.inner.classifier.is_some())
			.finish_non_exhaustive()
	}
}

impl Resolver {
	pub fn builder(lookup: Arc<dyn SyntaxLookup>) -> ResolverBuilder {
		ResolverBuilder {
			lookup,
			registry: None,
			classifier: None,
			platform: Platform::current(),
			ancestry_capacity: autosyntax_rules::probe::DEFAULT_CAPACITY,
		}
	}

	pub fn new(lookup: Arc<dyn SyntaxLookup>, config: ResolverConfig) -> Self {
		Self::builder(lookup).build(config)
	}

	/// Recompiles from `config` and swaps the result in. Attempts already
	/// running keep the rules they started with.
	pub fn reload(&self, config: ResolverConfig) {
		let active = ActiveRules::compile(config, &*self.inner.lookup, &self.inner.registry, self.inner.platform);
		self.inner.active.store(Arc::new(active));
		self.inner.ancestry.clear();
	}

	/// Rules and configuration currently in effect.
	pub fn active(&self) -> Arc<ActiveRules> {
		self.inner.active.load_full()
	}

	/// Diagnostics of the active compile.
	pub fn report(&self) -> CompileReport {
		self.inner.active.load().report.clone()
	}

	pub fn has_classifier(&self) -> bool {
		self.inner.classifier.is_some()
	}

	/// Drops per-document state; call when a document closes.
	pub fn forget(&self, id: DocumentId) {
		if let Some(token) = self.inner.attempts.lock().remove(&id) {
			token.cancel();
		}
	}

	/// Runs one resolution attempt for `doc`.
	pub fn resolve<D: Document + 'static>(&self, doc: &Arc<D>, trigger: impl Into<Trigger>) -> Resolution {
		let doc: Arc<dyn Document> = doc.clone();
		self.resolve_dyn(&doc, trigger.into())
	}

	pub fn resolve_dyn(&self, doc: &Arc<dyn Document>, trigger: Trigger) -> Resolution {
		let outcome = self.run(doc, trigger);
		if outcome == Outcome::NoMatch {
			debug!(doc = %doc.id(), event = %trigger.event, "no syntax matched");
		}
		Resolution::new(doc.id(), trigger.event, outcome)
	}

	/// Entry point for classifier answers.
	///
	/// Stale answers (an attempt other than the document's latest) are
	/// discarded, and so is any answer for a document that meanwhile got a
	/// non-plain syntax. When no prediction resolves, the built-in heuristics
	/// run instead.
	pub fn apply_classification(&self, doc: &dyn Document, response: ClassifyResponse) -> Resolution {
		let event = response.event.unwrap_or(EventKind::Command);
		let outcome = self.classification_outcome(doc, &response, event);
		Resolution::new(doc.id(), event, outcome)
	}

	fn run(&self, doc: &Arc<dyn Document>, trigger: Trigger) -> Outcome {
		let id = doc.id();
		if !doc.is_valid() {
			return Outcome::Skipped(SkipReason::Invalid);
		}
		let Some(_guard) = InFlight::acquire(&self.inner.in_flight, id) else {
			debug!(doc = %id, event = %trigger.event, "resolution already in flight");
			return Outcome::Skipped(SkipReason::InFlight);
		};

		let active = self.inner.active.load_full();
		let config = &active.config;
		let event = trigger.event;

		if event == EventKind::Exec {
			return self.exec_output(doc.as_ref(), config, event);
		}
		if let Some(reason) = prerequisites(doc.as_ref(), &trigger, config) {
			trace!(doc = %id, %event, ?reason, "skipping resolution");
			return Outcome::Skipped(reason);
		}
		if event == EventKind::New {
			return self.new_file(doc.as_ref(), config, event);
		}

		let Some(snapshot) = Snapshot::capture(&**doc, &config.trim_options()) else {
			return Outcome::Skipped(SkipReason::Invalid);
		};
		let token = self.begin_attempt(id);

		if let Some((stage, syntax)) = self.local_stages(&active, &snapshot, &trigger) {
			return assign(doc.as_ref(), syntax, stage, event);
		}

		if let Some(handle) = self.classifier_for(config, &snapshot, event) {
			return self.dispatch(handle, doc, &snapshot, config, token, event);
		}

		self.builtin_or_no_match(doc.as_ref(), &snapshot, event)
	}

	fn begin_attempt(&self, id: DocumentId) -> AttemptToken {
		let token = AttemptToken::new(id, self.inner.clock.next());
		if let Some(previous) = self.inner.attempts.lock().insert(id, token.clone()) {
			previous.cancel();
		}
		token
	}

	fn is_latest(&self, id: DocumentId, attempt: u64) -> bool {
		self.inner
			.attempts
			.lock()
			.get(&id)
			.is_some_and(|token| token.attempt() == attempt)
	}

	fn exec_output(&self, doc: &dyn Document, config: &ResolverConfig, event: EventKind) -> Outcome {
		let syntax = config
			.exec_file_syntax
			.as_deref()
			.filter(|_| is_absent_or_plaintext(doc.syntax().as_ref()))
			.and_then(|like| {
				self.inner
					.lookup
					.find_first_by_like(like, LookupFilter::default().hidden(true))
			});
		match syntax {
			Some(syntax) => assign(doc, syntax, Stage::ExecOutput, event),
			None => Outcome::NoMatch,
		}
	}

	fn new_file(&self, doc: &dyn Document, config: &ResolverConfig, event: EventKind) -> Outcome {
		let syntax = config.new_file_syntax.as_deref().and_then(|like| {
			self.inner
				.lookup
				.find_first_by_like(like, LookupFilter::default().plaintext(false))
		});
		match syntax {
			Some(syntax) => assign(doc, syntax, Stage::NewFile, event),
			None => Outcome::NoMatch,
		}
	}

	/// Synchronous stages, first hit wins.
	fn local_stages(&self, active: &ActiveRules, snapshot: &Snapshot, trigger: &Trigger) -> Option<(Stage, SyntaxInfo)> {
		let event = trigger.event;
		let found = self
			.explicit_marker(snapshot)
			.map(|syntax| (Stage::ExplicitMarker, syntax))
			.or_else(|| self.rule_engine(active, snapshot, event).map(|syntax| (Stage::RuleEngine, syntax)))
			.or_else(|| {
				self.content_heuristics(snapshot, trigger)
					.map(|syntax| (Stage::ContentHeuristics, syntax))
			})
			.or_else(|| {
				self.trimmed_filename(&active.config, snapshot, event)
					.map(|syntax| (Stage::TrimmedFilename, syntax))
			});
		if found.is_none() {
			trace!(%event, file = snapshot.file_name(), "no local stage applied");
		}
		found
	}

	fn explicit_marker(&self, snapshot: &Snapshot) -> Option<SyntaxInfo> {
		if !is_absent_or_plaintext(snapshot.syntax.as_ref()) {
			return None;
		}
		let like = heuristics::syntax_test_marker(&snapshot.first_line)?;
		let file_name = like.rsplit('/').next().unwrap_or(like);
		let filter = LookupFilter::default().hidden(true);
		self.inner
			.lookup
			.find_first_by_like(like, filter)
			.or_else(|| self.inner.lookup.find_first_by_like(file_name, filter))
	}

	fn rule_engine(&self, active: &ActiveRules, snapshot: &Snapshot, event: EventKind) -> Option<SyntaxInfo> {
		let cx = EvalContext::new(snapshot, &self.inner.ancestry).with_classifier(active.config.classifier.enabled);
		let rule = active.rules.test(&cx, Some(event))?;
		debug!(rule = %rule.comment, %event, "syntax rule matched");
		rule.syntax.clone()
	}

	/// Shebang, first-line patterns and modelines. A `Modify` only counts
	/// when the edit touched the first line.
	fn content_heuristics(&self, snapshot: &Snapshot, trigger: &Trigger) -> Option<SyntaxInfo> {
		if trigger.event == EventKind::Modify && !trigger.edits_first_line() {
			return None;
		}
		let plain = is_absent_or_plaintext(snapshot.syntax.as_ref());
		let lookup = &*self.inner.lookup;

		let shebang_applies = plain || !snapshot.file_name().contains('.') || snapshot.first_line.starts_with("#!");
		let by_shebang = shebang_applies
			.then(|| heuristics::first_line_syntax(lookup, &snapshot.first_line))
			.flatten();
		by_shebang.or_else(|| {
			plain
				.then(|| heuristics::modeline_syntax(lookup, &snapshot.content))
				.flatten()
		})
	}

	fn trimmed_filename(&self, config: &ResolverConfig, snapshot: &Snapshot, event: EventKind) -> Option<SyntaxInfo> {
		if !matches!(event, EventKind::Command | EventKind::Load) || !is_absent_or_plaintext(snapshot.syntax.as_ref()) {
			return None;
		}
		let file = snapshot.file.as_ref()?;
		heuristics::trimmed_candidates(&file.name, &config.trim_suffixes, config.trim_suffixes_auto)
			.into_iter()
			.find_map(|candidate| {
				let syntax = self.inner.lookup.find_for_file(&candidate, "")?;
				trace!(original = %file.name, %candidate, %syntax, "trimmed file name matched");
				(!syntax.is_plaintext()).then_some(syntax)
			})
	}

	fn classifier_for(&self, config: &ResolverConfig, snapshot: &Snapshot, event: EventKind) -> Option<&ClassifierHandle> {
		let handle = self.inner.classifier.as_ref()?;
		let wanted = config.classifier.enabled
			&& matches!(
				event,
				EventKind::Command | EventKind::Load | EventKind::Modify | EventKind::Paste
			)
			&& is_absent_or_plaintext(snapshot.syntax.as_ref())
			&& (event == EventKind::Command || !snapshot.file_name().contains('.'))
			&& (event != EventKind::Modify || snapshot.content.contains('\n'));
		wanted.then_some(handle)
	}

	fn dispatch(
		&self,
		handle: &ClassifierHandle,
		doc: &Arc<dyn Document>,
		snapshot: &Snapshot,
		config: &ResolverConfig,
		token: AttemptToken,
		event: EventKind,
	) -> Outcome {
		let attempt = token.attempt();
		let request = ClassifyRequest {
			document: token.document(),
			attempt,
			event,
			content: sample(&snapshot.content, config.classifier.sample_length),
		};
		debug!(doc = %token.document(), attempt, %event, "dispatching classifier request");

		let classifier = Arc::clone(&handle.classifier);
		let resolver = self.clone();
		let doc = Arc::clone(doc);
		handle.runtime.spawn(async move {
			let response = tokio::select! {
				biased;
				_ = token.cancelled() => {
					debug!(doc = %token.document(), attempt, "classifier request superseded");
					return;
				}
				response = classifier.classify(request) => response,
			};
			let resolution = match response {
				Ok(mut response) => {
					response.attempt.get_or_insert(attempt);
					response.event.get_or_insert(event);
					resolver.apply_classification(doc.as_ref(), response)
				}
				Err(error) => {
					warn!(doc = %token.document(), attempt, %error, "classifier request failed");
					let empty = ClassifyResponse {
						document: token.document(),
						attempt: Some(attempt),
						event: Some(event),
						predictions: Vec::new(),
					};
					resolver.apply_classification(doc.as_ref(), empty)
				}
			};
			trace!(doc = %resolution.document, outcome = ?resolution.outcome, "classifier callback finished");
		});

		Outcome::Pending { attempt }
	}

	fn classification_outcome(&self, doc: &dyn Document, response: &ClassifyResponse, event: EventKind) -> Outcome {
		let id = doc.id();
		if response.document != id {
			warn!(doc = %id, response = %response.document, "classifier response for another document");
			return Outcome::Skipped(SkipReason::Stale);
		}
		if let Some(attempt) = response.attempt
			&& !self.is_latest(id, attempt)
		{
			debug!(doc = %id, attempt, "discarding stale classifier response");
			return Outcome::Skipped(SkipReason::Stale);
		}
		if !doc.is_valid() {
			return Outcome::Skipped(SkipReason::Invalid);
		}
		if !is_absent_or_plaintext(doc.syntax().as_ref()) {
			debug!(doc = %id, "document resolved meanwhile; ignoring classifier response");
			return Outcome::Skipped(SkipReason::NotPlainText);
		}

		let active = self.inner.active.load_full();
		let Some(snapshot) = Snapshot::capture(doc, &active.config.trim_options()) else {
			return Outcome::Skipped(SkipReason::Invalid);
		};

		let predicted = resolve_predictions(
			&response.predictions,
			&active.config.classifier,
			&*self.inner.lookup,
			&snapshot.content,
		);
		match predicted {
			Some((syntax, confidence)) => {
				debug!(doc = %id, %syntax, confidence, "classifier prediction accepted");
				assign(doc, syntax, Stage::ExternalClassifier, event)
			}
			None => self.builtin_or_no_match(doc, &snapshot, event),
		}
	}

	fn builtin_or_no_match(&self, doc: &dyn Document, snapshot: &Snapshot, event: EventKind) -> Outcome {
		if !is_absent_or_plaintext(snapshot.syntax.as_ref()) {
			return Outcome::NoMatch;
		}
		match heuristics::builtin_syntax(&*self.inner.lookup, snapshot) {
			Some(syntax) => assign(doc, syntax, Stage::BuiltInHeuristics, event),
			None => Outcome::NoMatch,
		}
	}
}

/// Gates every attempt except `Exec`.
fn prerequisites(doc: &dyn Document, trigger: &Trigger, config: &ResolverConfig) -> Option<SkipReason> {
	if doc.is_transient() {
		return Some(SkipReason::Transient);
	}
	if trigger.must_plaintext && !is_absent_or_plaintext(doc.syntax().as_ref()) {
		return Some(SkipReason::NotPlainText);
	}
	let limit = config.syntax_detection_size_limit;
	if limit != 0 && doc.char_count() as u64 > limit {
		return Some(SkipReason::TooLarge);
	}
	None
}

/// Applies `syntax` unless the document already has it.
fn assign(doc: &dyn Document, syntax: SyntaxInfo, stage: Stage, event: EventKind) -> Outcome {
	if doc.syntax().is_some_and(|current| current.id == syntax.id) {
		debug!(doc = %doc.id(), %event, %stage, %syntax, "syntax unchanged");
		return Outcome::Unchanged { syntax, stage };
	}
	if !doc.assign_syntax(&syntax) {
		return Outcome::Skipped(SkipReason::Invalid);
	}
	info!(doc = %doc.id(), %event, %stage, %syntax, "assigned syntax");
	Outcome::Assigned { syntax, stage }
}

#[cfg(test)]
mod tests;
