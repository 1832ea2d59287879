//! Syntax rules and their priority-ordered collection.

use autosyntax_language::{Selector, SyntaxInfo};
use rustc_hash::FxHashSet as HashSet;

use crate::event::EventKind;
use crate::eval::EvalContext;
use crate::matches::Match;

/// Binds a scope gate, an event filter and a match tree to a target syntax.
#[derive(Debug, Clone)]
pub struct SyntaxRule {
	/// Free-form description, used in diagnostics.
	pub comment: String,
	/// Syntax-likes the rule was configured with.
	pub syntaxes: Vec<String>,
	/// Resolved target; `None` when no syntax-like resolved.
	pub syntax: Option<SyntaxInfo>,
	/// Scope gate over the current syntax. `None` when the configured
	/// selector failed to parse; such a rule never fires.
	pub selector: Option<Selector>,
	/// `None` fires on any event; an empty set never fires.
	pub on_events: Option<HashSet<EventKind>>,
	pub root: Option<Match>,
}

impl SyntaxRule {
	/// A rule with the empty selector that fires on any event.
	pub fn new(syntax: SyntaxInfo, root: Match) -> Self {
		Self {
			comment: String::new(),
			syntaxes: vec![syntax.name.to_string()],
			syntax: Some(syntax),
			selector: Some(Selector::default()),
			on_events: None,
			root: Some(root),
		}
	}

	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = comment.into();
		self
	}

	pub fn with_selector(mut self, selector: Selector) -> Self {
		self.selector = Some(selector);
		self
	}

	pub fn on_events(mut self, events: impl IntoIterator<Item = EventKind>) -> Self {
		self.on_events = Some(events.into_iter().collect());
		self
	}

	pub fn is_droppable(&self) -> bool {
		self.syntax.is_none() || self.on_events.as_ref().is_some_and(|events| events.is_empty()) || self.root.is_none()
	}

	/// Whether the event filter admits `event`. A missing event is admitted.
	pub fn accepts_event(&self, event: Option<EventKind>) -> bool {
		match (event, &self.on_events) {
			(Some(event), Some(events)) => events.contains(&event),
			_ => true,
		}
	}

	/// Event filter, then scope gate, then the match tree.
	pub fn test(&self, cx: &EvalContext<'_>, event: Option<EventKind>) -> bool {
		if !self.accepts_event(event) {
			return false;
		}
		let Some(selector) = &self.selector else {
			return false;
		};
		if !selector.matches(cx.snapshot.scope()) {
			return false;
		}
		self.root.as_ref().is_some_and(|root| root.test(cx))
	}
}

/// Rules in priority order; the first passing rule wins.
#[derive(Debug, Clone, Default)]
pub struct SyntaxRuleCollection {
	pub(crate) rules: Vec<SyntaxRule>,
}

impl SyntaxRuleCollection {
	pub fn new(rules: Vec<SyntaxRule>) -> Self {
		Self { rules }
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn rules(&self) -> &[SyntaxRule] {
		&self.rules
	}

	/// First rule passing for `event`; later rules are not evaluated.
	pub fn test(&self, cx: &EvalContext<'_>, event: Option<EventKind>) -> Option<&SyntaxRule> {
		self.rules.iter().find(|rule| rule.test(cx, event))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	use autosyntax_language::{LookupFilter, SyntaxLookup};

	use super::*;
	use crate::constraint::testing::catalog;
	use crate::constraint::{Constraint, ConstraintRule};
	use crate::error::ConstraintResult;
	use crate::probe::AncestryCache;
	use crate::snapshot::Snapshot;

	#[derive(Debug)]
	struct Counted {
		result: bool,
		calls: Arc<AtomicUsize>,
	}

	impl Constraint for Counted {
		fn test(&self, _cx: &EvalContext<'_>) -> ConstraintResult {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(self.result)
		}
	}

	fn syntax(name: &str) -> SyntaxInfo {
		catalog().find_first_by_like(name, LookupFilter::default()).unwrap()
	}

	fn rule(name: &str, result: bool, calls: &Arc<AtomicUsize>) -> SyntaxRule {
		let leaf = ConstraintRule::custom(
			"counted",
			Counted {
				result,
				calls: Arc::clone(calls),
			},
		);
		SyntaxRule::new(syntax(name), Match::all([leaf.into()])).with_comment(name)
	}

	fn first_match(collection: &SyntaxRuleCollection, event: Option<EventKind>) -> Option<String> {
		let snap = Snapshot::from_content("");
		let cache = AncestryCache::default();
		collection
			.test(&EvalContext::new(&snap, &cache), event)
			.map(|rule| rule.comment.clone())
	}

	#[test]
	fn test_first_matching_rule_wins() {
		let calls = Arc::new(AtomicUsize::new(0));
		let collection = SyntaxRuleCollection::new(vec![
			rule("YAML", false, &calls),
			rule("Python", true, &calls),
			rule("JSON", true, &calls),
		]);

		assert_eq!(first_match(&collection, None).as_deref(), Some("Python"));
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_reordering_exclusive_rules_keeps_outcome() {
		let calls = Arc::new(AtomicUsize::new(0));
		let a = rule("Python", true, &calls);
		let b = rule("JSON", false, &calls);

		let forward = SyntaxRuleCollection::new(vec![a.clone(), b.clone()]);
		let backward = SyntaxRuleCollection::new(vec![b, a]);
		assert_eq!(first_match(&forward, None), first_match(&backward, None));
	}

	#[test]
	fn test_event_filter() {
		let calls = Arc::new(AtomicUsize::new(0));
		let collection = SyntaxRuleCollection::new(vec![rule("Python", true, &calls).on_events([EventKind::Load])]);

		assert_eq!(first_match(&collection, Some(EventKind::Modify)), None);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert_eq!(first_match(&collection, Some(EventKind::Load)).as_deref(), Some("Python"));
		assert_eq!(first_match(&collection, None).as_deref(), Some("Python"));
	}

	#[test]
	fn test_selector_gates_on_current_scope() {
		let calls = Arc::new(AtomicUsize::new(0));
		let gated = rule("Python", true, &calls).with_selector(Selector::parse("text.plain").unwrap());
		let collection = SyntaxRuleCollection::new(vec![gated]);
		let cache = AncestryCache::default();

		let plain = Snapshot::from_content("");
		assert!(collection.test(&EvalContext::new(&plain, &cache), None).is_some());

		let json = Snapshot::from_content("").with_syntax(syntax("JSON"));
		assert!(collection.test(&EvalContext::new(&json, &cache), None).is_none());
	}

	#[test]
	fn test_droppable_rules() {
		let calls = Arc::new(AtomicUsize::new(0));
		assert!(!rule("Python", true, &calls).is_droppable());
		assert!(rule("Python", true, &calls).on_events([]).is_droppable());

		let mut no_target = rule("Python", true, &calls);
		no_target.syntax = None;
		assert!(no_target.is_droppable());

		let mut no_root = rule("Python", true, &calls);
		no_root.root = None;
		assert!(no_root.is_droppable());
	}
}
