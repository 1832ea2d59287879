//! Compiling rule definitions into an optimized [`SyntaxRuleCollection`].

use autosyntax_language::{LookupFilter, Selector, SyntaxLookup};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constraint::ConstraintRule;
use crate::error::RuleWarning;
use crate::event::EventKind;
use crate::matches::{MATCH_NAMES, Match, MatchKind, Node};
use crate::optimize::{Dropped, optimize};
use crate::platform::Platform;
use crate::registry::{ConstraintRegistry, suggest};
use crate::rule::{SyntaxRule, SyntaxRuleCollection};
use crate::spec::{
	ConstraintSpec, DEFAULT_MATCH, DEFAULT_SELECTOR, MatchSpec, NodeSpec, SyntaxRuleSpec, normalize_args,
};

/// Inputs shared by every factory while one collection is built.
pub struct BuildContext<'a> {
	pub lookup: &'a dyn SyntaxLookup,
	/// Platform the rules are decided for.
	pub platform: Platform,
	/// Suffixes `is_extension` strips before comparing.
	pub trim_suffixes: Vec<String>,
	warnings: Vec<RuleWarning>,
}

impl<'a> BuildContext<'a> {
	pub fn new(lookup: &'a dyn SyntaxLookup) -> Self {
		Self {
			lookup,
			platform: Platform::current(),
			trim_suffixes: Vec::new(),
			warnings: Vec::new(),
		}
	}

	pub fn with_platform(mut self, platform: Platform) -> Self {
		self.platform = platform;
		self
	}

	pub fn with_trim_suffixes(mut self, suffixes: Vec<String>) -> Self {
		self.trim_suffixes = suffixes;
		self
	}

	/// Records a diagnostic and logs it.
	pub fn warn(&mut self, warning: RuleWarning) {
		warn!(%warning, "syntax rule diagnostic");
		self.warnings.push(warning);
	}

	pub fn warnings(&self) -> &[RuleWarning] {
		&self.warnings
	}
}

/// Summary of one compile, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileReport {
	/// Rules left after optimization.
	pub rule_count: usize,
	pub dropped: Vec<Dropped>,
	pub warnings: Vec<RuleWarning>,
}

/// Compiles and optimizes `specs` into a collection.
pub fn compile(
	specs: &[SyntaxRuleSpec],
	registry: &ConstraintRegistry,
	mut cx: BuildContext<'_>,
) -> (SyntaxRuleCollection, CompileReport) {
	let mut collection = SyntaxRuleCollection::new(specs.iter().map(|spec| compile_rule(spec, registry, &mut cx)).collect());
	let dropped = optimize(&mut collection);

	let mut warnings = registry.warnings().to_vec();
	warnings.append(&mut cx.warnings);
	let report = CompileReport {
		rule_count: collection.len(),
		dropped,
		warnings,
	};
	info!(
		rules = report.rule_count,
		dropped = report.dropped.len(),
		warnings = report.warnings.len(),
		"compiled syntax rules"
	);
	(collection, report)
}

/// Compiles one rule without optimizing it.
pub fn compile_rule(spec: &SyntaxRuleSpec, registry: &ConstraintRegistry, cx: &mut BuildContext<'_>) -> SyntaxRule {
	let syntaxes = spec.syntaxes.to_vec();
	let syntax = cx.lookup.find_first_by_likes(&syntaxes, LookupFilter::default());
	if syntax.is_none() && !syntaxes.is_empty() {
		cx.warn(RuleWarning::UnresolvedSyntax {
			comment: spec.comment.clone(),
			likes: syntaxes.clone(),
		});
	}

	let source = spec.selector.as_deref().unwrap_or(DEFAULT_SELECTOR);
	let selector = match Selector::parse(source) {
		Ok(selector) => Some(selector),
		Err(err) => {
			cx.warn(RuleWarning::InvalidSelector {
				selector: source.to_string(),
				error: err.to_string(),
			});
			None
		}
	};

	let on_events = spec.on_events.as_ref().map(|names| {
		names
			.to_vec()
			.into_iter()
			.filter_map(|name| {
				let event = name.parse::<EventKind>().ok();
				if event.is_none() {
					debug!(event = %name, rule = %spec.comment, "ignoring unknown event name");
				}
				event
			})
			.collect()
	});

	SyntaxRule {
		comment: spec.comment.clone(),
		syntaxes,
		syntax,
		selector,
		on_events,
		root: Some(compile_match(&spec.root(), registry, cx)),
	}
}

pub fn compile_match(spec: &MatchSpec, registry: &ConstraintRegistry, cx: &mut BuildContext<'_>) -> Match {
	let name = spec.match_name.as_deref().unwrap_or(DEFAULT_MATCH);
	let args = normalize_args(spec.args.as_ref());
	let kind = match_kind(name, &args, cx);

	let children = spec
		.rules
		.iter()
		.filter_map(|node| compile_node(node, registry, cx))
		.collect();
	Match::new(kind, children)
}

fn compile_node(spec: &NodeSpec, registry: &ConstraintRegistry, cx: &mut BuildContext<'_>) -> Option<Node> {
	match spec {
		NodeSpec::Constraint(c) => Some(compile_constraint(c, registry, cx).into()),
		NodeSpec::Match(m) => Some(compile_match(m, registry, cx).into()),
		NodeSpec::Malformed(value) => {
			cx.warn(RuleWarning::MalformedNode { node: value.to_string() });
			None
		}
	}
}

fn compile_constraint(spec: &ConstraintSpec, registry: &ConstraintRegistry, cx: &mut BuildContext<'_>) -> ConstraintRule {
	let args = normalize_args(spec.args.as_ref());
	let kind = registry.build(&spec.constraint, &args, &spec.kwargs, cx);
	ConstraintRule::new(spec.constraint.clone(), kind, spec.inverted)
}

fn match_kind(name: &str, args: &[Value], cx: &mut BuildContext<'_>) -> MatchKind {
	let number = |idx: usize| args.get(idx).and_then(crate::constraint::args::value_to_number);
	match name {
		"all" => MatchKind::All,
		"any" => MatchKind::Any,
		"some" => MatchKind::Some(number(0).map_or(-1, |n| n.ceil() as i64)),
		"ratio" => MatchKind::Ratio {
			numerator: number(0).unwrap_or(0.0),
			denominator: number(1).unwrap_or(0.0),
		},
		other => {
			cx.warn(RuleWarning::UnknownMatch {
				name: other.to_string(),
				suggestion: suggest(other, MATCH_NAMES.into_iter()),
			});
			MatchKind::Unknown(other.to_string())
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::constraint::testing::catalog;
	use crate::probe::AncestryCache;
	use crate::snapshot::{FileIdentity, Snapshot};
	use crate::spec::parse_rules;

	const RULES: &str = r#"[
		{
			"comment": "python by extension",
			"syntaxes": ["Nope", "Python"],
			"rules": [{"constraint": "is_extension", "args": [".py"]}]
		},
		{
			"comment": "all empty",
			"syntaxes": "JSON",
			"match": "all",
			"rules": [
				{"constraint": "contains", "args": []},
				{"match": "any", "rules": []}
			]
		},
		{
			"comment": "never fires",
			"syntaxes": "YAML",
			"on_events": ["typing"],
			"rules": [{"constraint": "first_line_contains", "args": "---"}]
		},
		{
			"comment": "bad pieces",
			"syntaxes": "Unknown Syntax",
			"match": "most",
			"rules": [{"constraint": "is_extention", "args": ".x"}, 42]
		}
	]"#;

	fn compile_fixture() -> (SyntaxRuleCollection, CompileReport) {
		let catalog = catalog();
		let specs = parse_rules(RULES).unwrap();
		compile(&specs, &ConstraintRegistry::builtin(), BuildContext::new(&catalog))
	}

	#[test]
	fn test_compile_and_optimize() {
		let (collection, report) = compile_fixture();

		assert_eq!(collection.len(), 1);
		assert_eq!(report.rule_count, 1);
		let rule = &collection.rules()[0];
		assert_eq!(rule.syntax.as_ref().map(|s| &*s.name), Some("Python"));

		assert_eq!(
			report.dropped,
			vec![
				Dropped::Constraint {
					name: "contains".into(),
					inverted: false,
				},
				Dropped::Match {
					name: "any".into(),
					children: 0,
				},
				Dropped::Match {
					name: "all".into(),
					children: 0,
				},
				Dropped::Rule {
					comment: "all empty".into(),
					syntaxes: vec!["JSON".into()],
				},
				Dropped::Rule {
					comment: "never fires".into(),
					syntaxes: vec!["YAML".into()],
				},
				Dropped::Rule {
					comment: "bad pieces".into(),
					syntaxes: vec!["Unknown Syntax".into()],
				},
			]
		);
	}

	#[test]
	fn test_warnings_are_collected() {
		let (_, report) = compile_fixture();
		assert!(report.warnings.contains(&RuleWarning::UnknownMatch {
			name: "most".into(),
			suggestion: Some("some".into()),
		}));
		assert!(report.warnings.contains(&RuleWarning::UnknownConstraint {
			name: "is_extention".into(),
			suggestion: Some("is_extension".into()),
		}));
		assert!(report.warnings.contains(&RuleWarning::MalformedNode { node: "42".into() }));
		assert!(report.warnings.iter().any(|w| matches!(w, RuleWarning::UnresolvedSyntax { .. })));
	}

	#[test]
	fn test_dropped_set_is_reproducible() {
		let (_, first) = compile_fixture();
		let (_, second) = compile_fixture();
		assert_eq!(
			serde_json::to_string(&first.dropped).unwrap(),
			serde_json::to_string(&second.dropped).unwrap()
		);

		let json = serde_json::to_value(&first.dropped[0]).unwrap();
		assert_eq!(json["kind"], "constraint");
	}

	#[test]
	fn test_compiled_rule_evaluates() {
		let (collection, _) = compile_fixture();
		let cache = AncestryCache::default();
		let snap = Snapshot::from_content("print(1)").with_file(FileIdentity::new(std::path::Path::new("/t/a.py"), 8));
		let rule = collection.test(&crate::eval::EvalContext::new(&snap, &cache), Some(EventKind::Load));
		assert_eq!(rule.map(|r| r.comment.as_str()), Some("python by extension"));
	}

	#[test]
	fn test_invalid_selector_rule_never_fires() {
		let catalog = catalog();
		let specs = parse_rules(
			r#"[{"syntaxes": "Python", "selector": "text &", "rules": [{"constraint": "contains", "args": "x"}]}]"#,
		)
		.unwrap();
		let (collection, report) = compile(&specs, &ConstraintRegistry::builtin(), BuildContext::new(&catalog));

		assert_eq!(collection.len(), 1);
		assert!(matches!(report.warnings[0], RuleWarning::InvalidSelector { .. }));

		let cache = AncestryCache::default();
		let snap = Snapshot::from_content("x");
		assert!(collection.test(&crate::eval::EvalContext::new(&snap, &cache), None).is_none());
	}
}
