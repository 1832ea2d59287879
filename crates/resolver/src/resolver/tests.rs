use autosyntax_language::{SyntaxCatalog, SyntaxConfig};
use autosyntax_rules::parse_rules;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::classifier::Prediction;
use crate::host::MemoryDocument;
use crate::trigger::EditHint;

fn catalog() -> Arc<SyntaxCatalog> {
	let mut catalog = SyntaxCatalog::with_plain_text();
	catalog.register(
		SyntaxConfig::new("Python", "source.python")
			.with_extensions(&["py"])
			.with_shebangs(&["python"]),
	);
	catalog.register(SyntaxConfig::new("JSON", "source.json").with_extensions(&["json"]));
	catalog.register(SyntaxConfig::new("Build Output", "text.build-output").hidden(true));
	Arc::new(catalog)
}

fn syntax(catalog: &SyntaxCatalog, name: &str) -> SyntaxInfo {
	catalog
		.find_first_by_like(name, LookupFilter::default().hidden(true))
		.expect("registered syntax")
}

fn resolver_with(config: ResolverConfig) -> (Resolver, Arc<SyntaxCatalog>) {
	let _ = tracing_subscriber::fmt::try_init();
	let catalog = catalog();
	let resolver = Resolver::builder(catalog.clone())
		.registry(ConstraintRegistry::builtin())
		.build(config);
	(resolver, catalog)
}

fn rules(json: &str) -> ResolverConfig {
	ResolverConfig {
		syntax_rules: parse_rules(json).unwrap(),
		..ResolverConfig::default()
	}
}

fn classifier_config() -> ResolverConfig {
	let mut config = ResolverConfig::default();
	config.classifier.enabled = true;
	config.classifier.confidence_threshold = 0.5;
	config.classifier.syntax_map.insert("json".into(), vec!["JSON".into()]);
	config
}

fn doc(text: &str) -> Arc<MemoryDocument> {
	Arc::new(MemoryDocument::new(1, text))
}

fn name(resolution: &Resolution) -> Option<&str> {
	resolution.syntax().map(|s| &*s.name)
}

const PYTHON_RULE: &str = r#"[{"comment": "imports", "syntaxes": "Python", "rules": [
	{"constraint": "contains", "args": "import os"}
]}]"#;

#[test]
fn test_rule_engine_assigns() {
	let (resolver, _) = resolver_with(rules(PYTHON_RULE));
	let doc = doc("import os\nprint(os.name)\n");

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::RuleEngine));
	assert_eq!(name(&resolution), Some("Python"));
	assert_eq!(doc.syntax().map(|s| s.name), Some("Python".into()));
}

#[test]
fn test_same_syntax_is_unchanged() {
	let config = rules(r#"[{"syntaxes": "Python", "selector": "", "rules": [{"constraint": "contains", "args": "import"}]}]"#);
	let (resolver, catalog) = resolver_with(config);
	let python = syntax(&catalog, "Python");
	let doc = Arc::new(MemoryDocument::new(1, "import os").with_syntax(python.clone()));

	let resolution = resolver.resolve(&doc, EventKind::Command);
	assert_eq!(
		resolution.outcome,
		Outcome::Unchanged {
			syntax: python,
			stage: Stage::RuleEngine
		}
	);
}

#[test]
fn test_explicit_marker_falls_back_to_file_name() {
	let (resolver, _) = resolver_with(ResolverConfig::default());
	let doc = doc("# SYNTAX TEST \"Packages/Python/Python.sublime-syntax\"\nx = 1\n");

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::ExplicitMarker));
	assert_eq!(name(&resolution), Some("Python"));
}

#[test]
fn test_syntax_test_header_needs_a_syntax_file() {
	let (resolver, _) = resolver_with(ResolverConfig::default());
	let doc = doc("// SYNTAX TEST \"Python\"\nvar x = 1;\n");

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.outcome, Outcome::NoMatch);
	assert_eq!(doc.syntax(), None);
}

#[test]
fn test_exec_output_only_replaces_plain_text() {
	let mut config = ResolverConfig::default();
	config.exec_file_syntax = Some("Build Output".into());
	let (resolver, catalog) = resolver_with(config);

	let output = Arc::new(MemoryDocument::new(1, "cargo build").transient(true));
	let resolution = resolver.resolve(&output, EventKind::Exec);
	assert_eq!(resolution.stage(), Some(Stage::ExecOutput));
	assert_eq!(name(&resolution), Some("Build Output"));

	let styled = Arc::new(MemoryDocument::new(2, "").with_syntax(syntax(&catalog, "Python")));
	assert_eq!(resolver.resolve(&styled, EventKind::Exec).outcome, Outcome::NoMatch);
}

#[test]
fn test_new_file_syntax() {
	let mut config = ResolverConfig::default();
	config.new_file_syntax = Some("python".into());
	let (resolver, _) = resolver_with(config);

	let resolution = resolver.resolve(&doc(""), EventKind::New);
	assert_eq!(resolution.stage(), Some(Stage::NewFile));
	assert_eq!(name(&resolution), Some("Python"));

	let (resolver, _) = resolver_with(ResolverConfig::default());
	assert_eq!(resolver.resolve(&doc(""), EventKind::New).outcome, Outcome::NoMatch);
}

#[rstest]
#[case::transient(MemoryDocument::new(1, "import os").transient(true), Trigger::new(EventKind::Load), SkipReason::Transient)]
#[case::too_large(MemoryDocument::new(1, "import os, sys"), Trigger::new(EventKind::Load), SkipReason::TooLarge)]
#[case::not_plain(
	MemoryDocument::new(1, "import os").with_syntax(syntax(&catalog(), "JSON")),
	Trigger::new(EventKind::Modify).must_plaintext(true),
	SkipReason::NotPlainText
)]
fn test_prerequisites(#[case] document: MemoryDocument, #[case] trigger: Trigger, #[case] reason: SkipReason) {
	let mut config = rules(PYTHON_RULE);
	config.syntax_detection_size_limit = 12;
	let (resolver, _) = resolver_with(config);

	let document = Arc::new(document);
	assert_eq!(resolver.resolve(&document, trigger).outcome, Outcome::Skipped(reason));
	assert_eq!(document.syntax().map(|s| s.name), match reason {
		SkipReason::NotPlainText => Some("JSON".into()),
		_ => None,
	});
}

#[test]
fn test_closed_document_is_invalid() {
	let (resolver, _) = resolver_with(rules(PYTHON_RULE));
	let doc = doc("import os");
	doc.close();
	assert_eq!(
		resolver.resolve(&doc, EventKind::Load).outcome,
		Outcome::Skipped(SkipReason::Invalid)
	);
}

#[test]
fn test_in_flight_document_is_skipped() {
	let (resolver, _) = resolver_with(rules(PYTHON_RULE));
	let doc = doc("import os");

	let guard = InFlight::acquire(&resolver.inner.in_flight, DocumentId(1)).unwrap();
	assert_eq!(
		resolver.resolve(&doc, EventKind::Load).outcome,
		Outcome::Skipped(SkipReason::InFlight)
	);
	drop(guard);
	assert_eq!(resolver.resolve(&doc, EventKind::Load).stage(), Some(Stage::RuleEngine));
}

#[test]
fn test_modify_below_first_line_skips_content_heuristics() {
	let (resolver, _) = resolver_with(ResolverConfig::default());
	let text = "hello\nworld\n# vim: ft=python\n";
	let doc = doc(text);
	let chars = text.chars().count();

	let trigger = Trigger::for_text_change(&[EditHint { row: 2, offset: chars - 1 }], 1, chars).unwrap();
	assert_eq!(resolver.resolve(&doc, trigger).outcome, Outcome::NoMatch);

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::ContentHeuristics));
	assert_eq!(name(&resolution), Some("Python"));
}

#[test]
fn test_builtin_json_without_classifier() {
	let (resolver, _) = resolver_with(classifier_config());
	let resolution = resolver.resolve(&doc("{\"a\": [1, 2]}"), EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::BuiltInHeuristics));
	assert_eq!(name(&resolution), Some("JSON"));
}

#[test]
fn test_classification_for_latest_attempt_is_applied() {
	let (resolver, _) = resolver_with(classifier_config());
	let doc = doc("{\"a\": 1}");
	let token = resolver.begin_attempt(doc.id());

	let mut response = ClassifyResponse::new(doc.id(), vec![Prediction {
		label: "json".into(),
		confidence: 0.9,
	}]);
	response.attempt = Some(token.attempt());

	let resolution = resolver.apply_classification(doc.as_ref(), response);
	assert_eq!(resolution.event, EventKind::Command);
	assert_eq!(resolution.stage(), Some(Stage::ExternalClassifier));
	assert_eq!(name(&resolution), Some("JSON"));
}

#[test]
fn test_stale_classification_is_discarded() {
	let (resolver, _) = resolver_with(classifier_config());
	let doc = doc("{\"a\": 1}");
	let first = resolver.begin_attempt(doc.id());
	let second = resolver.begin_attempt(doc.id());
	assert!(first.is_cancelled());
	assert!(!second.is_cancelled());

	let mut response = ClassifyResponse::new(doc.id(), vec![Prediction {
		label: "json".into(),
		confidence: 0.9,
	}]);
	response.attempt = Some(first.attempt());
	let resolution = resolver.apply_classification(doc.as_ref(), response.clone());
	assert_eq!(resolution.outcome, Outcome::Skipped(SkipReason::Stale));

	response.document = DocumentId(99);
	response.attempt = Some(second.attempt());
	let resolution = resolver.apply_classification(doc.as_ref(), response);
	assert_eq!(resolution.outcome, Outcome::Skipped(SkipReason::Stale));
	assert_eq!(doc.syntax(), None);
}

#[test]
fn test_classification_after_manual_choice_is_a_no_op() {
	let (resolver, catalog) = resolver_with(classifier_config());
	let doc = Arc::new(MemoryDocument::new(1, "{}").with_syntax(syntax(&catalog, "Python")));

	let response = ClassifyResponse::new(doc.id(), vec![Prediction {
		label: "json".into(),
		confidence: 0.9,
	}]);
	let resolution = resolver.apply_classification(doc.as_ref(), response);
	assert_eq!(resolution.outcome, Outcome::Skipped(SkipReason::NotPlainText));
	assert_eq!(doc.syntax().map(|s| s.name), Some("Python".into()));
}

#[test]
fn test_weak_classification_falls_back_to_builtin() {
	let (resolver, _) = resolver_with(classifier_config());
	let doc = doc("[1, 2, 3]");

	let response = ClassifyResponse::new(doc.id(), vec![Prediction {
		label: "json".into(),
		confidence: 0.2,
	}]);
	let resolution = resolver.apply_classification(doc.as_ref(), response);
	assert_eq!(resolution.stage(), Some(Stage::BuiltInHeuristics));
}

#[test]
fn test_reload_swaps_rules() {
	let (resolver, _) = resolver_with(ResolverConfig::default());
	assert_eq!(resolver.report().rule_count, 0);
	assert_eq!(resolver.resolve(&doc("import os"), EventKind::Load).outcome, Outcome::NoMatch);

	resolver.reload(rules(PYTHON_RULE));
	assert_eq!(resolver.report().rule_count, 1);
	assert_eq!(resolver.active().config.syntax_rules.len(), 1);
	assert_eq!(
		resolver.resolve(&doc("import os"), EventKind::Load).stage(),
		Some(Stage::RuleEngine)
	);
}

#[test]
fn test_forget_cancels_pending_attempt() {
	let (resolver, _) = resolver_with(ResolverConfig::default());
	let token = resolver.begin_attempt(DocumentId(5));
	assert!(resolver.is_latest(DocumentId(5), token.attempt()));

	resolver.forget(DocumentId(5));
	assert!(token.is_cancelled());
	assert!(!resolver.is_latest(DocumentId(5), token.attempt()));
}
