use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use autosyntax_language::{SyntaxCatalog, SyntaxConfig, SyntaxLookup};
use autosyntax_resolver::{
	Classifier, ClassifierError, ClassifyRequest, ClassifyResponse, Document, EditHint, MemoryDocument, Outcome, PluginSettings,
	Prediction, Resolver, ResolverConfig, Stage, Trigger,
};
use autosyntax_rules::{DocumentSource, EventKind, parse_rules};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tokio::sync::Notify;

fn catalog() -> Arc<SyntaxCatalog> {
	let mut catalog = SyntaxCatalog::with_plain_text();
	catalog.register(
		SyntaxConfig::new("Python", "source.python")
			.with_extensions(&["py"])
			.with_shebangs(&["python"]),
	);
	catalog.register(
		SyntaxConfig::new("YAML", "source.yaml")
			.with_extensions(&["yaml"])
			.with_filenames(&["app"]),
	);
	catalog.register(SyntaxConfig::new("JSON", "source.json").with_extensions(&["json"]));
	Arc::new(catalog)
}

fn resolver(config: ResolverConfig) -> Resolver {
	let _ = tracing_subscriber::fmt::try_init();
	Resolver::new(catalog(), config)
}

fn syntax_name(doc: &MemoryDocument) -> Option<String> {
	doc.syntax().map(|s| s.name.to_string())
}

#[rstest]
#[case("#!/usr/bin/env python3")]
#[case("#!/usr/bin/python3.11")]
#[case("#!/usr/bin/env -S python -u")]
fn test_shebang_without_extension(#[case] shebang: &str) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("run");
	let text = format!("{shebang}\nprint('hi')\n");
	std::fs::write(&path, &text).unwrap();

	let resolver = resolver(ResolverConfig::default());
	let doc = Arc::new(MemoryDocument::new(1, text).with_path(&path));

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::ContentHeuristics));
	assert_eq!(syntax_name(&doc).as_deref(), Some("Python"));
}

#[test]
fn test_trim_suffix_from_project_settings() {
	let dir = tempfile::tempdir().unwrap();
	let settings_path = dir.path().join("autosyntax.json");
	std::fs::write(&settings_path, r#"{"trim_suffixes": [".service.yml"]}"#).unwrap();
	let file_path = dir.path().join("app.service.yml");
	std::fs::write(&file_path, "name: web\n").unwrap();

	let (project, warnings) = PluginSettings::load(&settings_path).unwrap();
	assert!(warnings.is_empty());
	let config = ResolverConfig::layered(&PluginSettings::default(), &PluginSettings::default(), &project);

	let resolver = resolver(config);
	let doc = Arc::new(MemoryDocument::new(1, "name: web\n").with_path(&file_path));

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::TrimmedFilename));
	assert_eq!(syntax_name(&doc).as_deref(), Some("YAML"));
}

#[test]
fn test_trimmed_file_name_needs_an_explicit_command_or_load() {
	let dir = tempfile::tempdir().unwrap();
	let file_path = dir.path().join("app.service.yml");
	std::fs::write(&file_path, "name: web\n").unwrap();

	let config = ResolverConfig {
		trim_suffixes: vec![".service.yml".into()],
		..ResolverConfig::default()
	};
	let resolver = resolver(config);
	let doc = Arc::new(MemoryDocument::new(1, "name: web\n").with_path(&file_path));

	assert_eq!(resolver.resolve(&doc, EventKind::Save).outcome, Outcome::NoMatch);
	assert_eq!(resolver.resolve(&doc, EventKind::Command).stage(), Some(Stage::TrimmedFilename));
}

#[test]
fn test_rule_limited_to_load_events() {
	let config = ResolverConfig {
		syntax_rules: parse_rules(
			r#"[{
				"comment": "yaml on load",
				"syntaxes": ["YAML"],
				"on_events": "load",
				"rules": [{"constraint": "first_line_contains", "args": ["key:"]}]
			}]"#,
		)
		.unwrap(),
		..ResolverConfig::default()
	};
	let resolver = resolver(config);
	let text = "key: value\n";
	let doc = Arc::new(MemoryDocument::new(1, text));

	let trigger = Trigger::for_text_change(&[EditHint { row: 0, offset: 3 }], 1, text.len()).unwrap();
	assert_eq!(resolver.resolve(&doc, trigger).outcome, Outcome::NoMatch);
	assert_eq!(syntax_name(&doc), None);

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::RuleEngine));
	assert_eq!(syntax_name(&doc).as_deref(), Some("YAML"));
}

enum Reply {
	Predict(&'static str, f64),
	Fail,
}

/// Answers every request the same way, optionally after being released.
struct ScriptedClassifier {
	reply: Reply,
	gate: Option<Arc<Notify>>,
	requests: Mutex<Vec<ClassifyRequest>>,
	answered: AtomicUsize,
}

impl ScriptedClassifier {
	fn new(reply: Reply) -> Self {
		Self {
			reply,
			gate: None,
			requests: Mutex::new(Vec::new()),
			answered: AtomicUsize::new(0),
		}
	}

	fn gated(mut self, gate: Arc<Notify>) -> Self {
		self.gate = Some(gate);
		self
	}
}

#[async_trait]
impl Classifier for ScriptedClassifier {
	async fn classify(&self, request: ClassifyRequest) -> Result<ClassifyResponse, ClassifierError> {
		self.requests.lock().push(request.clone());
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}
		self.answered.fetch_add(1, Ordering::AcqRel);
		match &self.reply {
			Reply::Predict(label, confidence) => {
				let mut response = ClassifyResponse::new(request.document, vec![Prediction {
					label: label.to_string(),
					confidence: *confidence,
				}]);
				response.attempt = Some(request.attempt);
				Ok(response)
			}
			Reply::Fail => Err(ClassifierError::Unavailable),
		}
	}
}

fn classifier_config() -> ResolverConfig {
	let mut config = ResolverConfig::default();
	config.classifier.enabled = true;
	config.classifier.confidence_threshold = 0.5;
	config.classifier.syntax_map.insert("json".into(), vec!["scope:source.json".into()]);
	config
}

fn with_classifier(classifier: Arc<ScriptedClassifier>) -> Resolver {
	let _ = tracing_subscriber::fmt::try_init();
	Resolver::builder(catalog())
		.classifier(classifier, tokio::runtime::Handle::current())
		.build(classifier_config())
}

async fn wait_until(mut done: impl FnMut() -> bool) -> bool {
	for _ in 0..200 {
		if done() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	done()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_classifier_assigns_asynchronously() {
	let classifier = Arc::new(ScriptedClassifier::new(Reply::Predict("json", 0.9)));
	let resolver = with_classifier(classifier.clone());
	let doc = Arc::new(MemoryDocument::new(7, "{\n  \"name\": \"demo\"\n}\n"));

	let resolution = resolver.resolve(&doc, EventKind::Load);
	let Outcome::Pending { attempt } = resolution.outcome else {
		panic!("expected a pending attempt, got {:?}", resolution.outcome);
	};

	assert!(wait_until(|| syntax_name(&doc).is_some()).await);
	assert_eq!(syntax_name(&doc).as_deref(), Some("JSON"));

	let requests = classifier.requests.lock();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].attempt, attempt);
	assert_eq!(requests[0].event, EventKind::Load);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_classifier_answer_after_manual_choice_is_ignored() {
	let gate = Arc::new(Notify::new());
	let classifier = Arc::new(ScriptedClassifier::new(Reply::Predict("json", 0.9)).gated(gate.clone()));
	let resolver = with_classifier(classifier.clone());
	let doc = Arc::new(MemoryDocument::new(8, "[1, 2, 3]\n"));

	assert!(matches!(
		resolver.resolve(&doc, EventKind::Load).outcome,
		Outcome::Pending { .. }
	));

	let python = catalog().find_first_by_like("Python", Default::default()).unwrap();
	assert!(doc.assign_syntax(&python));
	gate.notify_one();

	assert!(wait_until(|| classifier.answered.load(Ordering::Acquire) == 1).await);
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(syntax_name(&doc).as_deref(), Some("Python"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_classifier_failure_falls_back_to_builtin_heuristics() {
	let classifier = Arc::new(ScriptedClassifier::new(Reply::Fail));
	let resolver = with_classifier(classifier);
	let doc = Arc::new(MemoryDocument::new(9, "{\"ok\": true}"));

	assert!(matches!(
		resolver.resolve(&doc, EventKind::Command).outcome,
		Outcome::Pending { .. }
	));
	assert!(wait_until(|| syntax_name(&doc).is_some()).await);
	assert_eq!(syntax_name(&doc).as_deref(), Some("JSON"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_classifier_skipped_for_files_with_extensions() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("notes.txt");
	std::fs::write(&path, "{\"ok\": true}").unwrap();

	let classifier = Arc::new(ScriptedClassifier::new(Reply::Predict("json", 0.9)));
	let resolver = with_classifier(classifier.clone());
	let doc = Arc::new(MemoryDocument::new(10, "{\"ok\": true}").with_path(&path));

	let resolution = resolver.resolve(&doc, EventKind::Load);
	assert_eq!(resolution.stage(), Some(Stage::BuiltInHeuristics));
	assert!(classifier.requests.lock().is_empty());
}
