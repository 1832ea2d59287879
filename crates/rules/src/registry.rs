//! Name → factory registry for constraint kinds.
//!
//! The built-in kinds are always present. Other crates add kinds by submitting
//! a [`ConstraintReg`]:
//!
//! ```ignore
//! inventory::submit! {
//!     ConstraintReg::new("is_vendored", |args, cx| ConstraintKind::Custom(Arc::new(Vendored::build(args, cx))))
//! }
//! ```
//!
//! Names are looked up once while rules are built; evaluation never touches
//! the registry.

use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::build::BuildContext;
use crate::constraint::content::{Contains, ContainsRegex, FirstLineContains, FirstLineContainsRegex, IsInterpreter};
use crate::constraint::file::{
	IsExtension, IsName, NameContains, NameContainsRegex, PathContains, PathContainsRegex, RelativeExists,
};
use crate::constraint::metrics::Compare;
use crate::constraint::project::InProject;
use crate::constraint::syntax::{IsClassifierEnabled, IsHiddenSyntax, IsSyntax, SelectorMatches};
use crate::constraint::{ConstraintArgs, ConstraintKind};
use crate::error::RuleWarning;
use crate::platform::PlatformCheck;

/// Builds a constraint from its static configuration.
pub type ConstraintFactory = fn(&ConstraintArgs<'_>, &mut BuildContext<'_>) -> ConstraintKind;

type DynFactory = Arc<dyn Fn(&ConstraintArgs<'_>, &mut BuildContext<'_>) -> ConstraintKind + Send + Sync>;

/// Static registration of a constraint kind provided by another crate.
pub struct ConstraintReg {
	pub name: &'static str,
	pub factory: ConstraintFactory,
}

impl ConstraintReg {
	pub const fn new(name: &'static str, factory: ConstraintFactory) -> Self {
		Self { name, factory }
	}
}

inventory::collect!(ConstraintReg);

static BUILTINS: &[(&str, ConstraintFactory)] = &[
	("contains", |a, cx| ConstraintKind::Contains(Contains::build(a, cx))),
	("contains_regex", |a, cx| ConstraintKind::ContainsRegex(ContainsRegex::build(a, cx))),
	("first_line_contains", |a, cx| ConstraintKind::FirstLineContains(FirstLineContains::build(a, cx))),
	("first_line_contains_regex", |a, cx| {
		ConstraintKind::FirstLineContainsRegex(FirstLineContainsRegex::build(a, cx))
	}),
	("is_interpreter", |a, cx| ConstraintKind::IsInterpreter(IsInterpreter::build(a, cx))),
	("is_extension", |a, cx| ConstraintKind::IsExtension(IsExtension::build(a, cx))),
	("is_name", |a, cx| ConstraintKind::IsName(IsName::build(a, cx))),
	("name_contains", |a, cx| ConstraintKind::NameContains(NameContains::build(a, cx))),
	("name_contains_regex", |a, cx| ConstraintKind::NameContainsRegex(NameContainsRegex::build(a, cx))),
	("path_contains", |a, cx| ConstraintKind::PathContains(PathContains::build(a, cx))),
	("path_contains_regex", |a, cx| ConstraintKind::PathContainsRegex(PathContainsRegex::build(a, cx))),
	("relative_exists", |a, cx| ConstraintKind::RelativeExists(RelativeExists::build(a, cx))),
	("is_size", |a, cx| ConstraintKind::Compare(Compare::file_size(a, cx))),
	("is_line_count", |a, cx| ConstraintKind::Compare(Compare::line_count(a, cx))),
	("is_in_git_repo", |a, cx| ConstraintKind::InProject(InProject::git(a, cx))),
	("is_in_hg_repo", |a, cx| ConstraintKind::InProject(InProject::mercurial(a, cx))),
	("is_in_svn_repo", |a, cx| ConstraintKind::InProject(InProject::subversion(a, cx))),
	("is_in_ruby_on_rails_project", |a, cx| {
		ConstraintKind::InProject(InProject::ruby_on_rails(a, cx))
	}),
	("is_in_python_django_project", |a, cx| {
		ConstraintKind::InProject(InProject::python_django(a, cx))
	}),
	("is_platform", |a, cx| ConstraintKind::Platform(PlatformCheck::os(a, cx))),
	("is_arch", |a, cx| ConstraintKind::Platform(PlatformCheck::arch(a, cx))),
	("is_platform_arch", |a, cx| ConstraintKind::Platform(PlatformCheck::os_arch(a, cx))),
	("is_syntax", |a, cx| ConstraintKind::IsSyntax(IsSyntax::build(a, cx))),
	("is_hidden_syntax", |a, cx| ConstraintKind::IsHiddenSyntax(IsHiddenSyntax::build(a, cx))),
	("selector_matches", |a, cx| ConstraintKind::SelectorMatches(SelectorMatches::build(a, cx))),
	("is_classifier_enabled", |a, cx| {
		ConstraintKind::IsClassifierEnabled(IsClassifierEnabled::build(a, cx))
	}),
];

/// Maps constraint names to factories.
pub struct ConstraintRegistry {
	factories: HashMap<String, DynFactory>,
	warnings: Vec<RuleWarning>,
}

impl std::fmt::Debug for ConstraintRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names = self.names();
		names.sort_unstable();
		f.debug_struct("ConstraintRegistry")
			.field("names", &names)
			.field("warnings", &self.warnings)
			.finish()
	}
}

impl Default for ConstraintRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ConstraintRegistry {
	/// Built-in kinds only.
	pub fn builtin() -> Self {
		let mut registry = Self {
			factories: HashMap::default(),
			warnings: Vec::new(),
		};
		for &(name, factory) in BUILTINS {
			registry.factories.insert(name.to_string(), Arc::new(factory));
		}
		registry
	}

	/// Built-in kinds plus every [`ConstraintReg`] linked into the binary.
	pub fn new() -> Self {
		let mut registry = Self::builtin();
		for reg in inventory::iter::<ConstraintReg> {
			if let Err(warning) = registry.register(reg.name, reg.factory) {
				warn!(%warning, "ignoring constraint registration");
				registry.warnings.push(warning);
			}
		}
		registry
	}

	/// Adds a kind. The first registration of a name wins.
	pub fn register(
		&mut self,
		name: &str,
		factory: impl Fn(&ConstraintArgs<'_>, &mut BuildContext<'_>) -> ConstraintKind + Send + Sync + 'static,
	) -> Result<(), RuleWarning> {
		if self.factories.contains_key(name) {
			return Err(RuleWarning::DuplicateConstraint { name: name.to_string() });
		}
		self.factories.insert(name.to_string(), Arc::new(factory));
		Ok(())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}

	pub fn names(&self) -> Vec<&str> {
		self.factories.keys().map(String::as_str).collect()
	}

	/// Diagnostics raised while collecting registrations.
	pub fn warnings(&self) -> &[RuleWarning] {
		&self.warnings
	}

	/// Builds the kind registered as `name`, or [`ConstraintKind::Unknown`]
	/// with a warning.
	pub fn build(
		&self,
		name: &str,
		args: &[Value],
		kwargs: &Map<String, Value>,
		cx: &mut BuildContext<'_>,
	) -> ConstraintKind {
		match self.factories.get(name) {
			Some(factory) => factory(&ConstraintArgs::new(name, args, kwargs), cx),
			None => {
				cx.warn(RuleWarning::UnknownConstraint {
					name: name.to_string(),
					suggestion: suggest(name, self.factories.keys().map(String::as_str)),
				});
				ConstraintKind::Unknown
			}
		}
	}
}

/// Closest known name within a small edit distance.
pub(crate) fn suggest<'a>(name: &str, known: impl Iterator<Item = &'a str>) -> Option<String> {
	known
		.map(|k| (strsim::levenshtein(name, k), k))
		.filter(|(distance, _)| *distance <= 3)
		.min()
		.map(|(_, k)| k.to_string())
}
