//! Constraints over the backing file's name and path.

use std::path::Path;

use super::pattern::Pattern;
use super::{Constraint, ConstraintArgs};
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches};
use crate::eval::EvalContext;
use crate::platform::Os;
use crate::snapshot::FileIdentity;
use crate::trim::trimmed_strings;

fn on_disk<'a>(cx: &EvalContext<'a>) -> Result<&'a FileIdentity, NeverMatches> {
	cx.snapshot.file.as_ref().ok_or(NeverMatches::NotOnDisk)
}

/// `is_extension`: the file name, or any of its trimmed variants, ends with
/// one of the extensions.
#[derive(Debug, Clone)]
pub struct IsExtension {
	extensions: Vec<String>,
	case_insensitive: bool,
	trim_suffixes: Vec<String>,
}

impl IsExtension {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let case_insensitive = args.kwarg_bool("case_insensitive", cx.platform.os == Os::Windows);
		let fold = |s: String| if case_insensitive { s.to_lowercase() } else { s };
		let extensions = args
			.strings()
			.into_iter()
			.map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
			.map(fold)
			.collect();

		Self {
			extensions,
			case_insensitive,
			trim_suffixes: cx.trim_suffixes.clone(),
		}
	}
}

impl Constraint for IsExtension {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let name = cx.snapshot.file_name();
		Ok(trimmed_strings(name, &self.trim_suffixes, false).into_iter().any(|candidate| {
			let candidate = if self.case_insensitive {
				candidate.to_lowercase()
			} else {
				candidate
			};
			self.extensions.iter().any(|ext| candidate.ends_with(ext.as_str()))
		}))
	}

	fn is_droppable(&self) -> bool {
		self.extensions.is_empty()
	}
}

/// `is_name`: the file name equals one of the names.
#[derive(Debug, Clone)]
pub struct IsName {
	names: Vec<String>,
	case_insensitive: bool,
}

impl IsName {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let case_insensitive = args.kwarg_bool("case_insensitive", cx.platform.os.is_case_insensitive());
		let names = args
			.strings()
			.into_iter()
			.map(|n| if case_insensitive { n.to_lowercase() } else { n })
			.collect();
		Self { names, case_insensitive }
	}
}

impl Constraint for IsName {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let name = cx.snapshot.file_name();
		Ok(if self.case_insensitive {
			let name = name.to_lowercase();
			self.names.contains(&name)
		} else {
			self.names.iter().any(|n| n == name)
		})
	}

	fn is_droppable(&self) -> bool {
		self.names.is_empty()
	}
}

/// `name_contains`
#[derive(Debug, Clone)]
pub struct NameContains {
	needles: Vec<String>,
}

impl NameContains {
	pub fn build(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self { needles: args.strings() }
	}
}

impl Constraint for NameContains {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let name = cx.snapshot.file_name();
		Ok(self.needles.iter().any(|needle| name.contains(needle.as_str())))
	}

	fn is_droppable(&self) -> bool {
		self.needles.is_empty()
	}
}

/// `name_contains_regex`
#[derive(Debug, Clone)]
pub struct NameContainsRegex {
	pattern: Pattern,
}

impl NameContainsRegex {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self {
			pattern: Pattern::from_args(args, cx),
		}
	}
}

impl Constraint for NameContainsRegex {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		self.pattern.is_match(&on_disk(cx)?.name)
	}

	fn is_droppable(&self) -> bool {
		self.pattern.is_empty()
	}
}

/// `path_contains`: the `/`-separated path contains a needle.
#[derive(Debug, Clone)]
pub struct PathContains {
	needles: Vec<String>,
}

impl PathContains {
	pub fn build(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self { needles: args.strings() }
	}
}

impl Constraint for PathContains {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let path = cx.snapshot.file_path();
		Ok(self.needles.iter().any(|needle| path.contains(needle.as_str())))
	}

	fn is_droppable(&self) -> bool {
		self.needles.is_empty()
	}
}

/// `path_contains_regex`
#[derive(Debug, Clone)]
pub struct PathContainsRegex {
	pattern: Pattern,
}

impl PathContainsRegex {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self {
			pattern: Pattern::from_args(args, cx),
		}
	}
}

impl Constraint for PathContainsRegex {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		self.pattern.is_match(cx.snapshot.file_path())
	}

	fn is_droppable(&self) -> bool {
		self.pattern.is_empty()
	}
}

/// `relative_exists`: entries relative to the file's directory exist.
///
/// A trailing `/` asks for a directory, anything else for a regular file.
#[derive(Debug, Clone)]
pub struct RelativeExists {
	relatives: Vec<String>,
	require_all: bool,
}

impl RelativeExists {
	pub fn build(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		let require_all = args
			.kwarg("match")
			.and_then(|v| v.as_str())
			.is_some_and(|m| m.eq_ignore_ascii_case("all"));
		Self {
			relatives: args.strings(),
			require_all,
		}
	}

	fn exists(dir: &Path, relative: &str) -> bool {
		let target = dir.join(relative);
		if relative.ends_with(['/', '\\']) {
			target.is_dir()
		} else {
			target.is_file()
		}
	}
}

impl Constraint for RelativeExists {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let dir = on_disk(cx)?.parent().ok_or(NeverMatches::NotOnDisk)?;
		let mut hits = self.relatives.iter().map(|rel| Self::exists(dir, rel));
		Ok(if self.require_all {
			hits.all(|hit| hit)
		} else {
			hits.any(|hit| hit)
		})
	}

	fn is_droppable(&self) -> bool {
		self.relatives.is_empty()
	}
}
