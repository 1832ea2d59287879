//! "Is this file inside a ... project" constraints.

use std::path::Path;

use super::{Constraint, ConstraintArgs};
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches};
use crate::eval::EvalContext;
use crate::probe::ProjectMarker;

/// `is_in_git_repo`, `is_in_hg_repo`, `is_in_svn_repo`,
/// `is_in_ruby_on_rails_project` and `is_in_python_django_project`.
#[derive(Debug, Clone, Copy)]
pub struct InProject {
	marker: ProjectMarker,
}

impl InProject {
	pub const fn new(marker: ProjectMarker) -> Self {
		Self { marker }
	}

	pub fn git(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self::new(ProjectMarker::Git)
	}

	pub fn mercurial(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self::new(ProjectMarker::Mercurial)
	}

	pub fn subversion(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self::new(ProjectMarker::Subversion)
	}

	pub fn ruby_on_rails(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self::new(ProjectMarker::RubyOnRails)
	}

	pub fn python_django(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self::new(ProjectMarker::PythonDjango)
	}
}

impl Constraint for InProject {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let file = cx.snapshot.file.as_ref().ok_or(NeverMatches::NotOnDisk)?;
		Ok(cx.ancestry.has_ancestor(self.marker, Path::new(&file.path)))
	}
}
