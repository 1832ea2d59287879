//! Constraints over the document text and its first line.

use super::pattern::{Pattern, RegexFlags, merge_literals};
use super::{Constraint, ConstraintArgs};
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches};
use crate::eval::EvalContext;

/// Reads the `threshold` keyword as a minimum occurrence count.
///
/// `None` when the keyword is not numeric.
fn threshold(args: &ConstraintArgs<'_>) -> Option<i64> {
	args.kwarg_number("threshold", 1.0).ok().map(|t| t.ceil() as i64)
}

/// `contains`: total occurrences of the needles reach `threshold`.
#[derive(Debug, Clone)]
pub struct Contains {
	needles: Vec<String>,
	threshold: Option<i64>,
}

impl Contains {
	pub fn build(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self {
			needles: args.strings(),
			threshold: threshold(args),
		}
	}
}

impl Constraint for Contains {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let Some(threshold) = self.threshold else {
			return Err(NeverMatches::InvalidConfig.into());
		};
		if threshold <= 0 {
			return Ok(true);
		}
		let content = &cx.snapshot.content;
		Ok(self
			.needles
			.iter()
			.flat_map(|needle| content.matches(needle.as_str()))
			.nth(threshold as usize - 1)
			.is_some())
	}

	fn is_droppable(&self) -> bool {
		self.needles.is_empty() || self.threshold.is_none()
	}
}

/// `contains_regex`: regex matches in the content reach `threshold`.
#[derive(Debug, Clone)]
pub struct ContainsRegex {
	pattern: Pattern,
	threshold: Option<i64>,
}

impl ContainsRegex {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self {
			pattern: Pattern::from_args(args, cx),
			threshold: threshold(args),
		}
	}
}

impl Constraint for ContainsRegex {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let regex = self.pattern.regex()?;
		let Some(threshold) = self.threshold else {
			return Err(NeverMatches::InvalidConfig.into());
		};
		if threshold <= 0 {
			return Ok(true);
		}
		Ok(regex.find_iter(&cx.snapshot.content).nth(threshold as usize - 1).is_some())
	}

	fn is_droppable(&self) -> bool {
		self.pattern.is_empty() || self.threshold.is_none()
	}
}

/// `first_line_contains`: any needle occurs in the first line.
#[derive(Debug, Clone)]
pub struct FirstLineContains {
	needles: Vec<String>,
}

impl FirstLineContains {
	pub fn build(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self { needles: args.strings() }
	}
}

impl Constraint for FirstLineContains {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let line = &cx.snapshot.first_line;
		Ok(self.needles.iter().any(|needle| line.contains(needle.as_str())))
	}

	fn is_droppable(&self) -> bool {
		self.needles.is_empty()
	}
}

/// `first_line_contains_regex`
#[derive(Debug, Clone)]
pub struct FirstLineContainsRegex {
	pattern: Pattern,
}

impl FirstLineContainsRegex {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self {
			pattern: Pattern::from_args(args, cx),
		}
	}
}

impl Constraint for FirstLineContainsRegex {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		self.pattern.is_match(&cx.snapshot.first_line)
	}

	fn is_droppable(&self) -> bool {
		self.pattern.is_empty()
	}
}

/// `is_interpreter`: a shebang or `syntax=` modeline names an interpreter.
#[derive(Debug, Clone)]
pub struct IsInterpreter {
	pattern: Pattern,
}

impl IsInterpreter {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let names = args.strings();
		if names.is_empty() {
			return Self { pattern: Pattern::Empty };
		}
		let names = merge_literals(&names);
		let pattern = format!(r"^#!.+\b{names}\b|\bsyntax={names}(?:\s|$)");
		Self {
			pattern: Pattern::compile(args.name, &pattern, RegexFlags::default(), cx),
		}
	}
}

impl Constraint for IsInterpreter {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		self.pattern.is_match(&cx.snapshot.first_line)
	}

	fn is_droppable(&self) -> bool {
		self.pattern.is_empty()
	}
}
