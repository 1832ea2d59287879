//! Numeric comparisons against file size and line count.

use std::str::FromStr;

use super::args::value_to_number;
use super::{Constraint, ConstraintArgs};
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches};
use crate::eval::EvalContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
	Lt,
	Le,
	Ge,
	Gt,
	Eq,
	Ne,
}

impl Comparator {
	pub fn apply(self, lhs: f64, rhs: f64) -> bool {
		match self {
			Self::Lt => lhs < rhs,
			Self::Le => lhs <= rhs,
			Self::Ge => lhs >= rhs,
			Self::Gt => lhs > rhs,
			Self::Eq => lhs == rhs,
			Self::Ne => lhs != rhs,
		}
	}
}

impl FromStr for Comparator {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s {
			"<" | "lt" => Self::Lt,
			"<=" | "le" | "lte" => Self::Le,
			">=" | "ge" | "gte" => Self::Ge,
			">" | "gt" => Self::Gt,
			"=" | "==" | "===" | "eq" => Self::Eq,
			"!" | "!=" | "!==" | "<>" | "ne" | "neq" => Self::Ne,
			_ => return Err(()),
		})
	}
}

/// `[comparator, number]` arguments; `None` unless both are usable.
fn comparison(args: &ConstraintArgs<'_>) -> Option<(Comparator, f64)> {
	let [comparator, threshold] = args.args else {
		return None;
	};
	let comparator = comparator.as_str()?.trim().parse().ok()?;
	Some((comparator, value_to_number(threshold)?))
}

/// What a [`Compare`] constraint measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
	/// File size in bytes; the file must be on disk.
	FileSize,
	/// Document line count.
	LineCount,
}

/// `is_size` and `is_line_count`.
#[derive(Debug, Clone)]
pub struct Compare {
	metric: Metric,
	comparison: Option<(Comparator, f64)>,
}

impl Compare {
	pub fn file_size(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self {
			metric: Metric::FileSize,
			comparison: comparison(args),
		}
	}

	pub fn line_count(args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self {
			metric: Metric::LineCount,
			comparison: comparison(args),
		}
	}
}

impl Constraint for Compare {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		let (comparator, threshold) = self.comparison.ok_or(NeverMatches::InvalidConfig)?;
		let value = match self.metric {
			Metric::FileSize => cx.snapshot.file.as_ref().ok_or(NeverMatches::NotOnDisk)?.size,
			Metric::LineCount => cx.snapshot.line_count,
		};
		Ok(comparator.apply(value as f64, threshold))
	}

	fn is_droppable(&self) -> bool {
		self.comparison.is_none()
	}
}
