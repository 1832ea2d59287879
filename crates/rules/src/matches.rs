//! Boolean combinators over constraints and nested matches.
//!
//! All four kinds reduce to [`test_count`]: "at least `goal` of these
//! children pass", evaluated left to right with short-circuiting in both
//! directions.

use std::fmt;

use crate::constraint::ConstraintRule;
use crate::eval::EvalContext;

/// Names accepted for the `match` key.
pub const MATCH_NAMES: [&str; 4] = ["all", "any", "some", "ratio"];

/// Returns true once at least `goal` items pass `test`.
///
/// `goal <= 0` is trivially satisfied. At most `len - goal` failures are
/// tolerated; evaluation stops as soon as the outcome is decided either way.
pub fn test_count<T>(items: &[T], goal: i64, mut test: impl FnMut(&T) -> bool) -> bool {
	let mut goal = goal;
	if goal <= 0 {
		return true;
	}

	let mut tolerance = items.len() as i64 - goal;
	if tolerance < 0 {
		return false;
	}
	for item in items {
		if test(item) {
			goal -= 1;
			if goal == 0 {
				return true;
			}
		} else {
			tolerance -= 1;
			if tolerance < 0 {
				return false;
			}
		}
	}
	false
}

/// Smallest integer count reaching `numerator / denominator` of `len`.
///
/// Fractional goals round up: `ratio(1, 2)` over 3 children needs 2.
///
/// Integral operands are computed exactly in `i128`; operands too large for
/// that fall back to the floating point ratio.
pub fn ratio_goal(numerator: f64, denominator: f64, len: usize) -> i64 {
	let exact = (numerator.fract() == 0.0 && denominator.fract() == 0.0 && denominator != 0.0)
		.then(|| {
			let (num, den) = (numerator as i128, denominator as i128);
			let scaled = num.checked_mul(len as i128)?.checked_add(den.checked_sub(1)?)?;
			i64::try_from(scaled.div_euclid(den)).ok()
		})
		.flatten();
	exact.unwrap_or_else(|| ((numerator / denominator) * len as f64 - 1e-9).ceil() as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
	All,
	Any,
	/// At least this many children.
	Some(i64),
	/// At least this fraction of the children.
	Ratio { numerator: f64, denominator: f64 },
	/// A `match` name nothing is registered for.
	Unknown(String),
}

impl MatchKind {
	pub fn name(&self) -> &str {
		match self {
			Self::All => "all",
			Self::Any => "any",
			Self::Some(_) => "some",
			Self::Ratio { .. } => "ratio",
			Self::Unknown(name) => name,
		}
	}

	/// Whether the parameters are usable for `len` children.
	fn is_valid_for(&self, len: usize) -> bool {
		match *self {
			Self::All | Self::Any => true,
			Self::Some(count) => 0 <= count && count <= len as i64,
			Self::Ratio { numerator, denominator } => {
				denominator > 0.0 && (0.0..=1.0).contains(&(numerator / denominator))
			}
			Self::Unknown(_) => false,
		}
	}

	/// Number of passing children needed, `None` when unusable.
	pub fn goal(&self, len: usize) -> Option<i64> {
		if !self.is_valid_for(len) {
			return None;
		}
		Some(match *self {
			Self::All => len as i64,
			Self::Any => 1,
			Self::Some(count) => count,
			Self::Ratio { numerator, denominator } => ratio_goal(numerator, denominator, len),
			Self::Unknown(_) => return None,
		})
	}
}

impl fmt::Display for MatchKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Some(count) => write!(f, "some({count})"),
			Self::Ratio { numerator, denominator } => write!(f, "ratio({numerator}, {denominator})"),
			other => f.write_str(other.name()),
		}
	}
}

/// Child of a match: a constraint leaf or a nested match.
#[derive(Debug, Clone)]
pub enum Node {
	Constraint(ConstraintRule),
	Match(Match),
}

impl Node {
	pub fn test(&self, cx: &EvalContext<'_>) -> bool {
		match self {
			Self::Constraint(rule) => rule.test(cx),
			Self::Match(m) => m.test(cx),
		}
	}
}

impl From<ConstraintRule> for Node {
	fn from(rule: ConstraintRule) -> Self {
		Self::Constraint(rule)
	}
}

impl From<Match> for Node {
	fn from(m: Match) -> Self {
		Self::Match(m)
	}
}

/// A combinator over an ordered list of children.
#[derive(Debug, Clone)]
pub struct Match {
	kind: MatchKind,
	pub(crate) children: Vec<Node>,
}

impl Match {
	pub fn new(kind: MatchKind, children: Vec<Node>) -> Self {
		Self { kind, children }
	}

	pub fn all(children: impl IntoIterator<Item = Node>) -> Self {
		Self::new(MatchKind::All, children.into_iter().collect())
	}

	pub fn any(children: impl IntoIterator<Item = Node>) -> Self {
		Self::new(MatchKind::Any, children.into_iter().collect())
	}

	pub fn kind(&self) -> &MatchKind {
		&self.kind
	}

	pub fn children(&self) -> &[Node] {
		&self.children
	}

	/// Empty, or parameters out of range for the current children.
	pub fn is_droppable(&self) -> bool {
		self.children.is_empty() || !self.kind.is_valid_for(self.children.len())
	}

	pub fn test(&self, cx: &EvalContext<'_>) -> bool {
		match self.kind.goal(self.children.len()) {
			Some(goal) => test_count(&self.children, goal, |child| child.test(cx)),
			None => false,
		}
	}
}
