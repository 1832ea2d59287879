//! Leaf predicates.
//!
//! Built-in kinds are variants of [`ConstraintKind`] so evaluation dispatches
//! on a concrete value. Kinds registered by other crates (see
//! [`crate::registry`]) travel as [`ConstraintKind::Custom`].

pub(crate) mod args;
pub mod content;
pub mod file;
pub mod metrics;
pub mod pattern;
pub mod project;
pub mod syntax;

use std::fmt;
use std::sync::Arc;

use tracing::{trace, warn};

pub use self::args::ConstraintArgs;
use self::content::{Contains, ContainsRegex, FirstLineContains, FirstLineContainsRegex, IsInterpreter};
use self::file::{IsExtension, IsName, NameContains, NameContainsRegex, PathContains, PathContainsRegex, RelativeExists};
use self::metrics::Compare;
use self::project::InProject;
use self::syntax::{IsClassifierEnabled, IsHiddenSyntax, IsSyntax, SelectorMatches};
use crate::error::{ConstraintResult, Interrupt, NeverMatches};
use crate::eval::EvalContext;
use crate::platform::PlatformCheck;

/// A predicate over one [`EvalContext`].
pub trait Constraint: fmt::Debug + Send + Sync {
	/// Evaluates the predicate; interrupts bypass the `inverted` flag.
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult;

	/// True when the static configuration guarantees this contributes nothing.
	fn is_droppable(&self) -> bool {
		false
	}
}

/// Every constraint kind the engine knows how to evaluate.
#[derive(Debug, Clone)]
pub enum ConstraintKind {
	Contains(Contains),
	ContainsRegex(ContainsRegex),
	FirstLineContains(FirstLineContains),
	FirstLineContainsRegex(FirstLineContainsRegex),
	IsInterpreter(IsInterpreter),
	IsExtension(IsExtension),
	IsName(IsName),
	NameContains(NameContains),
	NameContainsRegex(NameContainsRegex),
	PathContains(PathContains),
	PathContainsRegex(PathContainsRegex),
	RelativeExists(RelativeExists),
	Compare(Compare),
	InProject(InProject),
	Platform(PlatformCheck),
	IsSyntax(IsSyntax),
	IsHiddenSyntax(IsHiddenSyntax),
	SelectorMatches(SelectorMatches),
	IsClassifierEnabled(IsClassifierEnabled),
	/// No constraint is registered under the requested name.
	Unknown,
	Custom(Arc<dyn Constraint>),
}

macro_rules! dispatch {
	($self:ident, $c:ident => $body:expr, unknown => $unknown:expr) => {
		match $self {
			ConstraintKind::Contains($c) => $body,
			ConstraintKind::ContainsRegex($c) => $body,
			ConstraintKind::FirstLineContains($c) => $body,
			ConstraintKind::FirstLineContainsRegex($c) => $body,
			ConstraintKind::IsInterpreter($c) => $body,
			ConstraintKind::IsExtension($c) => $body,
			ConstraintKind::IsName($c) => $body,
			ConstraintKind::NameContains($c) => $body,
			ConstraintKind::NameContainsRegex($c) => $body,
			ConstraintKind::PathContains($c) => $body,
			ConstraintKind::PathContainsRegex($c) => $body,
			ConstraintKind::RelativeExists($c) => $body,
			ConstraintKind::Compare($c) => $body,
			ConstraintKind::InProject($c) => $body,
			ConstraintKind::Platform($c) => $body,
			ConstraintKind::IsSyntax($c) => $body,
			ConstraintKind::IsHiddenSyntax($c) => $body,
			ConstraintKind::SelectorMatches($c) => $body,
			ConstraintKind::IsClassifierEnabled($c) => $body,
			ConstraintKind::Custom($c) => $body,
			ConstraintKind::Unknown => $unknown,
		}
	};
}

impl Constraint for ConstraintKind {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		dispatch!(self, c => c.test(cx), unknown => Err(NeverMatches::InvalidConfig.into()))
	}

	fn is_droppable(&self) -> bool {
		dispatch!(self, c => c.is_droppable(), unknown => true)
	}
}

/// A constraint leaf of a match tree.
#[derive(Debug, Clone)]
pub struct ConstraintRule {
	name: String,
	kind: ConstraintKind,
	inverted: bool,
}

impl ConstraintRule {
	pub fn new(name: impl Into<String>, kind: ConstraintKind, inverted: bool) -> Self {
		Self {
			name: name.into(),
			kind,
			inverted,
		}
	}

	/// Wraps an ad-hoc constraint implementation.
	pub fn custom(name: impl Into<String>, constraint: impl Constraint + 'static) -> Self {
		Self::new(name, ConstraintKind::Custom(Arc::new(constraint)), false)
	}

	pub fn inverted(mut self, inverted: bool) -> Self {
		self.inverted = inverted;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> &ConstraintKind {
		&self.kind
	}

	pub fn is_inverted(&self) -> bool {
		self.inverted
	}

	pub fn is_droppable(&self) -> bool {
		self.kind.is_droppable()
	}

	/// Evaluates the leaf. Never fails: interrupts and evaluation errors
	/// collapse to a plain boolean here.
	pub fn test(&self, cx: &EvalContext<'_>) -> bool {
		match self.kind.test(cx) {
			Ok(result) => result != self.inverted,
			Err(Interrupt::AlwaysTrue) => true,
			Err(Interrupt::Never(reason)) => {
				trace!(constraint = %self.name, %reason, "constraint never matches");
				false
			}
			Err(Interrupt::Failed(error)) => {
				warn!(constraint = %self.name, %error, "constraint evaluation failed");
				false
			}
		}
	}
}
