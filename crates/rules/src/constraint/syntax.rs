//! Constraints over the currently assigned syntax.

use autosyntax_language::{LookupFilter, Selector, SyntaxId, SyntaxInfo};

use super::{Constraint, ConstraintArgs};
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches, RuleWarning};
use crate::eval::EvalContext;

fn current<'a>(cx: &EvalContext<'a>) -> Result<&'a SyntaxInfo, NeverMatches> {
	cx.snapshot.syntax.as_ref().ok_or(NeverMatches::NoSyntax)
}

/// `is_syntax`: the current syntax is one of the resolved syntax-likes.
#[derive(Debug, Clone)]
pub struct IsSyntax {
	likes: Vec<String>,
	targets: Vec<SyntaxId>,
}

impl IsSyntax {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let likes = args.strings();
		let targets = cx
			.lookup
			.find_all_by_likes(&likes, LookupFilter::default())
			.into_iter()
			.map(|syntax| syntax.id)
			.collect();
		Self { likes, targets }
	}
}

impl Constraint for IsSyntax {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		Ok(self.targets.contains(&current(cx)?.id))
	}

	fn is_droppable(&self) -> bool {
		self.likes.is_empty()
	}
}

/// `is_hidden_syntax`
#[derive(Debug, Clone, Copy)]
pub struct IsHiddenSyntax;

impl IsHiddenSyntax {
	pub fn build(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self
	}
}

impl Constraint for IsHiddenSyntax {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		Ok(current(cx)?.hidden)
	}
}

/// `selector_matches`: any selector scores against the current scope.
#[derive(Debug, Clone)]
pub struct SelectorMatches {
	selectors: Vec<Selector>,
	/// Some arguments were given but none parsed.
	invalid: bool,
}

impl SelectorMatches {
	pub fn build(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let sources = args.strings();
		let mut selectors = Vec::with_capacity(sources.len());
		for source in &sources {
			match Selector::parse(source) {
				Ok(selector) => selectors.push(selector),
				Err(err) => cx.warn(RuleWarning::InvalidSelector {
					selector: source.clone(),
					error: err.to_string(),
				}),
			}
		}
		Self {
			invalid: selectors.is_empty() && !sources.is_empty(),
			selectors,
		}
	}
}

impl Constraint for SelectorMatches {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		if self.invalid {
			return Err(NeverMatches::InvalidConfig.into());
		}
		let scope = &current(cx)?.scope;
		Ok(self.selectors.iter().any(|selector| selector.score(scope) >= 1))
	}

	fn is_droppable(&self) -> bool {
		self.selectors.is_empty() && !self.invalid
	}
}

/// `is_classifier_enabled`
#[derive(Debug, Clone, Copy)]
pub struct IsClassifierEnabled;

impl IsClassifierEnabled {
	pub fn build(_args: &ConstraintArgs<'_>, _cx: &mut BuildContext<'_>) -> Self {
		Self
	}
}

impl Constraint for IsClassifierEnabled {
	fn test(&self, cx: &EvalContext<'_>) -> ConstraintResult {
		Ok(cx.classifier_enabled)
	}
}
