//! Dead-branch elimination.
//!
//! A bottom-up pass removing nodes whose static configuration guarantees they
//! contribute nothing. Each removed node is reported as a [`Dropped`] entry,
//! children before the parent they emptied.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintRule;
use crate::matches::{Match, Node};
use crate::rule::{SyntaxRule, SyntaxRuleCollection};

/// Diagnostic description of a pruned node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dropped {
	Constraint { name: String, inverted: bool },
	Match { name: String, children: usize },
	Rule { comment: String, syntaxes: Vec<String> },
}

/// A node of the rule tree that can be pruned.
pub trait Optimizable {
	fn is_droppable(&self) -> bool;

	/// Prunes droppable descendants, reporting them to `dropped`.
	fn optimize(&mut self, dropped: &mut Vec<Dropped>);

	fn describe(&self) -> Dropped;
}

/// Runs the pass over `target` and returns what was removed.
pub fn optimize<T: Optimizable + ?Sized>(target: &mut T) -> Vec<Dropped> {
	let mut dropped = Vec::new();
	target.optimize(&mut dropped);
	dropped
}

/// Removes items that are droppable as given, or become so once optimized.
fn prune<T: Optimizable>(items: &mut Vec<T>, dropped: &mut Vec<Dropped>) {
	items.retain_mut(|item| {
		if !item.is_droppable() {
			item.optimize(dropped);
			if !item.is_droppable() {
				return true;
			}
		}
		dropped.push(item.describe());
		false
	});
}

impl Optimizable for ConstraintRule {
	fn is_droppable(&self) -> bool {
		ConstraintRule::is_droppable(self)
	}

	fn optimize(&mut self, _dropped: &mut Vec<Dropped>) {}

	fn describe(&self) -> Dropped {
		Dropped::Constraint {
			name: self.name().to_string(),
			inverted: self.is_inverted(),
		}
	}
}

impl Optimizable for Match {
	fn is_droppable(&self) -> bool {
		Match::is_droppable(self)
	}

	fn optimize(&mut self, dropped: &mut Vec<Dropped>) {
		prune(&mut self.children, dropped);
	}

	fn describe(&self) -> Dropped {
		Dropped::Match {
			name: self.kind().to_string(),
			children: self.children().len(),
		}
	}
}

impl Optimizable for Node {
	fn is_droppable(&self) -> bool {
		match self {
			Node::Constraint(rule) => rule.is_droppable(),
			Node::Match(m) => m.is_droppable(),
		}
	}

	fn optimize(&mut self, dropped: &mut Vec<Dropped>) {
		match self {
			Node::Constraint(rule) => rule.optimize(dropped),
			Node::Match(m) => m.optimize(dropped),
		}
	}

	fn describe(&self) -> Dropped {
		match self {
			Node::Constraint(rule) => rule.describe(),
			Node::Match(m) => m.describe(),
		}
	}
}

impl Optimizable for SyntaxRule {
	fn is_droppable(&self) -> bool {
		SyntaxRule::is_droppable(self)
	}

	fn optimize(&mut self, dropped: &mut Vec<Dropped>) {
		let Some(root) = self.root.as_mut() else {
			return;
		};
		if !root.is_droppable() {
			root.optimize(dropped);
			if !root.is_droppable() {
				return;
			}
		}
		dropped.push(root.describe());
		self.root = None;
	}

	fn describe(&self) -> Dropped {
		Dropped::Rule {
			comment: self.comment.clone(),
			syntaxes: self.syntaxes.clone(),
		}
	}
}

impl Optimizable for SyntaxRuleCollection {
	fn is_droppable(&self) -> bool {
		false
	}

	fn optimize(&mut self, dropped: &mut Vec<Dropped>) {
		prune(&mut self.rules, dropped);
	}

	fn describe(&self) -> Dropped {
		Dropped::Match {
			name: "collection".to_string(),
			children: self.rules.len(),
		}
	}
}
