//! Rule definitions as configuration data.
//!
//! These types mirror the JSON shape users write in their settings. They are
//! compiled into the evaluable tree by [`crate::build`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default `match` of a rule or nested match.
pub const DEFAULT_MATCH: &str = "any";

/// Default scope gate of a rule.
pub const DEFAULT_SELECTOR: &str = "text.plain";

/// A value users may write either bare or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	One(T),
	Many(Vec<T>),
}

impl<T> Default for OneOrMany<T> {
	fn default() -> Self {
		Self::Many(Vec::new())
	}
}

impl<T: Clone> OneOrMany<T> {
	pub fn to_vec(&self) -> Vec<T> {
		match self {
			Self::One(value) => vec![value.clone()],
			Self::Many(values) => values.clone(),
		}
	}
}

/// One entry of the `syntax_rules` setting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxRuleSpec {
	pub comment: String,
	/// Syntax-likes of the target; the first one that resolves wins.
	pub syntaxes: OneOrMany<String>,
	/// `None` means [`DEFAULT_SELECTOR`]; `""` matches any scope.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub selector: Option<String>,
	/// `None` means any event.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub on_events: Option<OneOrMany<String>>,
	#[serde(rename = "match", skip_serializing_if = "Option::is_none")]
	pub match_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub args: Option<Value>,
	#[serde(skip_serializing_if = "Map::is_empty")]
	pub kwargs: Map<String, Value>,
	pub rules: Vec<NodeSpec>,
}

impl SyntaxRuleSpec {
	/// The root match described by the rule's own `match`/`args`/`rules`.
	pub fn root(&self) -> MatchSpec {
		MatchSpec {
			match_name: self.match_name.clone(),
			args: self.args.clone(),
			kwargs: self.kwargs.clone(),
			rules: self.rules.clone(),
		}
	}
}

/// Child of a `rules` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
	Constraint(ConstraintSpec),
	Match(MatchSpec),
	/// Anything that is neither; skipped with a warning.
	Malformed(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
	pub constraint: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub args: Option<Value>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub kwargs: Map<String, Value>,
	#[serde(default)]
	pub inverted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSpec {
	#[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
	pub match_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub args: Option<Value>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub kwargs: Map<String, Value>,
	pub rules: Vec<NodeSpec>,
}

/// Normalizes an `args` value: lists are taken as-is, anything else is wrapped.
pub fn normalize_args(args: Option<&Value>) -> Vec<Value> {
	match args {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(items)) => items.clone(),
		Some(other) => vec![other.clone()],
	}
}

/// Decodes a list of rule definitions.
pub fn parse_rules(json: &str) -> crate::error::Result<Vec<SyntaxRuleSpec>> {
	Ok(serde_json::from_str(json)?)
}
