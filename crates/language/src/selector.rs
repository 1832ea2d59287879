//! Scope selectors.
//!
//! A deliberately small subset of the usual scope selector language:
//!
//! * `source.python` matches any scope starting with the dotted prefix.
//! * `text.html source.js` matches a scope stack containing both, in order.
//! * `source - source.python` excludes matches of the right-hand side.
//! * `a, b` matches either alternative.
//!
//! The empty selector matches everything.

use std::fmt;

use crate::error::SelectorError;

/// A parsed scope selector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
	source: String,
	alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alternative {
	path: Vec<String>,
	excluded: Vec<Vec<String>>,
}

impl Selector {
	pub fn parse(source: &str) -> Result<Self, SelectorError> {
		let trimmed = source.trim();
		if trimmed.is_empty() {
			return Ok(Self {
				source: source.to_string(),
				alternatives: Vec::new(),
			});
		}

		if let Some(ch) = trimmed
			.chars()
			.find(|c| !(c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+' | ',' | ' ' | '\t')))
		{
			return Err(SelectorError::UnsupportedCharacter {
				ch,
				selector: source.to_string(),
			});
		}

		let alternatives = trimmed
			.split(',')
			.map(|alt| parse_alternative(alt, source))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			source: source.to_string(),
			alternatives,
		})
	}

	/// Returns true for the empty selector.
	pub fn is_empty(&self) -> bool {
		self.alternatives.is_empty()
	}

	/// Scores the selector against a (space separated) scope stack.
	///
	/// Zero means no match; the score of a match is the number of dotted
	/// segments it consumed, so more specific selectors score higher.
	pub fn score(&self, scope: &str) -> u32 {
		if self.alternatives.is_empty() {
			return 1;
		}

		let stack: Vec<&str> = scope.split_whitespace().collect();
		self.alternatives
			.iter()
			.map(|alt| alt.score(&stack))
			.max()
			.unwrap_or(0)
	}

	#[inline]
	pub fn matches(&self, scope: &str) -> bool {
		self.score(scope) > 0
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

fn parse_alternative(alt: &str, source: &str) -> Result<Alternative, SelectorError> {
	let mut segments = alt.split(" -").map(str::trim);
	let path = parse_path(segments.next().unwrap_or_default());
	if path.is_empty() {
		return Err(SelectorError::EmptyAlternative {
			selector: source.to_string(),
		});
	}

	let mut excluded = Vec::new();
	for segment in segments {
		let segment = segment.trim_start_matches('-').trim();
		let terms = parse_path(segment);
		if terms.is_empty() {
			return Err(SelectorError::DanglingExclusion {
				selector: source.to_string(),
			});
		}
		excluded.push(terms);
	}

	Ok(Alternative { path, excluded })
}

fn parse_path(segment: &str) -> Vec<String> {
	segment
		.split_whitespace()
		.map(|term| term.trim_matches('.').to_string())
		.filter(|term| !term.is_empty())
		.collect()
}

impl Alternative {
	fn score(&self, stack: &[&str]) -> u32 {
		if self.excluded.iter().any(|terms| path_score(terms, stack) > 0) {
			return 0;
		}
		path_score(&self.path, stack)
	}
}

/// Matches `terms` as an ordered subsequence of `stack`.
fn path_score(terms: &[String], stack: &[&str]) -> u32 {
	let mut score = 0;
	let mut scopes = stack.iter();
	for term in terms {
		match scopes.by_ref().find(|scope| prefix_matches(term, scope)) {
			Some(_) => score += term.split('.').count() as u32,
			None => return 0,
		}
	}
	score
}

fn prefix_matches(term: &str, scope: &str) -> bool {
	scope == term || (scope.starts_with(term) && scope.as_bytes().get(term.len()) == Some(&b'.'))
}
