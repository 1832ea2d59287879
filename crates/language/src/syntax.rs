//! Syntax identity.
//!
//! A [`SyntaxId`] is an opaque handle into whatever registry produced it.
//! [`SyntaxInfo`] carries the handful of attributes the rule engine needs
//! (name, scope, path, hidden flag) so snapshots never have to call back into
//! the registry.

use std::fmt;
use std::sync::Arc;

/// Base scope of the generic plain-text syntax.
pub const PLAIN_TEXT_SCOPE: &str = "text.plain";

/// Display name of the generic plain-text syntax.
pub const PLAIN_TEXT_NAME: &str = "Plain Text";

/// Unique identifier for a syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxId(pub u32);

impl SyntaxId {
	pub const INVALID: SyntaxId = SyntaxId(u32::MAX);

	#[inline]
	pub fn is_valid(self) -> bool {
		self != Self::INVALID
	}

	#[inline]
	pub fn idx(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for SyntaxId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Cheaply clonable description of a registered syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxInfo {
	pub id: SyntaxId,
	/// Display name (e.g., "Python").
	pub name: Arc<str>,
	/// Base scope (e.g., "source.python").
	pub scope: Arc<str>,
	/// Definition path, used by partial-path lookups.
	pub path: Arc<str>,
	/// Hidden syntaxes are excluded from lookups unless asked for.
	pub hidden: bool,
}

impl SyntaxInfo {
	pub fn new(id: SyntaxId, name: &str, scope: &str, path: &str, hidden: bool) -> Self {
		Self {
			id,
			name: Arc::from(name),
			scope: Arc::from(scope),
			path: Arc::from(path),
			hidden,
		}
	}

	/// Returns true for the generic plain-text fallback.
	#[inline]
	pub fn is_plaintext(&self) -> bool {
		&*self.scope == PLAIN_TEXT_SCOPE
	}
}

impl fmt::Display for SyntaxInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// Returns true when a document carries no syntax or only plain text.
#[inline]
pub fn is_absent_or_plaintext(syntax: Option<&SyntaxInfo>) -> bool {
	syntax.is_none_or(SyntaxInfo::is_plaintext)
}
