//! Host-facing syntax lookup interface.

use crate::syntax::SyntaxInfo;

/// Filters applied to "syntax-like" lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupFilter {
	pub include_hidden: bool,
	pub include_plaintext: bool,
}

impl Default for LookupFilter {
	fn default() -> Self {
		Self {
			include_hidden: false,
			include_plaintext: true,
		}
	}
}

impl LookupFilter {
	pub const fn hidden(mut self, include: bool) -> Self {
		self.include_hidden = include;
		self
	}

	pub const fn plaintext(mut self, include: bool) -> Self {
		self.include_plaintext = include;
		self
	}

	#[inline]
	pub fn accepts(&self, syntax: &SyntaxInfo) -> bool {
		(self.include_hidden || !syntax.hidden) && (self.include_plaintext || !syntax.is_plaintext())
	}
}

/// Resolves configured syntax references to concrete syntaxes.
///
/// A "syntax-like" is a display name (`Python`), a scope reference
/// (`scope:source.python`) or a fragment of the definition path
/// (`Python/Python.sublime-syntax`).
pub trait SyntaxLookup: Send + Sync {
	/// All syntaxes matching a syntax-like, best match first.
	fn find_by_like(&self, like: &str, filter: LookupFilter) -> Vec<SyntaxInfo>;

	/// The syntax the host would pick for a file name and first line.
	fn find_for_file(&self, file_name: &str, first_line: &str) -> Option<SyntaxInfo>;

	/// The plain-text fallback syntax, if the host has one.
	fn plain_text(&self) -> Option<SyntaxInfo>;

	fn find_first_by_like(&self, like: &str, filter: LookupFilter) -> Option<SyntaxInfo> {
		self.find_by_like(like, filter).into_iter().next()
	}

	/// First match of the first syntax-like that resolves.
	fn find_first_by_likes(&self, likes: &[String], filter: LookupFilter) -> Option<SyntaxInfo> {
		likes.iter().find_map(|like| self.find_first_by_like(like, filter))
	}

	/// Every syntax any of `likes` resolves to, without duplicates.
	fn find_all_by_likes(&self, likes: &[String], filter: LookupFilter) -> Vec<SyntaxInfo> {
		let mut out: Vec<SyntaxInfo> = Vec::new();
		for like in likes {
			for syntax in self.find_by_like(like, filter) {
				if !out.iter().any(|s| s.id == syntax.id) {
					out.push(syntax);
				}
			}
		}
		out
	}
}
