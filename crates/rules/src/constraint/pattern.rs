//! Regex arguments shared by the `*_regex` constraints.

use regex::{Regex, RegexBuilder};

use super::ConstraintArgs;
use crate::build::BuildContext;
use crate::error::{ConstraintResult, NeverMatches, RuleWarning};

/// Flags applied when `regex_flags` is not given.
pub const DEFAULT_FLAGS: &[&str] = &["MULTILINE"];

/// Regex flags in their long and short spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
	pub ignore_case: bool,
	pub multi_line: bool,
	pub dot_all: bool,
	pub verbose: bool,
	pub ascii: bool,
}

impl RegexFlags {
	/// Parses flag names, ignoring unknown ones.
	pub fn parse<S: AsRef<str>>(names: &[S]) -> Self {
		let mut flags = Self::default();
		for name in names {
			match name.as_ref() {
				"I" | "IGNORECASE" => flags.ignore_case = true,
				"M" | "MULTILINE" => flags.multi_line = true,
				"S" | "DOTALL" => flags.dot_all = true,
				"X" | "VERBOSE" => flags.verbose = true,
				"A" | "ASCII" => flags.ascii = true,
				"U" | "UNICODE" => flags.ascii = false,
				_ => {}
			}
		}
		flags
	}

	fn builder(&self, pattern: &str) -> RegexBuilder {
		let mut builder = RegexBuilder::new(pattern);
		builder
			.case_insensitive(self.ignore_case)
			.multi_line(self.multi_line)
			.dot_matches_new_line(self.dot_all)
			.ignore_whitespace(self.verbose)
			.unicode(!self.ascii);
		builder
	}
}

/// Joins alternatives into a single non-capturing alternation.
pub fn merge_regexes<S: AsRef<str>>(patterns: &[S]) -> String {
	match patterns {
		[] => String::new(),
		[single] => format!("(?:{})", single.as_ref()),
		many => {
			let joined = many.iter().map(|p| format!("(?:{})", p.as_ref())).collect::<Vec<_>>().join("|");
			format!("(?:{joined})")
		}
	}
}

/// Alternation matching any of `literals` verbatim.
pub fn merge_literals<S: AsRef<str>>(literals: &[S]) -> String {
	let escaped: Vec<String> = literals.iter().map(|l| regex::escape(l.as_ref())).collect();
	format!("(?:{})", escaped.join("|"))
}

/// A compiled regex argument.
///
/// A pattern that failed to compile is kept so evaluation can report it as
/// never matching; it has already produced a build warning.
#[derive(Debug, Clone)]
pub enum Pattern {
	Empty,
	Compiled(Regex),
	Invalid,
}

impl Pattern {
	/// Compiles the string `args` with the `regex_flags` keyword argument.
	pub fn from_args(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		let patterns = args.strings();
		if patterns.is_empty() {
			return Self::Empty;
		}
		let flags = match args.kwarg_strings("regex_flags") {
			Some(names) => RegexFlags::parse(&names),
			None => RegexFlags::parse(DEFAULT_FLAGS),
		};
		Self::compile(args.name, &merge_regexes(&patterns), flags, cx)
	}

	pub fn compile(constraint: &str, pattern: &str, flags: RegexFlags, cx: &mut BuildContext<'_>) -> Self {
		match flags.builder(pattern).build() {
			Ok(regex) => Self::Compiled(regex),
			Err(err) => {
				cx.warn(RuleWarning::InvalidRegex {
					constraint: constraint.to_string(),
					error: err.to_string(),
				});
				Self::Invalid
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	/// The compiled regex, or the interrupt to report instead.
	pub fn regex(&self) -> Result<&Regex, NeverMatches> {
		match self {
			Self::Compiled(regex) => Ok(regex),
			Self::Empty | Self::Invalid => Err(NeverMatches::InvalidConfig),
		}
	}

	pub fn is_match(&self, haystack: &str) -> ConstraintResult {
		Ok(self.regex()?.is_match(haystack))
	}
}
