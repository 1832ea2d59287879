//! Cheap, local content heuristics.

use std::sync::LazyLock;

use autosyntax_language::{LookupFilter, SyntaxInfo, SyntaxLookup};
use autosyntax_rules::Snapshot;
use autosyntax_rules::trim::{trimmed_filenames, trimmed_strings};
use regex::Regex;
use serde::de::IgnoredAny;

/// `SYNTAX TEST "Packages/Foo/Foo.sublime-syntax"` headers of syntax test files.
static SYNTAX_TEST: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)\bSYNTAX\s+TEST\s+"(?P<syntax>[^"]+)""#).expect("syntax test regex"));

/// Vim style `ft=python`, `filetype=python` and `syntax=python` markers.
static VIM_MODELINE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(?:filetype|ft|syntax)=(?P<syntax>[^\s:]+):?(?:\s|$)").expect("vim modeline regex"));

/// Emacs style `-*- mode: python -*-` or `-*- python -*-` markers.
static EMACS_MODELINE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)-\*-\s*(?:[^\n]*?\bmode:\s*)?(?P<syntax>[\w.+#-]+?)\s*(?:;[^\n]*?)?-\*-").expect("emacs modeline regex")
});

/// Syntax-likes tried for content shaped like JSON.
pub const JSON_LIKES: &[&str] = &["scope:source.json", "JSON"];

/// Syntax-likes tried for XML documents.
pub const XML_LIKES: &[&str] = &["scope:text.xml", "XML"];

/// Syntax file named by a syntax test header on the first line.
///
/// Only headers naming a `.sublime-syntax` file count.
pub fn syntax_test_marker(first_line: &str) -> Option<&str> {
	SYNTAX_TEST
		.captures(first_line)
		.and_then(|caps| caps.name("syntax"))
		.map(|m| m.as_str())
		.filter(|syntax| syntax.ends_with(".sublime-syntax"))
}

/// Syntax-likes named by editor modelines, in document order (Vim first).
pub fn modeline_syntaxes(content: &str) -> Vec<&str> {
	let vim = VIM_MODELINE.captures_iter(content);
	let emacs = EMACS_MODELINE.captures_iter(content);
	vim.chain(emacs)
		.filter_map(|caps| caps.name("syntax"))
		.map(|m| m.as_str())
		.collect()
}

/// Syntax picked by the host for the shebang or first-line pattern.
pub fn first_line_syntax(lookup: &dyn SyntaxLookup, first_line: &str) -> Option<SyntaxInfo> {
	lookup
		.find_for_file("", first_line)
		.filter(|syntax| !syntax.is_plaintext())
}

/// First non-plain syntax named by a modeline.
pub fn modeline_syntax(lookup: &dyn SyntaxLookup, content: &str) -> Option<SyntaxInfo> {
	modeline_syntaxes(content)
		.into_iter()
		.find_map(|like| lookup.find_first_by_like(like, LookupFilter::default().plaintext(false)))
}

/// File names to probe after trimming `name`, closest to the original first.
pub fn trimmed_candidates(name: &str, suffixes: &[String], auto: bool) -> Vec<String> {
	let mut out = trimmed_strings(name, suffixes, true);
	if auto {
		for candidate in trimmed_filenames(name) {
			if !out.contains(&candidate) {
				out.push(candidate);
			}
		}
	}
	out
}

/// Whether the trimmed content starts and ends like a JSON object or array.
pub fn has_json_shape(content: &str) -> bool {
	let trimmed = content.trim();
	matches!(
		(trimmed.chars().next(), trimmed.chars().last()),
		(Some('{'), Some('}')) | (Some('['), Some(']'))
	)
}

/// Whether the snapshot holds a JSON document. Truncated content is judged by
/// shape alone.
pub fn looks_like_json(snapshot: &Snapshot) -> bool {
	if !has_json_shape(&snapshot.content) {
		return false;
	}
	snapshot.truncated || serde_json::from_str::<IgnoredAny>(snapshot.content.trim()).is_ok()
}

pub fn looks_like_xml(content: &str) -> bool {
	content.trim_start_matches('\u{feff}').trim_start().starts_with("<?xml")
}

/// Built-in structured-data detection.
pub fn builtin_syntax(lookup: &dyn SyntaxLookup, snapshot: &Snapshot) -> Option<SyntaxInfo> {
	let likes = if looks_like_json(snapshot) {
		JSON_LIKES
	} else if looks_like_xml(&snapshot.content) {
		XML_LIKES
	} else {
		return None;
	};
	likes
		.iter()
		.find_map(|like| lookup.find_first_by_like(like, LookupFilter::default().plaintext(false)))
}

/// Rejects data-format labels whose content does not have the format's shape.
pub fn label_fits_content(label: &str, content: &str) -> bool {
	!label.eq_ignore_ascii_case("json") || has_json_shape(content)
}
