//! Point-in-time document captures.
//!
//! Every predicate evaluated during one resolution attempt observes the same
//! [`Snapshot`]; nothing downstream reads the live document again.

use std::ops::Range;
use std::path::{Path, PathBuf};

use autosyntax_language::{PLAIN_TEXT_SCOPE, SyntaxInfo};

/// Inserted between head and tail of a truncated content capture.
pub const TRUNCATION_SEPARATOR: &str = "\n\n";

/// Host collaborator that exposes a live document.
///
/// Implementations may be backed by a document that can close at any time;
/// reads of a vanished document return `None`.
pub trait DocumentSource {
	/// Returns false once the document has been closed.
	fn is_valid(&self) -> bool;

	/// Length of the document in chars.
	fn char_count(&self) -> usize;

	fn line_count(&self) -> usize;

	/// Text of a char range, clamped to the document.
	fn text(&self, range: Range<usize>) -> Option<String>;

	/// Path of the backing file, if the document has one.
	fn file_path(&self) -> Option<PathBuf>;

	/// Currently assigned syntax.
	fn syntax(&self) -> Option<SyntaxInfo>;

	/// Primary caret as `(row, col)`.
	fn caret(&self) -> Option<(u32, u32)> {
		None
	}

	/// Text of the first line, read at most `max_chars` chars deep.
	fn first_line(&self, max_chars: Option<usize>) -> Option<String> {
		let end = max_chars.map_or(self.char_count(), |max| max.min(self.char_count()));
		let head = self.text(0..end)?;
		Some(head.split('\n').next().unwrap_or_default().trim_end_matches('\r').to_string())
	}
}

/// Truncation limits applied while capturing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOptions {
	/// Half length (in chars) kept from each end of large documents.
	pub content_half: Option<usize>,
	/// Maximum chars read for the first line.
	pub first_line_length: Option<usize>,
}

impl Default for TrimOptions {
	fn default() -> Self {
		Self {
			content_half: Some(20_000),
			first_line_length: Some(1_000),
		}
	}
}

impl TrimOptions {
	/// Builds options from settings where a negative value disables a limit.
	pub fn from_settings(file_size: i64, first_line_length: i64) -> Self {
		Self {
			content_half: usize::try_from(file_size).ok(),
			first_line_length: usize::try_from(first_line_length).ok(),
		}
	}
}

/// Identity of the file backing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
	/// File name (e.g., `app.service.yml`).
	pub name: String,
	/// File name without leading dots (e.g., `bashrc` for `.bashrc`).
	pub name_unhidden: String,
	/// Full path, always with `/` separators.
	pub path: String,
	/// Compound extensions, longest first (e.g., `.service.yml`, `.yml`).
	pub extensions: Vec<String>,
	pub size: u64,
}

impl FileIdentity {
	pub fn new(path: &Path, size: u64) -> Self {
		let name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		let name_unhidden = name.trim_start_matches('.').to_string();
		let extensions = name_unhidden
			.match_indices('.')
			.map(|(idx, _)| name_unhidden[idx..].to_string())
			.filter(|ext| ext.len() > 1)
			.collect();

		Self {
			path: path.to_string_lossy().replace('\\', "/"),
			name,
			name_unhidden,
			extensions,
			size,
		}
	}

	/// Stats `path`; `None` unless it is a regular file on disk.
	pub fn probe(path: &Path) -> Option<Self> {
		let meta = std::fs::metadata(path).ok()?;
		meta.is_file().then(|| Self::new(path, meta.len()))
	}

	/// Directory holding the file.
	pub fn parent(&self) -> Option<&Path> {
		Path::new(&self.path).parent()
	}
}

/// Immutable capture of the document attributes predicates look at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
	/// Document text, possibly reduced to head + separator + tail.
	pub content: String,
	/// Whether `content` was truncated.
	pub truncated: bool,
	/// First line, possibly length-capped.
	pub first_line: String,
	/// `None` when the document has no backing file on disk.
	pub file: Option<FileIdentity>,
	pub syntax: Option<SyntaxInfo>,
	pub line_count: u64,
	pub char_count: u64,
	pub caret: Option<(u32, u32)>,
}

impl Snapshot {
	/// Captures `source` once. Returns `None` if the document vanished.
	pub fn capture(source: &dyn DocumentSource, trim: &TrimOptions) -> Option<Self> {
		if !source.is_valid() {
			return None;
		}

		let size = source.char_count();
		let (content, truncated) = match trim.content_half {
			Some(half) if half.saturating_mul(2) < size => {
				let mut content = source.text(0..half)?;
				content.push_str(TRUNCATION_SEPARATOR);
				content.push_str(&source.text(size - half..size)?);
				(content, true)
			}
			_ => (source.text(0..size)?, false),
		};

		let first_line = source.first_line(trim.first_line_length)?;
		let file = source.file_path().and_then(|path| FileIdentity::probe(&path));

		Some(Self {
			content,
			truncated,
			first_line,
			file,
			syntax: source.syntax(),
			line_count: source.line_count() as u64,
			char_count: size as u64,
			caret: source.caret(),
		})
	}

	/// Builds an untruncated snapshot of `content` with no file and no syntax.
	pub fn from_content(content: &str) -> Self {
		Self {
			content: content.to_string(),
			truncated: false,
			first_line: content.split('\n').next().unwrap_or_default().to_string(),
			file: None,
			syntax: None,
			line_count: content.split('\n').count() as u64,
			char_count: content.chars().count() as u64,
			caret: None,
		}
	}

	pub fn with_file(mut self, file: FileIdentity) -> Self {
		self.file = Some(file);
		self
	}

	pub fn with_syntax(mut self, syntax: SyntaxInfo) -> Self {
		self.syntax = Some(syntax);
		self
	}

	/// File name, or `""` when not on disk.
	pub fn file_name(&self) -> &str {
		self.file.as_ref().map_or("", |f| f.name.as_str())
	}

	/// `/`-separated file path, or `""` when not on disk.
	pub fn file_path(&self) -> &str {
		self.file.as_ref().map_or("", |f| f.path.as_str())
	}

	/// Base scope of the current syntax; plain text when there is none.
	pub fn scope(&self) -> &str {
		self.syntax.as_ref().map_or(PLAIN_TEXT_SCOPE, |s| &*s.scope)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use pretty_assertions::assert_eq;

	use super::*;

	struct Doc {
		text: String,
		reads: Cell<usize>,
	}

	impl DocumentSource for Doc {
		fn is_valid(&self) -> bool {
			true
		}

		fn char_count(&self) -> usize {
			self.text.chars().count()
		}

		fn line_count(&self) -> usize {
			self.text.split('\n').count()
		}

		fn text(&self, range: Range<usize>) -> Option<String> {
			self.reads.set(self.reads.get() + 1);
			Some(self.text.chars().skip(range.start).take(range.len()).collect())
		}

		fn file_path(&self) -> Option<PathBuf> {
			None
		}

		fn syntax(&self) -> Option<SyntaxInfo> {
			None
		}
	}

	fn doc(text: &str) -> Doc {
		Doc {
			text: text.to_string(),
			reads: Cell::new(0),
		}
	}

	#[test]
	fn test_small_document_is_not_truncated() {
		let trim = TrimOptions {
			content_half: Some(10),
			first_line_length: None,
		};
		let snap = Snapshot::capture(&doc("hello\nworld"), &trim).unwrap();

		assert_eq!(snap.content, "hello\nworld");
		assert!(!snap.truncated);
		assert_eq!(snap.first_line, "hello");
		assert_eq!(snap.line_count, 2);
		assert_eq!(snap.scope(), PLAIN_TEXT_SCOPE);
	}

	#[test]
	fn test_large_document_keeps_head_and_tail() {
		let text = format!("{}{}", "a".repeat(50), "z".repeat(50));
		let trim = TrimOptions {
			content_half: Some(8),
			first_line_length: Some(4),
		};
		let snap = Snapshot::capture(&doc(&text), &trim).unwrap();

		assert!(snap.truncated);
		assert_eq!(snap.content.chars().count(), 2 * 8 + TRUNCATION_SEPARATOR.chars().count());
		assert!(snap.content.starts_with("aaaaaaaa\n\n"));
		assert!(snap.content.ends_with("zzzzzzzz"));
		assert_eq!(snap.first_line, "aaaa");
		assert_eq!(snap.char_count, 100);
	}

	#[test]
	fn test_negative_limits_disable_truncation() {
		let trim = TrimOptions::from_settings(-1, -1);
		assert_eq!(trim.content_half, None);
		assert_eq!(trim.first_line_length, None);

		let text = "x".repeat(100);
		let snap = Snapshot::capture(&doc(&text), &trim).unwrap();
		assert_eq!(snap.content, text);
	}

	#[test]
	fn test_file_identity_extensions() {
		let file = FileIdentity::new(Path::new("/srv/app.service.yml"), 10);
		assert_eq!(file.name, "app.service.yml");
		assert_eq!(file.extensions, vec![".service.yml".to_string(), ".yml".to_string()]);

		let hidden = FileIdentity::new(Path::new("/home/u/.bashrc"), 0);
		assert_eq!(hidden.name_unhidden, "bashrc");
		assert!(hidden.extensions.is_empty());
	}
}
