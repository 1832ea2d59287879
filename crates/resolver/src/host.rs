//! Host document interface.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use autosyntax_language::SyntaxInfo;
use autosyntax_rules::DocumentSource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Host-assigned identity of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "doc#{}", self.0)
	}
}

/// A live document the resolver may assign a syntax to.
///
/// Documents can be shared with a spawned classifier task, so implementations
/// must be thread-safe; every method may be called after the document closed.
pub trait Document: DocumentSource + Send + Sync {
	fn id(&self) -> DocumentId;

	/// Preview documents (e.g., quick-open previews) are never resolved.
	fn is_transient(&self) -> bool {
		false
	}

	/// Applies `syntax`. Returns false if the document is gone.
	fn assign_syntax(&self, syntax: &SyntaxInfo) -> bool;
}

/// Document kept entirely in memory.
#[derive(Debug)]
pub struct MemoryDocument {
	id: DocumentId,
	text: RwLock<String>,
	path: Option<PathBuf>,
	syntax: RwLock<Option<SyntaxInfo>>,
	open: AtomicBool,
	transient: bool,
}

impl MemoryDocument {
	pub fn new(id: u64, text: impl Into<String>) -> Self {
		Self {
			id: DocumentId(id),
			text: RwLock::new(text.into()),
			path: None,
			syntax: RwLock::new(None),
			open: AtomicBool::new(true),
			transient: false,
		}
	}

	pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_syntax(self, syntax: SyntaxInfo) -> Self {
		*self.syntax.write() = Some(syntax);
		self
	}

	pub fn transient(mut self, transient: bool) -> Self {
		self.transient = transient;
		self
	}

	pub fn set_text(&self, text: impl Into<String>) {
		*self.text.write() = text.into();
	}

	pub fn close(&self) {
		self.open.store(false, Ordering::Release);
	}
}

impl DocumentSource for MemoryDocument {
	fn is_valid(&self) -> bool {
		self.open.load(Ordering::Acquire)
	}

	fn char_count(&self) -> usize {
		self.text.read().chars().count()
	}

	fn line_count(&self) -> usize {
		self.text.read().split('\n').count()
	}

	fn text(&self, range: Range<usize>) -> Option<String> {
		if !self.is_valid() {
			return None;
		}
		let text = self.text.read();
		Some(text.chars().skip(range.start).take(range.end.saturating_sub(range.start)).collect())
	}

	fn file_path(&self) -> Option<PathBuf> {
		self.path.clone()
	}

	fn syntax(&self) -> Option<SyntaxInfo> {
		self.syntax.read().clone()
	}
}

impl Document for MemoryDocument {
	fn id(&self) -> DocumentId {
		self.id
	}

	fn is_transient(&self) -> bool {
		self.transient
	}

	fn assign_syntax(&self, syntax: &SyntaxInfo) -> bool {
		if !self.is_valid() {
			return false;
		}
		*self.syntax.write() = Some(syntax.clone());
		true
	}
}
