//! Memoized filesystem ancestry probes.
//!
//! Project constraints ("is this file inside a git repository") walk from the
//! file's directory up to the filesystem root looking for marker entries. The
//! per-directory answers are kept in one bounded table shared by every
//! constraint and cleared whenever the rules are rebuilt.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

/// Default number of memoized `(marker, directory)` answers.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Marker entries identifying a project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectMarker {
	/// `.git` directory, or `.git` file for worktrees.
	Git,
	/// `.hg/`
	Mercurial,
	/// `.svn/`
	Subversion,
	/// `config/routes.rb`
	RubyOnRails,
	/// `manage.py` next to a package holding `settings.py`, `urls.py` and `wsgi.py`.
	PythonDjango,
}

impl ProjectMarker {
	/// Checks `dir` itself, without walking.
	pub fn is_root(self, dir: &Path) -> bool {
		match self {
			Self::Git => dir.join(".git").exists(),
			Self::Mercurial => dir.join(".hg").is_dir(),
			Self::Subversion => dir.join(".svn").is_dir(),
			Self::RubyOnRails => dir.join("config").join("routes.rb").is_file(),
			Self::PythonDjango => is_django_root(dir),
		}
	}
}

fn is_django_root(dir: &Path) -> bool {
	if !dir.join("manage.py").is_file() {
		return false;
	}
	let Ok(entries) = std::fs::read_dir(dir) else {
		return false;
	};
	entries
		.filter_map(Result::ok)
		.map(|entry| entry.path())
		.filter(|path| path.is_dir())
		.any(|sub| ["settings.py", "urls.py", "wsgi.py"].iter().all(|f| sub.join(f).is_file()))
}

/// Bounded `(marker, directory) -> bool` memo table.
#[derive(Debug)]
pub struct AncestryCache {
	memo: Mutex<LruCache<(ProjectMarker, PathBuf), bool>>,
}

impl Default for AncestryCache {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl AncestryCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
		Self {
			memo: Mutex::new(LruCache::new(capacity)),
		}
	}

	/// Returns true if any ancestor directory of `file` is a `marker` root.
	pub fn has_ancestor(&self, marker: ProjectMarker, file: &Path) -> bool {
		file.ancestors().skip(1).any(|dir| self.is_root(marker, dir))
	}

	fn is_root(&self, marker: ProjectMarker, dir: &Path) -> bool {
		let key = (marker, dir.to_path_buf());
		if let Some(&hit) = self.memo.lock().get(&key) {
			return hit;
		}

		// Probe without holding the lock.
		let hit = marker.is_root(dir);
		trace!(?marker, dir = %dir.display(), hit, "probed ancestor");
		self.memo.lock().put(key, hit);
		hit
	}

	/// Forgets every memoized answer.
	pub fn clear(&self) {
		self.memo.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.memo.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
