//! In-process syntax catalog.
//!
//! Connects file names, extensions, shebang interpreters and first-line
//! patterns to registered syntaxes. Hosts with their own syntax registry
//! implement [`SyntaxLookup`] directly; embedders without one use this.

use regex::Regex;
use rustc_hash::FxHashMap as HashMap;

use crate::lookup::{LookupFilter, SyntaxLookup};
use crate::syntax::{PLAIN_TEXT_NAME, PLAIN_TEXT_SCOPE, SyntaxId, SyntaxInfo};

/// Configuration for a single syntax.
#[derive(Debug, Clone, Default)]
pub struct SyntaxConfig {
	/// Display name (e.g., "Python").
	pub name: String,

	/// Base scope (e.g., "source.python").
	pub scope: String,

	/// Definition path. Defaults to `<name>/<name>.sublime-syntax`.
	pub path: Option<String>,

	/// Hidden syntaxes are skipped by default lookups.
	pub hidden: bool,

	/// File extensions without the leading dot. Compound extensions such as
	/// `service.yml` are allowed.
	pub extensions: Vec<String>,

	/// Exact filenames (e.g., "Makefile").
	pub filenames: Vec<String>,

	/// Shebang interpreters (e.g., "python", "bash").
	pub shebangs: Vec<String>,

	/// Pattern tested against the first line when nothing else matched.
	pub first_line_match: Option<Regex>,
}

impl SyntaxConfig {
	pub fn new(name: &str, scope: &str) -> Self {
		Self {
			name: name.to_string(),
			scope: scope.to_string(),
			..Default::default()
		}
	}

	pub fn with_path(mut self, path: &str) -> Self {
		self.path = Some(path.to_string());
		self
	}

	pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
		self.extensions = extensions.iter().map(|s| s.to_string()).collect();
		self
	}

	pub fn with_filenames(mut self, filenames: &[&str]) -> Self {
		self.filenames = filenames.iter().map(|s| s.to_string()).collect();
		self
	}

	pub fn with_shebangs(mut self, shebangs: &[&str]) -> Self {
		self.shebangs = shebangs.iter().map(|s| s.to_string()).collect();
		self
	}

	/// Sets the first-line pattern. An invalid pattern is logged and ignored.
	pub fn with_first_line_match(mut self, pattern: &str) -> Self {
		self.first_line_match = Regex::new(pattern)
			.map_err(|e| tracing::warn!(syntax = %self.name, pattern, error = %e, "invalid first_line_match"))
			.ok();
		self
	}

	pub fn hidden(mut self, hidden: bool) -> Self {
		self.hidden = hidden;
		self
	}

	/// Returns the definition path to use for lookups.
	pub fn path(&self) -> String {
		self.path
			.clone()
			.unwrap_or_else(|| format!("{0}/{0}.sublime-syntax", self.name))
	}
}

/// Manages syntax configurations and provides lookups.
///
/// When two syntaxes claim the same extension, filename or interpreter, the
/// one registered first keeps it.
#[derive(Debug, Default)]
pub struct SyntaxCatalog {
	configs: Vec<SyntaxConfig>,
	infos: Vec<SyntaxInfo>,
	/// Ids ordered for like-lookups: visible before hidden, then shorter path.
	preferred: Vec<SyntaxId>,
	by_extension: HashMap<String, SyntaxId>,
	by_filename: HashMap<String, SyntaxId>,
	by_shebang: HashMap<String, SyntaxId>,
	plain_text: Option<SyntaxId>,
}

impl SyntaxCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a catalog holding only the plain-text fallback.
	pub fn with_plain_text() -> Self {
		let mut catalog = Self::new();
		catalog.register(
			SyntaxConfig::new(PLAIN_TEXT_NAME, PLAIN_TEXT_SCOPE)
				.with_path("Text/Plain text.tmLanguage")
				.with_extensions(&["txt"]),
		);
		catalog
	}

	/// Registers a syntax configuration.
	pub fn register(&mut self, config: SyntaxConfig) -> SyntaxId {
		let id = SyntaxId(self.configs.len() as u32);

		for ext in &config.extensions {
			claim(&mut self.by_extension, ext.trim_start_matches('.'), id, "extension");
		}

		for name in &config.filenames {
			claim(&mut self.by_filename, name, id, "filename");
		}

		for shebang in &config.shebangs {
			claim(&mut self.by_shebang, shebang, id, "shebang");
		}

		if config.scope == PLAIN_TEXT_SCOPE && self.plain_text.is_none() {
			self.plain_text = Some(id);
		}

		let info = SyntaxInfo::new(id, &config.name, &config.scope, &config.path(), config.hidden);
		self.infos.push(info);
		self.configs.push(config);

		self.preferred.push(id);
		let infos = &self.infos;
		self.preferred
			.sort_by_key(|id| (infos[id.idx()].hidden, infos[id.idx()].path.len()));
		id
	}

	/// Gets a syntax configuration by ID.
	pub fn get(&self, id: SyntaxId) -> Option<&SyntaxConfig> {
		self.configs.get(id.idx())
	}

	/// Gets the shareable description of a syntax.
	pub fn info(&self, id: SyntaxId) -> Option<SyntaxInfo> {
		self.infos.get(id.idx()).cloned()
	}

	/// Finds a syntax by exact display name.
	pub fn syntax_for_name(&self, name: &str) -> Option<SyntaxId> {
		self.infos
			.iter()
			.find(|info| &*info.name == name)
			.map(|info| info.id)
	}

	/// Finds a syntax by file name: exact filename first, then compound
	/// extensions from the longest to the shortest.
	pub fn syntax_for_file_name(&self, file_name: &str) -> Option<SyntaxId> {
		if file_name.is_empty() {
			return None;
		}

		if let Some(id) = self.by_filename.get(file_name) {
			return Some(*id);
		}

		file_name
			.match_indices('.')
			.map(|(idx, _)| &file_name[idx + 1..])
			.filter(|ext| !ext.is_empty())
			.find_map(|ext| self.by_extension.get(ext).copied())
	}

	/// Finds a syntax by shebang line.
	pub fn syntax_for_shebang(&self, first_line: &str) -> Option<SyntaxId> {
		let line = first_line.strip_prefix("#!")?;
		let parts: Vec<&str> = line.split_whitespace().collect();

		// Handle /usr/bin/env python style, including `env -S`
		let interpreter = match parts.first().and_then(|p| p.rsplit('/').next()) {
			Some("env") => parts.iter().skip(1).find(|p| !p.starts_with('-')).copied(),
			other => other,
		};

		interpreter.and_then(|interp| {
			let interp = interp.rsplit('/').next().unwrap_or(interp);
			self.by_shebang.get(interp).copied().or_else(|| {
				// Strip version numbers (python3 -> python, python3.11 -> python)
				let base = interp.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
				self.by_shebang.get(base).copied()
			})
		})
	}

	/// Finds a syntax by first line: shebang, then first-line patterns.
	pub fn syntax_for_first_line(&self, first_line: &str) -> Option<SyntaxId> {
		if first_line.is_empty() {
			return None;
		}

		self.syntax_for_shebang(first_line).or_else(|| {
			self.configs
				.iter()
				.position(|config| {
					config
						.first_line_match
						.as_ref()
						.is_some_and(|re| re.is_match(first_line))
				})
				.map(|idx| SyntaxId(idx as u32))
		})
	}

	/// Returns all registered syntaxes.
	pub fn syntaxes(&self) -> impl Iterator<Item = &SyntaxInfo> {
		self.infos.iter()
	}

	fn preferred(&self) -> impl Iterator<Item = &SyntaxInfo> {
		self.preferred.iter().map(|id| &self.infos[id.idx()])
	}
}

fn claim(map: &mut HashMap<String, SyntaxId>, key: &str, id: SyntaxId, what: &'static str) {
	match map.get(key) {
		Some(existing) => {
			tracing::debug!(key, kind = what, kept = %existing, ignored = %id, "duplicate syntax association");
		}
		None => {
			map.insert(key.to_string(), id);
		}
	}
}

impl SyntaxLookup for SyntaxCatalog {
	fn find_by_like(&self, like: &str, filter: LookupFilter) -> Vec<SyntaxInfo> {
		if like.is_empty() {
			return Vec::new();
		}

		let mut found: Vec<&SyntaxInfo> = Vec::new();
		if let Some(scope) = like.strip_prefix("scope:") {
			found.extend(self.preferred().filter(|info| &*info.scope == scope));
		} else {
			let like_lower = like.to_lowercase();
			found.extend(self.preferred().filter(|info| &*info.name == like));
			found.extend(self.preferred().filter(|info| info.name.to_lowercase() == like_lower));
			found.extend(self.preferred().filter(|info| info.path.contains(like)));
		}

		let mut out: Vec<SyntaxInfo> = Vec::with_capacity(found.len());
		for info in found {
			if filter.accepts(info) && !out.iter().any(|s| s.id == info.id) {
				out.push(info.clone());
			}
		}
		out
	}

	fn find_for_file(&self, file_name: &str, first_line: &str) -> Option<SyntaxInfo> {
		self.syntax_for_file_name(file_name)
			.or_else(|| self.syntax_for_first_line(first_line))
			.and_then(|id| self.info(id))
	}

	fn plain_text(&self) -> Option<SyntaxInfo> {
		self.plain_text.and_then(|id| self.info(id))
	}
}
