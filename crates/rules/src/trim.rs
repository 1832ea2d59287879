//! File name suffix trimming.
//!
//! Editor backups and templated files often carry suffixes that hide the real
//! extension (`config.yml.bak`, `app.service.yml`). These helpers list the
//! names left after stripping such suffixes.

/// Every string reachable from `s` by repeatedly removing a suffix in
/// `suffixes`, depth first and without duplicates.
///
/// Empty suffixes are ignored.
pub fn trimmed_strings(s: &str, suffixes: &[String], skip_self: bool) -> Vec<String> {
	let mut out = Vec::new();
	collect_trimmed(s, suffixes, skip_self, &mut out);
	out
}

fn collect_trimmed(s: &str, suffixes: &[String], skip_self: bool, out: &mut Vec<String>) {
	if !skip_self && !out.iter().any(|seen| seen == s) {
		out.push(s.to_string());
	}
	for suffix in suffixes {
		if let Some(stem) = s.strip_suffix(suffix.as_str())
			&& !suffix.is_empty()
		{
			collect_trimmed(stem, suffixes, false, out);
		}
	}
}

/// Names left by dropping dotted suffixes one at a time (`a.b.c` gives
/// `a.b` then `a`). Leading dots of hidden files are not split on.
pub fn trimmed_filenames(name: &str) -> Vec<String> {
	let offset = name.len() - name.trim_start_matches('.').len();
	let mut out = Vec::new();
	let mut current = name;
	while let Some(idx) = current.rfind('.')
		&& idx > offset
	{
		current = &current[..idx];
		out.push(current.to_string());
	}
	out
}
