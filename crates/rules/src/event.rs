//! Host events that trigger a resolution attempt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of host events a resolution attempt can be triggered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
	/// Explicitly requested by the user.
	Command,
	/// Output document of a build/exec run.
	Exec,
	/// Document existed before the engine was loaded.
	Init,
	Load,
	Modify,
	New,
	Paste,
	Reload,
	Revert,
	Save,
	/// A preview document became a regular one.
	Untransientize,
}

impl EventKind {
	pub const ALL: [EventKind; 11] = [
		EventKind::Command,
		EventKind::Exec,
		EventKind::Init,
		EventKind::Load,
		EventKind::Modify,
		EventKind::New,
		EventKind::Paste,
		EventKind::Reload,
		EventKind::Revert,
		EventKind::Save,
		EventKind::Untransientize,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			EventKind::Command => "command",
			EventKind::Exec => "exec",
			EventKind::Init => "init",
			EventKind::Load => "load",
			EventKind::Modify => "modify",
			EventKind::New => "new",
			EventKind::Paste => "paste",
			EventKind::Reload => "reload",
			EventKind::Revert => "revert",
			EventKind::Save => "save",
			EventKind::Untransientize => "untransientize",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EventKind {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == s).ok_or(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_names_round_trip() {
		for kind in EventKind::ALL {
			assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
			assert_eq!(serde_json::to_string(&kind).unwrap(), format!("\"{kind}\""));
		}
		assert!("typing".parse::<EventKind>().is_err());
	}
}
