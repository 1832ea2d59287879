//! Host platform facts and the constraints that compare against them.
//!
//! Platform constraints are decided while rules are built; evaluation only
//! returns the stored answer.

use std::fmt;

use crate::build::BuildContext;
use crate::constraint::{Constraint, ConstraintArgs};
use crate::error::ConstraintResult;
use crate::eval::EvalContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
	Linux,
	Osx,
	Windows,
	Other,
}

impl Os {
	pub fn current() -> Self {
		match std::env::consts::OS {
			"linux" => Self::Linux,
			"macos" => Self::Osx,
			"windows" => Self::Windows,
			_ => Self::Other,
		}
	}

	/// File systems that compare names case-insensitively by default.
	pub fn is_case_insensitive(self) -> bool {
		matches!(self, Self::Osx | Self::Windows)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Linux => "linux",
			Self::Osx => "osx",
			Self::Windows => "windows",
			Self::Other => "other",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
	X32,
	X64,
	Arm64,
	Other,
}

impl Arch {
	pub fn current() -> Self {
		match std::env::consts::ARCH {
			"x86" => Self::X32,
			"x86_64" => Self::X64,
			"aarch64" => Self::Arm64,
			_ => Self::Other,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::X32 => "x32",
			Self::X64 => "x64",
			Self::Arm64 => "arm64",
			Self::Other => "other",
		}
	}
}

/// The platform rules are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
	pub os: Os,
	pub arch: Arch,
}

impl Platform {
	pub const fn new(os: Os, arch: Arch) -> Self {
		Self { os, arch }
	}

	pub fn current() -> Self {
		Self::new(Os::current(), Arch::current())
	}
}

impl Default for Platform {
	fn default() -> Self {
		Self::current()
	}
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.os.as_str(), self.arch.as_str())
	}
}

/// `is_platform`, `is_arch` and `is_platform_arch`.
#[derive(Debug, Clone, Copy)]
pub struct PlatformCheck {
	passes: bool,
	droppable: bool,
}

impl PlatformCheck {
	fn decide(args: &ConstraintArgs<'_>, actual: &str) -> Self {
		let wanted = args.strings();
		Self {
			passes: wanted.iter().any(|w| w.eq_ignore_ascii_case(actual)),
			droppable: wanted.is_empty(),
		}
	}

	pub fn os(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self::decide(args, cx.platform.os.as_str())
	}

	pub fn arch(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self::decide(args, cx.platform.arch.as_str())
	}

	pub fn os_arch(args: &ConstraintArgs<'_>, cx: &mut BuildContext<'_>) -> Self {
		Self::decide(args, &cx.platform.to_string())
	}
}

impl Constraint for PlatformCheck {
	fn test(&self, _cx: &EvalContext<'_>) -> ConstraintResult {
		Ok(self.passes)
	}

	fn is_droppable(&self) -> bool {
		self.droppable
	}
}
