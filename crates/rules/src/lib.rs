//! Declarative syntax detection rules.
//!
//! A rule pairs a target syntax with a tree of [`Match`] combinators over
//! leaf [`ConstraintRule`]s. Rules are compiled from JSON definitions
//! ([`spec`]), pruned by the [`optimize`] pass and evaluated against an
//! immutable [`Snapshot`] of a document.
//!
//! * [`snapshot`]: the document state a rule sees
//! * [`constraint`]: leaf predicates and their argument handling
//! * [`matches`]: the `all`/`any`/`some`/`ratio` combinators
//! * [`registry`]: name to factory mapping, extensible via `inventory`
//! * [`build`]: compiling definitions into a [`SyntaxRuleCollection`]
//! * [`probe`]: memoized project-root filesystem probes

#![deny(clippy::print_stderr)]

pub mod build;
pub mod constraint;
pub mod error;
pub mod eval;
pub mod event;
pub mod matches;
pub mod optimize;
pub mod platform;
pub mod probe;
pub mod registry;
pub mod rule;
pub mod snapshot;
pub mod spec;
pub mod trim;

pub use build::{BuildContext, CompileReport, compile};
pub use constraint::{Constraint, ConstraintArgs, ConstraintKind, ConstraintRule};
pub use error::{ConstraintResult, Interrupt, NeverMatches, RuleError, RuleWarning};
pub use eval::EvalContext;
pub use event::EventKind;
pub use matches::{Match, MatchKind, Node};
pub use optimize::{Dropped, Optimizable, optimize};
pub use platform::Platform;
pub use probe::{AncestryCache, ProjectMarker};
pub use registry::{ConstraintReg, ConstraintRegistry};
pub use rule::{SyntaxRule, SyntaxRuleCollection};
pub use snapshot::{DocumentSource, FileIdentity, Snapshot, TrimOptions};
pub use spec::{SyntaxRuleSpec, parse_rules};
