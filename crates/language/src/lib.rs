//! Syntax identity and lookup.
//!
//! This crate provides the vocabulary shared by the rule engine and the
//! resolver:
//!
//! * [`syntax`]: opaque syntax identity and the plain-text fallback
//! * [`lookup`]: the [`SyntaxLookup`] interface hosts implement
//! * [`catalog`]: an in-process [`SyntaxLookup`] keyed by filename, extension,
//!   shebang and first-line pattern
//! * [`selector`]: scope selector parsing and scoring

#![deny(clippy::print_stderr)]

pub mod catalog;
pub mod error;
pub mod lookup;
pub mod selector;
pub mod syntax;

pub use catalog::{SyntaxCatalog, SyntaxConfig};
pub use error::SelectorError;
pub use lookup::{LookupFilter, SyntaxLookup};
pub use selector::Selector;
pub use syntax::{PLAIN_TEXT_NAME, PLAIN_TEXT_SCOPE, SyntaxId, SyntaxInfo, is_absent_or_plaintext};
