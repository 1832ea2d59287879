//! Syntax resolution for open documents.
//!
//! The [`Resolver`] runs an ordered cascade of detection stages whenever the
//! host reports an event (load, save, modify, ...) and assigns the first
//! syntax a stage produces. Stages range from explicit markers and the
//! user's compiled rules over shebang, modeline and trimmed-file-name
//! heuristics to an asynchronous [`Classifier`].
//!
//! * [`config`]: layered settings and their resolved form
//! * [`host`]: the [`Document`] interface hosts implement
//! * [`trigger`]: event gating ([`Trigger`])
//! * [`heuristics`]: cheap local content checks
//! * [`classifier`]: classifier protocol and prediction handling
//! * [`resolution`]: attempt outcomes

#![deny(clippy::print_stderr)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod host;
pub mod resolution;
pub mod resolver;
mod token;
pub mod trigger;

pub use classifier::{Classifier, ClassifyRequest, ClassifyResponse, Prediction};
pub use config::{ClassifierConfig, ClassifierSettings, PluginSettings, ResolverConfig};
pub use error::{ClassifierError, ConfigError, ConfigWarning};
pub use host::{Document, DocumentId, MemoryDocument};
pub use resolution::{Outcome, Resolution, SkipReason, Stage};
pub use resolver::{ActiveRules, Resolver, ResolverBuilder};
pub use trigger::{EditHint, Trigger};
