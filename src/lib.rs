//! # route-forge
//!
//! Convention-driven route/store resolver and entry generator for Vue
//! projects. Scans a module tree, classifies files into route components,
//! named views, catch-all routes and store modules according to a
//! filename-symbol grammar, and emits synthetic JavaScript entry modules
//! for the host bundler.
//!
//! The host bundler is a collaborator, never a dependency: this crate
//! consumes a flat list of file paths plus a configuration object and
//! produces route/store descriptor trees and generated source text. The
//! host registers the generated files as ordinary entry modules.

pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod resolver;
pub mod symbols;
pub mod tree;
pub mod watch;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use config::{Config, ConfigError, Options};
pub use entry::{EntryManager, UpdateHooks};
pub use watch::EntryWatcher;

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// A single import target in generated code.
///
/// `namespace` is an identifier seed (the path relative to the module root)
/// from which the code generator derives a unique, collision-free import
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Absolute path to the source file.
    pub bundle: PathBuf,
    /// Identifier seed, usually a relative path like `home/index.vue`.
    pub namespace: String,
}

impl Bundle {
    pub fn new(bundle: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            namespace: namespace.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// EntryPoint / Page
// ---------------------------------------------------------------------------

/// One produced page entry, as handed to the host build tool.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPoint {
    /// Absolute path to the generated (or, for legacy entries, original) file.
    pub entry: PathBuf,
    /// The module directory (or file) this entry was resolved from.
    pub module: PathBuf,
    /// Page key, unique across the build.
    pub module_name: String,
    /// Output HTML filename (e.g. `index.html`).
    pub filename: String,
    /// HTML template path for the host's per-page HTML generation.
    pub template: PathBuf,
    /// Legacy entries bypass generation and use the source file directly.
    pub legacy: bool,
    /// Whether this entry imports the whole resolved tree (single-page app).
    pub spa: bool,
}

/// The `pages` map value consumed by the host's HTML-per-page generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub entry: PathBuf,
    pub template: PathBuf,
    pub filename: String,
}

// ---------------------------------------------------------------------------
// EntryError
// ---------------------------------------------------------------------------

/// Errors that abort entry resolution.
///
/// Resolution *ambiguities* (redundant index files, duplicate catch-all
/// routes, invalid named-view nesting) are never errors — they are logged
/// warnings and resolution proceeds with a deterministic best-effort choice.
/// Only genuinely fatal conditions surface here.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no entry points resolved — nothing to build")]
    NoEntries,

    #[error("invalid entry glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to read matched path: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("failed to write generated entry: {0}")]
    Io(#[from] std::io::Error),
}
