//! Hatch Core - Layered, theme-based scaffolding for Python packages
//!
//! A package is produced by applying several themes, in order, to the same
//! target directory: a base theme shared by every package, exactly one role
//! theme (standalone package, plugin or plugin host) and any enabled feature
//! themes. Later themes overwrite files written by earlier ones.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Path transformation, MiniJinja rendering,
//!   theme storage (directory or bundled) and theme application
//! - **Layer 2: Orchestration** - `ProjectConfig` validation and the
//!   `PackageInitializer`, including git/GitHub bookkeeping
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts for
//!   `init` (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage
//!
//! ```ignore
//! use hatch_core::{ConsoleReporter, PackageInitializer, ProjectConfig, ThemeSource};
//! use std::sync::Arc;
//!
//! let config = ProjectConfig::from_path("twat-hatch.toml".as_ref())?;
//! let store = ThemeSource::resolve(None).open();
//! let summary = PackageInitializer::new(config, ".".as_ref(), store, Arc::new(ConsoleReporter::new(false)))
//!     .initialize_all()?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod initializer;
pub mod report;
pub mod templates;
pub mod vcs;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::generator::{ConfigGenerator, ConfigValues, PackageKind};
pub use config::python::{normalize_version, PythonVersion};
pub use config::{PackageConfig, PackageRole, ProjectConfig, DEFAULT_CONFIG_FILE};
pub use context::RenderContext;
pub use error::{HatchError, Result};
pub use initializer::{PackageInitializer, PackageOutcome, PackageReport, RunSummary};
pub use report::{ConsoleReporter, Event, RecordingReporter, Reporter};
pub use templates::{
    DirectoryStore, EmbeddedStore, TemplateRenderer, TemplateStore, ThemeApplier, ThemeSource,
};
pub use vcs::GitCli;

#[cfg(feature = "tui")]
pub use tui::prompt_config_values;
