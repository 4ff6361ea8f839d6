//! Error taxonomy for configuration, theme resolution, rendering, file output
//! and version control

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T, E = HatchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HatchError {
    /// Required configuration fields are absent; paths are dotted (`author.email`)
    #[error("missing required configuration field(s): {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// A configuration field is present but its value is unusable
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("theme '{theme}' not found in {store}")]
    ThemeNotFound { theme: String, store: String },

    #[error("template '{template}' not found")]
    TemplateNotFound { template: String },

    #[error("syntax error in template '{template}': {message}")]
    TemplateSyntax { template: String, message: String },

    #[error("undefined variable while rendering '{template}': {message}")]
    UndefinedVariable { template: String, message: String },

    #[error("failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    #[error("failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {message}")]
    VersionControl { command: String, message: String },
}

impl HatchError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error must stop the whole run rather than just the package
    /// being initialized when it occurred.
    ///
    /// Configuration problems and missing themes would fail identically for
    /// every remaining package, so they end the run. Render and filesystem
    /// errors are scoped to one package.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            Self::MissingFields { .. }
                | Self::InvalidField { .. }
                | Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::ThemeNotFound { .. }
        )
    }
}
