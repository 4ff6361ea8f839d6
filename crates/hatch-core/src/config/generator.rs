//! Configuration file generation for `init` and `config show`

use super::python::{PythonVersion, DEFAULT_MIN_PYTHON};
use crate::context::PythonVersionInfo;
use crate::error::{HatchError, Result};
use crate::templates::{TemplateRenderer, TemplateStore};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_NAME: &str = "my-package";
pub const DEFAULT_PLUGIN_HOST: &str = "my-plugin-host";
pub const DEFAULT_AUTHOR_NAME: &str = "AUTHOR_NAME";
pub const DEFAULT_AUTHOR_EMAIL: &str = "author@example.com";
pub const DEFAULT_GITHUB_USERNAME: &str = "github_username";
pub const DEFAULT_LICENSE: &str = "MIT";
pub const DEFAULT_DEVELOPMENT_STATUS: &str = "4 - Beta";

/// Kind of configuration file to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageKind {
    #[default]
    Package,
    Plugin,
    PluginHost,
}

impl PackageKind {
    pub const ALL: [PackageKind; 3] = [Self::Package, Self::Plugin, Self::PluginHost];

    /// Name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Plugin => "plugin",
            Self::PluginHost => "plugin-host",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Package => "Standalone Python package",
            Self::Plugin => "Plugin package for a plugin host",
            Self::PluginHost => "Plugin host package that can load plugins",
        }
    }

    /// Root-level template in the store
    pub fn template(&self) -> &'static str {
        match self {
            Self::Package => "package.toml.j2",
            Self::Plugin => "plugin.toml.j2",
            Self::PluginHost => "plugin_host.toml.j2",
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "package" => Ok(Self::Package),
            "plugin" => Ok(Self::Plugin),
            "plugin-host" | "host" => Ok(Self::PluginHost),
            other => Err(format!(
                "unknown package type '{}' (expected one of: package, plugin, plugin-host)",
                other
            )),
        }
    }
}

/// Values supplied by the user; anything left `None` gets a default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValues {
    pub name: Option<String>,
    pub plugin_host: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub github_username: Option<String>,
    pub min_python: Option<String>,
    pub max_python: Option<String>,
    pub license: Option<String>,
    pub development_status: Option<String>,
    pub use_mkdocs: Option<bool>,
    pub use_vcs: Option<bool>,
}

impl ConfigValues {
    /// True when nothing was supplied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Serialize)]
struct GeneratorContext {
    name: String,
    plugin_host: Option<String>,
    author_name: String,
    author_email: String,
    github_username: String,
    min_python: String,
    max_python: Option<String>,
    license: String,
    development_status: String,
    use_mkdocs: bool,
    use_vcs: bool,
    dependencies: Vec<String>,
    plugin_dependencies: Vec<String>,
    dev_dependencies: Vec<String>,
    python_version_info: PythonVersionInfo,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_version(value: Option<&str>, field: &str) -> Result<Option<PythonVersion>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => PythonVersion::parse(v)
            .map(Some)
            .map_err(|reason| HatchError::invalid(field, reason)),
        None => Ok(None),
    }
}

/// Renders the root-level configuration templates of a store
pub struct ConfigGenerator {
    renderer: TemplateRenderer,
}

impl ConfigGenerator {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self {
            renderer: TemplateRenderer::new(store),
        }
    }

    /// Configuration file content for `kind`, defaults filled in
    pub fn generate(&self, kind: PackageKind, values: ConfigValues) -> Result<String> {
        let min = parse_version(values.min_python.as_deref(), "min_python")?
            .unwrap_or(DEFAULT_MIN_PYTHON);
        let max = parse_version(values.max_python.as_deref(), "max_python")?;
        if let Some(max) = max {
            if max.major != min.major || max < min {
                return Err(HatchError::invalid(
                    "max_python",
                    format!("maximum Python version {} is not compatible with minimum {}", max, min),
                ));
            }
        }

        let name = or_default(values.name, DEFAULT_NAME);
        let plugin_host = match kind {
            PackageKind::Plugin => Some(or_default(values.plugin_host, DEFAULT_PLUGIN_HOST)),
            PackageKind::PluginHost => Some(name.clone()),
            PackageKind::Package => None,
        };

        let context = GeneratorContext {
            name,
            plugin_host,
            author_name: or_default(values.author_name, DEFAULT_AUTHOR_NAME),
            author_email: or_default(values.author_email, DEFAULT_AUTHOR_EMAIL),
            github_username: or_default(values.github_username, DEFAULT_GITHUB_USERNAME),
            min_python: min.to_string(),
            max_python: max.map(|v| v.to_string()),
            license: or_default(values.license, DEFAULT_LICENSE),
            development_status: or_default(values.development_status, DEFAULT_DEVELOPMENT_STATUS),
            use_mkdocs: values.use_mkdocs.unwrap_or(false),
            use_vcs: values.use_vcs.unwrap_or(true),
            dependencies: Vec::new(),
            plugin_dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            python_version_info: PythonVersionInfo {
                requires_python: min.requires_python(max),
                classifiers: min.classifiers(max),
                ruff_target: min.ruff_target(),
                mypy_version: min.mypy_version(),
            },
        };

        self.renderer.render(kind.template(), &context)
    }

    /// Generate and write a configuration file to `path`
    pub fn write(&self, kind: PackageKind, path: &Path, values: ConfigValues) -> Result<()> {
        let content = self.generate(kind, values)?;
        std::fs::write(path, content).map_err(|e| HatchError::fs("write", path, e))
    }
}
