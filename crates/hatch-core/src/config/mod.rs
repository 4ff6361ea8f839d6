//! Run configuration: the `twat-hatch.toml` schema, validation and the
//! per-package view derived from it
//!
//! This module provides:
//! - `ProjectConfig`, the validated and immutable configuration of one run
//! - `PackageConfig` and `PackageRole`, the per-package role resolution
//! - Python version helpers (`python`)
//! - Configuration file generation for `init` / `config show` (`generator`)

pub mod generator;
pub mod python;

use crate::error::{HatchError, Result};
use python::PythonVersion;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Configuration file name looked up by `create` when none is given
pub const DEFAULT_CONFIG_FILE: &str = "twat-hatch.toml";

// Raw, all-optional mirror of the TOML sections. Validation turns this into
// `ProjectConfig` and reports every missing required field at once.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    project: RawProject,
    author: RawAuthor,
    package: RawPackage,
    dependencies: RawDependencies,
    development: RawDevelopment,
    tools: toml::Table,
    features: RawFeatures,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProject {
    packages: Option<Vec<String>>,
    plugin_host: Option<String>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAuthor {
    name: Option<String>,
    email: Option<String>,
    github_username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPackage {
    min_python: Option<String>,
    max_python: Option<String>,
    license: Option<String>,
    development_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDependencies {
    dependencies: Vec<String>,
    plugin_dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDevelopment {
    additional_dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFeatures {
    mkdocs: bool,
    semver: bool,
    vcs: bool,
}

/// Package author, shared by every package of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub github_username: String,
}

/// Optional features toggled in the `[features]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    /// Apply the `mkdocs` documentation theme
    pub mkdocs: bool,
    /// Exposed to templates only
    pub semver: bool,
    /// Initialize a git repository per package
    pub vcs: bool,
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Package names in the order they were listed
    pub packages: Vec<String>,
    pub plugin_host: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub author: Author,
    pub min_python: PythonVersion,
    pub max_python: Option<PythonVersion>,
    pub license: String,
    pub development_status: String,
    pub dependencies: Vec<String>,
    pub plugin_dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    /// The `[tools]` table, passed to templates verbatim
    pub tools: toml::Table,
    pub features: Features,
}

impl ProjectConfig {
    /// Load and validate a configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HatchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Parse and validate TOML content; `origin` is only used in error messages
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| HatchError::ConfigParse {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, field: &str| -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(field.to_string());
                    String::new()
                }
            }
        };

        let author = Author {
            name: require(raw.author.name, "author.name"),
            email: require(raw.author.email, "author.email"),
            github_username: require(raw.author.github_username, "author.github_username"),
        };
        let min_python = require(raw.package.min_python, "package.min_python");
        let license = require(raw.package.license, "package.license");
        let development_status =
            require(raw.package.development_status, "package.development_status");

        let packages = match raw.project.packages {
            Some(packages) if !packages.is_empty() => packages,
            _ => {
                missing.insert(0, "project.packages".to_string());
                Vec::new()
            }
        };

        if !missing.is_empty() {
            return Err(HatchError::MissingFields { fields: missing });
        }

        let mut seen = HashSet::new();
        for (idx, name) in packages.iter().enumerate() {
            validate_package_name(name)
                .map_err(|reason| HatchError::invalid(format!("project.packages[{}]", idx), reason))?;
            if !seen.insert(name.as_str()) {
                return Err(HatchError::invalid(
                    format!("project.packages[{}]", idx),
                    format!("package '{}' is listed more than once", name),
                ));
            }
        }

        let plugin_host = raw.project.plugin_host.filter(|h| !h.trim().is_empty());
        if let Some(host) = &plugin_host {
            validate_package_name(host)
                .map_err(|reason| HatchError::invalid("project.plugin_host", reason))?;
        }

        let min_python = PythonVersion::parse(&min_python)
            .map_err(|reason| HatchError::invalid("package.min_python", reason))?;
        let max_python = match raw.package.max_python.filter(|v| !v.trim().is_empty()) {
            Some(v) => {
                let max = PythonVersion::parse(&v)
                    .map_err(|reason| HatchError::invalid("package.max_python", reason))?;
                if max.major != min_python.major {
                    return Err(HatchError::invalid(
                        "package.max_python",
                        format!(
                            "maximum Python version {} must have the same major version as minimum {}",
                            max, min_python
                        ),
                    ));
                }
                if max < min_python {
                    return Err(HatchError::invalid(
                        "package.max_python",
                        format!("maximum Python version {} is lower than minimum {}", max, min_python),
                    ));
                }
                Some(max)
            }
            None => None,
        };

        Ok(Self {
            packages,
            plugin_host,
            output_dir: raw.project.output_dir,
            author,
            min_python,
            max_python,
            license,
            development_status,
            dependencies: raw.dependencies.dependencies,
            plugin_dependencies: raw.dependencies.plugin_dependencies,
            dev_dependencies: raw.development.additional_dependencies,
            tools: raw.tools,
            features: Features {
                mkdocs: raw.features.mkdocs,
                semver: raw.features.semver,
                vcs: raw.features.vcs,
            },
        })
    }

    /// Role of a package within this run
    pub fn role_of(&self, name: &str) -> PackageRole {
        match &self.plugin_host {
            Some(host) if host == name => PackageRole::PluginHost,
            Some(_) => PackageRole::Plugin,
            None => PackageRole::Package,
        }
    }

    /// Per-package view of this configuration
    pub fn package(&self, name: &str) -> PackageConfig {
        let role = self.role_of(name);
        PackageConfig {
            name: name.to_string(),
            import_name: import_name(name),
            plugin_host: match role {
                PackageRole::Plugin => self.plugin_host.clone(),
                _ => None,
            },
            role,
        }
    }

    /// Package names in initialization order: the plugin host first when it
    /// is part of this run, then the rest in listed order.
    pub fn initialization_order(&self) -> Vec<&str> {
        let host = self
            .plugin_host
            .as_deref()
            .filter(|host| self.packages.iter().any(|p| p == host));

        host.into_iter()
            .chain(
                self.packages
                    .iter()
                    .map(String::as_str)
                    .filter(|name| Some(*name) != host),
            )
            .collect()
    }

    /// Output directory, with relative paths resolved against `base_dir`
    pub fn resolve_output_dir(&self, base_dir: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        }
    }
}

/// What a package is for; selects exactly one role theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageRole {
    /// Standalone package
    Package,
    /// Plugin loaded by the configured plugin host
    Plugin,
    /// The package plugins register with
    PluginHost,
}

impl PackageRole {
    /// Theme applied on top of the base theme for this role
    pub fn theme(&self) -> &'static str {
        match self {
            PackageRole::Package => "package",
            PackageRole::Plugin => "plugin",
            PackageRole::PluginHost => "plugin_host",
        }
    }
}

impl fmt::Display for PackageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PackageRole::Package => "package",
            PackageRole::Plugin => "plugin",
            PackageRole::PluginHost => "plugin host",
        };
        write!(f, "{}", label)
    }
}

/// One package request derived from the project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    pub name: String,
    /// Python import name: the package name with `-` replaced by `_`
    pub import_name: String,
    pub role: PackageRole,
    /// Host this package plugs into; only set for plugins
    pub plugin_host: Option<String>,
}

/// Python import name for a distribution name
pub fn import_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Check that a name can be used as both a directory and (after `-` → `_`)
/// a Python import name
pub fn validate_package_name(name: &str) -> std::result::Result<(), String> {
    let first = name
        .chars()
        .next()
        .ok_or_else(|| "package name is empty".to_string())?;
    if first.is_ascii_digit() {
        return Err(format!("package name '{}' starts with a digit", name));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(format!(
            "package name '{}' contains invalid character '{}'",
            name, bad
        ));
    }
    Ok(())
}
