//! Template context assembled once per package

use crate::config::{PackageConfig, PackageRole, ProjectConfig};
use serde::Serialize;

/// Python version strings in the formats individual tools expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PythonVersionInfo {
    pub requires_python: String,
    pub classifiers: Vec<String>,
    pub ruff_target: String,
    pub mypy_version: String,
}

/// Variables available to every template of one package.
///
/// Built once before the first theme is applied and shared by reference with
/// every later theme of the same package.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub name: String,
    pub import_name: String,
    /// Import name with the plugin host prefix removed (`host_csv` -> `csv`)
    pub plugin_import_name: String,
    pub plugin_host: Option<String>,
    pub role: &'static str,
    pub is_package: bool,
    pub is_plugin: bool,
    pub is_plugin_host: bool,
    pub author_name: String,
    pub author_email: String,
    pub github_username: String,
    pub min_python: String,
    pub max_python: Option<String>,
    pub license: String,
    pub development_status: String,
    pub dependencies: Vec<String>,
    pub plugin_dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub use_mkdocs: bool,
    pub use_semver: bool,
    pub use_vcs: bool,
    pub python_version_info: PythonVersionInfo,
    pub tools: toml::Table,
}

impl RenderContext {
    pub fn new(project: &ProjectConfig, package: &PackageConfig) -> Self {
        let min = project.min_python;
        let max = project.max_python;

        Self {
            name: package.name.clone(),
            import_name: package.import_name.clone(),
            plugin_import_name: plugin_import_name(
                &package.import_name,
                project.plugin_host.as_deref(),
            ),
            plugin_host: project.plugin_host.clone(),
            role: package.role.theme(),
            is_package: package.role == PackageRole::Package,
            is_plugin: package.role == PackageRole::Plugin,
            is_plugin_host: package.role == PackageRole::PluginHost,
            author_name: project.author.name.clone(),
            author_email: project.author.email.clone(),
            github_username: project.author.github_username.clone(),
            min_python: min.to_string(),
            max_python: max.map(|v| v.to_string()),
            license: project.license.clone(),
            development_status: project.development_status.clone(),
            dependencies: project.dependencies.clone(),
            plugin_dependencies: project.plugin_dependencies.clone(),
            dev_dependencies: project.dev_dependencies.clone(),
            use_mkdocs: project.features.mkdocs,
            use_semver: project.features.semver,
            use_vcs: project.features.vcs,
            python_version_info: PythonVersionInfo {
                requires_python: min.requires_python(max),
                classifiers: min.classifiers(max),
                ruff_target: min.ruff_target(),
                mypy_version: min.mypy_version(),
            },
            tools: project.tools.clone(),
        }
    }
}

/// Strip the plugin host's import name (and one separator) from a plugin's
/// import name
fn plugin_import_name(import_name: &str, plugin_host: Option<&str>) -> String {
    let Some(host) = plugin_host.map(crate::config::import_name) else {
        return import_name.to_string();
    };

    match import_name.strip_prefix(&host) {
        Some(rest) if !rest.is_empty() => rest.strip_prefix('_').unwrap_or(rest).to_string(),
        _ => import_name.to_string(),
    }
}
