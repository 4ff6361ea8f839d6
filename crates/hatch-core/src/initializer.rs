//! Package initialization: theme selection, output layout and VCS bookkeeping

use crate::config::{validate_package_name, PackageConfig, PackageRole, ProjectConfig};
use crate::context::RenderContext;
use crate::error::{HatchError, Result};
use crate::report::{Event, Reporter};
use crate::templates::{TemplateStore, ThemeApplier};
use crate::vcs::{CommitIdentity, GitCli, VcsOutcome};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Theme applied to every package before its role theme
pub const BASE_THEME: &str = "default";

/// Feature themes, in the order they are applied
pub const MKDOCS_THEME: &str = "mkdocs";

/// Empty module the build backend fills in with the release version
pub const VERSION_FILE: &str = "__version__.py";

/// Result of one successfully scaffolded package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub name: String,
    pub role: PackageRole,
    pub target_dir: PathBuf,
    /// Themes in the order they were applied
    pub themes: Vec<String>,
    pub files: Vec<PathBuf>,
    /// `None` when version control is disabled
    pub vcs: Option<VcsOutcome>,
}

impl PackageReport {
    pub fn warnings(&self) -> &[String] {
        self.vcs
            .as_ref()
            .map(|vcs| vcs.warnings.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum PackageOutcome {
    Success(PackageReport),
    Failed { name: String, error: HatchError },
}

impl PackageOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Success(report) => &report.name,
            Self::Failed { name, .. } => name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Per-package outcomes of `initialize_all`, in initialization order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<PackageOutcome>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(PackageOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PackageReport> {
        self.outcomes.iter().filter_map(|o| match o {
            PackageOutcome::Success(report) => Some(report),
            PackageOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &HatchError)> {
        self.outcomes.iter().filter_map(|o| match o {
            PackageOutcome::Failed { name, error } => Some((name.as_str(), error)),
            PackageOutcome::Success(_) => None,
        })
    }
}

/// Scaffolds the packages of one validated configuration.
///
/// Packages are processed one after another; each owns the subdirectory
/// `<output_dir>/<import_name>` while it is being written.
pub struct PackageInitializer {
    config: ProjectConfig,
    output_dir: PathBuf,
    applier: ThemeApplier,
    reporter: Arc<dyn Reporter>,
    vcs: GitCli,
}

impl PackageInitializer {
    /// `base_dir` anchors a relative `project.output_dir`
    pub fn new(
        config: ProjectConfig,
        base_dir: &Path,
        store: Arc<dyn TemplateStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            output_dir: config.resolve_output_dir(base_dir),
            applier: ThemeApplier::new(store, Arc::clone(&reporter)),
            config,
            reporter,
            vcs: GitCli::default(),
        }
    }

    pub fn with_vcs(mut self, vcs: GitCli) -> Self {
        self.vcs = vcs;
        self
    }

    /// Replace the configured output directory
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Themes applied to a package: the base theme, exactly one role theme,
    /// then every enabled feature theme
    pub fn theme_plan(&self, package: &PackageConfig) -> Vec<&'static str> {
        let mut plan = vec![BASE_THEME, package.role.theme()];
        if self.config.features.mkdocs {
            plan.push(MKDOCS_THEME);
        }
        plan
    }

    /// Scaffold one package into `<output_dir>/<import_name>`.
    ///
    /// A theme that fails leaves the files of earlier themes on disk.
    /// Version control problems are reported as warnings and never fail the
    /// package.
    pub fn initialize_package(&self, name: &str) -> Result<PackageReport> {
        validate_package_name(name).map_err(|reason| HatchError::invalid("package", reason))?;

        let package = self.config.package(name);
        let context = RenderContext::new(&self.config, &package);
        let target_dir = self.output_dir.join(&package.import_name);

        self.reporter.report(Event::PackageStarted {
            name: package.name.clone(),
            role: package.role,
            target: target_dir.clone(),
        });

        let source_dir = target_dir.join("src").join(&package.import_name);
        fs::create_dir_all(&source_dir)
            .map_err(|e| HatchError::fs("create directory", &source_dir, e))?;

        let mut themes = Vec::new();
        let mut files = Vec::new();
        for theme in self.theme_plan(&package) {
            files.extend(self.applier.apply(theme, &target_dir, &context)?);
            themes.push(theme.to_string());
        }

        let version_file = source_dir.join(VERSION_FILE);
        touch(&version_file)?;
        self.reporter.report(Event::FileWritten {
            theme: String::new(),
            path: version_file.clone(),
        });
        files.push(version_file);

        let vcs = self.config.features.vcs.then(|| {
            let identity = CommitIdentity {
                name: self.config.author.name.clone(),
                email: self.config.author.email.clone(),
            };
            self.vcs.initialize(
                &target_dir,
                &identity,
                &self.config.author.github_username,
                &package.import_name,
                self.reporter.as_ref(),
            )
        });

        self.reporter.report(Event::PackageFinished {
            name: package.name.clone(),
            files: files.len(),
        });

        Ok(PackageReport {
            name: package.name,
            role: package.role,
            target_dir,
            themes,
            files,
            vcs,
        })
    }

    /// Scaffold every configured package, plugin host first.
    ///
    /// Render and filesystem errors fail only the package they occur in.
    /// Errors that would repeat for every package (configuration, missing
    /// theme) stop the run and are returned.
    pub fn initialize_all(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for name in self.config.initialization_order() {
            match self.initialize_package(name) {
                Ok(report) => summary.outcomes.push(PackageOutcome::Success(report)),
                Err(error) if error.is_fatal_to_run() => return Err(error),
                Err(error) => {
                    self.reporter.report(Event::PackageFailed {
                        name: name.to_string(),
                        error: error.to_string(),
                    });
                    summary.outcomes.push(PackageOutcome::Failed {
                        name: name.to_string(),
                        error,
                    });
                }
            }
        }

        Ok(summary)
    }
}

/// Create an empty file, leaving existing content untouched
fn touch(path: &Path) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(|e| HatchError::fs("create", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use crate::templates::{DirectoryStore, EmbeddedStore};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(packages: &[&str], plugin_host: Option<&str>, features: &str) -> ProjectConfig {
        let list = packages
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", ");
        let host = plugin_host
            .map(|h| format!("plugin_host = \"{}\"", h))
            .unwrap_or_default();
        let content = format!(
            r#"
[project]
packages = [{list}]
{host}

[author]
name = "Ada \"Countess\" Lovelace"
email = "ada@example.com"
github_username = "ada"

[package]
min_python = "3.10"
max_python = "3.12"
license = "MIT"
development_status = "4 - Beta"

[dependencies]
dependencies = ["rich", 'tomli; python_version < "3.11"']
plugin_dependencies = ["httpx"]

[development]
additional_dependencies = ["pytest-cov"]

[tools.ruff]
line-length = 100

[features]
{features}
"#
        );
        ProjectConfig::from_toml_str(&content, Path::new("twat-hatch.toml")).unwrap()
    }

    /// Themes root where every theme writes one marker file
    fn marker_themes() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for theme in ["default", "package", "plugin", "plugin_host", "mkdocs"] {
            write(
                tmp.path(),
                &format!("{theme}/{theme}.txt.j2"),
                "{{ name }} is a {{ role }}\n",
            );
        }
        write(
            tmp.path(),
            "default/src/__package_name__/__init__.py.j2",
            "\"\"\"{{ import_name }}\"\"\"\n",
        );
        tmp
    }

    fn initializer(
        config: ProjectConfig,
        themes: &Path,
        out: &Path,
    ) -> (PackageInitializer, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let init = PackageInitializer::new(
            config,
            out,
            Arc::new(DirectoryStore::new(themes)),
            reporter.clone(),
        )
        .with_vcs(GitCli::with_programs(
            out.join("no-such-git"),
            out.join("no-such-gh"),
        ));
        (init, reporter)
    }

    fn started(reporter: &RecordingReporter) -> Vec<String> {
        reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::PackageStarted { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plugin_host_initialized_first() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["host-plugin-a", "host"], Some("host"), "");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        let summary = init.initialize_all().unwrap();

        assert!(summary.is_success());
        assert_eq!(started(&reporter), vec!["host", "host-plugin-a"]);
        assert_eq!(
            reporter.applied_themes(),
            vec!["default", "plugin_host", "default", "plugin"]
        );
        assert_eq!(
            fs::read_to_string(out.path().join("host/plugin_host.txt")).unwrap(),
            "host is a plugin_host\n"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("host_plugin_a/plugin.txt")).unwrap(),
            "host-plugin-a is a plugin\n"
        );
        assert!(!out.path().join("host/plugin.txt").exists());
        assert!(!out.path().join("host_plugin_a/plugin_host.txt").exists());
    }

    #[test]
    fn test_absent_plugin_host_keeps_listed_order() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["b-plugin", "a-plugin"], Some("elsewhere"), "");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        init.initialize_all().unwrap();

        assert_eq!(started(&reporter), vec!["b-plugin", "a-plugin"]);
        assert_eq!(reporter.applied_themes(), vec!["default", "plugin", "default", "plugin"]);
    }

    #[test]
    fn test_theme_plan() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();

        let cfg = config(&["solo"], None, "mkdocs = true");
        let (init, _) = initializer(cfg, themes.path(), out.path());
        assert_eq!(
            init.theme_plan(&init.config().package("solo")),
            vec!["default", "package", "mkdocs"]
        );

        let cfg = config(&["host", "host-x"], Some("host"), "");
        let (init, _) = initializer(cfg, themes.path(), out.path());
        assert_eq!(
            init.theme_plan(&init.config().package("host")),
            vec!["default", "plugin_host"]
        );
        assert_eq!(
            init.theme_plan(&init.config().package("host-x")),
            vec!["default", "plugin"]
        );
    }

    #[test]
    fn test_package_layout_and_version_file() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["acme-tool"], None, "");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        let report = init.initialize_package("acme-tool").unwrap();

        let target = out.path().join("acme_tool");
        assert_eq!(report.target_dir, target);
        assert_eq!(report.role, PackageRole::Package);
        assert_eq!(report.themes, vec!["default", "package"]);
        assert_eq!(report.vcs, None);

        let version = target.join("src/acme_tool/__version__.py");
        assert_eq!(fs::read_to_string(&version).unwrap(), "");
        assert_eq!(report.files.last(), Some(&version));
        assert_eq!(reporter.written_files(), report.files);
        assert!(target.join("src/acme_tool/__init__.py").is_file());
    }

    #[test]
    fn test_version_file_content_is_preserved() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        write(out.path(), "acme/src/acme/__version__.py", "__version__ = \"1.0\"\n");
        let cfg = config(&["acme"], None, "");
        let (init, _) = initializer(cfg, themes.path(), out.path());

        init.initialize_package("acme").unwrap();

        assert_eq!(
            fs::read_to_string(out.path().join("acme/src/acme/__version__.py")).unwrap(),
            "__version__ = \"1.0\"\n"
        );
    }

    #[test]
    fn test_missing_feature_theme_keeps_earlier_files() {
        let themes = marker_themes();
        fs::remove_dir_all(themes.path().join("mkdocs")).unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["docs-pkg"], None, "mkdocs = true");
        let (init, _) = initializer(cfg, themes.path(), out.path());

        let err = init.initialize_package("docs-pkg").unwrap_err();

        assert!(matches!(err, HatchError::ThemeNotFound { ref theme, .. } if theme == "mkdocs"));
        assert!(out.path().join("docs_pkg/default.txt").is_file());
        assert!(out.path().join("docs_pkg/package.txt").is_file());
        assert!(!out.path().join("docs_pkg/mkdocs.txt").exists());
    }

    #[test]
    fn test_missing_theme_stops_the_run() {
        let themes = marker_themes();
        fs::remove_dir_all(themes.path().join("plugin")).unwrap();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["host", "host-a", "host-b"], Some("host"), "");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        let err = init.initialize_all().unwrap_err();

        assert!(matches!(err, HatchError::ThemeNotFound { .. }));
        assert_eq!(started(&reporter), vec!["host", "host-a"]);
        assert!(!out.path().join("host_b").exists());
    }

    #[test]
    fn test_render_failure_is_isolated_to_its_package() {
        let themes = marker_themes();
        write(
            themes.path(),
            "package/broken.txt.j2",
            "{% if name == \"bad\" %}{{ no_such_variable }}{% endif %}ok\n",
        );
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["bad", "good"], None, "");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        let summary = init.initialize_all().unwrap();

        assert!(!summary.is_success());
        let failures: Vec<&str> = summary.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["bad"]);
        let succeeded: Vec<&str> = summary.succeeded().map(|r| r.name.as_str()).collect();
        assert_eq!(succeeded, vec!["good"]);
        assert!(out.path().join("good/broken.txt").is_file());
        assert!(reporter
            .events()
            .iter()
            .any(|e| matches!(e, Event::PackageFailed { name, .. } if name == "bad")));
    }

    #[test]
    fn test_unavailable_git_is_only_a_warning() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        let cfg = config(&["vcs-pkg"], None, "vcs = true");
        let (init, reporter) = initializer(cfg, themes.path(), out.path());

        let summary = init.initialize_all().unwrap();

        assert!(summary.is_success());
        let report = summary.succeeded().next().unwrap();
        let vcs = report.vcs.as_ref().unwrap();
        assert!(!vcs.initialized);
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(reporter.warnings().len(), 1);
        assert!(out.path().join("vcs_pkg/default.txt").is_file());
    }

    #[test]
    fn test_output_dir_is_resolved_against_base_dir() {
        let themes = marker_themes();
        let base = tempfile::tempdir().unwrap();
        let mut cfg = config(&["pkg"], None, "");
        cfg.output_dir = Some(PathBuf::from("build"));
        let (init, _) = initializer(cfg, themes.path(), base.path());
        assert_eq!(init.output_dir(), base.path().join("build"));

        let other = tempfile::tempdir().unwrap();
        let init = init.with_output_dir(other.path());
        let report = init.initialize_package("pkg").unwrap();
        assert_eq!(report.target_dir, other.path().join("pkg"));
    }

    #[test]
    fn test_invalid_package_name_is_rejected() {
        let themes = marker_themes();
        let out = tempfile::tempdir().unwrap();
        let (init, _) = initializer(config(&["ok"], None, ""), themes.path(), out.path());
        let err = init.initialize_package("../escape").unwrap_err();
        assert!(matches!(err, HatchError::InvalidField { .. }));
    }

    fn bundled(config: ProjectConfig, out: &Path) -> RunSummary {
        let reporter = Arc::new(RecordingReporter::new());
        PackageInitializer::new(config, out, Arc::new(EmbeddedStore), reporter)
            .initialize_all()
            .unwrap()
    }

    fn assert_success(summary: &RunSummary) {
        for (name, error) in summary.failures() {
            panic!("{name} failed: {error}");
        }
    }

    #[test]
    fn test_bundled_themes_render_for_every_role() {
        let out = tempfile::tempdir().unwrap();

        let summary = bundled(
            config(&["acme", "acme-csv"], Some("acme"), "mkdocs = true\nsemver = true"),
            out.path(),
        );
        assert_success(&summary);
        let summary = bundled(config(&["acme-tool"], None, "mkdocs = true"), out.path());
        assert_success(&summary);
        let summary = bundled(config(&["plain"], None, ""), out.path());
        assert_success(&summary);

        for pkg in ["acme", "acme_csv", "acme_tool", "plain"] {
            let root = out.path().join(pkg);
            assert!(root.join(".gitignore").is_file(), "{pkg}: .gitignore");
            assert!(root.join("README.md").is_file(), "{pkg}: README.md");
            assert!(root.join(format!("src/{pkg}/__init__.py")).is_file(), "{pkg}: __init__.py");
            assert!(root.join(format!("src/{pkg}/__version__.py")).is_file(), "{pkg}: version");

            let pyproject = fs::read_to_string(root.join("pyproject.toml")).unwrap();
            let parsed: toml::Table = toml::from_str(&pyproject)
                .unwrap_or_else(|e| panic!("{pkg}: invalid pyproject.toml: {e}\n{pyproject}"));
            let project = &parsed["project"];
            assert_eq!(project["name"].as_str(), Some(pkg.replace('_', "-").as_str()));
            assert_eq!(
                project["authors"][0]["name"].as_str(),
                Some(r#"Ada "Countess" Lovelace"#),
                "{pkg}: author"
            );
            let deps: Vec<&str> = project["dependencies"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|d| d.as_str())
                .collect();
            assert!(deps.contains(&r#"tomli; python_version < "3.11""#), "{pkg}: {deps:?}");
        }

        assert!(out.path().join("acme/mkdocs.yml").is_file());
        assert!(out.path().join("acme_tool/docs/index.md").is_file());
        assert!(!out.path().join("plain/mkdocs.yml").exists());
        assert!(out.path().join("acme_csv/src/acme_csv/plugin.py").is_file());
        assert!(out.path().join("acme_tool/src/acme_tool/acme_tool.py").is_file());
    }
}
