//! Template Store: named themes, each a directory tree of `.j2` templates
//!
//! Two backends are provided:
//! - `DirectoryStore`: a themes root on disk (`--themes-dir`, `TWAT_HATCH_THEMES`)
//! - `EmbeddedStore`: the `themes/` directory compiled into the binary
//!
//! Template identifiers are `/`-separated paths relative to the themes root,
//! e.g. `default/hidden.gitignore.j2`. Directories whose name starts with `_`
//! hold shared partials and are never listed as themes.

use crate::error::{HatchError, Result};
use rust_embed::RustEmbed;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Suffix marking a file as a renderable template
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Environment variable overriding the bundled themes with a directory
pub const THEMES_DIR_ENV: &str = "TWAT_HATCH_THEMES";

/// One template file discovered in a theme
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateFile {
    pub theme: String,
    /// `/`-separated path relative to the theme directory, suffix included
    pub relative_path: String,
}

impl TemplateFile {
    /// Identifier understood by the renderer
    pub fn id(&self) -> String {
        format!("{}/{}", self.theme, self.relative_path)
    }
}

/// A named collection of themes
pub trait TemplateStore: Send + Sync + 'static {
    /// Human-readable location, used in error messages
    fn describe(&self) -> String;

    /// Names of all themes, sorted
    fn theme_names(&self) -> Vec<String>;

    fn has_theme(&self, theme: &str) -> bool {
        is_theme_name(theme) && self.theme_names().iter().any(|t| t == theme)
    }

    /// Every template of a theme in lexical path order.
    ///
    /// Fails with `ThemeNotFound` when the theme does not exist.
    fn templates(&self, theme: &str) -> Result<Vec<TemplateFile>>;

    /// Source of a template or partial; `None` when the identifier is unknown
    fn read(&self, id: &str) -> Result<Option<String>>;
}

fn is_theme_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('_')
        && !name.starts_with('.')
        && !name.contains(|c: char| c == '/' || c == '\\')
}

fn theme_not_found(theme: &str, store: &dyn TemplateStore) -> HatchError {
    HatchError::ThemeNotFound {
        theme: theme.to_string(),
        store: store.describe(),
    }
}

/// Themes stored as directories under a root on disk
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier below the root, refusing anything that escapes it
    fn resolve(&self, id: &str) -> Option<PathBuf> {
        let relative = Path::new(id);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

impl TemplateStore for DirectoryStore {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn theme_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_theme_name(name))
            .collect();
        names.sort();
        names
    }

    fn has_theme(&self, theme: &str) -> bool {
        is_theme_name(theme) && self.root.join(theme).is_dir()
    }

    fn templates(&self, theme: &str) -> Result<Vec<TemplateFile>> {
        if !self.has_theme(theme) {
            return Err(theme_not_found(theme, self));
        }

        let theme_dir = self.root.join(theme);
        let mut files = Vec::new();

        for entry in WalkDir::new(&theme_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&theme_dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                HatchError::fs("walk", path, source)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&theme_dir) else {
                continue;
            };
            let relative_path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if relative_path.ends_with(TEMPLATE_SUFFIX) {
                files.push(TemplateFile {
                    theme: theme.to_string(),
                    relative_path,
                });
            }
        }

        Ok(files)
    }

    fn read(&self, id: &str) -> Result<Option<String>> {
        let Some(path) = self.resolve(id) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| HatchError::fs("read template", path, e))
    }
}

#[derive(RustEmbed)]
#[folder = "../../themes/"]
struct BundledThemes;

/// Themes compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedStore;

impl TemplateStore for EmbeddedStore {
    fn describe(&self) -> String {
        "bundled themes".to_string()
    }

    fn theme_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BundledThemes::iter()
            .filter_map(|path| path.split_once('/').map(|(theme, _)| theme.to_string()))
            .filter(|name| is_theme_name(name))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn templates(&self, theme: &str) -> Result<Vec<TemplateFile>> {
        if !self.has_theme(theme) {
            return Err(theme_not_found(theme, self));
        }

        let prefix = format!("{}/", theme);
        let mut files: Vec<TemplateFile> = BundledThemes::iter()
            .filter_map(|path| {
                path.strip_prefix(&prefix)
                    .filter(|rest| rest.ends_with(TEMPLATE_SUFFIX))
                    .map(|rest| TemplateFile {
                        theme: theme.to_string(),
                        relative_path: rest.to_string(),
                    })
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn read(&self, id: &str) -> Result<Option<String>> {
        let Some(file) = BundledThemes::get(id) else {
            return Ok(None);
        };
        String::from_utf8(file.data.into_owned())
            .map(Some)
            .map_err(|_| HatchError::Render {
                template: id.to_string(),
                message: "template is not valid UTF-8".to_string(),
            })
    }
}

/// Where themes are loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSource {
    Directory(PathBuf),
    Bundled,
}

impl ThemeSource {
    /// An explicit directory wins, then `TWAT_HATCH_THEMES`, then the bundled themes
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        explicit
            .or_else(|| {
                std::env::var_os(THEMES_DIR_ENV)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .map_or(Self::Bundled, Self::Directory)
    }

    pub fn open(self) -> Arc<dyn TemplateStore> {
        match self {
            Self::Directory(path) => Arc::new(DirectoryStore::new(path)),
            Self::Bundled => Arc::new(EmbeddedStore),
        }
    }
}

impl fmt::Display for ThemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => write!(f, "{}", path.display()),
            Self::Bundled => write!(f, "bundled themes"),
        }
    }
}
