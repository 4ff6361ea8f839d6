//! Theme storage, path rewriting, rendering and application
//!
//! This module provides:
//! - Template Store backends (directory on disk, bundled into the binary)
//! - The path transformer (`hidden.` prefix, `__package_name__`, `.j2` suffix)
//! - The MiniJinja-based renderer
//! - The theme applier that writes a rendered theme into a directory

pub mod applier;
pub mod path;
pub mod renderer;
pub mod store;

pub use applier::ThemeApplier;
pub use path::{transform, HIDDEN_MARKER, PACKAGE_NAME_PLACEHOLDER};
pub use renderer::TemplateRenderer;
pub use store::{
    DirectoryStore, EmbeddedStore, TemplateFile, TemplateStore, ThemeSource, TEMPLATE_SUFFIX,
    THEMES_DIR_ENV,
};
