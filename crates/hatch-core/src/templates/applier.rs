//! Rendering a whole theme into a target directory

use super::path;
use super::renderer::TemplateRenderer;
use super::store::TemplateStore;
use crate::context::RenderContext;
use crate::error::{HatchError, Result};
use crate::report::{Event, Reporter};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Applies themes from one store, reporting every written file
pub struct ThemeApplier {
    store: Arc<dyn TemplateStore>,
    renderer: TemplateRenderer,
    reporter: Arc<dyn Reporter>,
}

impl ThemeApplier {
    pub fn new(store: Arc<dyn TemplateStore>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            renderer: TemplateRenderer::new(Arc::clone(&store)),
            store,
            reporter,
        }
    }

    /// Render every template of `theme` into `target_dir`, overwriting
    /// existing files. Returns the written paths in template order.
    ///
    /// The first render or I/O error stops the theme. Files written before the
    /// failure are left in place.
    pub fn apply(
        &self,
        theme: &str,
        target_dir: &Path,
        context: &RenderContext,
    ) -> Result<Vec<PathBuf>> {
        let templates = self.store.templates(theme)?;

        fs::create_dir_all(target_dir)
            .map_err(|e| HatchError::fs("create directory", target_dir, e))?;

        let mut written = Vec::with_capacity(templates.len());

        for template in &templates {
            let target_path = target_dir.join(path::transform(&template.relative_path, context)?);
            let content = self.renderer.render(&template.id(), context)?;

            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| HatchError::fs("create directory", parent, e))?;
            }
            fs::write(&target_path, content)
                .map_err(|e| HatchError::fs("write", &target_path, e))?;

            self.reporter.report(Event::FileWritten {
                theme: theme.to_string(),
                path: target_path.clone(),
            });
            written.push(target_path);
        }

        self.reporter.report(Event::ThemeApplied {
            theme: theme.to_string(),
            files: written.len(),
        });

        Ok(written)
    }
}
