//! Mapping of template paths to output paths

use super::store::TEMPLATE_SUFFIX;
use crate::context::RenderContext;
use crate::error::{HatchError, Result};
use std::path::PathBuf;

/// Leading marker turning a file or directory into a dotfile (`hidden.gitignore` -> `.gitignore`)
pub const HIDDEN_MARKER: &str = "hidden.";

/// Placeholder replaced by the package's import name in any path segment
pub const PACKAGE_NAME_PLACEHOLDER: &str = "__package_name__";

/// Output path, relative to the target directory, for a template's relative path
pub fn transform(relative_path: &str, context: &RenderContext) -> Result<PathBuf> {
    transform_with(relative_path, &context.import_name)
}

/// Path rewriting applied per segment, left to right:
/// 1. a leading `hidden.` becomes `.`
/// 2. every `__package_name__` becomes `import_name`
/// 3. the `.j2` suffix is stripped from the final segment
///
/// Applying it to its own output changes nothing, except for a name ending in
/// `.j2.j2`, which loses one suffix per pass.
///
/// A segment that ends up as `.` or `..` is rejected so that output never
/// escapes the target directory.
pub fn transform_with(relative_path: &str, import_name: &str) -> Result<PathBuf> {
    let segments: Vec<&str> = relative_path
        .split(|c: char| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .collect();
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| {
            let mut out = match segment.strip_prefix(HIDDEN_MARKER) {
                Some(rest) => format!(".{}", rest),
                None => segment.to_string(),
            };
            if out.contains(PACKAGE_NAME_PLACEHOLDER) {
                out = out.replace(PACKAGE_NAME_PLACEHOLDER, import_name);
            }
            if idx == last {
                if let Some(stripped) = out.strip_suffix(TEMPLATE_SUFFIX) {
                    if !stripped.is_empty() {
                        out = stripped.to_string();
                    }
                }
            }
            if out == "." || out == ".." {
                return Err(HatchError::Render {
                    template: relative_path.to_string(),
                    message: format!("path segment '{}' resolves to '{}'", segment, out),
                });
            }
            Ok(out)
        })
        .collect()
}
