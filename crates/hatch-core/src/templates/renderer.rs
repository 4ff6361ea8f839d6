//! MiniJinja environment configured for generating source and config files

use super::store::TemplateStore;
use crate::error::{HatchError, Result};
use minijinja::{AutoEscape, Environment, Error, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;

/// Renders templates from a `TemplateStore`.
///
/// Block tags are trimmed, nothing is escaped and referencing a variable the
/// context lacks is an error instead of an empty string.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_filter("split", split);
        env.add_filter("strftime", strftime);
        env.add_filter("toml", to_toml);

        env.set_loader(move |name| {
            store.read(name).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("failed to load template '{}'", name),
                )
                .with_source(e)
            })
        });

        Self { env }
    }

    /// Render a template by identifier (`<theme>/<relative path>`)
    pub fn render<S: Serialize>(&self, template_id: &str, context: &S) -> Result<String> {
        let template = self
            .env
            .get_template(template_id)
            .map_err(|e| match e.kind() {
                ErrorKind::TemplateNotFound => HatchError::TemplateNotFound {
                    template: template_id.to_string(),
                },
                _ => map_error(template_id, e),
            })?;

        template
            .render(context)
            .map_err(|e| map_error(template_id, e))
    }
}

fn map_error(template_id: &str, err: Error) -> HatchError {
    let template = template_id.to_string();
    let message = err.to_string();
    match err.kind() {
        ErrorKind::SyntaxError => HatchError::TemplateSyntax { template, message },
        ErrorKind::UndefinedError => HatchError::UndefinedVariable { template, message },
        _ => HatchError::Render { template, message },
    }
}

/// `{{ "a,b" | split(",") }}`; splits on whitespace without a delimiter
fn split(value: &str, delimiter: Option<&str>) -> Vec<String> {
    match delimiter {
        Some(delimiter) => value.split(delimiter).map(str::to_string).collect(),
        None => value.split_whitespace().map(str::to_string).collect(),
    }
}

/// `{{ "%Y-%m-%d" | strftime }}` formats the current local time
fn strftime(format: &str) -> Result<String, Error> {
    let now = chrono::Local::now();
    let mut out = String::new();
    write!(out, "{}", now.format(format)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid strftime format '{}'", format),
        )
    })?;
    Ok(out)
}

/// `{{ value | toml }}` renders a value as an inline TOML literal
fn to_toml(value: Value) -> Result<String, Error> {
    toml::Value::try_from(&value)
        .map(|v| v.to_string())
        .map_err(|e| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("cannot express {} as TOML: {}", value, e),
            )
        })
}
