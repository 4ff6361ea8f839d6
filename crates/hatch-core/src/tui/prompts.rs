//! Charm-style prompts filling in a configuration file's values

use crate::config::generator::{
    ConfigValues, PackageKind, DEFAULT_DEVELOPMENT_STATUS, DEFAULT_LICENSE, DEFAULT_NAME,
    DEFAULT_PLUGIN_HOST,
};
use crate::config::python::{PythonVersion, DEFAULT_MIN_PYTHON};
use crate::config::validate_package_name;
use anyhow::Result;

const DEVELOPMENT_STATUSES: &[&str] = &[
    "1 - Planning",
    "2 - Pre-Alpha",
    "3 - Alpha",
    "4 - Beta",
    "5 - Production/Stable",
    "6 - Mature",
    "7 - Inactive",
];

/// Ask for every value `init` needs.
///
/// `kind` skips the package type question. Values already present in
/// `values` are used as prompt defaults.
pub fn prompt_config_values(
    kind: Option<PackageKind>,
    values: ConfigValues,
) -> Result<(PackageKind, ConfigValues)> {
    cliclack::intro("twat-hatch init")?;

    let kind = match kind {
        Some(kind) => {
            cliclack::log::info(format!("Package type: {} ({})", kind, kind.description()))?;
            kind
        }
        None => select_kind()?,
    };

    let name = text(
        "Package name",
        values.name.as_deref(),
        DEFAULT_NAME,
        |input: &String| validate_package_name(input),
    )?;

    let plugin_host = if kind == PackageKind::Plugin {
        Some(text(
            "Plugin host package",
            values.plugin_host.as_deref(),
            DEFAULT_PLUGIN_HOST,
            |input: &String| validate_package_name(input),
        )?)
    } else {
        values.plugin_host
    };

    let author_name: String = cliclack::input("Author name")
        .default_input(values.author_name.as_deref().unwrap_or_default())
        .interact()?;
    let author_email: String = cliclack::input("Author email")
        .default_input(values.author_email.as_deref().unwrap_or_default())
        .validate(|input: &String| {
            if input.contains('@') {
                Ok(())
            } else {
                Err("Please enter an email address")
            }
        })
        .interact()?;
    let github_username: String = cliclack::input("GitHub username")
        .default_input(values.github_username.as_deref().unwrap_or_default())
        .interact()?;

    let min_python = text(
        "Minimum Python version",
        values.min_python.as_deref(),
        &DEFAULT_MIN_PYTHON.to_string(),
        |input: &String| PythonVersion::parse(input).map(|_| ()),
    )?;
    let max_python: String = cliclack::input("Maximum Python version (empty for none)")
        .default_input(values.max_python.as_deref().unwrap_or_default())
        .required(false)
        .validate(|input: &String| {
            if input.trim().is_empty() {
                Ok(())
            } else {
                PythonVersion::parse(input).map(|_| ())
            }
        })
        .interact()?;

    let license = text("License", values.license.as_deref(), DEFAULT_LICENSE, |_: &String| {
        Ok::<(), String>(())
    })?;

    let development_status = select_status(values.development_status.as_deref())?;

    let use_mkdocs: bool = cliclack::confirm("Add MkDocs documentation?")
        .initial_value(values.use_mkdocs.unwrap_or(false))
        .interact()?;
    let use_vcs: bool = cliclack::confirm("Initialize a git repository?")
        .initial_value(values.use_vcs.unwrap_or(true))
        .interact()?;

    Ok((
        kind,
        ConfigValues {
            name: Some(name),
            plugin_host,
            author_name: Some(author_name),
            author_email: Some(author_email),
            github_username: Some(github_username),
            min_python: Some(min_python),
            max_python: Some(max_python).filter(|v| !v.trim().is_empty()),
            license: Some(license),
            development_status: Some(development_status),
            use_mkdocs: Some(use_mkdocs),
            use_vcs: Some(use_vcs),
        },
    ))
}

fn select_kind() -> Result<PackageKind> {
    let mut select = cliclack::select("What do you want to create?");
    for kind in PackageKind::ALL {
        select = select.item(kind, kind.as_str(), kind.description());
    }
    Ok(select.interact()?)
}

fn select_status(current: Option<&str>) -> Result<String> {
    let current = current.unwrap_or(DEFAULT_DEVELOPMENT_STATUS);
    let mut select = cliclack::select("Development status");
    for status in DEVELOPMENT_STATUSES {
        select = select.item(status.to_string(), *status, "");
    }
    if DEVELOPMENT_STATUSES.contains(&current) {
        select = select.initial_value(current.to_string());
    }
    Ok(select.interact()?)
}

/// Required text input with a placeholder default and a validator
fn text<F>(prompt: &str, current: Option<&str>, default: &str, validate: F) -> Result<String>
where
    F: Fn(&String) -> std::result::Result<(), String> + 'static,
{
    let initial = current.unwrap_or(default);
    let value: String = cliclack::input(prompt)
        .placeholder(default)
        .default_input(initial)
        .validate(validate)
        .interact()?;
    Ok(value.trim().to_string())
}
