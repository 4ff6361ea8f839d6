//! twat-hatch CLI - Layered scaffolding for Python packages, plugins and plugin hosts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hatch_core::{
    ConfigGenerator, ConfigValues, ConsoleReporter, PackageInitializer, PackageKind,
    ProjectConfig, RunSummary, ThemeSource, DEFAULT_CONFIG_FILE,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "twat-hatch")]
#[command(about = "Scaffold Python packages, plugins and plugin hosts from layered themes")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a twat-hatch.toml configuration file
    Init(InitArgs),
    /// Inspect configuration templates
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Create packages from a configuration file
    Create(CreateArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print an example configuration for a package type
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Package type: package, plugin or plugin-host
    #[arg(short = 't', long = "type")]
    pub kind: Option<PackageKind>,

    /// Configuration file to write
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Package name
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(long)]
    pub author_name: Option<String>,

    #[arg(long)]
    pub author_email: Option<String>,

    #[arg(long)]
    pub github_username: Option<String>,

    /// Minimum Python version (e.g. 3.10 or 3,10)
    #[arg(long)]
    pub min_python: Option<String>,

    /// Maximum supported Python version, inclusive
    #[arg(long)]
    pub max_python: Option<String>,

    #[arg(long)]
    pub license: Option<String>,

    /// Trove development status, e.g. "4 - Beta"
    #[arg(long)]
    pub development_status: Option<String>,

    /// Plugin host package (plugins only)
    #[arg(long)]
    pub plugin_host: Option<String>,

    /// Enable the MkDocs documentation theme
    #[arg(long)]
    pub mkdocs: bool,

    /// Do not initialize git repositories
    #[arg(long)]
    pub no_vcs: bool,

    /// Use defaults for everything not given (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,

    /// Themes directory to use instead of the bundled themes
    #[arg(long = "themes-dir")]
    pub themes_dir: Option<PathBuf>,
}

impl InitArgs {
    fn values(&self) -> ConfigValues {
        ConfigValues {
            name: self.name.clone(),
            plugin_host: self.plugin_host.clone(),
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
            github_username: self.github_username.clone(),
            min_python: self.min_python.clone(),
            max_python: self.max_python.clone(),
            license: self.license.clone(),
            development_status: self.development_status.clone(),
            use_mkdocs: self.mkdocs.then_some(true),
            use_vcs: self.no_vcs.then_some(false),
        }
    }
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Package type: package, plugin or plugin-host
    #[arg(short = 't', long = "type", default_value = "package")]
    pub kind: PackageKind,

    /// Themes directory to use instead of the bundled themes
    #[arg(long = "themes-dir")]
    pub themes_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Default)]
pub struct CreateArgs {
    /// Configuration file
    pub config: Option<PathBuf>,

    /// Directory to create packages in, overriding project.output_dir
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Themes directory to use instead of the bundled themes
    #[arg(long = "themes-dir")]
    pub themes_dir: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn init(args: InitArgs) -> Result<()> {
    let store = ThemeSource::resolve(args.themes_dir.clone()).open();
    let generator = ConfigGenerator::new(store);
    let values = args.values();

    let interactive = values.is_empty() && !args.yes && console::Term::stdout().is_term();

    let (kind, values) = if interactive {
        hatch_core::prompt_config_values(args.kind, values)?
    } else {
        (args.kind.unwrap_or_default(), values)
    };

    generator
        .write(kind, &args.output, values)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} {} configuration written to {}",
        "✓".green(),
        kind,
        args.output.display().to_string().cyan()
    );
    println!("  Run `twat-hatch create` to generate the package.");
    Ok(())
}

fn show(args: ShowArgs) -> Result<()> {
    let store = ThemeSource::resolve(args.themes_dir).open();
    let content = ConfigGenerator::new(store)
        .generate(args.kind, ConfigValues::default())
        .with_context(|| format!("Failed to generate {} configuration", args.kind))?;
    print!("{}", content);
    Ok(())
}

fn create(args: CreateArgs) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = ProjectConfig::from_path(&config_path)
        .with_context(|| format!("Invalid configuration {}", config_path.display()))?;

    let source = ThemeSource::resolve(args.themes_dir);
    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;
    let reporter = Arc::new(ConsoleReporter::new(args.quiet));

    let mut initializer = PackageInitializer::new(config, &base_dir, source.clone().open(), reporter);
    if let Some(output_dir) = args.output_dir {
        initializer = initializer.with_output_dir(base_dir.join(output_dir));
    }

    let summary = initializer
        .initialize_all()
        .with_context(|| format!("Package creation aborted (themes: {})", source))?;

    print_summary(&summary, args.quiet);

    let failed: Vec<&str> = summary.failures().map(|(name, _)| name).collect();
    if !failed.is_empty() {
        anyhow::bail!("Failed to create: {}", failed.join(", "));
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, quiet: bool) {
    if quiet {
        return;
    }
    println!();
    for report in summary.succeeded() {
        let status = if report.warnings().is_empty() {
            "✓".green()
        } else {
            "!".yellow()
        };
        println!(
            "{} {} ({}) -> {}",
            status,
            report.name.bold(),
            report.role,
            report.target_dir.display().to_string().cyan()
        );
    }
    for (name, error) in summary.failures() {
        println!("{} {}: {}", "✗".red(), name.bold(), error);
    }
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    let result = match args.command {
        Some(Command::Init(init_args)) => init(init_args),
        Some(Command::Config(ConfigCommand::Show(show_args))) => show(show_args),
        Some(Command::Create(create_args)) => create(create_args),
        // No subcommand provided, default to creating from ./twat-hatch.toml
        None => create(CreateArgs::default()),
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_init_flags_map_to_values() {
        let args = Args::parse_from([
            "twat-hatch",
            "init",
            "--type",
            "plugin",
            "--name",
            "host-csv",
            "--plugin-host",
            "host",
            "--min-python",
            "3,11",
            "--no-vcs",
        ]);
        let Some(Command::Init(init_args)) = args.command else {
            panic!("expected init");
        };
        assert_eq!(init_args.kind, Some(PackageKind::Plugin));
        assert_eq!(init_args.output, PathBuf::from(DEFAULT_CONFIG_FILE));

        let values = init_args.values();
        assert_eq!(values.name.as_deref(), Some("host-csv"));
        assert_eq!(values.plugin_host.as_deref(), Some("host"));
        assert_eq!(values.use_vcs, Some(false));
        assert_eq!(values.use_mkdocs, None);
    }

    #[test]
    fn test_config_show_type() {
        let args = Args::parse_from(["twat-hatch", "config", "show", "--type", "plugin-host"]);
        match args.command {
            Some(Command::Config(ConfigCommand::Show(show))) => {
                assert_eq!(show.kind, PackageKind::PluginHost)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_init_then_create_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("twat-hatch.toml");

        init(InitArgs {
            kind: Some(PackageKind::Package),
            output: config.clone(),
            name: Some("demo-pkg".to_string()),
            author_name: Some("Ada".to_string()),
            author_email: Some("ada@example.com".to_string()),
            github_username: Some("ada".to_string()),
            min_python: None,
            max_python: None,
            license: None,
            development_status: None,
            plugin_host: None,
            mkdocs: false,
            no_vcs: true,
            yes: true,
            themes_dir: None,
        })
        .unwrap();

        create(CreateArgs {
            config: Some(config),
            output_dir: Some(tmp.path().join("out")),
            themes_dir: None,
            quiet: true,
        })
        .unwrap();

        let pkg = tmp.path().join("out/demo_pkg");
        assert!(pkg.join("pyproject.toml").is_file());
        assert!(pkg.join("src/demo_pkg/__version__.py").is_file());
        assert!(!pkg.join(".git").exists());
    }

    #[test]
    fn test_create_fails_on_missing_config() {
        let tmp = tempfile::tempdir().unwrap();
        let err = create(CreateArgs {
            config: Some(tmp.path().join("missing.toml")),
            ..Default::default()
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("missing.toml"));
    }
}
