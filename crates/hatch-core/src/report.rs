//! Progress reporting for theme application and package initialization
//!
//! The library never prints directly. Everything observable is sent to a
//! `Reporter`: `ConsoleReporter` prints coloured lines for the CLI,
//! `RecordingReporter` keeps events in memory for tests.

use crate::config::PackageRole;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Something that happened while scaffolding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PackageStarted {
        name: String,
        role: PackageRole,
        target: PathBuf,
    },
    FileWritten {
        /// Empty for files not rendered from a theme
        theme: String,
        path: PathBuf,
    },
    ThemeApplied {
        theme: String,
        files: usize,
    },
    /// A version control command completed successfully
    VcsStep {
        description: String,
        dir: PathBuf,
    },
    Warning {
        message: String,
    },
    PackageFinished {
        name: String,
        files: usize,
    },
    PackageFailed {
        name: String,
        error: String,
    },
}

/// Observer receiving scaffolding events
pub trait Reporter: Send + Sync {
    fn report(&self, event: Event);

    fn warn(&self, message: String) {
        self.report(Event::Warning { message });
    }
}

/// Prints events to the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    /// Only print warnings and failures
    pub quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: Event) {
        match event {
            Event::Warning { message } => {
                eprintln!("{} {}", "Warning:".yellow(), message);
            }
            Event::PackageFailed { name, error } => {
                eprintln!("{} {}: {}", "Failed:".red().bold(), name, error);
            }
            _ if self.quiet => {}
            Event::PackageStarted { name, role, target } => {
                println!();
                println!(
                    "{} {} ({}) in {}",
                    "Creating".cyan().bold(),
                    name.bold(),
                    role,
                    target.display()
                );
            }
            Event::FileWritten { path, .. } => {
                println!("  {} {}", "Created:".dimmed(), path.display().to_string().cyan());
            }
            Event::ThemeApplied { theme, files } => {
                println!("  {} theme '{}' ({} files)", "->".blue(), theme, files);
            }
            Event::VcsStep { description, dir } => {
                println!("  {} {} in {}", "git".green(), description, dir.display());
            }
            Event::PackageFinished { name, files } => {
                println!("{} {} ({} files)", "Done".green().bold(), name, files);
            }
        }
    }
}

/// Collects events for later inspection
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Paths of every `FileWritten` event, in order
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::FileWritten { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Warning { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Themes in the order they finished applying
    pub fn applied_themes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::ThemeApplied { theme, .. } => Some(theme),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_filters() {
        let reporter = RecordingReporter::new();
        reporter.report(Event::FileWritten {
            theme: "default".to_string(),
            path: PathBuf::from("/out/a"),
        });
        reporter.report(Event::ThemeApplied {
            theme: "default".to_string(),
            files: 1,
        });
        reporter.warn("git missing".to_string());

        assert_eq!(reporter.written_files(), vec![PathBuf::from("/out/a")]);
        assert_eq!(reporter.applied_themes(), vec!["default"]);
        assert_eq!(reporter.warnings(), vec!["git missing"]);
        assert_eq!(reporter.events().len(), 3);
    }
}
