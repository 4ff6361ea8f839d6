//! Git and GitHub bookkeeping for freshly scaffolded packages
//!
//! Every step shells out synchronously with captured output. Failures are
//! turned into warnings by `GitCli::initialize`; they never fail a package.

use crate::error::{HatchError, Result};
use crate::report::{Event, Reporter};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Branch the new repository is switched to right after `git init`
pub const DEFAULT_BRANCH: &str = "main";

pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Author and committer of the initial commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// What version control bookkeeping achieved for one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsOutcome {
    pub initialized: bool,
    pub committed: bool,
    /// `<owner>/<repo>` when a GitHub remote was created and pushed
    pub remote: Option<String>,
    pub warnings: Vec<String>,
}

/// Runs `git` and `gh` from PATH (or explicit program paths)
#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
    gh: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            gh: PathBuf::from("gh"),
        }
    }
}

impl GitCli {
    pub fn with_programs(git: impl Into<PathBuf>, gh: impl Into<PathBuf>) -> Self {
        Self {
            git: git.into(),
            gh: gh.into(),
        }
    }

    /// Check if `git` can be executed at all
    pub fn is_available(&self) -> bool {
        Command::new(&self.git)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn run(
        &self,
        program: &Path,
        args: &[&str],
        dir: &Path,
        envs: &[(&str, &str)],
    ) -> Result<String> {
        let command_line = std::iter::once(program.display().to_string())
            .chain(args.iter().map(|a| a.to_string()))
            .collect::<Vec<_>>()
            .join(" ");

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .envs(envs.iter().copied())
            .output()
            .map_err(|e| HatchError::VersionControl {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            Err(HatchError::VersionControl {
                command: command_line,
                message,
            })
        }
    }

    /// `git init` followed by renaming the unborn branch to `main`
    pub fn init_repository(&self, dir: &Path) -> Result<()> {
        self.run(&self.git, &["init"], dir, &[])?;
        self.run(&self.git, &["branch", "-M", DEFAULT_BRANCH], dir, &[])?;
        Ok(())
    }

    /// Stage everything and create the initial commit as `identity`
    pub fn commit_all(&self, dir: &Path, identity: &CommitIdentity) -> Result<()> {
        let envs = [
            ("GIT_AUTHOR_NAME", identity.name.as_str()),
            ("GIT_AUTHOR_EMAIL", identity.email.as_str()),
            ("GIT_COMMITTER_NAME", identity.name.as_str()),
            ("GIT_COMMITTER_EMAIL", identity.email.as_str()),
        ];
        self.run(&self.git, &["add", "."], dir, &[])?;
        self.run(
            &self.git,
            &["commit", "-m", INITIAL_COMMIT_MESSAGE],
            dir,
            &envs,
        )?;
        Ok(())
    }

    /// Create a public GitHub repository from `dir` and push to it
    pub fn create_remote(&self, dir: &Path, full_name: &str) -> Result<()> {
        let source = dir.display().to_string();
        self.run(
            &self.gh,
            &[
                "repo",
                "create",
                full_name,
                "--public",
                "--source",
                &source,
                "--remote=origin",
                "--push",
            ],
            dir,
            &[],
        )?;
        Ok(())
    }

    /// Run every bookkeeping step that can succeed, reporting each one.
    ///
    /// A failed `init` skips the commit; the remote is only created when a
    /// username is given and the commit exists.
    pub fn initialize(
        &self,
        dir: &Path,
        identity: &CommitIdentity,
        github_username: &str,
        repo_name: &str,
        reporter: &dyn Reporter,
    ) -> VcsOutcome {
        let mut outcome = VcsOutcome::default();
        let warn = |outcome: &mut VcsOutcome, what: &str, err: HatchError| {
            let message = format!("{} failed in {}: {}", what, dir.display(), err);
            reporter.warn(message.clone());
            outcome.warnings.push(message);
        };
        let step = |description: String| {
            reporter.report(Event::VcsStep {
                description,
                dir: dir.to_path_buf(),
            })
        };

        match self.init_repository(dir) {
            Ok(()) => {
                outcome.initialized = true;
                step(format!("initialized repository (branch {})", DEFAULT_BRANCH));
            }
            Err(e) => {
                warn(&mut outcome, "git init", e);
                return outcome;
            }
        }

        match self.commit_all(dir, identity) {
            Ok(()) => {
                outcome.committed = true;
                step("created initial commit".to_string());
            }
            Err(e) => {
                warn(&mut outcome, "git commit", e);
                return outcome;
            }
        }

        let owner = github_username.trim();
        if owner.is_empty() {
            return outcome;
        }

        let full_name = format!("{}/{}", owner, repo_name);
        match self.create_remote(dir, &full_name) {
            Ok(()) => {
                step(format!("linked GitHub repository {}", full_name));
                outcome.remote = Some(full_name);
            }
            Err(e) => warn(&mut outcome, "GitHub repository creation", e),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;

    fn identity() -> CommitIdentity {
        CommitIdentity {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_missing_git_binary_yields_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let git = GitCli::with_programs(
            tmp.path().join("no-such-git"),
            tmp.path().join("no-such-gh"),
        );
        let reporter = RecordingReporter::new();

        assert!(!git.is_available());
        let outcome = git.initialize(tmp.path(), &identity(), "ada", "pkg", &reporter);

        assert!(!outcome.initialized);
        assert!(!outcome.committed);
        assert_eq!(outcome.remote, None);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("git init"));
        assert_eq!(reporter.warnings(), outcome.warnings);
    }

    #[test]
    fn test_error_names_the_command() {
        let tmp = tempfile::tempdir().unwrap();
        let git = GitCli::with_programs(tmp.path().join("missing"), "gh");
        let err = git.init_repository(tmp.path()).unwrap_err();
        match err {
            HatchError::VersionControl { command, .. } => assert!(command.ends_with("missing init")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_real_git_repository_and_commit() {
        let git = GitCli::with_programs("git", "/nonexistent/gh");
        if !git.is_available() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# pkg\n").unwrap();
        let reporter = RecordingReporter::new();

        let outcome = git.initialize(tmp.path(), &identity(), "", "pkg", &reporter);

        assert!(outcome.initialized);
        assert!(outcome.committed, "warnings: {:?}", outcome.warnings);
        assert_eq!(outcome.remote, None);
        assert!(tmp.path().join(".git").is_dir());

        let branch = git
            .run(Path::new("git"), &["rev-parse", "--abbrev-ref", "HEAD"], tmp.path(), &[])
            .unwrap();
        assert_eq!(branch, DEFAULT_BRANCH);
        let author = git
            .run(Path::new("git"), &["log", "-1", "--format=%an <%ae>"], tmp.path(), &[])
            .unwrap();
        assert_eq!(author, "Ada Lovelace <ada@example.com>");
    }
}
