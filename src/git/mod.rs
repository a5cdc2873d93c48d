//! Optional git sync of the deck repository via the `git` CLI.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

const LOCAL_TIMEOUT: Duration = Duration::from_secs(15);
const PUSH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("`git {command}` timed out")]
    Timeout { command: String },

    #[error("`git {command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Pushed,
    CommittedNoRemote,
}

#[derive(Debug, Clone)]
pub struct GitRepo {
    dir: PathBuf,
}

impl GitRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn git(&self, args: &[&str], timeout: Duration) -> Result<String, GitError> {
        let command = args.join(" ");
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| GitError::Timeout {
                command: command.clone(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(%command, %stderr, "git command failed");
            return Err(GitError::Failed { command, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs `git init` unless the directory already holds a repository.
    pub async fn ensure_init(&self) -> Result<(), GitError> {
        if self.dir.join(".git").exists() {
            return Ok(());
        }
        self.git(&["init", "--quiet"], LOCAL_TIMEOUT).await?;
        info!(dir = %self.dir.display(), "initialised deck repository");
        Ok(())
    }

    pub async fn has_remote(&self) -> bool {
        self.git(&["remote", "-v"], LOCAL_TIMEOUT)
            .await
            .is_ok_and(|out| !out.trim().is_empty())
    }

    pub async fn commit(&self, file_name: &str, message: &str) -> Result<(), GitError> {
        self.git(&["add", "--", file_name], LOCAL_TIMEOUT).await?;
        self.git(&["commit", "--quiet", "-m", message], LOCAL_TIMEOUT)
            .await?;
        Ok(())
    }

    pub async fn push(&self) -> Result<(), GitError> {
        self.git(&["push", "--quiet"], PUSH_TIMEOUT).await?;
        Ok(())
    }

    /// Commits the deck file and pushes when a remote is configured.
    pub async fn sync(&self, deck_file: &Path, term: &str) -> Result<SyncOutcome, GitError> {
        let file_name = deck_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.ensure_init().await?;
        self.commit(&file_name, &format!("add {term}")).await?;

        if !self.has_remote().await {
            debug!("no git remote configured, skipping push");
            return Ok(SyncOutcome::CommittedNoRemote);
        }
        self.push().await.inspect_err(|e| warn!(error = %e, "git push failed"))?;
        Ok(SyncOutcome::Pushed)
    }
}

/// Instructions for wiring up a remote, with the directory shell-escaped.
pub fn remote_hint(dir: &Path) -> String {
    let dir = shell_escape::escape(Cow::Owned(dir.to_string_lossy().into_owned()));
    format!(
        "[hint] No git remote set. Add one:\n  git -C {dir} remote add origin <YOUR_GITHUB_URL>\n  git -C {dir} branch -M main && git -C {dir} push -u origin main"
    )
}
