//! translate-shell (`trans`) wrapper for brief translations and language identification.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Abstraction over the translation backend.
/// Implemented by `TransShell` for production; stub implementations used in tests.
pub trait Translator {
    /// Brief translation of `text` from `src` to `dst`. `None` when nothing usable came back.
    async fn brief(&self, src: &str, dst: &str, text: &str) -> Option<String>;

    /// Raw language identification output for `text` (a code or a language name).
    async fn identify(&self, text: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct TransShell {
    program: String,
    timeout: Duration,
}

impl TransShell {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: TRANSLATE_TIMEOUT,
        }
    }

    async fn run(&self, args: &[&str]) -> Option<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(program = %self.program, error = %e, "translator not runnable");
                return None;
            }
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "translator timed out"
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!(program = %self.program, status = %output.status, "translator exited with failure");
        }

        first_line(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Translator for TransShell {
    async fn brief(&self, src: &str, dst: &str, text: &str) -> Option<String> {
        let pair = format!("{src}:{dst}");
        self.run(&["-b", &pair, text]).await
    }

    async fn identify(&self, text: &str) -> Option<String> {
        self.run(&["-id", "-b", text]).await
    }
}

/// First non-empty trimmed line of translator output.
fn first_line(out: &str) -> Option<String> {
    out.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
