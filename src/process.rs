//! Thin wrapper around [`std::process::Command`] for short-lived helper tools.
//!
//! `pactl` queries are run to completion and their output captured. The
//! long-lived ffmpeg child is managed separately in [`crate::stream`].

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::process::{Command, ExitStatus};

/// Captured result of a finished command.
#[derive(Debug)]
pub struct CommandResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Builder for a captured command invocation.
#[derive(Debug)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            error_msg: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Message used when the command exits non-zero.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    pub fn run(self) -> Result<CommandResult> {
        tracing::trace!("running {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        let result = CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            let msg = self
                .error_msg
                .unwrap_or_else(|| format!("'{}' exited with {}", self.program, result.status));
            let stderr = result.stderr.trim();
            if stderr.is_empty() {
                bail!("{}", msg);
            }
            bail!("{}\n{}", msg, stderr);
        }

        Ok(result)
    }
}
