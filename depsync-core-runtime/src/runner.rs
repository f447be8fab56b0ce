//! Command runner port and the process-backed adapter.

use depsync_types::CommandSpec;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}:\n{output}", describe_status(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        output: String,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// Stdout followed by stderr, lossily decoded.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into [`ExecError::Failed`].
    pub fn check(self, spec: &CommandSpec) -> Result<Self, ExecError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExecError::Failed {
                command: spec.display(),
                status: self.status,
                output: self.output,
            })
        }
    }
}

/// Executes structured commands.
///
/// Implementations return `Ok` for any process that ran to completion,
/// whatever its exit status; callers decide what a non-zero exit means.
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;

    /// Run and require a zero exit status.
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.run(spec)?.check(spec)
    }
}

/// Runs commands as child processes with stdin closed.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        debug!(command = %spec, cwd = ?spec.cwd, "running");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let out = cmd.output().map_err(|source| ExecError::Spawn {
            command: spec.display(),
            source,
        })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(CommandOutput {
            status: out.status.code(),
            output,
        })
    }
}
