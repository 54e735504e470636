//! Process execution
//!
//! Stage commands are spawned directly (never through a shell), so
//! arguments such as `--gtest_filter=*vol_del*` reach the binary verbatim.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::Command;

use super::stage::StageCommand;

/// What a finished process left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Captured stdout; empty when stdio was inherited
    pub stdout: String,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns stage commands and waits for them
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run to completion, capturing stdout
    async fn capture(&self, command: &StageCommand) -> io::Result<ProcessOutput>;

    /// Run to completion with inherited stdio
    async fn run(&self, command: &StageCommand) -> io::Result<ProcessOutput>;
}

/// Executor backed by real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn capture(&self, command: &StageCommand) -> io::Result<ProcessOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await?;

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            code: output.status.code(),
        })
    }

    async fn run(&self, command: &StageCommand) -> io::Result<ProcessOutput> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .status()
            .await?;

        Ok(ProcessOutput {
            stdout: String::new(),
            code: status.code(),
        })
    }
}
