//! Stage runner
//!
//! Executes one stage: spawns its command, captures output, persists the
//! output to the stage's log file and classifies the run.

mod classify;
mod exec;
mod stage;

pub use classify::{Classifier, MarkerClassifier, Verdict};
pub use exec::{ProcessExecutor, ProcessOutput, SystemExecutor};
pub use stage::{Stage, StageCommand, StageKind, StagePlan, DEFAULT_PASS_MARKER};

#[cfg(test)]
pub(crate) use exec::fake;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::{paths, Error, FailureReason, Result};

/// Outcome of running one stage
#[derive(Debug, Clone)]
pub struct StageResult {
    pub kind: StageKind,
    /// Captured stdout; empty for the recovery stage
    pub raw_output: String,
    pub verdict: Verdict,
    pub passed: bool,
    pub log_written: bool,
    pub log_path: Option<PathBuf>,
    /// Exit code of the (last) process, informational for captured stages
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

/// Runs stages through a [`ProcessExecutor`]
#[derive(Clone)]
pub struct StageRunner {
    executor: Arc<dyn ProcessExecutor>,
}

impl StageRunner {
    pub fn new(executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor }
    }

    /// Runner that spawns real processes
    pub fn system() -> Self {
        Self::new(Arc::new(SystemExecutor))
    }

    /// Run a stage to completion
    ///
    /// A missing pass marker is reported through `StageResult::passed`;
    /// spawn errors and a failed recovery phase are returned as
    /// [`Error::StageFailed`].
    pub async fn run(&self, stage: &Stage) -> Result<StageResult> {
        tracing::info!(stage = stage.name(), "Running stage");
        let started = Instant::now();

        let mut result = match &stage.plan {
            StagePlan::Captured {
                command,
                log_path,
                classifier,
            } => {
                self.run_captured(stage.kind, command, log_path, classifier.as_ref())
                    .await?
            }
            StagePlan::Recovery { abort, recover } => {
                self.run_recovery(stage.kind, abort, recover).await?
            }
        };
        result.elapsed = started.elapsed();

        tracing::info!(
            stage = stage.name(),
            passed = result.passed,
            elapsed_secs = result.elapsed.as_secs(),
            "Stage finished"
        );
        Ok(result)
    }

    async fn run_captured(
        &self,
        kind: StageKind,
        command: &StageCommand,
        log_path: &Path,
        classifier: &dyn Classifier,
    ) -> Result<StageResult> {
        tracing::debug!(stage = kind.name(), command = %command, "Spawning");

        let output = self.executor.capture(command).await.map_err(|e| {
            Error::stage_failed(kind.name(), FailureReason::SpawnFailed(e.to_string()))
        })?;

        // Exit status is informational only; the output decides
        if !output.success() {
            tracing::warn!(
                stage = kind.name(),
                code = ?output.code,
                "Test binary exited unsuccessfully, judging by output"
            );
        }

        let log_written = write_log(kind, log_path, &output.stdout).await;
        let verdict = classifier.classify(&output.stdout);

        Ok(StageResult {
            kind,
            passed: verdict.is_pass(),
            verdict,
            raw_output: output.stdout,
            log_written,
            log_path: Some(log_path.to_path_buf()),
            exit_code: output.code,
            elapsed: Duration::ZERO,
        })
    }

    async fn run_recovery(
        &self,
        kind: StageKind,
        abort: &StageCommand,
        recover: &StageCommand,
    ) -> Result<StageResult> {
        // The abort phase is expected to crash; only log what happened
        tracing::debug!(stage = kind.name(), command = %abort, "Spawning abort phase");
        match self.executor.run(abort).await {
            Ok(out) => {
                tracing::info!(stage = kind.name(), code = ?out.code, "Abort phase finished")
            }
            Err(e) => {
                tracing::warn!(stage = kind.name(), error = %e, "Abort phase could not be started")
            }
        }

        tracing::debug!(stage = kind.name(), command = %recover, "Spawning recovery phase");
        let out = self.executor.run(recover).await.map_err(|e| {
            Error::stage_failed(kind.name(), FailureReason::SpawnFailed(e.to_string()))
        })?;

        if !out.success() {
            return Err(Error::stage_failed(
                kind.name(),
                FailureReason::NonZeroExit(out.code),
            ));
        }

        Ok(StageResult {
            kind,
            raw_output: String::new(),
            verdict: Verdict::Passed,
            passed: true,
            log_written: false,
            log_path: None,
            exit_code: out.code,
            elapsed: Duration::ZERO,
        })
    }
}

/// Overwrite the stage log; failures are logged and reported as `false`
async fn write_log(kind: StageKind, path: &Path, content: &str) -> bool {
    if let Err(e) = paths::ensure_parent_dir(path).await {
        tracing::warn!(stage = kind.name(), path = %path.display(), error = %e, "Could not create log directory");
        return false;
    }
    match tokio::fs::write(path, content).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(stage = kind.name(), path = %path.display(), error = %e, "Could not write stage log");
            false
        }
    }
}
