//! Full regression pipeline
//!
//! Runs an ordered list of stages with fail-fast semantics: each stage
//! starts only after the previous one passed, and the first failure halts
//! the pipeline. Every transition is announced through the [`Notifier`].

use std::sync::Arc;
use std::time::Duration;

use crate::common::{Error, FailureReason, Result};
use crate::notify::Notifier;
use crate::runner::{Stage, StageKind, StageResult, StageRunner};

/// Where the pipeline stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage passed
    Completed,
    /// A stage failed; later stages were skipped
    Halted {
        stage: StageKind,
        reason: FailureReason,
    },
}

/// Results of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub outcome: PipelineOutcome,
    /// Results of stages that produced one, in execution order
    pub results: Vec<StageResult>,
}

impl PipelineReport {
    pub fn passed(&self) -> bool {
        self.outcome == PipelineOutcome::Completed
    }
}

/// Runs the regression pipeline
pub struct Sequencer {
    runner: StageRunner,
    notifier: Arc<dyn Notifier>,
    stages: Vec<Stage>,
    settle: Duration,
}

impl Sequencer {
    pub fn new(
        runner: StageRunner,
        notifier: Arc<dyn Notifier>,
        stages: Vec<Stage>,
        settle: Duration,
    ) -> Self {
        Self {
            runner,
            notifier,
            stages,
            settle,
        }
    }

    /// Run every stage in order, halting at the first failure
    pub async fn run(&self) -> Result<PipelineReport> {
        self.notifier.notify("Regression Test Starting").await;

        let mut results = Vec::with_capacity(self.stages.len());

        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 && !self.settle.is_zero() {
                tracing::debug!(secs = self.settle.as_secs(), "Waiting before next stage");
                tokio::time::sleep(self.settle).await;
            }

            let label = stage.kind.label();
            let failure = match self.runner.run(stage).await {
                Ok(result) if result.passed => {
                    results.push(result);
                    None
                }
                Ok(result) => {
                    results.push(result);
                    Some(FailureReason::MarkerAbsent)
                }
                Err(Error::StageFailed { reason, .. }) => Some(reason),
                Err(e) => return Err(e),
            };

            if let Some(reason) = failure {
                tracing::warn!(
                    stage = stage.name(),
                    reason_code = reason.code(),
                    reason = %reason,
                    log = ?stage.log_path(),
                    "Stage failed, halting pipeline"
                );
                self.notifier.notify(&format!("{label} Test Failed")).await;
                return Ok(PipelineReport {
                    outcome: PipelineOutcome::Halted {
                        stage: stage.kind,
                        reason,
                    },
                    results,
                });
            }

            self.notifier.notify(&format!("{label} Test Passed")).await;
        }

        Ok(PipelineReport {
            outcome: PipelineOutcome::Completed,
            results,
        })
    }
}
