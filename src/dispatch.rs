//! Mode dispatch
//!
//! Maps a `--test_suits` value onto a single stage or the full pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::Mode;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::notify::Notifier;
use crate::runner::{Stage, StageKind, StageResult, StageRunner};
use crate::sequence::{PipelineReport, Sequencer};

/// What a dispatch ran
#[derive(Debug)]
pub enum DispatchOutcome {
    Stage(StageResult),
    Sequence(PipelineReport),
}

impl DispatchOutcome {
    pub fn passed(&self) -> bool {
        match self {
            DispatchOutcome::Stage(result) => result.passed,
            DispatchOutcome::Sequence(report) => report.passed(),
        }
    }
}

/// Resolves modes to stages and runs them
pub struct Dispatcher {
    runner: StageRunner,
    notifier: Arc<dyn Notifier>,
    config: Config,
    bin_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(
        runner: StageRunner,
        notifier: Arc<dyn Notifier>,
        config: Config,
        bin_dir: PathBuf,
    ) -> Self {
        Self {
            runner,
            notifier,
            config,
            bin_dir,
        }
    }

    /// Run whatever `mode` selects
    ///
    /// Single-stage modes bypass the sequencer: no notifications, no pauses.
    /// An unrecognized mode runs nothing and returns [`Error::UnknownMode`].
    pub async fn dispatch(&self, mode: &str) -> Result<DispatchOutcome> {
        let mode = Mode::from_name(mode).ok_or_else(|| Error::UnknownMode(mode.to_string()))?;
        tracing::info!(%mode, dir = %self.bin_dir.display(), "Dispatching");

        match mode {
            Mode::Single(kind) => {
                let stage = self.stage(kind);
                self.runner.run(&stage).await.map(DispatchOutcome::Stage)
            }
            Mode::Sequence => {
                let sequencer = Sequencer::new(
                    self.runner.clone(),
                    self.notifier.clone(),
                    self.pipeline()?,
                    self.config.sequence.settle(),
                );
                sequencer.run().await.map(DispatchOutcome::Sequence)
            }
        }
    }

    /// Stages of the `sequence` pipeline, in order
    pub fn pipeline(&self) -> Result<Vec<Stage>> {
        let stages = self
            .config
            .sequence
            .stages
            .iter()
            .map(|name| {
                StageKind::from_name(name)
                    .map(|kind| self.stage(kind))
                    .ok_or_else(|| {
                        Error::Config(format!("Unknown stage '{name}' in [sequence] stages"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if stages.is_empty() {
            return Err(Error::Config("[sequence] stages is empty".to_string()));
        }
        Ok(stages)
    }

    fn stage(&self, kind: StageKind) -> Stage {
        Stage::resolve(kind, &self.bin_dir, &self.config.logs.dir, &self.config)
    }
}
