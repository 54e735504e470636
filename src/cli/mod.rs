//! CLI command handling
//!
//! Wires configuration, notifier and runner together, dispatches the
//! selected mode and prints a terminal summary.

mod summary;

use crate::commands::Cli;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::dispatch::Dispatcher;
use crate::notify;
use crate::runner::StageRunner;

/// Process exit status for a run whose stages all passed
pub const EXIT_OK: i32 = 0;
/// Process exit status when a stage failed or the pipeline halted
pub const EXIT_FAILED: i32 = 1;

/// Run the CLI, returning the process exit status
pub async fn run(cli: Cli) -> Result<i32> {
    let Some(mode) = cli.test_suits.as_deref().filter(|m| !m.is_empty()) else {
        println!("No test suite selected. Use -t <normal|vol_del|recovery|mapping|load|sequence>.");
        return Ok(EXIT_OK);
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.log_dir {
        config.logs.dir = dir;
    }
    if cli.no_notify {
        config.notify.enabled = false;
    }

    println!("testing suits ({mode})");
    println!("dir path ({})", cli.dirpath.display());

    let notifier = notify::from_config(&config.notify);
    let dispatcher = Dispatcher::new(StageRunner::system(), notifier, config, cli.dirpath);

    match dispatcher.dispatch(mode).await {
        Ok(outcome) => {
            summary::print_outcome(&outcome);
            Ok(if outcome.passed() { EXIT_OK } else { EXIT_FAILED })
        }
        Err(Error::StageFailed { stage, reason }) => {
            summary::print_stage_error(&stage, &reason);
            Ok(EXIT_FAILED)
        }
        Err(e) => Err(e),
    }
}
