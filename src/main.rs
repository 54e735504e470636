//! regress - storage-engine regression runner
//!
//! Runs the pre-built test binaries one suite at a time or as a fail-fast
//! pipeline, keeping a log per stage and posting progress to a chat webhook.

use clap::Parser;
use regress::commands::Cli;
use regress::{cli, common::logging};

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    logging::init_cli(args.verbose);

    match cli::run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
