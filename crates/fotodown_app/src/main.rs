mod cli;
mod interrupt;
mod progress;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_info, engine_warn, LogDestination};
use fotodown_engine::{EngineHandle, RunReport};

use crate::cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let destination = if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    engine_logging::initialize(destination, args.log_level());

    let credentials = args.credentials();
    let out_dir = args.out.clone().unwrap_or_default();
    let handle = EngineHandle::start(args.engine_config(), credentials, out_dir);
    interrupt::cancel_on_ctrl_c(handle.cancel_token());

    let report = progress::follow(handle)
        .with_context(|| format!("downloading photos for user {}", args.user))?;
    summarize(&report);
    Ok(())
}

fn summarize(report: &RunReport) {
    for failure in report.failures() {
        if let Err(err) = &failure.result {
            engine_warn!("{:04} {}: {}", failure.counter, failure.page_url, err);
        }
    }
    engine_info!(
        "Done. {} downloaded, {} failed.",
        report.succeeded(),
        report.failed()
    );
}
