use std::path::PathBuf;
use std::time::Duration;

use fotodown_engine::{Credentials, EngineConfig, DEFAULT_WORKERS};
use log::LevelFilter;

/// Download all your photos from fotocommunity.de.
#[derive(Debug, clap::Parser)]
#[command(name = "fotodown", version)]
pub struct Args {
    /// Account whose photos are downloaded
    #[arg(short, long)]
    pub user: String,

    /// Password of the account
    #[arg(long, env = "FOTODOWN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Output directory; defaults to the current directory
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Number of concurrent downloads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds; waits indefinitely when omitted
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Also write the log to ./fotodown.log
    #[arg(long)]
    pub log_file: bool,

    /// Log per-photo details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            workers: self.workers,
            ..EngineConfig::default()
        };
        config.request.request_timeout = self.timeout.map(Duration::from_secs);
        config
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
