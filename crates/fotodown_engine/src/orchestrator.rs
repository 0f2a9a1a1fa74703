use std::path::Path;
use std::sync::Arc;

use engine_logging::engine_info;
use tokio_util::sync::CancellationToken;

use crate::listing::crawl;
use crate::persist::prepare_output_dir;
use crate::{
    Credentials, DownloadPool, EngineConfig, EngineEvent, ProgressSink, RunError, RunReport,
    Session,
};

/// Drives login, the full listing crawl and the download pool for one account.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Download every photo of the account into `out_dir`.
    ///
    /// Login, output directory and listing failures abort before any photo is
    /// fetched. Per-photo failures only show up in the returned report.
    pub async fn run(
        &self,
        credentials: &Credentials,
        out_dir: &Path,
        sink: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Result<RunReport, RunError> {
        let out_dir = prepare_output_dir(out_dir)?;

        let session = Session::login(
            &self.config.site,
            &self.config.request,
            credentials,
            &cancel,
        )
        .await?;
        sink.emit(EngineEvent::LoggedIn {
            account_id: session.account_id(),
        });

        engine_info!(
            "Downloading all photos for user {} into output directory {}",
            credentials.account,
            out_dir.display()
        );

        let stubs = crawl(&session, &out_dir, sink.as_ref(), &cancel).await?;
        if stubs.is_empty() {
            return Err(RunError::EmptyResult);
        }
        engine_info!("Fetched {} image urls, downloading images", stubs.len());

        let pool = DownloadPool::new(self.config.workers);
        let report = pool.run(Arc::new(session), stubs, sink, cancel).await;

        engine_info!(
            "Done: {} of {} photos downloaded, {} failed",
            report.succeeded(),
            report.total(),
            report.failed()
        );
        Ok(report)
    }
}
