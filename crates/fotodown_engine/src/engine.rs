use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::progress::ChannelProgressSink;
use crate::{Credentials, EngineConfig, EngineEvent, Orchestrator, RunError, RunReport};

/// A run executing on its own thread and tokio runtime.
///
/// Progress arrives through [`EngineHandle::try_recv`]; the final report
/// through [`EngineHandle::join`].
pub struct EngineHandle {
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
    worker: thread::JoinHandle<Result<RunReport, RunError>>,
}

impl EngineHandle {
    pub fn start(config: EngineConfig, credentials: Credentials, out_dir: PathBuf) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let run_cancel = cancel.clone();

        let worker = thread::spawn(move || -> Result<RunReport, RunError> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| RunError::Internal(format!("tokio runtime: {err}")))?;
            let sink = Arc::new(ChannelProgressSink::new(event_tx));
            let orchestrator = Orchestrator::new(config);
            runtime.block_on(orchestrator.run(&credentials, &out_dir, sink, run_cancel))
        });

        Self {
            event_rx,
            cancel,
            worker,
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Ask the run to stop; pending photos are reported as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that stops this run when cancelled, for use from other threads.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn join(self) -> Result<RunReport, RunError> {
        self.worker
            .join()
            .unwrap_or_else(|_| Err(RunError::Internal("engine thread panicked".into())))
    }
}
