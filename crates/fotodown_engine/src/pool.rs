use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::detail::resolve;
use crate::fetch::download_to_file;
use crate::{
    DownloadOutcome, EngineEvent, FetchError, ItemError, PhotoStub, ProgressSink, RunReport,
    Session,
};

type StubQueue = Arc<Mutex<mpsc::Receiver<PhotoStub>>>;

/// State shared read-only by all workers of one download phase.
struct WorkerContext {
    session: Arc<Session>,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
    completed: AtomicUsize,
    total: usize,
    done: mpsc::UnboundedSender<DownloadOutcome>,
}

/// Fixed-size set of workers that resolve and download stubs.
#[derive(Debug, Clone, Copy)]
pub struct DownloadPool {
    workers: usize,
}

impl DownloadPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Attempt every stub exactly once and return one outcome per stub.
    ///
    /// Failures are recorded per stub and never stop the other workers. A stub
    /// whose worker panicked is reported as [`ItemError::WorkerLost`].
    /// Returns once the queue is closed and every worker has drained it.
    pub async fn run(
        &self,
        session: Arc<Session>,
        stubs: Vec<PhotoStub>,
        sink: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> RunReport {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(WorkerContext {
            session,
            sink,
            cancel,
            completed: AtomicUsize::new(0),
            total: stubs.len(),
            done: done_tx,
        });

        // Every submitted stub ends up with an outcome, even if its worker dies.
        let mut pending: BTreeMap<usize, String> = stubs
            .iter()
            .map(|stub| (stub.counter, stub.page_url.clone()))
            .collect();

        // Capacity 1 keeps the feeder at most one stub ahead of the workers.
        let (tx, rx) = mpsc::channel(1);
        let queue: StubQueue = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for _ in 0..self.workers {
            workers.spawn(worker(ctx.clone(), queue.clone()));
        }
        // Only workers hold the receiver, so sends fail once they are all gone.
        drop(queue);

        for stub in stubs {
            if let Err(unsent) = tx.send(stub).await {
                engine_error!(
                    "All download workers exited, photo {} not attempted",
                    unsent.0.counter
                );
                break;
            }
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                engine_error!("Download worker terminated abnormally: {}", err);
            }
        }
        drop(ctx);

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(outcome) = done_rx.recv().await {
            pending.remove(&outcome.counter);
            outcomes.push(outcome);
        }
        for (counter, page_url) in pending {
            engine_warn!("Photo {} ({}) lost with its worker", counter, page_url);
            outcomes.push(DownloadOutcome {
                counter,
                page_url,
                result: Err(ItemError::WorkerLost),
            });
        }
        RunReport::new(outcomes)
    }
}

async fn worker(ctx: Arc<WorkerContext>, queue: StubQueue) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(stub) = next else {
            break;
        };
        let outcome = ctx.process(stub).await;
        // The receiver outlives every worker.
        let _ = ctx.done.send(outcome);
    }
}

impl WorkerContext {
    async fn process(&self, stub: PhotoStub) -> DownloadOutcome {
        let counter = stub.counter;
        let page_url = stub.page_url.clone();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ItemError::Fetch(FetchError::cancelled())),
            result = fetch_photo(&self.session, stub) => result,
        };

        match &result {
            Ok(path) => engine_debug!("Photo {} saved to {}", counter, path.display()),
            Err(err) => engine_warn!("Photo {} ({}) failed: {}", counter, page_url, err),
        }

        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.emit(EngineEvent::ItemCompleted {
            counter,
            success: result.is_ok(),
            completed,
            total: self.total,
        });

        DownloadOutcome {
            counter,
            page_url,
            result,
        }
    }
}

async fn fetch_photo(session: &Session, stub: PhotoStub) -> Result<PathBuf, ItemError> {
    let resolved = resolve(session, stub).await?;
    let target = resolved.stub.target_path;
    download_to_file(session.client(), &resolved.original_url, &target).await?;
    Ok(target)
}
