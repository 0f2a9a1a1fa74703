mod common;

use std::path::Path;
use std::sync::Arc;

use common::{image_bytes, login, mount_photo, mount_successful_login, origin_prefix, TestSink};
use fotodown_engine::{
    CancellationToken, DownloadPool, EngineEvent, FailureKind, ItemError, NoopProgressSink,
    PhotoStub, ProgressSink, DEFAULT_WORKERS,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stub(base: &str, out_dir: &Path, counter: usize, name: &str, id: u64) -> PhotoStub {
    PhotoStub {
        counter,
        page_url: format!("{base}/photo/{name}/{id}"),
        target_path: out_dir.join(format!("{counter:04}-{name}.jpg")),
        origin_prefix: origin_prefix(base, name),
        content_id: id,
        title: None,
    }
}

#[tokio::test]
async fn pool_attempts_every_stub_exactly_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_successful_login(&server).await;
    let out = TempDir::new().unwrap();

    let mut stubs = Vec::new();
    for i in 0..45usize {
        let name = format!("photo{i}");
        let id = 500 + i as u64;
        if i % 5 == 0 {
            // Detail page without a link to the original.
            Mock::given(method("GET"))
                .and(path(format!("/photo/{name}/{id}")))
                .respond_with(common::html("<a href=\"/elsewhere\">nothing</a>"))
                .expect(1)
                .mount(&server)
                .await;
        } else {
            mount_photo(&server, &name, id).await;
        }
        stubs.push(stub(&base, out.path(), i, &name, id));
    }

    let session = Arc::new(login(&server).await);
    let sink = Arc::new(TestSink::new());
    let report = DownloadPool::new(DEFAULT_WORKERS)
        .run(session, stubs, sink.clone(), CancellationToken::new())
        .await;

    assert_eq!(report.total(), 45);
    assert_eq!(report.failed(), 9);
    assert_eq!(report.succeeded(), 36);
    let counters: Vec<usize> = report.outcomes.iter().map(|o| o.counter).collect();
    assert_eq!(counters, (0..45).collect::<Vec<_>>());

    for outcome in &report.outcomes {
        let name = format!("photo{}", outcome.counter);
        let target = out.path().join(format!("{:04}-{name}.jpg", outcome.counter));
        if outcome.counter % 5 == 0 {
            assert_eq!(
                outcome.result,
                Err(ItemError::Resolve {
                    page_url: outcome.page_url.clone()
                })
            );
            assert!(!target.exists());
        } else {
            assert_eq!(outcome.result.as_ref().unwrap(), &target);
            assert_eq!(std::fs::read(&target).unwrap(), image_bytes(&name));
        }
    }

    let completed: Vec<usize> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::ItemCompleted {
                completed, total, ..
            } => {
                assert_eq!(total, 45);
                Some(completed)
            }
            _ => None,
        })
        .collect();
    assert_eq!(completed.len(), 45);
    assert_eq!(completed.iter().max(), Some(&45));
}

#[tokio::test]
async fn single_worker_drains_whole_queue() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_successful_login(&server).await;
    let out = TempDir::new().unwrap();

    let mut stubs = Vec::new();
    for i in 0..5usize {
        let name = format!("solo{i}");
        mount_photo(&server, &name, i as u64).await;
        stubs.push(stub(&base, out.path(), i, &name, i as u64));
    }

    let session = Arc::new(login(&server).await);
    let report = DownloadPool::new(1)
        .run(session, stubs, Arc::new(NoopProgressSink), CancellationToken::new())
        .await;

    assert_eq!(report.total(), 5);
    assert_eq!(report.succeeded(), 5);
}

#[tokio::test]
async fn zero_workers_is_clamped_to_one() {
    assert_eq!(DownloadPool::new(0).workers(), 1);
    assert_eq!(DownloadPool::new(7).workers(), 7);
}

#[tokio::test]
async fn failed_image_fetch_is_recorded_and_leaves_no_file() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_successful_login(&server).await;
    let out = TempDir::new().unwrap();

    mount_photo(&server, "good", 1).await;
    Mock::given(method("GET"))
        .and(path("/photo/gone/2"))
        .respond_with(common::html(&common::detail_page(&base, "gone")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/images/gone{}", common::HASH_SUFFIX)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let stubs = vec![
        stub(&base, out.path(), 0, "good", 1),
        stub(&base, out.path(), 1, "gone", 2),
    ];
    let session = Arc::new(login(&server).await);
    let report = DownloadPool::new(2)
        .run(session, stubs, Arc::new(NoopProgressSink), CancellationToken::new())
        .await;

    assert_eq!(report.succeeded(), 1);
    let failed = report.failures().next().unwrap();
    assert_eq!(failed.counter, 1);
    match &failed.result {
        Err(ItemError::Fetch(err)) => assert_eq!(err.kind, FailureKind::HttpStatus(404)),
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert!(!out.path().join("0001-gone.jpg").exists());
    assert!(out.path().join("0000-good.jpg").exists());
}

#[tokio::test]
async fn cancelled_pool_still_reports_every_stub() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_successful_login(&server).await;
    let out = TempDir::new().unwrap();

    let stubs: Vec<PhotoStub> = (0..8)
        .map(|i| stub(&base, out.path(), i, &format!("c{i}"), i as u64))
        .collect();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let session = Arc::new(login(&server).await);
    let report = DownloadPool::new(3)
        .run(session, stubs, Arc::new(NoopProgressSink), cancel)
        .await;

    assert_eq!(report.total(), 8);
    assert!(report.outcomes.iter().all(|o| matches!(
        &o.result,
        Err(ItemError::Fetch(err)) if err.kind == FailureKind::Cancelled
    )));
}

/// Sink whose `emit` panics while reporting one particular photo.
struct PanicOnCounter(usize);

impl ProgressSink for PanicOnCounter {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::ItemCompleted { counter, .. } = event {
            if counter == self.0 {
                panic!("sink failed for photo {counter}");
            }
        }
    }
}

#[tokio::test]
async fn panicking_worker_does_not_lose_outcomes() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_successful_login(&server).await;
    let out = TempDir::new().unwrap();

    let mut stubs = Vec::new();
    for i in 0..6usize {
        let name = format!("p{i}");
        mount_photo(&server, &name, i as u64).await;
        stubs.push(stub(&base, out.path(), i, &name, i as u64));
    }

    let session = Arc::new(login(&server).await);
    let report = DownloadPool::new(2)
        .run(session, stubs, Arc::new(PanicOnCounter(2)), CancellationToken::new())
        .await;

    assert_eq!(report.total(), 6);
    let counters: Vec<usize> = report.outcomes.iter().map(|o| o.counter).collect();
    assert_eq!(counters, (0..6).collect::<Vec<_>>());
    assert_eq!(report.outcomes[2].result, Err(ItemError::WorkerLost));
    assert_eq!(report.succeeded(), 5);
}
