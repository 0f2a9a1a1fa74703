use std::time::Duration;

use engine_logging::engine_info;
use fotodown_engine::{EngineEvent, EngineHandle, RunError, RunReport};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Log engine events until the run finishes, then return its outcome.
pub fn follow(handle: EngineHandle) -> Result<RunReport, RunError> {
    loop {
        if let Some(event) = handle.recv_timeout(POLL_INTERVAL) {
            log_event(&event);
            continue;
        }
        if handle.is_finished() {
            while let Some(event) = handle.try_recv() {
                log_event(&event);
            }
            return handle.join();
        }
    }
}

fn log_event(event: &EngineEvent) {
    match event {
        EngineEvent::LoggedIn { account_id } => engine_info!("Logged in, account id {}", account_id),
        EngineEvent::PageFetched {
            page,
            photos_on_page,
            total_photos,
        } => engine_info!(
            "Page {}: {} photos ({} so far)",
            page,
            photos_on_page,
            total_photos
        ),
        EngineEvent::CrawlCompleted { total_photos } => {
            engine_info!("Found {} photos", total_photos)
        }
        EngineEvent::ItemCompleted {
            completed, total, ..
        } => {
            if *completed == *total || *completed % 10 == 0 {
                engine_info!("Downloaded {}/{}", completed, total);
            }
        }
    }
}
