use std::path::Path;

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::fetch::{cancellable, fetch_html};
use crate::markup::parse_listing_page;
use crate::session::cancel_aware;
use crate::{EngineEvent, PhotoStub, ProgressSink, RunError, Session};

const FIRST_PAGE: u32 = 1;

/// Walk every listing page of the session's account, starting at page 1.
///
/// Pages are fetched strictly in sequence because the next index comes from
/// the current page's pagination marker. The returned stubs are in listing
/// order with contiguous counters starting at 0.
pub async fn crawl(
    session: &Session,
    out_dir: &Path,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<Vec<PhotoStub>, RunError> {
    let site = session.site();
    let top_url = Url::parse(&site.top_url)
        .map_err(|err| RunError::Internal(format!("bad top url {}: {err}", site.top_url)))?;

    let mut stubs: Vec<PhotoStub> = Vec::new();
    let mut next_page = Some(FIRST_PAGE);

    while let Some(page) = next_page {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        let url = site.listing_url(session.account_id(), page);
        engine_info!("Fetching image urls from page {}", page);

        let html = cancellable(cancel, fetch_html(session.client(), &url))
            .await
            .map_err(cancel_aware)?;
        let listing = parse_listing_page(&html, stubs.len(), out_dir, &top_url).map_err(|err| {
            RunError::Parse {
                page,
                message: err.to_string(),
            }
        })?;

        engine_debug!(
            "Page {} yielded {} photos, next page {:?}",
            page,
            listing.stubs.len(),
            listing.next_page
        );
        let photos_on_page = listing.stubs.len();
        stubs.extend(listing.stubs);
        sink.emit(EngineEvent::PageFetched {
            page,
            photos_on_page,
            total_photos: stubs.len(),
        });
        next_page = listing.next_page;
    }

    sink.emit(EngineEvent::CrawlCompleted {
        total_photos: stubs.len(),
    });
    Ok(stubs)
}
