use crate::fetch::fetch_html;
use crate::markup::find_original_url;
use crate::{ItemError, PhotoStub, ResolvedPhoto, Session};

/// Look up the full-resolution URL of `stub` on its detail page.
pub async fn resolve(session: &Session, stub: PhotoStub) -> Result<ResolvedPhoto, ItemError> {
    let html = fetch_html(session.client(), &stub.page_url).await?;
    match find_original_url(&html, &stub.origin_prefix) {
        Some(original_url) => Ok(ResolvedPhoto { stub, original_url }),
        None => Err(ItemError::Resolve {
            page_url: stub.page_url,
        }),
    }
}
