use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use engine_logging::engine_warn;

use crate::decode::decode_page;
use crate::{FailureKind, FetchError, RequestSettings};

/// Build the client shared by every request of a run.
pub(crate) fn build_client(
    settings: &RequestSettings,
    cookies: Arc<Jar>,
) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder()
        .cookie_provider(cookies)
        .user_agent(settings.user_agent.clone());
    if let Some(timeout) = settings.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

/// Resolve `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::cancelled()),
        result = fut => result,
    }
}

pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
    request.send().await.map_err(map_reqwest_error)
}

/// Send a prepared request and read the whole body as decoded text, whatever the status.
pub(crate) async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, FetchError> {
    let response = send(request).await?;
    read_text(response).await
}

/// GET an HTML page, failing on non-success status.
pub(crate) async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let parsed = parse_url(url)?;
    let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;
    ensure_success(&response)?;
    read_text(response).await
}

/// Stream the body of `url` into a newly created file at `target`.
///
/// The file is only created once a successful response has arrived. A body
/// that fails mid-stream leaves the partial file behind.
pub(crate) async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
) -> Result<u64, FetchError> {
    let parsed = parse_url(url)?;
    let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;
    ensure_success(&response)?;

    let mut file = tokio::fs::File::create(target).await.map_err(map_io_error)?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        file.write_all(&chunk).await.map_err(map_io_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(map_io_error)?;
    Ok(written)
}

async fn read_text(response: reqwest::Response) -> Result<String, FetchError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    let url = response.url().to_string();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    let page = decode_page(&bytes, content_type.as_deref());
    if page.had_replacements {
        engine_warn!(
            "{} is not valid {}, malformed bytes replaced",
            url,
            page.encoding_label
        );
    }
    Ok(page.text)
}

pub(crate) fn parse_url(url: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(url).map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))
}

fn ensure_success(response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(FetchError::new(
        FailureKind::HttpStatus(status.as_u16()),
        format!("{} for {}", status, response.url()),
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_io_error(err: std::io::Error) -> FetchError {
    FetchError::new(FailureKind::Io, err.to_string())
}
