use std::fmt;
use std::path::PathBuf;

use crate::persist::PersistError;

/// A photo discovered on a listing page, before its full-resolution URL is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoStub {
    /// Global sequence number, contiguous across listing pages.
    pub counter: usize,
    pub page_url: String,
    pub target_path: PathBuf,
    /// Preview URL with its query removed; the full-resolution link starts with it.
    pub origin_prefix: String,
    pub content_id: u64,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPhoto {
    pub stub: PhotoStub,
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoggedIn {
        account_id: u64,
    },
    PageFetched {
        page: u32,
        photos_on_page: usize,
        total_photos: usize,
    },
    CrawlCompleted {
        total_photos: usize,
    },
    ItemCompleted {
        counter: usize,
        success: bool,
        completed: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "operation cancelled")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Io,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors that abort the whole run before or instead of downloading.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("login failed: {0}")]
    Auth(String),
    #[error("listing page {page} could not be parsed: {message}")]
    Parse { page: u32, message: String },
    #[error("no images found")]
    EmptyResult,
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("run cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Per-photo failure; recorded in the report, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("no original image url found for {page_url}")]
    Resolve { page_url: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("download worker stopped before finishing this photo")]
    WorkerLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub counter: usize,
    pub page_url: String,
    pub result: Result<PathBuf, ItemError>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate of one download phase, ordered by counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<DownloadOutcome>,
}

impl RunReport {
    pub fn new(mut outcomes: Vec<DownloadOutcome>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.counter);
        Self { outcomes }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}
