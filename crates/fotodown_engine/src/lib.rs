//! Fotodown engine: login, listing crawl and concurrent photo download.
mod config;
mod decode;
mod detail;
mod engine;
mod fetch;
mod filename;
mod listing;
pub mod markup;
mod orchestrator;
mod persist;
mod pool;
mod progress;
mod session;
mod types;

pub use config::{Credentials, EngineConfig, RequestSettings, SiteConfig, DEFAULT_WORKERS};
pub use decode::{decode_page, DecodedPage};
pub use detail::resolve;
pub use engine::EngineHandle;
pub use filename::{photo_filename, recover_base_name, PREVIEW_SUFFIX_LEN};
pub use listing::crawl;
pub use markup::{ListingPage, MarkupError, Pagination};
pub use orchestrator::Orchestrator;
pub use persist::{prepare_output_dir, PersistError};
pub use pool::DownloadPool;
pub use progress::{ChannelProgressSink, NoopProgressSink, ProgressSink};
pub use session::Session;
pub use tokio_util::sync::CancellationToken;
pub use types::{
    DownloadOutcome, EngineEvent, FailureKind, FetchError, ItemError, PhotoStub, ResolvedPhoto,
    RunError, RunReport,
};
