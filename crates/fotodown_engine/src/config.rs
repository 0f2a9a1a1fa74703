use std::fmt;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 20;

const DEFAULT_TOP_URL: &str = "https://www.fotocommunity.de";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.0.1 Safari/605.1.15";

/// Endpoints of the photo community site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub top_url: String,
    pub login_url: String,
    pub user_photos_url: String,
}

impl SiteConfig {
    /// Derive every endpoint from a single origin, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            top_url: base.to_string(),
            login_url: format!("{base}/login"),
            user_photos_url: format!("{base}/user_photos"),
        }
    }

    pub fn listing_url(&self, account_id: u64, page: u32) -> String {
        format!(
            "{}/{account_id}?sort=new&page={page}",
            self.user_photos_url.trim_end_matches('/')
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::with_base(DEFAULT_TOP_URL)
    }
}

/// Per-request deadlines. `None` waits indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSettings {
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub site: SiteConfig,
    pub request: RequestSettings,
    pub workers: usize,
}

impl EngineConfig {
    pub fn with_site(site: SiteConfig) -> Self {
        Self {
            site,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            request: RequestSettings::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub account: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}
