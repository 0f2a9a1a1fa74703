use std::fmt;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;

use crate::fetch::{build_client, cancellable, fetch_text, parse_url, send};
use crate::markup::extract_account_id;
use crate::{Credentials, FailureKind, RequestSettings, RunError, SiteConfig};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Authenticated client state shared read-only by every request of a run.
#[derive(Clone)]
pub struct Session {
    client: reqwest::Client,
    cookies: Arc<Jar>,
    account_id: u64,
    site: SiteConfig,
}

impl Session {
    /// Log in and scan the response for the account id marker.
    ///
    /// The cookie jar honours `Domain` attributes, so cookies set by the
    /// login host are sent to the other subdomains of the site as well.
    pub async fn login(
        site: &SiteConfig,
        request: &RequestSettings,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Self, RunError> {
        let cookies = Arc::new(Jar::default());
        let client = build_client(request, cookies.clone())?;
        let login_url = parse_url(&site.login_url)?;

        engine_debug!("Fetching login page {}", login_url);
        cancellable(cancel, send(client.get(login_url.clone())))
            .await
            .map_err(cancel_aware)?;

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("login[login]", &credentials.account)
            .append_pair("login[pass]", &credentials.secret)
            .append_pair("login[vorname]", "")
            .append_pair("signup", "Einloggen")
            .finish();
        let post = client
            .post(login_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        let page = cancellable(cancel, fetch_text(post))
            .await
            .map_err(cancel_aware)?;

        let account_id = extract_account_id(&page).ok_or_else(|| {
            RunError::Auth(format!(
                "failed to find user id after login for {}",
                credentials.account
            ))
        })?;
        engine_info!("Logged in as {} (id {})", credentials.account, account_id);

        Ok(Self {
            client,
            cookies,
            account_id,
            site: site.clone(),
        })
    }

    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

pub(crate) fn cancel_aware(err: crate::FetchError) -> RunError {
    if err.kind == FailureKind::Cancelled {
        RunError::Cancelled
    } else {
        RunError::Fetch(err)
    }
}
