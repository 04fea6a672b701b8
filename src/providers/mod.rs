pub mod proxyscrape;
pub mod scrapingant;
pub mod speedx;

use crate::configuration::{ProviderConfig, Providers};
use crate::error::FetchError;
use crate::provider::Provider;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub use proxyscrape::ProxyScrape;
pub use scrapingant::ScrapingAnt;
pub use speedx::SpeedX;

const USER_AGENT: &str = concat!("proxyhelper/", env!("CARGO_PKG_VERSION"));

static CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?(?::[0-9]{1,5})?$")
        .expect("candidate pattern is valid")
});

/// Client used for fetching the lists themselves (never proxied).
pub fn new_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// `host[:port]` shape check. Anything else is dropped before probing.
pub fn is_candidate(value: &str) -> bool {
    CANDIDATE.is_match(value)
}

/// Splits a plain-text list on LF or CR-LF, keeping well-formed entries.
pub fn parse_lines(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| is_candidate(line))
        .map(str::to_string)
        .collect()
}

/// GETs `url` and returns the body of a 2xx response.
pub(crate) async fn fetch_text(
    client: &Client,
    provider: &str,
    url: &str,
) -> Result<String, FetchError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::transport(provider, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            provider: provider.to_string(),
            status,
        });
    }

    resp.text()
        .await
        .map_err(|e| FetchError::transport(provider, e))
}

/// The known sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    ProxyScrape,
    ScrapingAnt,
    SpeedX,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::ProxyScrape,
        ProviderKind::ScrapingAnt,
        ProviderKind::SpeedX,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::ProxyScrape => proxyscrape::NAME,
            ProviderKind::ScrapingAnt => scrapingant::NAME,
            ProviderKind::SpeedX => speedx::NAME,
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            ProviderKind::ProxyScrape => proxyscrape::PROXYSCRAPE_URL,
            ProviderKind::ScrapingAnt => scrapingant::SCRAPINGANT_URL,
            ProviderKind::SpeedX => speedx::SPEEDX_URL,
        }
    }

    pub fn config(self, providers: &Providers) -> &ProviderConfig {
        match self {
            ProviderKind::ProxyScrape => &providers.proxyscrape,
            ProviderKind::ScrapingAnt => &providers.scrapingant,
            ProviderKind::SpeedX => &providers.speedx,
        }
    }

    pub fn build(self, url: Option<&str>, client: Client) -> Arc<dyn Provider> {
        let url = url.unwrap_or(self.default_url()).to_string();
        match self {
            ProviderKind::ProxyScrape => Arc::new(ProxyScrape::with_url(client, url)),
            ProviderKind::ScrapingAnt => Arc::new(ScrapingAnt::with_url(client, url)),
            ProviderKind::SpeedX => Arc::new(SpeedX::with_url(client, url)),
        }
    }
}

/// Builds every enabled source, in declaration order.
pub fn from_settings(providers: &Providers, client: &Client) -> Vec<Arc<dyn Provider>> {
    ProviderKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let conf = kind.config(providers);
            if !conf.enabled {
                log::debug!("{} disabled in configuration", kind.name());
                return None;
            }
            Some(kind.build(conf.url.as_deref(), client.clone()))
        })
        .collect()
}
