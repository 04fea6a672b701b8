use super::{fetch_text, parse_lines};
use crate::error::FetchError;
use crate::provider::Provider;
use async_trait::async_trait;
use reqwest::Client;

pub const NAME: &str = "ProxyScrape";
pub const PROXYSCRAPE_URL: &str =
    "https://api.proxyscrape.com/v3/free-proxy-list/get?request=displayproxies";

/// ProxyScrape display API: one `ip:port` per CR-LF terminated line.
pub struct ProxyScrape {
    client: Client,
    url: String,
}

impl ProxyScrape {
    pub fn with_url(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Provider for ProxyScrape {
    async fn list(&self) -> Result<Vec<String>, FetchError> {
        let body = fetch_text(&self.client, NAME, &self.url).await?;
        Ok(parse_lines(&body))
    }

    fn name(&self) -> &str {
        NAME
    }
}
