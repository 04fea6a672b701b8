use super::{fetch_text, parse_lines};
use crate::error::FetchError;
use crate::provider::Provider;
use async_trait::async_trait;
use reqwest::Client;

pub const NAME: &str = "SpeedX";
pub const SPEEDX_URL: &str =
    "https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/http.txt";

/// TheSpeedX/SOCKS-List on GitHub, raw `http.txt`.
pub struct SpeedX {
    client: Client,
    url: String,
}

impl SpeedX {
    pub fn with_url(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Provider for SpeedX {
    async fn list(&self) -> Result<Vec<String>, FetchError> {
        let body = fetch_text(&self.client, NAME, &self.url).await?;
        Ok(parse_lines(&body))
    }

    fn name(&self) -> &str {
        NAME
    }
}
