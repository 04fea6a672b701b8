use super::{fetch_text, is_candidate};
use crate::error::FetchError;
use crate::provider::Provider;
use crate::proxy::ProxyType;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

pub const NAME: &str = "ScrapingAnt";
pub const SCRAPINGANT_URL: &str = "https://scrapingant.com/proxies";

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// ScrapingAnt free proxy page. HTML table with `IP`, `Port` and
/// `Protocol` columns; only `HTTP` rows are kept.
pub struct ScrapingAnt {
    client: Client,
    url: String,
}

impl ScrapingAnt {
    pub fn with_url(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Provider for ScrapingAnt {
    async fn list(&self) -> Result<Vec<String>, FetchError> {
        let body = fetch_text(&self.client, NAME, &self.url).await?;
        parse_table(&body).map_err(|message| FetchError::parse(NAME, message))
    }

    fn name(&self) -> &str {
        NAME
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extracts HTTP proxies from the first table of `body`.
///
/// Columns are located by header name, so reordering on the page is
/// harmless. Without a `Port` column the bare address is returned.
pub fn parse_table(body: &str) -> Result<Vec<String>, String> {
    let doc = Html::parse_document(body);
    let table = doc.select(&TABLE).next().ok_or("proxy table not found")?;

    let headers: Vec<String> = table
        .select(&HEADER_CELL)
        .map(|th| cell_text(th).to_ascii_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let ip_col = column("ip").ok_or("no IP column in proxy table")?;
    let protocol_col = column("protocol").ok_or("no Protocol column in proxy table")?;
    let port_col = column("port");

    let mut result = Vec::new();
    for row in table.select(&ROW) {
        let cols: Vec<String> = row.select(&CELL).map(cell_text).collect();
        if cols.is_empty() {
            continue;
        }

        let Some(protocol) = cols.get(protocol_col) else {
            continue;
        };
        if ProxyType::from_label(protocol) != ProxyType::Http {
            continue;
        }

        let Some(ip) = cols.get(ip_col) else {
            continue;
        };
        let addr = match port_col.and_then(|i| cols.get(i)) {
            Some(port) if !port.is_empty() => format!("{}:{}", ip, port),
            _ => ip.clone(),
        };

        if is_candidate(&addr) {
            result.push(addr);
        }
    }

    Ok(result)
}
