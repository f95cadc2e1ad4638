use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::debug;

use super::parse::parse_markets_output;
use super::record::BubbleRecord;

pub const DEFAULT_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

const MAX_PAGES: u32 = 40;
const MAX_PER_PAGE: u32 = 250;

/// Called from a worker thread.
pub trait MarketSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<BubbleRecord>>;

    fn describe(&self) -> String;
}

pub struct CoinGeckoSource {
    client: Client,
    url: String,
    vs_currency: String,
    pages: u32,
    per_page: u32,
}

impl CoinGeckoSource {
    pub fn new(url: String, vs_currency: String, pages: u32, per_page: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("market-bubbles/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            vs_currency,
            pages: pages.clamp(1, MAX_PAGES),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    fn fetch_page(&self, page: u32) -> Result<Vec<BubbleRecord>> {
        let query = [
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_owned()),
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
            ("sparkline", "false".to_owned()),
        ];

        let body = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .with_context(|| format!("request for page {page} of {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("market API rejected page {page}"))?
            .text()
            .with_context(|| format!("failed to read body of page {page}"))?;

        parse_markets_output(&body).with_context(|| format!("failed to decode page {page}"))
    }
}

impl MarketSource for CoinGeckoSource {
    fn fetch(&self) -> Result<Vec<BubbleRecord>> {
        let mut records =
            Vec::with_capacity((self.pages as usize).saturating_mul(self.per_page as usize));
        for page in 1..=self.pages {
            let mut page_records = self.fetch_page(page)?;
            debug!(page, count = page_records.len(), "fetched market page");
            records.append(&mut page_records);
        }
        Ok(records)
    }

    fn describe(&self) -> String {
        format!(
            "{} ({} x {} in {})",
            self.url, self.pages, self.per_page, self.vs_currency
        )
    }
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MarketSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<BubbleRecord>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        parse_markets_output(&raw)
            .with_context(|| format!("failed to decode {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
