//! Exchange listing registry providers.
//!
//! Pulls the listed-company registries from the TWSE and TPEX open-data
//! endpoints and normalizes them into [`StockListing`] records. The
//! registries publish dates in the ROC calendar (e.g. `1130823`), which is
//! converted here.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::info;
use twstock_core::{Market, StockListing};

use crate::error::{DataError, Result};

const DEFAULT_TWSE_BASE_URL: &str = "https://openapi.twse.com.tw";
const DEFAULT_TPEX_BASE_URL: &str = "https://www.tpex.org.tw";
const UA: &str = "Mozilla/5.0 (compatible; twstock/0.3)";

/// Reference-listing collaborator: yields the current security registry.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<StockListing>>;
}

/// Listing provider over the TWSE / TPEX open-data company registries.
pub struct TwseListingProvider {
    client: reqwest::Client,
    twse_base_url: String,
    tpex_base_url: String,
}

impl Default for TwseListingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TwseListingProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            twse_base_url: DEFAULT_TWSE_BASE_URL.to_string(),
            tpex_base_url: DEFAULT_TPEX_BASE_URL.to_string(),
        }
    }

    /// Point both registries at different hosts (tests).
    pub fn with_base_urls(
        mut self,
        twse_base_url: impl Into<String>,
        tpex_base_url: impl Into<String>,
    ) -> Self {
        self.twse_base_url = twse_base_url.into();
        self.tpex_base_url = tpex_base_url.into();
        self
    }

    async fn fetch_board(&self, url: &str, market: Market) -> Result<Vec<StockListing>> {
        let rows: Vec<RegistryRow> = self
            .client
            .get(url)
            .header(USER_AGENT, UA)
            .send()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| DataError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|e| DataError::Decode {
                origin: format!("{} registry", market.label()),
                reason: e.to_string(),
            })?;

        Ok(rows
            .into_iter()
            .filter(|row| !row.code.trim().is_empty())
            .map(|row| {
                let name = if row.short_name.trim().is_empty() {
                    row.name.trim().to_string()
                } else {
                    row.short_name.trim().to_string()
                };
                StockListing {
                    code: row.code.trim().to_string(),
                    name,
                    market,
                    industry: non_empty(row.industry),
                    // The company registries carry equities only; ETFs and
                    // warrants are published elsewhere.
                    category: Some("股票".to_string()),
                    list_date: row.list_date.as_deref().and_then(parse_registry_date),
                }
            })
            .collect())
    }
}

#[async_trait]
impl ListingProvider for TwseListingProvider {
    async fn fetch_all(&self) -> Result<Vec<StockListing>> {
        let listed_url = format!("{}/v1/opendata/t187ap03_L", self.twse_base_url);
        let otc_url = format!("{}/openapi/v1/mopsfin_t187ap03_O", self.tpex_base_url);

        let mut listings = self.fetch_board(&listed_url, Market::Listed).await?;
        let otc = self.fetch_board(&otc_url, Market::Otc).await?;

        info!(
            listed = listings.len(),
            otc = otc.len(),
            "exchange registries fetched"
        );

        listings.extend(otc);
        Ok(listings)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryRow {
    #[serde(rename = "公司代號")]
    code: String,
    #[serde(rename = "公司名稱", default)]
    name: String,
    #[serde(rename = "公司簡稱", default)]
    short_name: String,
    #[serde(rename = "產業別", default)]
    industry: Option<String>,
    #[serde(rename = "上市日期", alias = "上櫃日期", default)]
    list_date: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse registry dates: ROC-calendar `1130823`, `113/08/23`, and the
/// occasional Gregorian `2024-08-23` / `20240823`.
fn parse_registry_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match cleaned.len() {
        // ROC year: three digits + MMDD.
        7 => {
            let year: i32 = cleaned[..3].parse().ok()?;
            let month: u32 = cleaned[3..5].parse().ok()?;
            let day: u32 = cleaned[5..7].parse().ok()?;
            NaiveDate::from_ymd_opt(year + 1911, month, day)
        }
        8 => {
            let year: i32 = cleaned[..4].parse().ok()?;
            let month: u32 = cleaned[4..6].parse().ok()?;
            let day: u32 = cleaned[6..8].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        _ => None,
    }
}
