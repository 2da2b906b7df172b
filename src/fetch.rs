//! Market data acquisition.
//!
//! Pulls minute OHLCV bars for a continuous futures symbol from the Massive
//! REST API and maps them into a [`BarSeries`]. The signal pipeline itself
//! never does I/O; this client is the collaborator that feeds it.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::bars::{Bar, BarSeries};
use crate::calendar::ExchangeCalendar;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.massive.io";
/// Continuous front-month symbol for the S&P 500 E-mini
pub const DEFAULT_SYMBOL: &str = "ES";

/// Minute-bar client for the Massive REST API
pub struct MarketDataClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// One bar as the provider returns it
#[derive(Debug, Deserialize)]
struct RawBar {
    /// Bar open time, ISO-8601 UTC
    t: DateTime<Utc>,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
    /// Trade count for the interval (unused)
    #[serde(default)]
    n: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BarsResponse {
    #[serde(default)]
    bars: Vec<RawBar>,
}

impl MarketDataClient {
    /// Create a client from the `MASSIVE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MASSIVE_API_KEY")
            .context("MASSIVE_API_KEY environment variable not set")?;
        Ok(Self::new(api_key, DEFAULT_BASE_URL.to_string()))
    }

    /// Create a client with explicit credentials.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            api_key,
        }
    }

    /// Fetch minute bars covering the trailing `days` calendar days.
    ///
    /// An empty provider response maps to an empty series, not an error;
    /// the engine produces empty output for empty input.
    pub async fn fetch_minute_bars(
        &self,
        symbol: &str,
        days: i64,
        calendar: &ExchangeCalendar,
    ) -> Result<BarSeries> {
        let end = Utc::now();
        let start = end - Duration::days(days);
        let start_s = start.to_rfc3339();
        let end_s = end.to_rfc3339();

        let url = format!("{}/v1/quotes/{}/bars", self.base_url, symbol);
        info!("Fetching {} minute bars: {} to {}", symbol, start_s, end_s);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("start", start_s.as_str()),
                ("end", end_s.as_str()),
                ("granularity", "minute"),
                ("adjusted", "false"),
            ])
            .send()
            .await
            .context("Failed to reach market data API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Market data request failed with status {}: {}",
                status,
                body
            ));
        }

        let payload: BarsResponse = response
            .json()
            .await
            .context("Failed to parse market data response")?;

        if payload.bars.is_empty() {
            warn!("Provider returned no bars for {} in the requested range", symbol);
            return Ok(BarSeries::new(symbol, Vec::new()));
        }

        let series = map_bars(symbol, payload.bars, calendar);
        info!("Fetched {} bars for {}", series.len(), symbol);
        Ok(series)
    }
}

/// Map provider bars into engine bars, localizing timestamps once at ingest.
fn map_bars(symbol: &str, raw: Vec<RawBar>, calendar: &ExchangeCalendar) -> BarSeries {
    let bars = raw
        .into_iter()
        .map(|r| Bar {
            ts_event: r.t,
            ts_local: calendar.localize(r.t),
            open: r.o,
            high: r.h,
            low: r.l,
            close: r.c,
            volume: r.v as u64,
        })
        .collect();
    BarSeries::new(symbol, bars)
}
