use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Bar, Error, MarketDataSource, Result};

/// Yahoo Finance chart API client. Used for all bar fetches.
pub struct YahooClient {
    base_url: String,
    http: Client,
}

impl YahooClient {
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; fxbot/0.1)")
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl MarketDataSource for YahooClient {
    async fn fetch_bars(&self, symbol: &str, interval: &str, range: &str) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!(%symbol, %interval, %range, "Fetching bars");

        let resp = self
            .http
            .get(&url)
            .query(&[("interval", interval), ("range", range)])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        // Yahoo reports unknown symbols as a 404 with a structured error body
        let parsed: ChartResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::Http(format!("HTTP {status}: {body}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = parsed.chart.error {
            return Err(Error::MarketData(format!(
                "{symbol}: {} ({})",
                err.description, err.code
            )));
        }
        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status}: {body}")));
        }

        let result = parsed
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| Error::MarketData(format!("{symbol}: empty chart result")))?;

        let bars = result.into_bars();
        debug!(%symbol, bars = bars.len(), "Fetched bars");
        Ok(bars)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Deserialize, Default)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Deserialize, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Zip the parallel arrays into bars, dropping any interval with a
    /// missing value (Yahoo emits nulls for gaps and the forming bar).
    fn into_bars(self) -> Vec<Bar> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                Some(Bar {
                    timestamp: DateTime::<Utc>::from_timestamp(ts, 0)?,
                    open: at(&quote.open, i)?,
                    high: at(&quote.high, i)?,
                    low: at(&quote.low, i)?,
                    close: at(&quote.close, i)?,
                })
            })
            .collect()
    }
}
