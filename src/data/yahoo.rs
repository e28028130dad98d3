//! Yahoo Finance chart API integration for `USD{CODE}=X` daily closes.

use std::cell::Cell;
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::source::RateSource;
use crate::domain::{Currency, DateRange, RateSeries};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; fxdash/0.1)";
const DEFAULT_DELAY_MS: u64 = 2000;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Connection settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Pause between consecutive requests to stay under the rate limit.
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl YahooConfig {
    /// Read `FXDASH_*` overrides; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FXDASH_YAHOO_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(ua) = std::env::var("FXDASH_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Ok(raw) = std::env::var("FXDASH_REQUEST_DELAY_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                AppError::new(AppError::USAGE, format!("Invalid FXDASH_REQUEST_DELAY_MS '{raw}': {e}"))
            })?;
            config.request_delay = Duration::from_millis(ms);
        }
        if let Ok(raw) = std::env::var("FXDASH_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                AppError::new(AppError::USAGE, format!("Invalid FXDASH_TIMEOUT_SECS '{raw}': {e}"))
            })?;
            config.timeout = Duration::from_secs(secs.max(1));
        }

        Ok(config)
    }
}

pub struct YahooSource {
    client: Client,
    config: YahooConfig,
    last_request: Cell<Option<Instant>>,
}

impl YahooSource {
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(YahooConfig::from_env()?)
    }

    pub fn new(config: YahooConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(config: YahooConfig, client: Client) -> Self {
        Self {
            client,
            config,
            last_request: Cell::new(None),
        }
    }

    fn chart_url(&self, currency: Currency) -> String {
        format!("{}/v8/finance/chart/{}", self.config.base_url, currency.symbol())
    }

    fn throttle(&self) {
        if let Some(prev) = self.last_request.get() {
            let elapsed = prev.elapsed();
            if elapsed < self.config.request_delay {
                std::thread::sleep(self.config.request_delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl RateSource for YahooSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn fetch_series(&self, currency: Currency, range: &DateRange) -> Result<RateSeries, AppError> {
        self.throttle();

        let period1 = unix_midnight(range.start());
        let period2 = unix_midnight(range.end());

        let resp = self
            .client
            .get(self.chart_url(currency))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(AppError::RUNTIME, format!("Yahoo request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to read Yahoo response: {e}")))?;

        // 404 carries a JSON error body ("No data found"); treat it as an empty range.
        if !status.is_success() && status.as_u16() != 404 {
            return Err(AppError::new(
                AppError::RUNTIME,
                format!("Yahoo request failed with status {status}."),
            ));
        }

        let rows = parse_chart_response(&body)?;
        let series = RateSeries::from_points(currency, rows).clipped(range);
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart response body into `(date, close)` rows.
///
/// "No data found" errors and results without timestamps yield no rows;
/// any other upstream error is a failure.
pub fn parse_chart_response(body: &str) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| AppError::new(AppError::RUNTIME, format!("Failed to parse Yahoo response: {e}")))?;

    if let Some(err) = resp.chart.error {
        let code = err.code.unwrap_or_default();
        let description = err.description.unwrap_or_default();
        if code.eq_ignore_ascii_case("Not Found") || description.contains("No data found") {
            return Ok(Vec::new());
        }
        return Err(AppError::new(
            AppError::RUNTIME,
            format!("Yahoo chart API error: {code} {description}").trim_end().to_string(),
        ));
    }

    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let mut out = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(quote.close.iter()) {
        let Some(close) = close else {
            continue;
        };
        let Some(dt) = DateTime::from_timestamp(ts + offset, 0) else {
            log::warn!("skipping invalid Yahoo timestamp {ts}");
            continue;
        };
        out.push((dt.date_naive(), *close));
    }

    Ok(out)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}
