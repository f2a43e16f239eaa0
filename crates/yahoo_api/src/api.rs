use async_trait::async_trait;
use history_model::{DailyBar, HistoryProvider, ProviderResult};
use itertools::izip;
use log::{debug, warn};
use redis::AsyncCommands;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;

const YAHOO_BASE_API_URL: &str = "https://query2.finance.yahoo.com";
const YAHOO_NOT_FOUND_CODE: &str = "Not Found";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct YahooChartJSON {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartErrorJSON>,
}

#[derive(Debug, Deserialize)]
struct ChartErrorJSON {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance daily history client.
pub struct YahooAPI {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderMap,
    cache: Option<HistoryCache>,
}

impl YahooAPI {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            ),
        );

        YahooAPI {
            base_url: YAHOO_BASE_API_URL.to_string(),
            client: reqwest::Client::new(),
            headers,
            cache: None,
        }
    }

    /// Keeps fetched histories in Redis for `ttl_secs`.
    pub fn with_cache(mut self, redis_client: redis::Client, ttl_secs: u64) -> Self {
        self.cache = Some(HistoryCache {
            redis_client,
            ttl_secs,
        });
        self
    }

    pub async fn get_ticker(&self, ticker: &str) -> ProviderResult<Vec<DailyBar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=max&interval=1d&events=history&includePrePost=false",
            self.base_url, ticker
        );

        debug!("get_ticker | url: {}", url);

        if let Some(cache) = &self.cache {
            match cache.get(&url).await {
                Ok(Some(history)) => {
                    debug!("get_ticker | cache hit | key: {}", url);
                    return Ok(history);
                }
                Ok(None) => debug!("get_ticker | cache miss | key: {}", url),
                Err(e) => warn!("get_ticker | cache unavailable: {}", e),
            }
        }

        let body = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?
            .text()
            .await?;

        let history = parse_chart(&body)?;

        if let Some(cache) = &self.cache {
            if !history.is_empty() {
                debug!("get_ticker | saving to cache");
                if let Err(e) = cache.set(&url, &history).await {
                    warn!("get_ticker | could not save to cache: {}", e);
                }
            }
        }

        Ok(history)
    }
}

impl Default for YahooAPI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryProvider for YahooAPI {
    async fn fetch_history(&self, ticker: &str) -> ProviderResult<Vec<DailyBar>> {
        self.get_ticker(ticker).await
    }
}

struct HistoryCache {
    redis_client: redis::Client,
    ttl_secs: u64,
}

impl HistoryCache {
    async fn get(&self, key: &str) -> ProviderResult<Option<Vec<DailyBar>>> {
        let mut redis_con = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = redis_con.get(key).await?;
        match cached {
            Some(cached) => Ok(Some(serde_json::from_str(&cached)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, history: &[DailyBar]) -> ProviderResult<()> {
        let mut redis_con = self.redis_client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(history)?;
        let _: () = redis_con.set_ex(key, serialized, self.ttl_secs).await?;
        Ok(())
    }
}

/// Turns a chart response body into an ascending, date-unique history.
///
/// Rows with a missing price or volume are skipped. Timestamps are shifted by
/// the exchange offset before taking the calendar date, and when two rows land
/// on the same date the later one is kept. An unknown symbol yields an empty
/// history.
pub fn parse_chart(body: &str) -> Result<Vec<DailyBar>, CustomError> {
    let json: YahooChartJSON = serde_json::from_str(body)?;

    if let Some(error) = json.chart.error {
        if error.code == YAHOO_NOT_FOUND_CODE {
            return Ok(vec![]);
        }
        return Err(CustomError::Api(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let Some(result) = json.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(vec![]);
    };

    let offset = result.meta.gmtoffset.unwrap_or_default();
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut rows: Vec<(i64, DailyBar)> = izip!(
        &timestamps,
        &quote.open,
        &quote.high,
        &quote.low,
        &quote.close,
        &quote.volume
    )
    .filter_map(|(t, o, h, l, c, v)| {
        let date = chrono::DateTime::from_timestamp(*t + offset, 0)?.date_naive();
        let bar = DailyBar {
            date,
            open: (*o)?,
            high: (*h)?,
            low: (*l)?,
            close: (*c)?,
            volume: v.map(|v| v.max(0.0).round() as u64)?,
        };
        Some((*t, bar))
    })
    .collect();

    rows.sort_by_key(|(t, _)| *t);

    let mut history: Vec<DailyBar> = Vec::with_capacity(rows.len());
    for (_, bar) in rows {
        match history.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => history.push(bar),
        }
    }

    Ok(history)
}

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),
}
