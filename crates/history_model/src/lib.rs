use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub type ProviderResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }
}

/// Source of full daily history for a ticker.
///
/// Implementations return bars in ascending date order with one bar per
/// trading day. An unknown ticker is reported as an empty history rather
/// than an error where the upstream makes the distinction.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(&self, ticker: &str) -> ProviderResult<Vec<DailyBar>>;
}

/// Numeric bar fields that can be plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::Volume => "Volume",
        }
    }

    pub fn value(&self, bar: &DailyBar) -> f64 {
        match self {
            Column::Open => bar.open,
            Column::High => bar.high,
            Column::Low => bar.low,
            Column::Close => bar.close,
            Column::Volume => bar.volume as f64,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown column: {}", self.0)
    }
}

impl Error for UnknownColumn {}

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// The tickers offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ticker {
    #[default]
    Tsla,
    Amzn,
    Meta,
    Nflx,
    Goog,
    Aapl,
}

impl Ticker {
    pub const ALL: [Ticker; 6] = [
        Ticker::Tsla,
        Ticker::Amzn,
        Ticker::Meta,
        Ticker::Nflx,
        Ticker::Goog,
        Ticker::Aapl,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Ticker::Tsla => "TSLA",
            Ticker::Amzn => "AMZN",
            Ticker::Meta => "META",
            Ticker::Nflx => "NFLX",
            Ticker::Goog => "GOOG",
            Ticker::Aapl => "AAPL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ticker::Tsla => "Tesla, Inc.",
            Ticker::Amzn => "Amazon.com, Inc.",
            Ticker::Meta => "Meta Platforms, Inc.",
            Ticker::Nflx => "Netflix, Inc",
            Ticker::Goog => "Alphabet Inc.",
            Ticker::Aapl => "Apple Inc.",
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTicker(pub String);

impl fmt::Display for UnknownTicker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unknown ticker: {}", self.0)
    }
}

impl Error for UnknownTicker {}

impl FromStr for Ticker {
    type Err = UnknownTicker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::ALL
            .into_iter()
            .find(|ticker| ticker.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTicker(s.to_string()))
    }
}

/// Values of the most recent bar, shown as the at-a-glance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&DailyBar> for Snapshot {
    fn from(bar: &DailyBar) -> Self {
        Snapshot {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
