//! Serializable display states handed to the page.
//!
//! Provider outages and empty histories are not errors at this level: they
//! become views with `available: false` so the page can render an empty chart
//! and blank indicators. Only invalid selections are passed back as errors.

use chrono::NaiveDate;
use history_model::{Column, Snapshot, Ticker};
use serde::Serialize;

use crate::dashboard::Dashboard;
use crate::error::DashboardError;
use crate::filter::{Dimension, Universe};
use crate::projection::{Chart, PlotPoint};

pub const PAGE_TITLE: &str = "Stock Price App";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub ticker: Ticker,
    pub available: bool,
    pub title: Option<String>,
    pub column: Option<Column>,
    pub points: Vec<PlotPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ChartView {
    pub fn from_reaction(
        ticker: Ticker,
        reaction: Result<Option<Chart>, DashboardError>,
    ) -> Result<ChartView, DashboardError> {
        match reaction {
            Ok(Some(chart)) => Ok(ChartView {
                ticker,
                available: true,
                title: Some(chart.title),
                column: Some(chart.column),
                points: chart.points,
                reason: None,
            }),
            Ok(None) => Ok(ChartView {
                ticker,
                available: true,
                title: None,
                column: None,
                points: vec![],
                reason: None,
            }),
            Err(e) if e.is_no_data() => Ok(ChartView {
                ticker,
                available: false,
                title: None,
                column: None,
                points: vec![],
                reason: Some(e.to_string()),
            }),
            Err(e) => Err(e),
        }
    }
}

/// The at-a-glance indicator row. Values are `None` when no data is available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlanceView {
    pub ticker: Ticker,
    pub available: bool,
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GlanceView {
    pub fn from_reaction(
        ticker: Ticker,
        reaction: Result<Snapshot, DashboardError>,
    ) -> Result<GlanceView, DashboardError> {
        match reaction {
            Ok(snapshot) => Ok(GlanceView {
                ticker,
                available: true,
                date: Some(snapshot.date),
                open: Some(snapshot.open),
                high: Some(snapshot.high),
                low: Some(snapshot.low),
                close: Some(snapshot.close),
                volume: Some(snapshot.volume),
                reason: None,
            }),
            Err(e) if e.is_no_data() => Ok(GlanceView {
                ticker,
                available: false,
                date: None,
                open: None,
                high: None,
                low: None,
                close: None,
                volume: None,
                reason: Some(e.to_string()),
            }),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerOption {
    pub label: &'static str,
    pub value: Ticker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistOptions<V: Ord> {
    pub title: &'static str,
    pub all_label: &'static str,
    pub options: Universe<V>,
}

impl<V: Ord + Copy> ChecklistOptions<V> {
    fn new(dimension: Dimension, universe: &Universe<V>) -> Self {
        ChecklistOptions {
            title: dimension.title(),
            all_label: dimension.all_label(),
            options: universe.clone(),
        }
    }
}

/// Everything the page needs to build its controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    pub title: &'static str,
    pub tickers: Vec<TickerOption>,
    pub default_ticker: Ticker,
    pub columns: Vec<Column>,
    pub years: ChecklistOptions<i32>,
    pub months: ChecklistOptions<u32>,
}

impl Options {
    pub fn new(dashboard: &Dashboard) -> Self {
        Options {
            title: PAGE_TITLE,
            tickers: Ticker::ALL
                .into_iter()
                .map(|ticker| TickerOption {
                    label: ticker.label(),
                    value: ticker,
                })
                .collect(),
            default_ticker: dashboard.reference(),
            columns: Column::ALL.to_vec(),
            years: ChecklistOptions::new(Dimension::Year, dashboard.years()),
            months: ChecklistOptions::new(Dimension::Month, dashboard.months()),
        }
    }
}
