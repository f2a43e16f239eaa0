use chrono::NaiveDate;
use history_model::{Column, DailyBar, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub column: Column,
    pub points: Vec<PlotPoint>,
}

/// Bars whose year and month are both selected, in series order.
///
/// An empty selection in either dimension selects nothing.
pub fn filter_bars<'a>(
    series: &'a [DailyBar],
    years: &BTreeSet<i32>,
    months: &BTreeSet<u32>,
) -> Vec<&'a DailyBar> {
    series
        .iter()
        .filter(|bar| years.contains(&bar.year()) && months.contains(&bar.month()))
        .collect()
}

pub fn project(bars: &[&DailyBar], column: Column) -> Chart {
    Chart {
        title: format!("Plot of {}", column),
        column,
        points: bars
            .iter()
            .map(|bar| PlotPoint {
                date: bar.date,
                value: column.value(bar),
            })
            .collect(),
    }
}

/// The most recent bar of an unfiltered series.
pub fn snapshot(series: &[DailyBar]) -> Option<Snapshot> {
    series.last().map(Snapshot::from)
}
