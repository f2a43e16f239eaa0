use history_model::{Column, DailyBar, HistoryProvider, Snapshot, Ticker};
use log::{debug, error};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::DashboardError;
use crate::filter::{Universe, month_universe, year_universe};
use crate::projection::{Chart, filter_bars, project, snapshot};

/// What the chart should show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartRequest {
    pub column: Option<Column>,
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
}

/// The dashboard reactions, backed by a history provider.
///
/// The year and month universes are captured from the reference ticker when
/// the dashboard is loaded and stay fixed afterwards, whatever ticker is
/// being viewed.
pub struct Dashboard {
    provider: Arc<dyn HistoryProvider>,
    reference: Ticker,
    years: Universe<i32>,
    months: Universe<u32>,
}

impl Dashboard {
    pub async fn load(
        provider: Arc<dyn HistoryProvider>,
        reference: Ticker,
    ) -> Result<Self, DashboardError> {
        let series = fetch(provider.as_ref(), reference.symbol()).await?;
        let years = year_universe(&series);
        let months = month_universe(&series);
        Ok(Dashboard {
            provider,
            reference,
            years,
            months,
        })
    }

    pub fn new(
        provider: Arc<dyn HistoryProvider>,
        reference: Ticker,
        years: Universe<i32>,
        months: Universe<u32>,
    ) -> Self {
        Dashboard {
            provider,
            reference,
            years,
            months,
        }
    }

    pub fn reference(&self) -> Ticker {
        self.reference
    }

    pub fn years(&self) -> &Universe<i32> {
        &self.years
    }

    pub fn months(&self) -> &Universe<u32> {
        &self.months
    }

    /// Rejects year or month values the checklists do not offer.
    pub fn validate_selection(
        &self,
        years: &BTreeSet<i32>,
        months: &BTreeSet<u32>,
    ) -> Result<(), DashboardError> {
        let bad_years = self.years.outside(years);
        if !bad_years.is_empty() {
            return Err(DashboardError::InvalidSelection(format!(
                "years not offered: {:?}",
                bad_years
            )));
        }

        let bad_months = self.months.outside(months);
        if !bad_months.is_empty() {
            return Err(DashboardError::InvalidSelection(format!(
                "months not offered: {:?}",
                bad_months
            )));
        }

        Ok(())
    }

    /// Filtered chart for `ticker`, or `None` when no column is chosen.
    ///
    /// The history is fetched fresh on every call.
    pub async fn chart(
        &self,
        ticker: &str,
        request: &ChartRequest,
    ) -> Result<Option<Chart>, DashboardError> {
        debug_assert!(
            self.validate_selection(&request.years, &request.months)
                .is_ok(),
            "chart selection must be validated by the caller"
        );

        let Some(column) = request.column else {
            debug!("chart | {} | no column selected", ticker);
            return Ok(None);
        };

        let series = fetch(self.provider.as_ref(), ticker).await?;
        let bars = filter_bars(&series, &request.years, &request.months);
        debug!(
            "chart | {} | {} of {} bars selected",
            ticker,
            bars.len(),
            series.len()
        );
        Ok(Some(project(&bars, column)))
    }

    /// Latest bar of the unfiltered history for `ticker`.
    pub async fn glance(&self, ticker: &str) -> Result<Snapshot, DashboardError> {
        let series = fetch(self.provider.as_ref(), ticker).await?;
        snapshot(&series).ok_or_else(|| DashboardError::EmptySeries(ticker.to_string()))
    }
}

async fn fetch(
    provider: &dyn HistoryProvider,
    ticker: &str,
) -> Result<Vec<DailyBar>, DashboardError> {
    match provider.fetch_history(ticker).await {
        Ok(series) if series.is_empty() => Err(DashboardError::EmptySeries(ticker.to_string())),
        Ok(series) => Ok(series),
        Err(e) => {
            error!("fetch | {} | provider failed: {}", ticker, e);
            Err(DashboardError::ProviderUnavailable {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
