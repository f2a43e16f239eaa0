use thiserror::Error;

/// Failure of a single dashboard reaction.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The market data provider could not be reached or answered with garbage.
    #[error("Provider unavailable for {ticker}: {reason}")]
    ProviderUnavailable { ticker: String, reason: String },

    /// The provider answered with zero bars.
    #[error("No data for {0}")]
    EmptySeries(String),

    /// A filter value outside its universe, or an unknown column.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl DashboardError {
    /// Whether the reaction should degrade to a "no data available" display
    /// instead of being rejected.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            DashboardError::ProviderUnavailable { .. } | DashboardError::EmptySeries(_)
        )
    }
}
