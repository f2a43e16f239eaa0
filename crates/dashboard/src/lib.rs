pub mod dashboard;
pub mod error;
pub mod filter;
pub mod projection;
pub mod view;

pub use dashboard::{ChartRequest, Dashboard};
pub use error::DashboardError;
pub use filter::{Dimension, FilterState, Trigger, Universe};
