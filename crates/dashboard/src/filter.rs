//! "Select all" reconciliation for the year and month checklists.
//!
//! Each dimension pairs a multi-select list with an "all" toggle. After either
//! control is edited, [`FilterState::reconcile`] brings the other one back in
//! line so that `all` is on exactly when every value of the universe is
//! selected.

use history_model::DailyBar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which control the user just edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    MultiSelect,
    AllToggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Month,
}

impl Dimension {
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Year => "Choose Year",
            Dimension::Month => "Choose Month",
        }
    }

    pub fn all_label(&self) -> &'static str {
        match self {
            Dimension::Year => "All Years",
            Dimension::Month => "All Months",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dimension::Year => write!(f, "year"),
            Dimension::Month => write!(f, "month"),
        }
    }
}

/// The values a checklist offers, fixed for the lifetime of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Universe<V: Ord> {
    values: BTreeSet<V>,
}

impl<V: Ord + Copy> Universe<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Universe {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &BTreeSet<V> {
        &self.values
    }

    /// Values of `selected` that the checklist does not offer.
    pub fn outside(&self, selected: &BTreeSet<V>) -> Vec<V> {
        selected.difference(&self.values).copied().collect()
    }
}

/// Distinct years present in `series`.
pub fn year_universe(series: &[DailyBar]) -> Universe<i32> {
    Universe::new(series.iter().map(DailyBar::year))
}

/// Distinct months present in `series`.
pub fn month_universe(series: &[DailyBar]) -> Universe<u32> {
    Universe::new(series.iter().map(DailyBar::month))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState<V: Ord> {
    pub selected: BTreeSet<V>,
    pub all: bool,
}

impl<V: Ord> Default for FilterState<V> {
    fn default() -> Self {
        FilterState {
            selected: BTreeSet::new(),
            all: false,
        }
    }
}

impl<V: Ord + Copy> FilterState<V> {
    pub fn new(selected: impl IntoIterator<Item = V>, all: bool) -> Self {
        FilterState {
            selected: selected.into_iter().collect(),
            all,
        }
    }

    /// Resolves the pair after the control named by `trigger` was edited.
    ///
    /// A list edit is kept as is and decides the toggle. A toggle edit is kept
    /// as is and decides the list: on selects the whole universe, off clears it.
    pub fn reconcile(self, trigger: Trigger, universe: &Universe<V>) -> Self {
        match trigger {
            Trigger::MultiSelect => {
                let all = self.selected == universe.values;
                FilterState {
                    selected: self.selected,
                    all,
                }
            }
            Trigger::AllToggle => {
                let selected = if self.all {
                    universe.values.clone()
                } else {
                    BTreeSet::new()
                };
                FilterState {
                    selected,
                    all: self.all,
                }
            }
        }
    }
}
