//! Route handlers, grouped by resource.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod medications;
pub mod records;
pub mod reminders;
pub mod sharing;

use medvault_core::{Pagination, DEFAULT_UPCOMING_REMINDER_DAYS};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size, clamped to 1..=100. Defaults to 10.
    pub limit: Option<i64>,
    /// Rows to skip. Defaults to 0.
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpcomingPageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Only entries from now on.
    #[serde(default)]
    pub upcoming: bool,
}

impl UpcomingPageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivePageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Only active medications.
    #[serde(default)]
    pub active: bool,
}

impl ActivePageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DaysParams {
    /// Look-ahead in days. Defaults to 30.
    #[serde(default = "default_upcoming_days")]
    pub days: i64,
}

fn default_upcoming_days() -> i64 {
    DEFAULT_UPCOMING_REMINDER_DAYS
}
