//! View state owned by the dashboard consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::types::{ResearchStatus, StatsResponse};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Last known dashboard data plus presentation flags.
///
/// There is no global instance; whoever renders the dashboard owns one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub sidebar_open: bool,
    pub theme: Theme,
    pub loading: bool,
    pub error: Option<String>,
    pub stats: Option<StatsResponse>,
    pub research_status: Option<ResearchStatus>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            theme: Theme::default(),
            loading: false,
            error: None,
            stats: None,
            research_status: None,
            last_updated: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `stats` and stamps `last_updated` with the current time.
    pub fn set_stats(&mut self, stats: StatsResponse) {
        self.stats = Some(stats);
        self.last_updated = Some(Utc::now());
    }

    pub fn set_research_status(&mut self, status: ResearchStatus) {
        self.research_status = Some(status);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn record_error(&mut self, error: &ApiError) {
        self.set_error(error.message.clone());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
