//! Query parameters for the filtered list endpoints.
//!
//! Encoding rules match what the dashboard has always sent: score bounds are
//! sent whenever present (zero included) and whole scores go out without a
//! fractional part, string filters are dropped when empty, and `limit`/`offset`
//! are dropped when absent or zero.

use serde::{Serialize, Serializer};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn is_unset(value: &Option<u32>) -> bool {
    value.is_none_or(|n| n == 0)
}

/// `5.0` is sent as `5`; `7.5` stays `7.5`.
fn score<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match *value {
        Some(v) if (v as i64) as f64 == v => serializer.serialize_i64(v as i64),
        Some(v) => serializer.serialize_f64(v),
        None => serializer.serialize_none(),
    }
}

/// Filters for `GET /research/results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResearchFilters {
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "score")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "score")]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "is_blank")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "is_unset")]
    pub offset: Option<u32>,
}

/// Filters for `GET /colby/commands`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandFilters {
    #[serde(skip_serializing_if = "is_blank")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "is_unset")]
    pub offset: Option<u32>,
}

/// Filters for `GET /colby/best-practices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BestPracticeFilters {
    #[serde(skip_serializing_if = "is_blank")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "is_unset")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "is_unset")]
    pub offset: Option<u32>,
}
