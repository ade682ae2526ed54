//! Availability day models.
//!
//! One row per (artist, date) pair; rows only ever come and go through the
//! toggle operation, the blocked-date purge, or cascading artist deletion.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailabilityDay {
    pub id: String,
    pub artist_id: String,
    pub date: String,
    pub note: Option<String>,
    pub color: String,
    pub created_at: String,
}

/// Request body for POST /availability-days/toggle
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// Response for POST /availability-days/toggle
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub action: ToggleAction,
    pub date: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AvailabilityDay>,
}

/// Availability row enriched with artist identity, for the admin views
#[derive(Debug, Serialize)]
pub struct EnrichedAvailabilityDay {
    pub id: String,
    pub artist_id: String,
    pub date: String,
    pub note: Option<String>,
    pub color: String,
    pub created_at: String,
    pub artist_name: String,
    pub artist_email: String,
    pub artist_category: Option<String>,
}

/// Query parameters shared by the list, by-date, and export endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityFilter {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub artist_id: Option<String>,
}
