//! Blocked date models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockedDate {
    pub id: String,
    pub date: String,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockedDateRequest {
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBlockedDateRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Response for POST /blocked-dates: the new row plus how many existing
/// availability records the block wiped out.
#[derive(Debug, Serialize)]
pub struct BlockDateResponse {
    #[serde(flatten)]
    pub blocked: BlockedDate,
    pub removed_availabilities: u64,
}
