//! CSV export endpoint (admin only).

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::calendar::export::{export_csv, CsvExport};
use crate::db::AvailabilityFilter;
use crate::AppState;

use super::auth::AdminUser;
use super::error::ApiError;

/// Export matching availability and blocked-date rows as one CSV table
///
/// GET /api/export/csv
pub async fn csv(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(filter): Query<AvailabilityFilter>,
) -> Result<Json<CsvExport>, ApiError> {
    let export = export_csv(&state.db, &filter).await?;
    Ok(Json(export))
}
