//! Blocked-date registry endpoints (admin only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::calendar::blocked;
use crate::db::{
    AvailabilityFilter, BlockDateResponse, BlockedDate, CreateBlockedDateRequest,
    UpdateBlockedDateRequest,
};
use crate::AppState;

use super::auth::AdminUser;
use super::error::ApiError;
use super::validation::validate_note;

/// Block a date for all artists
///
/// POST /api/blocked-dates
pub async fn create(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<CreateBlockedDateRequest>,
) -> Result<Json<BlockDateResponse>, ApiError> {
    if let Err(e) = validate_note(&request.note) {
        return Err(ApiError::validation_field("note", e));
    }
    let response = blocked::block_date(&state.db, &request).await?;
    Ok(Json(response))
}

/// List blocked dates, optionally restricted to a range
///
/// GET /api/blocked-dates
pub async fn list(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(filter): Query<AvailabilityFilter>,
) -> Result<Json<Vec<BlockedDate>>, ApiError> {
    let dates = blocked::list_blocked_dates(&state.db, &filter).await?;
    Ok(Json(dates))
}

/// Edit a blocked date
///
/// PUT /api/blocked-dates/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBlockedDateRequest>,
) -> Result<Json<BlockedDate>, ApiError> {
    if let Err(e) = validate_note(&request.note) {
        return Err(ApiError::validation_field("note", e));
    }
    let updated = blocked::update_blocked_date(&state.db, &id, &request).await?;
    Ok(Json(updated))
}

/// Unblock a date; purged availabilities are not restored
///
/// DELETE /api/blocked-dates/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    blocked::unblock_date(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
