//! Availability endpoints: the toggle verb plus the role-scoped read views.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::calendar::{self, artist_identity, toggle::toggle_day};
use crate::db::{
    AvailabilityDay, AvailabilityFilter, EnrichedAvailabilityDay, ToggleRequest, ToggleResponse,
    User,
};
use crate::AppState;

use super::auth::{AdminUser, ArtistUser};
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_color, validate_note};

/// The single write verb for availability
///
/// POST /api/availability-days/toggle
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_note(&request.note) {
        errors.add("note", e);
    }
    if let Err(e) = validate_color(&request.color) {
        errors.add("color", e);
    }
    errors.finish()?;

    let response = toggle_day(&state.db, &state.config.calendar, &artist.id, &request).await?;
    Ok(Json(response))
}

/// Attach artist identity to each availability row, one lookup per row
async fn enrich(
    state: &AppState,
    days: Vec<AvailabilityDay>,
) -> Result<Vec<EnrichedAvailabilityDay>, ApiError> {
    let mut enriched = Vec::with_capacity(days.len());
    for day in days {
        let identity = artist_identity(&state.db, &day.artist_id).await?;
        enriched.push(EnrichedAvailabilityDay {
            id: day.id,
            artist_id: day.artist_id,
            date: day.date,
            note: day.note,
            color: day.color,
            created_at: day.created_at,
            artist_name: identity.name,
            artist_email: identity.email,
            artist_category: identity.category,
        });
    }
    Ok(enriched)
}

/// Role-scoped list: admins see every matching row with artist identity
/// attached, artists see only their own raw rows.
///
/// GET /api/availability-days
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: User,
    Query(mut filter): Query<AvailabilityFilter>,
) -> Result<Response, ApiError> {
    if user.role_enum().is_admin() {
        let days = calendar::export::fetch_availabilities(&state.db, &filter).await?;
        let enriched = enrich(&state, days).await?;
        Ok(Json(enriched).into_response())
    } else {
        // callers already know who they are; no enrichment
        filter.artist_id = Some(user.id);
        let days = calendar::export::fetch_availabilities(&state.db, &filter).await?;
        Ok(Json(days).into_response())
    }
}

/// Artists available on one date
///
/// GET /api/availability-days/:id (the segment is a YYYY-MM-DD date)
pub async fn available_on_date(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(date): Path<String>,
) -> Result<Json<Vec<EnrichedAvailabilityDay>>, ApiError> {
    let parsed = calendar::parse_date(&date).map_err(ApiError::from)?;
    let filter = AvailabilityFilter {
        start_date: Some(parsed.format("%Y-%m-%d").to_string()),
        end_date: Some(parsed.format("%Y-%m-%d").to_string()),
        artist_id: None,
    };
    let days = calendar::export::fetch_availabilities(&state.db, &filter).await?;
    let enriched = enrich(&state, days).await?;
    Ok(Json(enriched))
}

/// Remove one availability record: owners delete their own, admins any
///
/// DELETE /api/availability-days/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let day: Option<AvailabilityDay> =
        sqlx::query_as("SELECT * FROM availability_days WHERE id = ?")
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;
    let day = day.ok_or_else(|| ApiError::not_found("Availability not found"))?;

    if !user.role_enum().is_admin() && day.artist_id != user.id {
        return Err(ApiError::forbidden(
            "You can only remove your own availability",
        ));
    }

    sqlx::query("DELETE FROM availability_days WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
