//! Admin views over artist accounts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{ArtistCategory, ArtistProfile, ArtistProfileResponse, SetCategoryRequest, User};
use crate::AppState;

use super::auth::AdminUser;
use super::error::ApiError;
use super::profile::get_or_create_profile;
use super::validation::validate_uuid;

/// Artist account joined with its profile and availability count
#[derive(Debug, Serialize)]
pub struct ArtistWithProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub link: Option<String>,
    pub rate: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    pub gallery_urls: Vec<String>,
    pub bio: Option<String>,
    pub availability_count: i64,
    pub created_at: String,
}

/// List every artist with profile data and how many days they marked
///
/// GET /api/artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<ArtistWithProfile>>, ApiError> {
    let users: Vec<User> =
        sqlx::query_as("SELECT * FROM users WHERE role = 'artist' ORDER BY created_at ASC")
            .fetch_all(&state.db)
            .await?;

    let mut artists = Vec::with_capacity(users.len());
    for user in users {
        let profile: Option<ArtistProfile> =
            sqlx::query_as("SELECT * FROM artist_profiles WHERE user_id = ?")
                .bind(&user.id)
                .fetch_optional(&state.db)
                .await?;

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM availability_days WHERE artist_id = ?")
                .bind(&user.id)
                .fetch_one(&state.db)
                .await?;

        let (display_name, phone, link, rate, category, logo_url, gallery_urls, bio) =
            match profile {
                Some(p) => {
                    let gallery = p.gallery_paths();
                    (
                        p.display_name,
                        p.phone,
                        p.link,
                        p.rate,
                        p.category,
                        p.logo_path,
                        gallery,
                        p.bio,
                    )
                }
                None => (String::new(), None, None, None, None, None, Vec::new(), None),
            };

        artists.push(ArtistWithProfile {
            id: user.id,
            email: user.email,
            display_name,
            phone,
            link,
            rate,
            category,
            logo_url,
            gallery_urls,
            bio,
            availability_count: count.0,
            created_at: user.created_at,
        });
    }

    Ok(Json(artists))
}

/// Assign an artist's category, creating the profile lazily
///
/// PATCH /api/artists/:id/category
pub async fn set_category(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(request): Json<SetCategoryRequest>,
) -> Result<Json<ArtistProfileResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "artist_id") {
        return Err(ApiError::validation_field("artist_id", e));
    }
    let category: ArtistCategory = request
        .category
        .parse()
        .map_err(|_| ApiError::validation_field("category", "Category must be DJ or Group"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ? AND role = 'artist'")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    if user.is_none() {
        return Err(ApiError::not_found("Artist not found"));
    }

    let mut profile = get_or_create_profile(&state.db, &id).await?;
    profile.category = Some(category.to_string());
    profile.updated_at = chrono::Utc::now().to_rfc3339();

    sqlx::query("UPDATE artist_profiles SET category = ?, updated_at = ? WHERE id = ?")
        .bind(&profile.category)
        .bind(&profile.updated_at)
        .bind(&profile.id)
        .execute(&state.db)
        .await?;

    tracing::info!(artist_id = %id, category = %category, "Artist category updated");
    Ok(Json(ArtistProfileResponse::from(profile)))
}

/// Delete an artist account with everything attached to it
///
/// DELETE /api/artists/:id
pub async fn delete_artist(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "artist_id") {
        return Err(ApiError::validation_field("artist_id", e));
    }
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| ApiError::not_found("Artist not found"))?;
    if !user.role_enum().is_artist() {
        return Err(ApiError::bad_request("Only artist accounts can be deleted"));
    }

    // profile row read first so stored media can be cleaned up after commit
    let profile: Option<ArtistProfile> =
        sqlx::query_as("SELECT * FROM artist_profiles WHERE user_id = ?")
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM availability_days WHERE artist_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM artist_profiles WHERE user_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM invitations WHERE email = ?")
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Some(profile) = profile {
        if let Some(logo) = &profile.logo_path {
            super::profile::remove_stored_file(&state, logo);
        }
        for image in profile.gallery_paths() {
            super::profile::remove_stored_file(&state, &image);
        }
    }

    tracing::info!(artist_id = %id, email = %user.email, "Artist deleted");
    Ok(StatusCode::NO_CONTENT)
}
