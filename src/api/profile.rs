//! Artist profile endpoints: upsert, fetch, and media uploads.
//!
//! Uploaded files land under `<data_dir>/uploads` and are served back at
//! `/uploads/*` by the static file service.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{ArtistProfile, ArtistProfileResponse, DbPool, UpsertProfileRequest};
use crate::AppState;

use super::auth::ArtistUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_bio, validate_display_name, validate_link, validate_phone, MAX_GALLERY_IMAGES,
};

/// Upload ceiling per image
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Fetch the caller's profile row, creating an empty one on first use
pub(crate) async fn get_or_create_profile(
    pool: &DbPool,
    user_id: &str,
) -> Result<ArtistProfile, ApiError> {
    let existing: Option<ArtistProfile> =
        sqlx::query_as("SELECT * FROM artist_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    if let Some(profile) = existing {
        return Ok(profile);
    }

    let now = chrono::Utc::now().to_rfc3339();
    let profile = ArtistProfile {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        display_name: String::new(),
        phone: None,
        link: None,
        rate: None,
        category: None,
        logo_path: None,
        gallery: "[]".to_string(),
        bio: None,
        created_at: now.clone(),
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO artist_profiles (id, user_id, display_name, gallery, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&profile.id)
    .bind(&profile.user_id)
    .bind(&profile.display_name)
    .bind(&profile.gallery)
    .bind(&profile.created_at)
    .bind(&profile.updated_at)
    .execute(pool)
    .await?;
    Ok(profile)
}

/// Fetch the caller's own profile
///
/// GET /api/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
) -> Result<Json<ArtistProfileResponse>, ApiError> {
    let profile: Option<ArtistProfile> =
        sqlx::query_as("SELECT * FROM artist_profiles WHERE user_id = ?")
            .bind(&artist.id)
            .fetch_optional(&state.db)
            .await?;
    let profile = profile.ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(ArtistProfileResponse::from(profile)))
}

/// Create or update the caller's profile
///
/// POST /api/profile
pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Json<ArtistProfileResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_display_name(&request.display_name) {
        errors.add("display_name", e);
    }
    if let Err(e) = validate_phone(&request.phone) {
        errors.add("phone", e);
    }
    if let Err(e) = validate_link(&request.link) {
        errors.add("link", e);
    }
    if let Err(e) = validate_bio(&request.bio) {
        errors.add("bio", e);
    }
    if let Some(rate) = &request.rate {
        if rate.len() > 50 {
            errors.add("rate", "Rate is too long (max 50 characters)");
        }
    }
    errors.finish()?;

    let mut profile = get_or_create_profile(&state.db, &artist.id).await?;
    profile.display_name = request.display_name;
    profile.phone = request.phone;
    profile.link = request.link;
    profile.rate = request.rate;
    profile.bio = request.bio;
    profile.updated_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE artist_profiles SET display_name = ?, phone = ?, link = ?, rate = ?, bio = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&profile.display_name)
    .bind(&profile.phone)
    .bind(&profile.link)
    .bind(&profile.rate)
    .bind(&profile.bio)
    .bind(&profile.updated_at)
    .bind(&profile.id)
    .execute(&state.db)
    .await?;

    Ok(Json(ArtistProfileResponse::from(profile)))
}

#[derive(Debug, Serialize)]
pub struct LogoUploadResponse {
    pub logo_url: String,
}

#[derive(Debug, Serialize)]
pub struct GalleryUploadResponse {
    pub image_url: String,
    pub gallery_urls: Vec<String>,
}

/// Map an accepted image content type to its file extension
fn image_extension(content_type: Option<&str>) -> Result<&'static str, ApiError> {
    match content_type {
        Some("image/png") => Ok("png"),
        Some("image/jpeg") => Ok("jpg"),
        Some("image/webp") => Ok("webp"),
        _ => Err(ApiError::validation_field(
            "file",
            "Only PNG, JPEG, or WebP images are accepted",
        )),
    }
}

/// Pull the image out of a multipart body and persist it, returning the
/// `/uploads/...` URL path.
async fn store_image(
    state: &AppState,
    mut multipart: Multipart,
    subdir: &str,
) -> Result<String, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let ext = image_extension(field.content_type())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::validation_field("file", "Uploaded file is empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::validation_field(
                "file",
                "Uploaded file is too large (max 5 MiB)",
            ));
        }

        let dir = state.config.server.data_dir.join("uploads").join(subdir);
        crate::utils::ensure_dir(&dir)
            .map_err(|e| ApiError::internal(format!("Failed to prepare upload dir: {}", e)))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to store upload: {}", e)))?;

        return Ok(format!("/uploads/{}/{}", subdir, file_name));
    }

    Err(ApiError::validation_field("file", "Missing 'file' field"))
}

/// Delete a previously stored upload, tolerating its absence
pub(crate) fn remove_stored_file(state: &AppState, url_path: &str) {
    let relative = url_path.trim_start_matches('/');
    let path = state.config.server.data_dir.join(relative);
    if let Err(e) = std::fs::remove_file(&path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove stored file");
        }
    }
}

/// Upload or replace the profile logo
///
/// POST /api/profile/upload-logo
pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
    multipart: Multipart,
) -> Result<Json<LogoUploadResponse>, ApiError> {
    let profile = get_or_create_profile(&state.db, &artist.id).await?;
    let logo_url = store_image(&state, multipart, "logos").await?;

    sqlx::query("UPDATE artist_profiles SET logo_path = ?, updated_at = ? WHERE id = ?")
        .bind(&logo_url)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&profile.id)
        .execute(&state.db)
        .await?;

    if let Some(old) = &profile.logo_path {
        remove_stored_file(&state, old);
    }

    Ok(Json(LogoUploadResponse { logo_url }))
}

/// Add an image to the profile gallery
///
/// POST /api/profile/upload-gallery
pub async fn upload_gallery(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
    multipart: Multipart,
) -> Result<Json<GalleryUploadResponse>, ApiError> {
    let profile = get_or_create_profile(&state.db, &artist.id).await?;
    let mut gallery = profile.gallery_paths();
    if gallery.len() >= MAX_GALLERY_IMAGES {
        return Err(ApiError::validation_field(
            "file",
            format!("Gallery is full (max {} images)", MAX_GALLERY_IMAGES),
        ));
    }

    let image_url = store_image(&state, multipart, "gallery").await?;
    gallery.push(image_url.clone());

    let gallery_json = serde_json::to_string(&gallery)
        .map_err(|e| ApiError::internal(format!("Failed to encode gallery: {}", e)))?;
    sqlx::query("UPDATE artist_profiles SET gallery = ?, updated_at = ? WHERE id = ?")
        .bind(&gallery_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&profile.id)
        .execute(&state.db)
        .await?;

    Ok(Json(GalleryUploadResponse {
        image_url,
        gallery_urls: gallery,
    }))
}

/// Remove a gallery image by position
///
/// DELETE /api/profile/remove-gallery/:index
pub async fn remove_gallery(
    State(state): State<Arc<AppState>>,
    ArtistUser(artist): ArtistUser,
    Path(index): Path<usize>,
) -> Result<Json<GalleryUploadResponse>, ApiError> {
    let profile: Option<ArtistProfile> =
        sqlx::query_as("SELECT * FROM artist_profiles WHERE user_id = ?")
            .bind(&artist.id)
            .fetch_optional(&state.db)
            .await?;
    let profile = profile.ok_or_else(|| ApiError::not_found("Profile not found"))?;

    let mut gallery = profile.gallery_paths();
    if index >= gallery.len() {
        return Err(ApiError::not_found("Gallery image not found"));
    }
    let removed = gallery.remove(index);

    let gallery_json = serde_json::to_string(&gallery)
        .map_err(|e| ApiError::internal(format!("Failed to encode gallery: {}", e)))?;
    sqlx::query("UPDATE artist_profiles SET gallery = ?, updated_at = ? WHERE id = ?")
        .bind(&gallery_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&profile.id)
        .execute(&state.db)
        .await?;

    remove_stored_file(&state, &removed);

    Ok(Json(GalleryUploadResponse {
        image_url: removed,
        gallery_urls: gallery,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let pool = test_pool().await;
        let first = get_or_create_profile(&pool, "user-1").await.unwrap();
        let second = get_or_create_profile(&pool, "user-1").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.display_name, "");
        assert!(first.gallery_paths().is_empty());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(Some("image/png")).unwrap(), "png");
        assert_eq!(image_extension(Some("image/jpeg")).unwrap(), "jpg");
        assert_eq!(image_extension(Some("image/webp")).unwrap(), "webp");
        assert!(image_extension(Some("image/gif")).is_err());
        assert!(image_extension(Some("application/pdf")).is_err());
        assert!(image_extension(None).is_err());
    }
}
