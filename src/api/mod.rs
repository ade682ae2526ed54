mod artists;
pub mod auth;
mod availability;
mod blocked_dates;
pub mod error;
mod export;
mod invitations;
mod profile;
mod validation;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::CorsConfig;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public except /me, which authenticates via extractor)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let api_routes = Router::new()
        // Invitations (verify is public; the rest is admin-gated in handlers)
        .route("/invitations", post(invitations::create_invitation))
        .route("/invitations", get(invitations::list_invitations))
        .route("/invitations/verify/:token", get(invitations::verify_invitation))
        .route("/invitations/:id", delete(invitations::delete_invitation))
        // Artist profile
        .route("/profile", post(profile::upsert_profile))
        .route("/profile", get(profile::get_profile))
        .route("/profile/upload-logo", post(profile::upload_logo))
        .route("/profile/upload-gallery", post(profile::upload_gallery))
        .route("/profile/remove-gallery/:index", delete(profile::remove_gallery))
        // Artist management
        .route("/artists", get(artists::list_artists))
        .route("/artists/:id/category", patch(artists::set_category))
        .route("/artists/:id", delete(artists::delete_artist))
        // Availability days
        .route("/availability-days/toggle", post(availability::toggle))
        .route("/availability-days", get(availability::list))
        .route("/availability-days/:id", get(availability::available_on_date))
        .route("/availability-days/:id", delete(availability::delete))
        // Blocked dates
        .route("/blocked-dates", post(blocked_dates::create))
        .route("/blocked-dates", get(blocked_dates::list))
        .route("/blocked-dates/:id", put(blocked_dates::update))
        .route("/blocked-dates/:id", delete(blocked_dates::delete))
        // Export
        .route("/export/csv", get(export::csv));

    let uploads_dir = state.config.server.data_dir.join("uploads");

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn health_check() -> &'static str {
    "OK"
}
