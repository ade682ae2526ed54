//! Authentication: password hashing, bearer token issue/verify, and the
//! request extractors enforcing role-based access.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    DbPool, Invitation, LoginRequest, LoginResponse, RegisterRequest, User, UserResponse, UserRole,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::{validate_email, validate_password};

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Bearer token claims: subject is the user email
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issue a signed bearer token for a user
pub fn create_access_token(
    email: &str,
    secret: &str,
    ttl_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp();
    let claims = Claims {
        sub: email.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a bearer token, returning its claims
pub fn decode_access_token(
    token: &str,
    secret: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Extract the bearer token from request headers
fn extract_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Resolve a bearer token to its user row
pub async fn get_current_user(
    pool: &DbPool,
    secret: &str,
    token: &str,
) -> Result<User, ApiError> {
    let claims = decode_access_token(token, secret)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&claims.sub)
        .fetch_optional(pool)
        .await?;

    user.ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
}

/// Extractor for the current authenticated user
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        get_current_user(&state.db, &state.config.auth.jwt_secret, token).await
    }
}

/// Extractor requiring the admin role
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = User::from_request_parts(parts, state).await?;
        if !user.role_enum().is_admin() {
            return Err(ApiError::forbidden("Administrator access required"));
        }
        Ok(AdminUser(user))
    }
}

/// Extractor requiring the artist role
pub struct ArtistUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ArtistUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = User::from_request_parts(parts, state).await?;
        if !user.role_enum().is_artist() {
            return Err(ApiError::forbidden("Only artists can perform this action"));
        }
        Ok(ArtistUser(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub token: String,
}

/// Register a new artist account by consuming an invitation token
///
/// POST /api/auth/register?token=...
pub async fn register(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegisterQuery>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Err(e) = validate_email(&request.email) {
        return Err(ApiError::validation_field("email", e));
    }
    if let Err(e) = validate_password(&request.password) {
        return Err(ApiError::validation_field("password", e));
    }

    let invitation: Option<Invitation> =
        sqlx::query_as("SELECT * FROM invitations WHERE token = ? AND status = 'sent'")
            .bind(&query.token)
            .fetch_optional(&state.db)
            .await?;
    let invitation = match invitation {
        Some(inv) if !inv.is_expired() => inv,
        // not-found and expired are indistinguishable on purpose
        _ => {
            return Err(ApiError::validation_field(
                "token",
                "Invitation token is invalid or expired",
            ))
        }
    };

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::validation_field(
            "email",
            "A user with this email already exists",
        ));
    }

    let password_hash = hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: request.email,
        password_hash,
        role: UserRole::Artist.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        updated_at: chrono::Utc::now().to_rfc3339(),
    };

    // account creation and invitation acceptance commit together
    let mut tx = state.db.begin().await?;
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE invitations SET status = 'accepted' WHERE id = ?")
        .bind(&invitation.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(email = %user.email, "Artist account registered");
    Ok(Json(UserResponse::from(user)))
}

/// Credential check, issuing a bearer token
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    let access_token = create_access_token(
        &user.email,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_minutes,
    )
    .map_err(|e| ApiError::internal(format!("Failed to issue token: {}", e)))?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserResponse::from(user),
    }))
}

/// Resolve the caller's identity
///
/// GET /api/auth/me
pub async fn me(user: User) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Seed the admin account at startup when configured and absent
pub async fn ensure_admin_user(
    pool: &DbPool,
    email: &Option<String>,
    password: &Option<String>,
) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (email, password) else {
        tracing::info!("No admin credentials configured, skipping admin seeding");
        return Ok(());
    };

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, 'admin', ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!(email = %email, "Seeded admin user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let token = create_access_token("dj.alex@example.com", "secret", 30).unwrap();
        let claims = decode_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "dj.alex@example.com");
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let token = create_access_token("dj.alex@example.com", "secret", 30).unwrap();
        assert!(decode_access_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // expired well past the default validation leeway
        let token = create_access_token("dj.alex@example.com", "secret", -10).unwrap();
        assert!(decode_access_token(&token, "secret").is_err());
    }

    #[tokio::test]
    async fn test_ensure_admin_user_is_idempotent() {
        let pool = test_pool().await;
        let email = Some("admin@example.com".to_string());
        let password = Some("demo-password".to_string());

        ensure_admin_user(&pool, &email, &password).await.unwrap();
        ensure_admin_user(&pool, &email, &password).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_ensure_admin_user_skips_when_unconfigured() {
        let pool = test_pool().await;
        ensure_admin_user(&pool, &None, &None).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
