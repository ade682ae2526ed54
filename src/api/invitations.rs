//! Invitation ledger endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{CreateInvitationRequest, Invitation, VerifyInvitationResponse};
use crate::AppState;

use super::auth::AdminUser;
use super::error::ApiError;
use super::validation::validate_email;

/// Invitations stay valid for this many days
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Generate an opaque single-use invitation token
fn generate_invitation_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Create an invitation and send the email out of band
///
/// POST /api/invitations
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<Json<Invitation>, ApiError> {
    if let Err(e) = validate_email(&request.email) {
        return Err(ApiError::validation_field("email", e));
    }

    let existing_user: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;
    if existing_user.is_some() {
        return Err(ApiError::validation_field(
            "email",
            "A user with this email already exists",
        ));
    }

    let pending: Option<(String,)> =
        sqlx::query_as("SELECT id FROM invitations WHERE email = ? AND status = 'sent'")
            .bind(&request.email)
            .fetch_optional(&state.db)
            .await?;
    if pending.is_some() {
        return Err(ApiError::conflict(
            "An invitation is already pending for this email",
        ));
    }

    let now = chrono::Utc::now();
    let invitation = Invitation {
        id: Uuid::new_v4().to_string(),
        email: request.email,
        token: generate_invitation_token(),
        status: "sent".to_string(),
        expires_at: (now + chrono::Duration::days(INVITATION_TTL_DAYS)).to_rfc3339(),
        created_at: now.to_rfc3339(),
    };

    // the partial unique index turns a concurrent duplicate into a conflict
    sqlx::query(
        "INSERT INTO invitations (id, email, token, status, expires_at, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&invitation.id)
    .bind(&invitation.email)
    .bind(&invitation.token)
    .bind(&invitation.status)
    .bind(&invitation.expires_at)
    .bind(&invitation.created_at)
    .execute(&state.db)
    .await?;

    // Fire-and-forget: the invitation stands even if delivery fails
    let mailer = state.mailer.clone();
    let email = invitation.email.clone();
    let token = invitation.token.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send_invitation_email(&email, &token, INVITATION_TTL_DAYS)
            .await
        {
            tracing::warn!(email = %email, error = %e, "Failed to send invitation email");
        }
    });

    tracing::info!(email = %invitation.email, "Invitation created");
    Ok(Json(invitation))
}

/// List all invitations, newest first
///
/// GET /api/invitations
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Invitation>>, ApiError> {
    let invitations: Vec<Invitation> =
        sqlx::query_as("SELECT * FROM invitations ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(invitations))
}

/// Remove an invitation
///
/// DELETE /api/invitations/:id
pub async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM invitations WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Invitation not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Validity check used by the registration UI (public)
///
/// GET /api/invitations/verify/:token
pub async fn verify_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<VerifyInvitationResponse>, ApiError> {
    let invitation: Option<Invitation> =
        sqlx::query_as("SELECT * FROM invitations WHERE token = ? AND status = 'sent'")
            .bind(&token)
            .fetch_optional(&state.db)
            .await?;

    match invitation {
        Some(inv) if !inv.is_expired() => Ok(Json(VerifyInvitationResponse {
            valid: true,
            email: inv.email,
        })),
        // unknown and expired tokens answer identically
        _ => Err(ApiError::validation_field(
            "token",
            "Invitation token is invalid or expired",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_generated_tokens_are_long_and_unique() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    async fn insert_invitation(pool: &crate::db::DbPool, email: &str, status: &str) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now();
        sqlx::query(
            "INSERT INTO invitations (id, email, token, status, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(generate_invitation_token())
        .bind(status)
        .bind((now + chrono::Duration::days(INVITATION_TTL_DAYS)).to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(pool)
        .await
        .map(|_| ())
    }

    #[tokio::test]
    async fn test_one_pending_invitation_per_email() {
        let pool = test_pool().await;
        insert_invitation(&pool, "artist@example.com", "sent")
            .await
            .unwrap();

        // the partial unique index rejects a second pending invitation even
        // when the handler-level check is raced past
        let err = insert_invitation(&pool, "artist@example.com", "sent")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE"));

        // once accepted, a fresh invitation for the same email is allowed
        sqlx::query("UPDATE invitations SET status = 'accepted' WHERE email = ?")
            .bind("artist@example.com")
            .execute(&pool)
            .await
            .unwrap();
        insert_invitation(&pool, "artist@example.com", "sent")
            .await
            .unwrap();
    }
}
