//! Invitation ledger models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invitation lifecycle status as persisted. A lapsed invitation keeps the
/// `sent` status in storage; expiry is evaluated against `expires_at` at
/// read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Sent,
    Accepted,
    Expired,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Sent => write!(f, "sent"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    pub id: String,
    pub email: String,
    pub token: String,
    pub status: String,
    pub expires_at: String,
    pub created_at: String,
}

impl Invitation {
    /// Check if the invitation has passed its expiry timestamp
    pub fn is_expired(&self) -> bool {
        if let Ok(expires) = chrono::DateTime::parse_from_rfc3339(&self.expires_at) {
            expires < chrono::Utc::now()
        } else {
            true // Treat parse errors as expired
        }
    }

    /// A pending invitation: stored as sent and not yet lapsed
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Sent.to_string() && !self.is_expired()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
}

/// Response for GET /invitations/verify/:token
#[derive(Debug, Serialize)]
pub struct VerifyInvitationResponse {
    pub valid: bool,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn invitation(expires_at: String, status: &str) -> Invitation {
        Invitation {
            id: "i1".into(),
            email: "artist@example.com".into(),
            token: "tok".into(),
            status: status.into(),
            expires_at,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_pending_within_window() {
        let inv = invitation((Utc::now() + Duration::days(7)).to_rfc3339(), "sent");
        assert!(!inv.is_expired());
        assert!(inv.is_pending());
    }

    #[test]
    fn test_lapsed_invitation_stays_sent_but_not_pending() {
        let inv = invitation((Utc::now() - Duration::hours(1)).to_rfc3339(), "sent");
        assert!(inv.is_expired());
        assert!(!inv.is_pending());
        // storage status unchanged
        assert_eq!(inv.status, "sent");
    }

    #[test]
    fn test_accepted_is_not_pending() {
        let inv = invitation((Utc::now() + Duration::days(7)).to_rfc3339(), "accepted");
        assert!(!inv.is_pending());
    }

    #[test]
    fn test_unparseable_expiry_counts_as_expired() {
        let inv = invitation("garbage".into(), "sent");
        assert!(inv.is_expired());
    }
}
