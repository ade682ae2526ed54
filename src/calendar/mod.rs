//! Calendar core: the availability toggle engine, the blocked-date
//! registry, and the aggregation/export helpers the admin views build on.

pub mod blocked;
pub mod export;
pub mod toggle;

use chrono::NaiveDate;
use thiserror::Error;

use crate::db::DbPool;

/// Placeholder used when an availability row points at a deleted user
pub const UNKNOWN_ARTIST: &str = "Unknown artist";

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("Date {0} is beyond the planning horizon of {1} months")]
    BeyondHorizon(NaiveDate, i64),

    #[error("Date {0} is blocked")]
    DateBlocked(NaiveDate),

    #[error("Date {0} is already blocked")]
    AlreadyBlocked(NaiveDate),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Parse an ISO `YYYY-MM-DD` calendar date
pub fn parse_date(s: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CalendarError::InvalidDate(s.to_string()))
}

/// Check a date against the editable window: not in the past, not past the
/// forward planning horizon (months approximated as 30 days each).
pub fn check_window(
    date: NaiveDate,
    today: NaiveDate,
    max_months_ahead: i64,
) -> Result<(), CalendarError> {
    if date < today {
        return Err(CalendarError::PastDate(date));
    }
    let horizon = today + chrono::Duration::days(max_months_ahead * 30);
    if date > horizon {
        return Err(CalendarError::BeyondHorizon(date, max_months_ahead));
    }
    Ok(())
}

/// Artist identity attached to availability rows in admin views and CSV
/// export: display name with email fallback, or a placeholder when the user
/// record itself is gone.
#[derive(Debug, Clone)]
pub struct ArtistIdentity {
    pub name: String,
    pub email: String,
    pub category: Option<String>,
    pub rate: Option<String>,
}

/// Resolve one artist's identity with a user + profile lookup.
pub async fn artist_identity(pool: &DbPool, artist_id: &str) -> Result<ArtistIdentity, CalendarError> {
    let user: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = ?")
        .bind(artist_id)
        .fetch_optional(pool)
        .await?;

    let Some((email,)) = user else {
        return Ok(ArtistIdentity {
            name: UNKNOWN_ARTIST.to_string(),
            email: String::new(),
            category: None,
            rate: None,
        });
    };

    let profile: Option<(String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT display_name, category, rate FROM artist_profiles WHERE user_id = ?",
    )
    .bind(artist_id)
    .fetch_optional(pool)
    .await?;

    let (display_name, category, rate) = profile.unwrap_or_default();
    let name = if display_name.is_empty() {
        email.clone()
    } else {
        display_name
    };

    Ok(ArtistIdentity {
        name,
        email,
        category,
        rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-06-10").unwrap(), d("2025-06-10"));
        assert!(parse_date("10/06/2025").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_window_today_is_editable() {
        let today = d("2025-06-01");
        assert!(check_window(today, today, 18).is_ok());
    }

    #[test]
    fn test_window_rejects_past() {
        let today = d("2025-06-01");
        assert!(matches!(
            check_window(d("2025-05-31"), today, 18),
            Err(CalendarError::PastDate(_))
        ));
    }

    #[test]
    fn test_window_horizon_boundary() {
        let today = d("2025-06-01");
        // 18 * 30 = 540 days out is the last editable day
        let last = today + chrono::Duration::days(540);
        assert!(check_window(last, today, 18).is_ok());
        assert!(matches!(
            check_window(last + chrono::Duration::days(1), today, 18),
            Err(CalendarError::BeyondHorizon(_, 18))
        ));
    }
}
