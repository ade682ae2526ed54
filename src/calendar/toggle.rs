//! The availability toggle engine.
//!
//! A single verb mutates availability: toggling a day creates the record
//! when absent and deletes it when present. The blocked-date check and the
//! flip share one transaction, so a toggle cannot slip a record onto a date
//! that a concurrent block has already purged.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::CalendarConfig;
use crate::db::{AvailabilityDay, DbPool, ToggleAction, ToggleRequest, ToggleResponse};

use super::{check_window, parse_date, CalendarError};

/// Flip the availability record for (artist, date).
///
/// Role enforcement (artist-only) happens at the API boundary; everything
/// else about the toggle contract lives here.
pub async fn toggle_day(
    pool: &DbPool,
    calendar: &CalendarConfig,
    artist_id: &str,
    req: &ToggleRequest,
) -> Result<ToggleResponse, CalendarError> {
    let date = parse_date(&req.date)?;
    check_window(date, Utc::now().date_naive(), calendar.max_months_ahead)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut tx = pool.begin().await?;

    let blocked: Option<(String,)> = sqlx::query_as("SELECT id FROM blocked_dates WHERE date = ?")
        .bind(&date_str)
        .fetch_optional(&mut *tx)
        .await?;
    if blocked.is_some() {
        return Err(CalendarError::DateBlocked(date));
    }

    let existing: Option<AvailabilityDay> =
        sqlx::query_as("SELECT * FROM availability_days WHERE artist_id = ? AND date = ?")
            .bind(artist_id)
            .bind(&date_str)
            .fetch_optional(&mut *tx)
            .await?;

    if let Some(existing) = existing {
        sqlx::query("DELETE FROM availability_days WHERE id = ?")
            .bind(&existing.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(artist_id = %artist_id, date = %date_str, "Availability removed");
        return Ok(ToggleResponse {
            action: ToggleAction::Removed,
            date: date_str,
            available: false,
            record: None,
        });
    }

    let record = AvailabilityDay {
        id: Uuid::new_v4().to_string(),
        artist_id: artist_id.to_string(),
        date: date_str.clone(),
        note: req.note.clone(),
        color: req
            .color
            .clone()
            .unwrap_or_else(|| calendar.default_color.clone()),
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO availability_days (id, artist_id, date, note, color, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.artist_id)
    .bind(&record.date)
    .bind(&record.note)
    .bind(&record.color)
    .bind(&record.created_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    debug!(artist_id = %artist_id, date = %date_str, "Availability added");
    Ok(ToggleResponse {
        action: ToggleAction::Added,
        date: date_str,
        available: true,
        record: Some(record),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::Duration;

    fn config() -> CalendarConfig {
        CalendarConfig::default()
    }

    fn future_date(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    fn request(date: &str) -> ToggleRequest {
        ToggleRequest {
            date: date.to_string(),
            note: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn test_toggle_add_then_remove_round_trip() {
        let pool = test_pool().await;
        let date = future_date(1);

        let added = toggle_day(&pool, &config(), "artist-1", &request(&date))
            .await
            .unwrap();
        assert_eq!(added.action, ToggleAction::Added);
        assert!(added.available);
        let first_id = added.record.as_ref().unwrap().id.clone();

        let removed = toggle_day(&pool, &config(), "artist-1", &request(&date))
            .await
            .unwrap();
        assert_eq!(removed.action, ToggleAction::Removed);
        assert!(!removed.available);
        assert!(removed.record.is_none());

        // back to original state, and a re-add mints a fresh id
        let re_added = toggle_day(&pool, &config(), "artist-1", &request(&date))
            .await
            .unwrap();
        assert_ne!(re_added.record.unwrap().id, first_id);
    }

    #[tokio::test]
    async fn test_toggle_defaults_color() {
        let pool = test_pool().await;
        let added = toggle_day(&pool, &config(), "artist-1", &request(&future_date(3)))
            .await
            .unwrap();
        assert_eq!(added.record.unwrap().color, "#3b82f6");
    }

    #[tokio::test]
    async fn test_toggle_keeps_supplied_note_and_color() {
        let pool = test_pool().await;
        let req = ToggleRequest {
            date: future_date(2),
            note: Some("festival weekend".to_string()),
            color: Some("#ff0000".to_string()),
        };
        let added = toggle_day(&pool, &config(), "artist-1", &req).await.unwrap();
        let record = added.record.unwrap();
        assert_eq!(record.note.as_deref(), Some("festival weekend"));
        assert_eq!(record.color, "#ff0000");
    }

    #[tokio::test]
    async fn test_toggle_rejects_past_date() {
        let pool = test_pool().await;
        let yesterday = (Utc::now().date_naive() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let err = toggle_day(&pool, &config(), "artist-1", &request(&yesterday))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::PastDate(_)));
    }

    #[tokio::test]
    async fn test_toggle_rejects_beyond_horizon() {
        let pool = test_pool().await;
        // 19 months out with an 18-month horizon
        let err = toggle_day(&pool, &config(), "artist-1", &request(&future_date(19 * 30)))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::BeyondHorizon(_, _)));
    }

    #[tokio::test]
    async fn test_toggle_rejects_malformed_date() {
        let pool = test_pool().await;
        let err = toggle_day(&pool, &config(), "artist-1", &request("June 10th"))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn test_toggle_rejects_blocked_date() {
        let pool = test_pool().await;
        let date = future_date(5);
        sqlx::query(
            "INSERT INTO blocked_dates (id, date, note, created_at) VALUES (?, ?, NULL, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&date)
        .bind(Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .unwrap();

        // rejected even though the artist has no record on that date
        let err = toggle_day(&pool, &config(), "artist-1", &request(&date))
            .await
            .unwrap_err();
        assert!(matches!(err, CalendarError::DateBlocked(_)));
    }

    #[tokio::test]
    async fn test_toggle_is_scoped_per_artist() {
        let pool = test_pool().await;
        let date = future_date(4);
        toggle_day(&pool, &config(), "artist-1", &request(&date))
            .await
            .unwrap();

        // another artist toggling the same date adds their own record
        let other = toggle_day(&pool, &config(), "artist-2", &request(&date))
            .await
            .unwrap();
        assert_eq!(other.action, ToggleAction::Added);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM availability_days WHERE date = ?")
            .bind(&date)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 2);
    }
}
