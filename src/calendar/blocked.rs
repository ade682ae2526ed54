//! The blocked-date registry.
//!
//! Blocking a date is destructive: every availability record on that date is
//! purged in the same transaction, and unblocking never restores them.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::{
    AvailabilityFilter, BlockDateResponse, BlockedDate, CreateBlockedDateRequest, DbPool,
    UpdateBlockedDateRequest,
};

use super::{parse_date, CalendarError};

/// Block a date for every artist, purging existing availability records.
pub async fn block_date(
    pool: &DbPool,
    req: &CreateBlockedDateRequest,
) -> Result<BlockDateResponse, CalendarError> {
    let date = parse_date(&req.date)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let mut tx = pool.begin().await?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM blocked_dates WHERE date = ?")
        .bind(&date_str)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(CalendarError::AlreadyBlocked(date));
    }

    let removed = sqlx::query("DELETE FROM availability_days WHERE date = ?")
        .bind(&date_str)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let blocked = BlockedDate {
        id: Uuid::new_v4().to_string(),
        date: date_str,
        note: req.note.clone(),
        created_at: Utc::now().to_rfc3339(),
    };
    sqlx::query("INSERT INTO blocked_dates (id, date, note, created_at) VALUES (?, ?, ?, ?)")
        .bind(&blocked.id)
        .bind(&blocked.date)
        .bind(&blocked.note)
        .bind(&blocked.created_at)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(date = %blocked.date, removed_availabilities = removed, "Date blocked");
    Ok(BlockDateResponse {
        blocked,
        removed_availabilities: removed,
    })
}

/// Edit a blocked date. Moving it to a new date re-checks uniqueness and
/// purges availabilities on the new date; the original purge is never
/// compensated.
pub async fn update_blocked_date(
    pool: &DbPool,
    id: &str,
    req: &UpdateBlockedDateRequest,
) -> Result<BlockedDate, CalendarError> {
    let mut tx = pool.begin().await?;

    let mut blocked: BlockedDate = sqlx::query_as("SELECT * FROM blocked_dates WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CalendarError::NotFound("Blocked date"))?;

    if let Some(new_date) = &req.date {
        let date = parse_date(new_date)?;
        let date_str = date.format("%Y-%m-%d").to_string();
        if date_str != blocked.date {
            let duplicate: Option<(String,)> =
                sqlx::query_as("SELECT id FROM blocked_dates WHERE date = ? AND id != ?")
                    .bind(&date_str)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if duplicate.is_some() {
                return Err(CalendarError::AlreadyBlocked(date));
            }
            sqlx::query("DELETE FROM availability_days WHERE date = ?")
                .bind(&date_str)
                .execute(&mut *tx)
                .await?;
            blocked.date = date_str;
        }
    }
    if let Some(note) = &req.note {
        blocked.note = Some(note.clone());
    }

    sqlx::query("UPDATE blocked_dates SET date = ?, note = ? WHERE id = ?")
        .bind(&blocked.date)
        .bind(&blocked.note)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(blocked)
}

/// Unblock a date. Availability records purged by the original block stay
/// gone.
pub async fn unblock_date(pool: &DbPool, id: &str) -> Result<(), CalendarError> {
    let result = sqlx::query("DELETE FROM blocked_dates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CalendarError::NotFound("Blocked date"));
    }
    info!(id = %id, "Date unblocked");
    Ok(())
}

/// List blocked dates, optionally restricted to a date range.
pub async fn list_blocked_dates(
    pool: &DbPool,
    filter: &AvailabilityFilter,
) -> Result<Vec<BlockedDate>, CalendarError> {
    if let Some(start) = &filter.start_date {
        parse_date(start)?;
    }
    if let Some(end) = &filter.end_date {
        parse_date(end)?;
    }

    let mut sql = String::from("SELECT * FROM blocked_dates WHERE 1=1");
    if filter.start_date.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if filter.end_date.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date ASC");

    let mut query = sqlx::query_as::<_, BlockedDate>(&sql);
    if let Some(start) = &filter.start_date {
        query = query.bind(start);
    }
    if let Some(end) = &filter.end_date {
        query = query.bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}
