//! Aggregation queries and CSV export.

use serde::Serialize;

use crate::db::{AvailabilityDay, AvailabilityFilter, BlockedDate, DbPool};

use super::{artist_identity, blocked::list_blocked_dates, parse_date, CalendarError};

/// Fetch availability rows matching the filter, oldest date first.
pub async fn fetch_availabilities(
    pool: &DbPool,
    filter: &AvailabilityFilter,
) -> Result<Vec<AvailabilityDay>, CalendarError> {
    if let Some(start) = &filter.start_date {
        parse_date(start)?;
    }
    if let Some(end) = &filter.end_date {
        parse_date(end)?;
    }

    let mut sql = String::from("SELECT * FROM availability_days WHERE 1=1");
    if filter.artist_id.is_some() {
        sql.push_str(" AND artist_id = ?");
    }
    if filter.start_date.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if filter.end_date.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date ASC, created_at ASC");

    let mut query = sqlx::query_as::<_, AvailabilityDay>(&sql);
    if let Some(artist_id) = &filter.artist_id {
        query = query.bind(artist_id);
    }
    if let Some(start) = &filter.start_date {
        query = query.bind(start);
    }
    if let Some(end) = &filter.end_date {
        query = query.bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Response for GET /export/csv
#[derive(Debug, Serialize)]
pub struct CsvExport {
    pub csv_content: String,
    pub row_count: usize,
}

const CSV_HEADER: &str = "date,kind,name,email,rate,note";

/// Build the combined availability + blocked-date table as CSV.
pub async fn export_csv(
    pool: &DbPool,
    filter: &AvailabilityFilter,
) -> Result<CsvExport, CalendarError> {
    let availabilities = fetch_availabilities(pool, filter).await?;
    let blocked = list_blocked_dates(pool, filter).await?;

    // (date, kind, name, email, rate, note) per row; one identity lookup
    // per availability row
    let mut rows: Vec<[String; 6]> = Vec::with_capacity(availabilities.len() + blocked.len());
    for day in &availabilities {
        let identity = artist_identity(pool, &day.artist_id).await?;
        rows.push([
            day.date.clone(),
            "available".to_string(),
            identity.name,
            identity.email,
            identity.rate.unwrap_or_default(),
            day.note.clone().unwrap_or_default(),
        ]);
    }
    for row in &blocked {
        rows.push([
            row.date.clone(),
            "blocked".to_string(),
            String::new(),
            String::new(),
            String::new(),
            row.note.clone().unwrap_or_default(),
        ]);
    }
    rows.sort_by(|a, b| a[0].cmp(&b[0]).then_with(|| a[1].cmp(&b[1])));

    let row_count = rows.len();
    let mut csv_content = String::from(CSV_HEADER);
    for row in rows {
        csv_content.push('\n');
        let line: Vec<String> = row.iter().map(|field| escape_field(field)).collect();
        csv_content.push_str(&line.join(","));
    }

    Ok(CsvExport {
        csv_content,
        row_count,
    })
}

/// Quote a CSV field when it contains a delimiter, quote, or line break
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::blocked::block_date;
    use crate::calendar::toggle::toggle_day;
    use crate::config::CalendarConfig;
    use crate::db::{test_pool, CreateBlockedDateRequest, ToggleRequest};
    use chrono::{Duration, Utc};

    fn future_date(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    async fn seed_artist(pool: &DbPool, id: &str, email: &str, display_name: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) \
             VALUES (?, ?, 'x', 'artist', ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
        if let Some(name) = display_name {
            sqlx::query(
                "INSERT INTO artist_profiles (id, user_id, display_name, rate, created_at, updated_at) \
                 VALUES (?, ?, ?, '300', ?, ?)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(id)
            .bind(name)
            .bind(&now)
            .bind(&now)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    async fn add_availability(pool: &DbPool, artist_id: &str, date: &str, note: Option<&str>) {
        let req = ToggleRequest {
            date: date.to_string(),
            note: note.map(|n| n.to_string()),
            color: None,
        };
        toggle_day(pool, &CalendarConfig::default(), artist_id, &req)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_export_counts_and_name_fallbacks() {
        let pool = test_pool().await;
        seed_artist(&pool, "artist-1", "dj.alex@example.com", Some("DJ Alex")).await;
        seed_artist(&pool, "artist-2", "marie@example.com", None).await;

        add_availability(&pool, "artist-1", &future_date(1), None).await;
        add_availability(&pool, "artist-2", &future_date(2), None).await;
        // a row whose user record is gone
        add_availability(&pool, "artist-3", &future_date(3), None).await;
        block_date(
            &pool,
            &CreateBlockedDateRequest {
                date: future_date(4),
                note: Some("holiday".to_string()),
            },
        )
        .await
        .unwrap();

        let export = export_csv(&pool, &AvailabilityFilter::default())
            .await
            .unwrap();
        assert_eq!(export.row_count, 4);

        let lines: Vec<&str> = export.csv_content.lines().collect();
        assert_eq!(lines[0], "date,kind,name,email,rate,note");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("DJ Alex"));
        // no profile name: falls back to the email
        assert!(lines[2].starts_with(&format!(
            "{},available,marie@example.com,marie@example.com",
            future_date(2)
        )));
        // no user record: fixed placeholder
        assert!(lines[3].contains("Unknown artist"));
        assert!(lines[4].ends_with("blocked,,,,holiday"));
    }

    #[tokio::test]
    async fn test_export_respects_range_filter() {
        let pool = test_pool().await;
        seed_artist(&pool, "artist-1", "a@example.com", None).await;
        add_availability(&pool, "artist-1", &future_date(1), None).await;
        add_availability(&pool, "artist-1", &future_date(10), None).await;

        let filter = AvailabilityFilter {
            start_date: Some(future_date(5)),
            end_date: None,
            artist_id: None,
        };
        let export = export_csv(&pool, &filter).await.unwrap();
        assert_eq!(export.row_count, 1);
    }

    #[tokio::test]
    async fn test_export_escapes_notes() {
        let pool = test_pool().await;
        seed_artist(&pool, "artist-1", "a@example.com", None).await;
        add_availability(&pool, "artist-1", &future_date(1), Some("early, \"late\" set")).await;

        let export = export_csv(&pool, &AvailabilityFilter::default())
            .await
            .unwrap();
        assert!(export
            .csv_content
            .contains("\"early, \"\"late\"\" set\""));
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[tokio::test]
    async fn test_fetch_availabilities_artist_filter() {
        let pool = test_pool().await;
        seed_artist(&pool, "artist-1", "a@example.com", None).await;
        seed_artist(&pool, "artist-2", "b@example.com", None).await;
        add_availability(&pool, "artist-1", &future_date(1), None).await;
        add_availability(&pool, "artist-2", &future_date(1), None).await;

        let filter = AvailabilityFilter {
            start_date: None,
            end_date: None,
            artist_id: Some("artist-2".to_string()),
        };
        let rows = fetch_availabilities(&pool, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].artist_id, "artist-2");
    }
}
