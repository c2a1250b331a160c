//! The append-only ledger of deals already posted to the channel.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `sent_deals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SentDealRow {
    pub item_id: String,
    pub title: Option<String>,
    /// Stored by `SQLite` as UTC `CURRENT_TIMESTAMP` text.
    pub sent_at: NaiveDateTime,
}

/// Records `item_id` as sent.
///
/// There is no update path: a second call for the same id fails with
/// [`DbError::AlreadySent`], which callers should read as "already sent".
///
/// # Errors
///
/// Returns [`DbError::AlreadySent`] on a duplicate id, [`DbError::Sqlx`]
/// for any other database failure.
pub async fn mark_sent(pool: &SqlitePool, item_id: &str, title: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO sent_deals (item_id, title) VALUES (?, ?)")
        .bind(item_id)
        .bind(title)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DbError::AlreadySent {
                item_id: item_id.to_string(),
            },
            other => DbError::Sqlx(other),
        })?;

    Ok(())
}

/// Returns `true` if `item_id` has been recorded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn is_sent(pool: &SqlitePool, item_id: &str) -> Result<bool, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sent_deals WHERE item_id = ?")
        .bind(item_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Fetches one ledger row by item id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_sent_deal(
    pool: &SqlitePool,
    item_id: &str,
) -> Result<Option<SentDealRow>, DbError> {
    let row = sqlx::query_as::<_, SentDealRow>(
        "SELECT item_id, title, sent_at FROM sent_deals WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Lists the most recently sent deals, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sent(pool: &SqlitePool, limit: i64) -> Result<Vec<SentDealRow>, DbError> {
    let rows = sqlx::query_as::<_, SentDealRow>(
        "SELECT item_id, title, sent_at FROM sent_deals \
         ORDER BY sent_at DESC, rowid DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
