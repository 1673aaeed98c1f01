//! Database access for fg-dir
//!
//! SQLite mirror of the in-memory working set. Reads happen against the
//! working set; the database is the durable copy, written with keyed
//! upserts and deletes after each mutation.

use crate::models::{Listing, Province};
use chrono::{DateTime, Utc};
use fg_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

/// Initialize database connection pool
///
/// Creates the database file and schema when missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the listings table if it doesn't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            province TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            lat REAL NOT NULL DEFAULT 0,
            lng REAL NOT NULL DEFAULT 0,
            added_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (listings)");

    Ok(())
}

/// Load the full working set, in insertion order
pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<Listing>> {
    let rows = sqlx::query_as::<_, (String, String, String, String, f64, f64, String)>(
        "SELECT id, name, province, address, lat, lng, added_at FROM listings ORDER BY rowid",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, name, province, address, lat, lng, added_at)| {
            Ok(Listing {
                id: Uuid::parse_str(&id)
                    .map_err(|e| Error::Internal(format!("Corrupt listing id {}: {}", id, e)))?,
                name,
                province: Province::parse(&province)
                    .ok_or_else(|| Error::Internal(format!("Corrupt province: {}", province)))?,
                address,
                lat,
                lng,
                added_at: parse_timestamp(&added_at)?,
            })
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp {}: {}", raw, e)))
}

/// Insert or replace one listing, keyed by id
pub async fn upsert(pool: &SqlitePool, listing: &Listing) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO listings (id, name, province, address, lat, lng, added_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            province = excluded.province,
            address = excluded.address,
            lat = excluded.lat,
            lng = excluded.lng
        "#,
    )
    .bind(listing.id.to_string())
    .bind(&listing.name)
    .bind(listing.province.name())
    .bind(&listing.address)
    .bind(listing.lat)
    .bind(listing.lng)
    .bind(listing.added_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete listings by id; missing ids are ignored
pub async fn delete_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<()> {
    for id in ids {
        sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id.to_string())
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Apply a reconciliation changeset: keyed deletes then keyed upserts
pub async fn apply_changeset(
    pool: &SqlitePool,
    deleted_ids: &[Uuid],
    upserts: &[Listing],
) -> Result<()> {
    delete_ids(pool, deleted_ids).await?;
    for listing in upserts {
        upsert(pool, listing).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database_pool(&dir.path().join("test.db"))
            .await
            .unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn upsert_then_fetch_round_trips() {
        let (_dir, pool) = temp_pool().await;

        let listing = Listing::new("Soda X", Province::Alajuela, "100m norte", 10.01, -84.21);
        upsert(&pool, &listing).await.unwrap();

        let all = fetch_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, listing.id);
        assert_eq!(all[0].name, "Soda X");
        assert_eq!(all[0].province, Province::Alajuela);
        assert_eq!(all[0].lat, 10.01);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_and_keeps_added_at() {
        let (_dir, pool) = temp_pool().await;

        let mut listing = Listing::new("Antes", Province::Limon, "", 0.0, 0.0);
        upsert(&pool, &listing).await.unwrap();
        let original_added_at = fetch_all(&pool).await.unwrap()[0].added_at;

        listing.name = "Después".to_string();
        listing.lat = 9.5;
        listing.lng = -83.0;
        upsert(&pool, &listing).await.unwrap();

        let all = fetch_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Después");
        assert_eq!(all[0].added_at, original_added_at);
    }

    #[tokio::test]
    async fn delete_ids_removes_only_named_rows() {
        let (_dir, pool) = temp_pool().await;

        let a = Listing::new("A", Province::SanJose, "", 0.0, 0.0);
        let b = Listing::new("B", Province::SanJose, "", 0.0, 0.0);
        upsert(&pool, &a).await.unwrap();
        upsert(&pool, &b).await.unwrap();

        delete_ids(&pool, &[a.id, Uuid::new_v4()]).await.unwrap();

        let all = fetch_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b.id);
    }

    #[tokio::test]
    async fn fetch_preserves_insertion_order() {
        let (_dir, pool) = temp_pool().await;

        let listings: Vec<Listing> = (0..5)
            .map(|i| Listing::new(format!("L{}", i), Province::Cartago, "", 0.0, 0.0))
            .collect();
        for l in &listings {
            upsert(&pool, l).await.unwrap();
        }

        let all = fetch_all(&pool).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|l| l.id).collect();
        let expected: Vec<Uuid> = listings.iter().map(|l| l.id).collect();
        assert_eq!(ids, expected);
    }
}
