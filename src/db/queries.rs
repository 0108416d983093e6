use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{encode_labels, VideoRecord, VideoRow};

/// Key of the playlist sync row in `sync_state`.
pub const YOUTUBE_SYNC_KEY: &str = "youtube_sync";

// ========== Videos ==========

/// Upsert a batch of videos and stamp the sync time, atomically.
///
/// Existing rows are overwritten field by field, so repeating the same batch
/// leaves the table unchanged apart from `updated_at`.
pub async fn upsert_videos(pool: &SqlitePool, videos: &[VideoRecord], synced_at_ms: i64) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin video upsert")?;

    for video in videos {
        sqlx::query(
            r"
            INSERT INTO videos (id, title, original_title, thumbnail, published_at, link, collections, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                original_title = excluded.original_title,
                thumbnail = excluded.thumbnail,
                published_at = excluded.published_at,
                link = excluded.link,
                collections = excluded.collections,
                tags = excluded.tags,
                updated_at = datetime('now')
            ",
        )
        .bind(&video.id)
        .bind(&video.title)
        .bind(&video.original_title)
        .bind(&video.thumbnail)
        .bind(&video.published_at)
        .bind(&video.link)
        .bind(encode_labels(&video.collections))
        .bind(encode_labels(&video.tags))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to upsert video {}", video.id))?;
    }

    sqlx::query(
        r"
        INSERT INTO sync_state (key, last_synced) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET last_synced = excluded.last_synced
        ",
    )
    .bind(YOUTUBE_SYNC_KEY)
    .bind(synced_at_ms)
    .execute(&mut *tx)
    .await
    .context("Failed to stamp sync time")?;

    tx.commit().await.context("Failed to commit video upsert")?;

    Ok(())
}

/// List all videos, newest first.
pub async fn list_videos(pool: &SqlitePool) -> Result<Vec<VideoRecord>> {
    let rows: Vec<VideoRow> =
        sqlx::query_as("SELECT * FROM videos ORDER BY published_at DESC, id ASC")
            .fetch_all(pool)
            .await
            .context("Failed to list videos")?;

    Ok(rows.into_iter().map(VideoRecord::from).collect())
}

/// Get a single video by its id.
pub async fn get_video(pool: &SqlitePool, id: &str) -> Result<Option<VideoRecord>> {
    let row: Option<VideoRow> = sqlx::query_as("SELECT * FROM videos WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch video by id")?;

    Ok(row.map(VideoRecord::from))
}

/// Count stored videos.
pub async fn count_videos(pool: &SqlitePool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await
        .context("Failed to count videos")?;

    Ok(count)
}

// ========== Sync State ==========

/// Epoch milliseconds of the last successful sync, if any.
pub async fn get_last_synced(pool: &SqlitePool) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_synced FROM sync_state WHERE key = ?")
        .bind(YOUTUBE_SYNC_KEY)
        .fetch_optional(pool)
        .await
        .context("Failed to read sync state")?;

    Ok(row.map(|(ts,)| ts))
}
