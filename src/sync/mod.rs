//! Cooldown-gated playlist synchronization.
//!
//! The coordinator reads through a [`VideoStore`], refreshes from a
//! [`VideoSource`] when the cache is stale or empty, and reads time from a
//! [`Clock`]. All three are injected so the policy can be tested without a
//! network, a database, or real delays.

mod coordinator;

pub use coordinator::{SyncCoordinator, SyncReport, SyncStatus, DEFAULT_SYNC_COOLDOWN};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, warn};

use crate::db::{self, Database, VideoRecord};
use crate::youtube::FetchError;

/// Upstream provider of classified videos.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch the full current video list.
    async fn fetch_videos(&self) -> Result<Vec<VideoRecord>, FetchError>;

    /// Fetch, logging any failure and degrading to an empty list.
    async fn fetch_or_empty(&self) -> Vec<VideoRecord> {
        match self.fetch_videos().await {
            Ok(videos) => videos,
            Err(FetchError::NotConfigured) => {
                warn!("YouTube API key or playlist id missing or placeholder; skipping fetch");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Error fetching YouTube videos");
                Vec::new()
            }
        }
    }
}

/// Durable storage for video records and the last sync time.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Upsert `videos` by id and stamp `synced_at_ms`, all or nothing.
    async fn save_videos(&self, videos: &[VideoRecord], synced_at_ms: i64) -> Result<()>;

    /// All stored videos, newest first.
    async fn list_videos(&self) -> Result<Vec<VideoRecord>>;

    async fn get_video(&self, id: &str) -> Result<Option<VideoRecord>>;

    /// Epoch milliseconds of the last successful save, if any.
    async fn last_synced(&self) -> Result<Option<i64>>;

    async fn count_videos(&self) -> Result<i64>;
}

#[async_trait]
impl VideoStore for Database {
    async fn save_videos(&self, videos: &[VideoRecord], synced_at_ms: i64) -> Result<()> {
        db::upsert_videos(self.pool(), videos, synced_at_ms).await
    }

    async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        db::list_videos(self.pool()).await
    }

    async fn get_video(&self, id: &str) -> Result<Option<VideoRecord>> {
        db::get_video(self.pool(), id).await
    }

    async fn last_synced(&self) -> Result<Option<i64>> {
        db::get_last_synced(self.pool()).await
    }

    async fn count_videos(&self) -> Result<i64> {
        db::count_videos(self.pool()).await
    }
}

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
