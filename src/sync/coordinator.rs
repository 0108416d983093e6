use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, error, info, warn};

use super::{Clock, VideoSource, VideoStore};
use crate::db::VideoRecord;

/// Minimum time between automatic syncs.
pub const DEFAULT_SYNC_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Number of fetched videos echoed back by a manual sync.
const SYNC_SAMPLE_SIZE: usize = 5;

/// Outcome of a manual sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReport {
    Success { count: usize, sample: Vec<VideoRecord> },
    Failure { error: String },
}

impl SyncReport {
    fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// `{ "success": true, "count": .., "sample": [..] }` or `{ "success": false, "error": .. }`
impl Serialize for SyncReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { count, sample } => {
                let mut s = serializer.serialize_struct("SyncReport", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("count", count)?;
                s.serialize_field("sample", sample)?;
                s.end()
            }
            Self::Failure { error } => {
                let mut s = serializer.serialize_struct("SyncReport", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Snapshot of sync state for the admin view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub last_synced: Option<i64>,
    pub last_synced_at: Option<String>,
    pub video_count: i64,
    pub cooldown_secs: u64,
    pub next_auto_sync_at: Option<String>,
}

/// Serves the video list and decides when to refresh it from upstream.
///
/// Refreshes happen inline with reads, never in the background. Two reads
/// racing past the cooldown may both sync; the upsert is idempotent so the
/// only cost is a duplicate fetch.
#[derive(Clone)]
pub struct SyncCoordinator {
    store: Arc<dyn VideoStore>,
    source: Arc<dyn VideoSource>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<dyn VideoStore>,
        source: Arc<dyn VideoSource>,
        clock: Arc<dyn Clock>,
        cooldown: Duration,
    ) -> Self {
        Self {
            store,
            source,
            clock,
            cooldown,
        }
    }

    /// Return the video list, refreshing it first if the cooldown has passed
    /// or the store is empty.
    ///
    /// Never fails: any sync problem is logged and the cached list returned.
    pub async fn get_videos_with_auto_sync(&self) -> Vec<VideoRecord> {
        let cached = match self.store.list_videos().await {
            Ok(videos) => videos,
            Err(e) => {
                error!(error = %e, "Error fetching videos from store");
                Vec::new()
            }
        };

        match self.refresh_if_stale(cached.is_empty()).await {
            Ok(Some(fresh)) => fresh,
            Ok(None) => cached,
            Err(e) => {
                error!("Auto-sync failed: {e:#}");
                cached
            }
        }
    }

    async fn refresh_if_stale(&self, cache_empty: bool) -> Result<Option<Vec<VideoRecord>>> {
        let last_synced = match self.store.last_synced().await {
            Ok(ts) => ts.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Could not read last sync time, assuming never synced");
                0
            }
        };

        let should_sync = self.cooldown_elapsed(last_synced, self.clock.now_millis());
        let must_sync = cache_empty;
        if !should_sync && !must_sync {
            debug!(last_synced, "Sync cooldown active, serving cached videos");
            return Ok(None);
        }

        info!(should_sync, must_sync, "Auto-sync triggered: cache expired or empty");
        let mut fresh = self.source.fetch_or_empty().await;
        if fresh.is_empty() {
            return Ok(None);
        }

        self.store
            .save_videos(&fresh, self.clock.now_millis())
            .await
            .context("Failed to save synced videos")?;

        sort_newest_first(&mut fresh);
        info!(count = fresh.len(), "Auto-sync stored fresh videos");
        Ok(Some(fresh))
    }

    /// Sync immediately, ignoring the cooldown, and report the outcome.
    ///
    /// Unlike the automatic path, failures are returned to the caller.
    pub async fn force_sync_now(&self) -> SyncReport {
        let videos = match self.source.fetch_videos().await {
            Ok(videos) => videos,
            Err(e) => {
                error!(error = %e, "Manual sync failed");
                return SyncReport::failure(format!("Sync failed: {e}"));
            }
        };

        if let Err(e) = self.store.save_videos(&videos, self.clock.now_millis()).await {
            error!("Manual sync could not save videos: {e:#}");
            return SyncReport::failure("Failed to save videos");
        }

        info!(count = videos.len(), "Manual sync complete");
        SyncReport::Success {
            count: videos.len(),
            sample: videos.into_iter().take(SYNC_SAMPLE_SIZE).collect(),
        }
    }

    /// Look up a single stored video; store errors read as not found.
    pub async fn get_video_by_id(&self, id: &str) -> Option<VideoRecord> {
        match self.store.get_video(id).await {
            Ok(video) => video,
            Err(e) => {
                error!(error = %e, video_id = id, "Error fetching video");
                None
            }
        }
    }

    /// Current sync state for the admin view.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn sync_status(&self) -> Result<SyncStatus> {
        let last_synced = self.store.last_synced().await?;
        let video_count = self.store.count_videos().await?;
        let cooldown_ms = i64::try_from(self.cooldown.as_millis()).unwrap_or(i64::MAX);

        Ok(SyncStatus {
            last_synced,
            last_synced_at: last_synced.and_then(format_millis),
            video_count,
            cooldown_secs: self.cooldown.as_secs(),
            next_auto_sync_at: last_synced
                .map(|ts| ts.saturating_add(cooldown_ms))
                .and_then(format_millis),
        })
    }

    fn cooldown_elapsed(&self, last_synced: i64, now: i64) -> bool {
        let cooldown_ms = i64::try_from(self.cooldown.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(last_synced) > cooldown_ms
    }
}

fn sort_newest_first(videos: &mut [VideoRecord]) {
    videos.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn format_millis(ms: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339())
}
