//! Client for the YouTube Data API `playlistItems` endpoint.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::classify::classify_title;
use crate::config::YouTubeConfig;
use crate::db::VideoRecord;
use crate::sync::VideoSource;

/// Items requested per page (the API maximum).
pub const PAGE_SIZE: u32 = 50;

/// Stop paginating once this many videos have been collected.
pub const MAX_VIDEOS: usize = 200;

/// Titles YouTube substitutes for entries the uploader removed or restricted.
pub const UNAVAILABLE_TITLES: &[&str] = &["Private video", "Deleted video"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("YouTube API key or playlist id missing or placeholder")]
    NotConfigured,
    #[error("invalid YouTube API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("YouTube API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("YouTube API error: {0}")]
    Status(reqwest::StatusCode),
}

// ========== API response types ==========

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest resolution available: maxres, then high, then medium.
    #[must_use]
    pub fn best_url(&self) -> String {
        [&self.maxres, &self.high, &self.medium]
            .into_iter()
            .flatten()
            .map(|t| t.url.clone())
            .next()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

// ========== Conversion ==========

/// Build a video record from a playlist item, running the title classifier.
#[must_use]
pub fn video_from_item(item: &PlaylistItem) -> VideoRecord {
    let snippet = &item.snippet;
    let classified = classify_title(&snippet.title);
    let video_id = &snippet.resource_id.video_id;

    VideoRecord {
        id: video_id.clone(),
        title: classified.title,
        original_title: classified.original_title,
        thumbnail: snippet.thumbnails.best_url(),
        published_at: snippet.published_at.clone(),
        link: VideoRecord::watch_url(video_id),
        collections: classified.collections,
        tags: classified.tags,
    }
}

/// Whether a record stands for a private or deleted upload.
#[must_use]
pub fn is_unavailable(video: &VideoRecord) -> bool {
    UNAVAILABLE_TITLES.contains(&video.title.as_str())
}

// ========== Fetcher ==========

/// Pages through a playlist and returns its classified videos.
#[derive(Debug, Clone)]
pub struct PlaylistFetcher {
    client: reqwest::Client,
    config: YouTubeConfig,
}

impl PlaylistFetcher {
    /// Build a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: YouTubeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("club-video-library/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, config: YouTubeConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every valid video in the playlist, up to [`MAX_VIDEOS`].
    ///
    /// Any failing page aborts the whole fetch; no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotConfigured`] without touching the network when
    /// credentials are missing, otherwise the first request or decode error.
    pub async fn fetch_playlist(&self) -> Result<Vec<VideoRecord>, FetchError> {
        let (api_key, playlist_id) = self
            .config
            .live_credentials()
            .ok_or(FetchError::NotConfigured)?;

        let mut videos: Vec<VideoRecord> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.page_url(api_key, playlist_id, page_token.as_deref())?;
            let page = self.fetch_page(url).await?;

            let before = videos.len();
            videos.extend(
                page.items
                    .iter()
                    .map(video_from_item)
                    .filter(|v| !is_unavailable(v)),
            );
            debug!(
                received = page.items.len(),
                kept = videos.len() - before,
                "Fetched playlist page"
            );

            page_token = page.next_page_token;
            if page_token.is_none() || videos.len() >= MAX_VIDEOS {
                break;
            }
        }

        info!(count = videos.len(), "Fetched playlist");
        Ok(videos)
    }

    /// Request URLs carry the API key, so errors are stripped of them before
    /// they reach logs or sync reports.
    async fn fetch_page(&self, url: url::Url) -> Result<PlaylistResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response
            .json::<PlaylistResponse>()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))
    }

    fn page_url(
        &self,
        api_key: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<url::Url, FetchError> {
        let base = self.config.api_base_url.trim_end_matches('/');
        let mut url = url::Url::parse(&format!("{base}/playlistItems"))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "snippet")
                .append_pair("playlistId", playlist_id)
                .append_pair("maxResults", &PAGE_SIZE.to_string())
                .append_pair("key", api_key);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl VideoSource for PlaylistFetcher {
    async fn fetch_videos(&self) -> Result<Vec<VideoRecord>, FetchError> {
        self.fetch_playlist().await
    }
}
