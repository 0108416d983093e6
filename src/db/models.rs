use serde::{Deserialize, Serialize};

/// A training video as stored and served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub thumbnail: String,
    /// ISO 8601 timestamp; sorting on the string orders chronologically.
    pub published_at: String,
    pub link: String,
    pub collections: Vec<String>,
    pub tags: Vec<String>,
}

impl VideoRecord {
    /// Canonical watch URL for a YouTube video id.
    #[must_use]
    pub fn watch_url(video_id: &str) -> String {
        format!("https://youtube.com/watch?v={video_id}")
    }
}

/// Row shape of the `videos` table. Label lists are stored as JSON arrays.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub thumbnail: String,
    pub published_at: String,
    pub link: String,
    pub collections: String,
    pub tags: String,
    pub updated_at: String,
}

impl From<VideoRow> for VideoRecord {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            original_title: row.original_title,
            thumbnail: row.thumbnail,
            published_at: row.published_at,
            link: row.link,
            collections: decode_labels(&row.collections),
            tags: decode_labels(&row.tags),
        }
    }
}

/// Encode a label list for storage.
#[must_use]
pub fn encode_labels(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored label list; corrupt values read as empty.
#[must_use]
pub fn decode_labels(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
