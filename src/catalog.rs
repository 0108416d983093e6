//! Browsing helpers over a video list: search, date filter and collections.
//!
//! Everything here is pure; callers pass in the list returned by the sync
//! coordinator.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::db::VideoRecord;

/// Slug that selects every video.
pub const ALL_SLUG: &str = "all";

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// URL-safe form of a label: lower-cased, other runs replaced by `-`.
///
/// Non-ASCII letters are treated as separators, so `"Måndagspass"` becomes
/// `"m-ndagspass"`.
#[must_use]
pub fn slugify(label: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&label.to_lowercase(), "-")
        .into_owned()
}

/// Videos whose title, collections or tags contain `query`, ignoring case.
#[must_use]
pub fn search<'a>(videos: &'a [VideoRecord], query: &str) -> Vec<&'a VideoRecord> {
    let needle = query.trim().to_lowercase();
    videos
        .iter()
        .filter(|v| needle.is_empty() || matches_query(v, &needle))
        .collect()
}

fn matches_query(video: &VideoRecord, needle: &str) -> bool {
    video.title.to_lowercase().contains(needle)
        || video
            .tags
            .iter()
            .chain(&video.collections)
            .any(|label| label.to_lowercase().contains(needle))
}

/// Keep videos published on `date` (`YYYY-MM-DD`).
#[must_use]
pub fn filter_by_date<'a>(videos: &[&'a VideoRecord], date: &str) -> Vec<&'a VideoRecord> {
    let date = date.trim();
    videos
        .iter()
        .copied()
        .filter(|v| v.published_at.starts_with(date))
        .collect()
}

/// A collection and how many videos it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub title: String,
    pub slug: String,
    pub count: usize,
}

/// Every collection label in use, sorted by title.
#[must_use]
pub fn collection_index(videos: &[VideoRecord]) -> Vec<CollectionSummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for video in videos {
        for collection in &video.collections {
            *counts.entry(collection.as_str()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(title, count)| CollectionSummary {
            title: title.to_string(),
            slug: slugify(title),
            count,
        })
        .collect()
}

/// Videos grouped under one collection or tag slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub videos: Vec<VideoRecord>,
}

/// Resolve a slug to its videos, matching collections first and then tags.
///
/// Returns `None` when no video carries the slug.
#[must_use]
pub fn find_collection(videos: &[VideoRecord], slug: &str) -> Option<CollectionView> {
    if slug == ALL_SLUG {
        return Some(CollectionView {
            slug: slug.to_string(),
            title: "Alla Pass".to_string(),
            description: "Hela arkivet från klubben.".to_string(),
            videos: videos.to_vec(),
        });
    }

    let has_slug = |labels: &[String]| labels.iter().any(|l| slugify(l) == slug);
    let matching: Vec<VideoRecord> = videos
        .iter()
        .filter(|v| has_slug(&v.collections) || has_slug(&v.tags))
        .cloned()
        .collect();

    let first = matching.first()?;
    let collection_title = first.collections.iter().find(|c| slugify(c) == slug);
    let tag_title = first.tags.iter().find(|t| slugify(t) == slug);

    let title = collection_title
        .or(tag_title)
        .cloned()
        .unwrap_or_else(|| slug.to_string());
    let description = describe(&title, collection_title.is_none(), matching.len());

    Some(CollectionView {
        slug: slug.to_string(),
        title,
        description,
        videos: matching,
    })
}

const WEEKDAYS: &[(&str, &str)] = &[
    ("Måndag", "måndagar"),
    ("Tisdag", "tisdagar"),
    ("Onsdag", "onsdagar"),
    ("Torsdag", "torsdagar"),
    ("Fredag", "fredagar"),
    ("Lördag", "lördagar"),
    ("Söndag", "söndagar"),
];

fn describe(title: &str, is_tag: bool, count: usize) -> String {
    if let Some((_, plural)) = WEEKDAYS.iter().find(|(day, _)| title.contains(day)) {
        return format!("Pass körda på {plural}.");
    }
    if title.contains("No-Gi") {
        return "Grappling utan dräkt (Submission Wrestling).".to_string();
    }
    if title.contains("Gi") && !title.contains("No") {
        return "Tekniker och sparring med dräkt.".to_string();
    }
    if title.contains("Grund") {
        return "Grundkursens tekniker.".to_string();
    }
    if is_tag {
        return format!("Videos taggade med \"{title}\"");
    }
    format!("Samling med {count} videos.")
}
