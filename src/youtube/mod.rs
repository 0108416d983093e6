//! YouTube playlist ingestion: title classification and the playlist client.

pub mod classify;
pub mod playlist;

pub use classify::{classify_title, lookup_collection, ClassifiedTitle, COLLECTION_KEYWORDS};
pub use playlist::{FetchError, PlaylistFetcher, MAX_VIDEOS, PAGE_SIZE};
