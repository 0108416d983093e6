//! Club video library.
//!
//! Serves a martial-arts club's training videos, mirrored from a YouTube
//! playlist. Titles are parsed into collections and tags, and the mirror is
//! refreshed on read once a cooldown has passed.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod sync;
pub mod web;
pub mod youtube;
