//! Shared fixtures for podplanner integration tests

#![allow(dead_code)]

use podplanner::{EpisodeApi, Identity, ManualClock, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Titles in `fixtures/episodes.csv`, in file order
pub const TITLES: [&str; 3] = ["Cats at Home", "Dog Days", "Birdsong"];

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn episodes_csv() -> Vec<u8> {
    std::fs::read(fixture_path("episodes.csv")).expect("episodes fixture is readable")
}

/// An API over a default store with the episode fixture uploaded.
pub fn uploaded_session() -> (EpisodeApi, Identity) {
    let api = EpisodeApi::default();
    let identity = api.new_identity();
    api.upload_csv(&identity, "episodes.csv", &episodes_csv())
        .expect("fixture uploads");
    (api, identity)
}

/// An API whose store runs on a manual clock.
pub fn api_with_clock(ttl: Duration, capacity: usize) -> (EpisodeApi, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let store = SessionStore::with_clock(ttl, capacity, clock.clone());
    (EpisodeApi::new(Arc::new(store)), clock)
}
