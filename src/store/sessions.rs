//! SessionStore: bounded, expiring map from identity to session bundle

use super::bundle::{BundleUpdate, SessionBundle};
use super::clock::{Clock, SystemClock};
use super::identity::Identity;
use crate::config::StoreConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Inactivity window after which a bundle is dropped
pub const DEFAULT_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// Maximum number of identities held at once
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
struct Entry {
    bundle: SessionBundle,
    updated_at: DateTime<Utc>,
    /// Write order, used to pick the least recently updated entry
    seq: u64,
}

/// Per-identity session storage
///
/// Each identity maps to one [`SessionBundle`]. Writes refresh the entry's
/// expiry; reads do not. Expired entries are dropped lazily, when they are
/// touched or when a new identity needs room.
#[derive(Debug)]
pub struct SessionStore {
    entries: DashMap<Identity, Entry>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    /// Serializes admission of new identities so the capacity bound holds
    admission: Mutex<()>,
    seq: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
            clock,
            admission: Mutex::new(()),
            seq: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.capacity)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clone of the live bundle, or an empty one on miss or expiry
    pub fn get(&self, identity: &Identity) -> SessionBundle {
        self.read(identity, SessionBundle::clone).unwrap_or_default()
    }

    /// Borrow the live bundle without cloning it
    ///
    /// Returns `None` when the identity is unknown or expired.
    pub fn read<R>(&self, identity: &Identity, f: impl FnOnce(&SessionBundle) -> R) -> Option<R> {
        let now = self.clock.now();
        {
            let entry = self.entries.get(identity)?;
            if !self.is_expired(&entry, now) {
                return Some(f(&entry.bundle));
            }
        }
        self.drop_if_expired(identity, now);
        None
    }

    /// Merge `update` into the identity's bundle, creating it if needed
    pub fn put(&self, identity: &Identity, update: BundleUpdate) {
        let now = self.clock.now();
        if let Some(mut entry) = self.entries.get_mut(identity) {
            if self.is_expired(&entry, now) {
                debug!(identity = %identity, "session expired, starting fresh");
                entry.bundle = SessionBundle::default();
            }
            update.apply(&mut entry.bundle);
            self.touch(&mut entry, now);
            return;
        }
        self.admit(identity, update, now);
    }

    /// Read-modify-write on an existing live bundle
    ///
    /// `f` mutates the stored bundle in place under the identity's lock and
    /// must not touch it before the last point where it can fail. The expiry
    /// is refreshed only when `f` returns `Ok`. Returns `None` when the
    /// identity is unknown or expired.
    pub fn update<R, E>(
        &self,
        identity: &Identity,
        f: impl FnOnce(&mut SessionBundle) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let now = self.clock.now();
        match self.entries.get_mut(identity) {
            None => return None,
            Some(mut entry) => {
                if !self.is_expired(&entry, now) {
                    let result = f(&mut entry.bundle);
                    if result.is_ok() {
                        self.touch(&mut entry, now);
                    }
                    return Some(result);
                }
            }
        }
        self.drop_if_expired(identity, now);
        None
    }

    pub fn remove(&self, identity: &Identity) -> Option<SessionBundle> {
        self.entries.remove(identity).map(|(_, entry)| entry.bundle)
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(self.clock.now())
    }

    /// Whether the identity has a live bundle
    pub fn contains(&self, identity: &Identity) -> bool {
        self.read(identity, |_| ()).is_some()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        match (now - entry.updated_at).to_std() {
            Ok(age) => age >= self.ttl,
            // clock went backwards
            Err(_) => false,
        }
    }

    fn touch(&self, entry: &mut Entry, now: DateTime<Utc>) {
        entry.updated_at = now;
        entry.seq = self.seq.fetch_add(1, Ordering::Relaxed);
    }

    fn drop_if_expired(&self, identity: &Identity, now: DateTime<Utc>) {
        if self
            .entries
            .remove_if(identity, |_, entry| self.is_expired(entry, now))
            .is_some()
        {
            debug!(identity = %identity, "session expired");
        }
    }

    fn admit(&self, identity: &Identity, update: BundleUpdate, now: DateTime<Utc>) {
        let _guard = self.admission.lock().unwrap_or_else(|e| e.into_inner());

        // Another writer may have admitted this identity while we waited.
        if !self.entries.contains_key(identity) {
            self.make_room(now);
        }

        let mut entry = self.entries.entry(identity.clone()).or_insert_with(|| Entry {
            bundle: SessionBundle::default(),
            updated_at: now,
            seq: 0,
        });
        if self.is_expired(&entry, now) {
            entry.bundle = SessionBundle::default();
        }
        update.apply(&mut entry.bundle);
        self.touch(&mut entry, now);
    }

    fn make_room(&self, now: DateTime<Utc>) {
        if self.entries.len() < self.capacity {
            return;
        }
        self.purge_expired_at(now);

        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.seq)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else { break };
            if self.entries.remove(&oldest).is_some() {
                debug!(identity = %oldest, "evicted least recently updated session");
            }
        }
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        self.entries.retain(|identity, entry| {
            let keep = !self.is_expired(entry, now);
            if !keep {
                debug!(identity = %identity, "session expired");
                purged += 1;
            }
            keep
        });
        purged
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::ManualClock;

    fn store_with_clock(ttl_secs: u64, capacity: usize) -> (SessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = SessionStore::with_clock(
            Duration::from_secs(ttl_secs),
            capacity,
            clock.clone(),
        );
        (store, clock)
    }

    fn named(name: &str) -> BundleUpdate {
        BundleUpdate::new().with_uploaded_filename(name)
    }

    #[test]
    fn test_get_unknown_identity_is_empty() {
        let store = SessionStore::default();
        assert!(store.get(&Identity::new()).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_merges_into_existing_bundle() {
        let store = SessionStore::default();
        let id = Identity::new();

        store.put(&id, named("a.csv").with_current_csv_file("a.csv"));
        store.put(&id, named("b.csv"));

        let bundle = store.get(&id);
        assert_eq!(bundle.uploaded_filename.as_deref(), Some("b.csv"));
        assert_eq!(bundle.current_csv_file.as_deref(), Some("a.csv"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_identities_are_isolated() {
        let store = SessionStore::default();
        let (a, b) = (Identity::new(), Identity::new());
        store.put(&a, named("a.csv"));
        assert!(store.get(&b).is_empty());
        assert_eq!(store.get(&a).uploaded_filename.as_deref(), Some("a.csv"));
    }

    #[test]
    fn test_bundle_expires_after_ttl() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        clock.advance(chrono::Duration::seconds(59));
        assert!(store.contains(&id));

        clock.advance(chrono::Duration::seconds(1));
        assert!(store.get(&id).is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_reads_do_not_refresh_expiry() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        clock.advance(chrono::Duration::seconds(40));
        let _ = store.get(&id);
        clock.advance(chrono::Duration::seconds(40));

        assert!(!store.contains(&id));
    }

    #[test]
    fn test_writes_refresh_expiry() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        clock.advance(chrono::Duration::seconds(40));
        store.put(&id, BundleUpdate::new());
        clock.advance(chrono::Duration::seconds(40));

        assert_eq!(store.get(&id).uploaded_filename.as_deref(), Some("a.csv"));
    }

    #[test]
    fn test_put_after_expiry_starts_from_empty_bundle() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv").with_current_csv_file("a.csv"));

        clock.advance(chrono::Duration::seconds(61));
        store.put(&id, named("b.csv"));

        let bundle = store.get(&id);
        assert_eq!(bundle.uploaded_filename.as_deref(), Some("b.csv"));
        assert!(bundle.current_csv_file.is_none());
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = SessionStore::default();
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        let failed: Option<Result<(), &str>> = store.update(&id, |_| Err("nope"));
        assert_eq!(failed, Some(Err("nope")));
        assert_eq!(store.get(&id).uploaded_filename.as_deref(), Some("a.csv"));

        let done: Option<Result<usize, &str>> = store.update(&id, |bundle| {
            bundle.uploaded_filename = Some("changed.csv".into());
            Ok(1)
        });
        assert_eq!(done, Some(Ok(1)));
        assert_eq!(store.get(&id).uploaded_filename.as_deref(), Some("changed.csv"));
    }

    #[test]
    fn test_failed_update_does_not_refresh_expiry() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        clock.advance(chrono::Duration::seconds(40));
        let failed: Option<Result<(), &str>> = store.update(&id, |_| Err("nope"));
        assert!(failed.is_some());

        clock.advance(chrono::Duration::seconds(20));
        assert!(!store.contains(&id));
    }

    #[test]
    fn test_successful_update_refreshes_expiry() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        store.put(&id, named("a.csv"));

        clock.advance(chrono::Duration::seconds(40));
        let done: Option<Result<(), &str>> = store.update(&id, |_| Ok(()));
        assert!(done.is_some());

        clock.advance(chrono::Duration::seconds(40));
        assert!(store.contains(&id));
    }

    #[test]
    fn test_update_on_missing_or_expired_identity_is_none() {
        let (store, clock) = store_with_clock(60, 10);
        let id = Identity::new();
        let missing: Option<Result<(), ()>> = store.update(&id, |_| Ok(()));
        assert!(missing.is_none());

        store.put(&id, named("a.csv"));
        clock.advance(chrono::Duration::seconds(60));
        let expired: Option<Result<(), ()>> = store.update(&id, |_| Ok(()));
        assert!(expired.is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_capacity_evicts_least_recently_updated() {
        let (store, _clock) = store_with_clock(3600, 2);
        let (a, b, c) = (Identity::new(), Identity::new(), Identity::new());

        store.put(&a, named("a.csv"));
        store.put(&b, named("b.csv"));
        // a becomes the most recently updated
        store.put(&a, BundleUpdate::new());
        store.put(&c, named("c.csv"));

        assert_eq!(store.len(), 2);
        assert!(store.contains(&a));
        assert!(!store.contains(&b));
        assert!(store.contains(&c));
    }

    #[test]
    fn test_admission_prefers_purging_expired_entries() {
        let (store, clock) = store_with_clock(60, 2);
        let (old, fresh, new) = (Identity::new(), Identity::new(), Identity::new());

        store.put(&old, named("old.csv"));
        clock.advance(chrono::Duration::seconds(50));
        store.put(&fresh, named("fresh.csv"));
        clock.advance(chrono::Duration::seconds(20));
        store.put(&new, named("new.csv"));

        assert!(!store.contains(&old));
        assert!(store.contains(&fresh));
        assert!(store.contains(&new));
    }

    #[test]
    fn test_purge_expired_counts_dropped_entries() {
        let (store, clock) = store_with_clock(60, 10);
        store.put(&Identity::new(), named("a.csv"));
        store.put(&Identity::new(), named("b.csv"));
        clock.advance(chrono::Duration::seconds(30));
        let survivor = Identity::new();
        store.put(&survivor, named("c.csv"));
        clock.advance(chrono::Duration::seconds(30));

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&survivor));
    }

    #[test]
    fn test_remove_returns_bundle() {
        let store = SessionStore::default();
        let id = Identity::new();
        store.put(&id, named("a.csv"));
        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.uploaded_filename.as_deref(), Some("a.csv"));
        assert!(store.remove(&id).is_none());
    }
}
