//! TTL-indexed cache of scored documents
//!
//! Entries live in a `HashMap` keyed by document id. A min-heap ordered by
//! expiry time drives the proactive sweep: each sweep pops only the entries that
//! are due, so a pass costs O(k log n) for k expired entries. Overwritten entries
//! leave stale heap records behind; those carry an older generation number and
//! are skipped when popped. The heap is rebuilt from the live index when stale
//! records outnumber live ones.
//!
//! Expired entries become tombstones rather than disappearing so that
//! `active_items + expired_items == total_items` holds across lazy expiry on
//! `get`, sweeps and `ttl = 0` puts. `clear_expired` drops the tombstones; the
//! engine calls it at the end of every maintenance pass.
//! `stats` is O(n) over live entries so it stays exact between sweeps.

use crate::types::{DocumentId, ScoredDocument};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, PartialEq)]
struct CacheEntry {
    document: ScoredDocument,
    expires_at: DateTime<Utc>,
    generation: u64,
}

impl CacheEntry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Point-in-time cache counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct CacheStats {
    pub total_items: usize,
    pub active_items: usize,
    pub expired_items: usize,
}

type ExpiryKey = Reverse<(DateTime<Utc>, u64, DocumentId)>;

#[derive(Debug, Default)]
struct CacheState {
    live: HashMap<DocumentId, CacheEntry>,
    tombstones: HashMap<DocumentId, CacheEntry>,
    expiry_heap: BinaryHeap<ExpiryKey>,
    next_generation: u64,
}

impl CacheState {
    fn retire(&mut self, id: &DocumentId) -> bool {
        match self.live.remove(id) {
            Some(entry) => {
                self.tombstones.insert(id.clone(), entry);
                true
            }
            None => false,
        }
    }

    fn rebuild_heap(&mut self) {
        self.expiry_heap = self
            .live
            .iter()
            .map(|(id, entry)| Reverse((entry.expires_at, entry.generation, id.clone())))
            .collect();
    }
}

/// Thread-safe TTL cache keyed by document id
#[derive(Debug, Default)]
pub struct ConfidenceCache {
    state: Mutex<CacheState>,
}

fn expiry_for(inserted_at: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| inserted_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl ConfidenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `doc`. A TTL of zero records the
    /// document for audit without making it retrievable.
    pub fn put(&self, doc: ScoredDocument, ttl_seconds: u64) {
        self.put_at(doc, ttl_seconds, Utc::now())
    }

    pub fn put_at(&self, doc: ScoredDocument, ttl_seconds: u64, now: DateTime<Utc>) {
        let mut state = self.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        let id = doc.document_id().clone();

        let entry = CacheEntry {
            document: doc,
            expires_at: expiry_for(now, ttl_seconds),
            generation,
        };

        state.tombstones.remove(&id);
        if ttl_seconds == 0 {
            state.live.remove(&id);
            state.tombstones.insert(id, entry);
            return;
        }

        state
            .expiry_heap
            .push(Reverse((entry.expires_at, generation, id.clone())));
        state.live.insert(id, entry);

        if state.expiry_heap.len() > 2 * state.live.len() + 64 {
            state.rebuild_heap();
        }
    }

    /// Fetch a live document. An entry found past its expiry is retired.
    pub fn get(&self, id: &DocumentId) -> Option<ScoredDocument> {
        self.get_at(id, Utc::now())
    }

    pub fn get_at(&self, id: &DocumentId, now: DateTime<Utc>) -> Option<ScoredDocument> {
        let mut state = self.state.lock();
        match state.live.get(id) {
            None => return None,
            Some(entry) if !entry.is_expired_at(now) => return Some(entry.document.clone()),
            Some(_) => {}
        }
        state.retire(id);
        None
    }

    /// Move every due entry to the tombstone set. Returns how many expired.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock();
        let mut expired = 0;

        loop {
            let due = match state.expiry_heap.peek() {
                Some(Reverse((expires_at, _, _))) => *expires_at <= now,
                None => false,
            };
            if !due {
                break;
            }
            let Some(Reverse((_, generation, id))) = state.expiry_heap.pop() else {
                break;
            };
            let current = state
                .live
                .get(&id)
                .map(|entry| entry.generation == generation)
                .unwrap_or(false);
            if current && state.retire(&id) {
                expired += 1;
            }
        }

        if expired > 0 {
            tracing::debug!(expired, remaining = state.live.len(), "Swept expired cache entries");
        }
        expired
    }

    /// Sweep, then drop all tombstones. Returns how many were dropped.
    pub fn clear_expired(&self) -> usize {
        self.clear_expired_at(Utc::now())
    }

    pub fn clear_expired_at(&self, now: DateTime<Utc>) -> usize {
        self.sweep_at(now);
        let mut state = self.state.lock();
        let cleared = state.tombstones.len();
        state.tombstones.clear();
        cleared
    }

    /// Forget a document entirely, live or expired.
    pub fn remove(&self, id: &DocumentId) -> bool {
        let mut state = self.state.lock();
        let live = state.live.remove(id).is_some();
        let tombstone = state.tombstones.remove(id).is_some();
        live || tombstone
    }

    pub fn stats(&self) -> CacheStats {
        self.stats_at(Utc::now())
    }

    /// O(n) in the number of live entries.
    pub fn stats_at(&self, now: DateTime<Utc>) -> CacheStats {
        let state = self.state.lock();
        let live_expired = state
            .live
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();
        let total_items = state.live.len() + state.tombstones.len();
        let expired_items = state.tombstones.len() + live_expired;
        CacheStats {
            total_items,
            active_items: total_items - expired_items,
            expired_items,
        }
    }
}
