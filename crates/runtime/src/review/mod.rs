//! Human review queue
//!
//! Holds at most one unresolved item per document. Items are ordered by
//! priority (URGENT, HIGH, MEDIUM) and then by first-seen time, oldest first.
//! Re-enqueueing an unresolved document updates it in place and keeps its
//! original creation time. Resolved items move to a bounded audit log and no
//! longer appear in queue views.

use crate::types::{ConfidenceBand, DocumentId, Metadata, ReviewPriority};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Default number of resolved items kept for audit
pub const DEFAULT_RESOLVED_RETENTION: usize = 10_000;

/// A document waiting for (or having received) human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct ReviewItem {
    pub document_id: DocumentId,
    pub confidence_score: f64,
    pub confidence_band: ConfidenceBand,
    pub priority: ReviewPriority,
    pub reason: String,
    pub category: String,
    #[cfg_attr(feature = "http-api", schema(value_type = Object))]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved: bool,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ReviewItem {
    pub fn new(
        document_id: DocumentId,
        confidence_score: f64,
        confidence_band: ConfidenceBand,
        priority: ReviewPriority,
        reason: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id,
            confidence_score,
            confidence_band,
            priority,
            reason: reason.into(),
            category: String::new(),
            metadata: Metadata::new(),
            created_at,
            updated_at: created_at,
            resolved: false,
            resolution: None,
            resolved_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Counts used by alerting and dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "http-api", derive(utoipa::ToSchema))]
pub struct ReviewQueueSnapshot {
    pub unresolved_count: usize,
    pub urgent_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    /// Total resolutions since startup, including ones trimmed from the audit log
    pub resolved_count: u64,
}

impl ReviewQueueSnapshot {
    pub fn count_for(&self, priority: ReviewPriority) -> usize {
        match priority {
            ReviewPriority::Urgent => self.urgent_count,
            ReviewPriority::High => self.high_count,
            ReviewPriority::Medium => self.medium_count,
        }
    }
}

/// (priority rank, first-seen time, insertion sequence)
type OrderKey = (u8, DateTime<Utc>, u64);

#[derive(Debug)]
struct Pending {
    item: ReviewItem,
    key: OrderKey,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: HashMap<DocumentId, Pending>,
    order: BTreeMap<OrderKey, DocumentId>,
    resolved: VecDeque<ReviewItem>,
    resolved_total: u64,
    next_seq: u64,
}

/// Thread-safe priority review queue
#[derive(Debug)]
pub struct ReviewQueue {
    state: Mutex<QueueState>,
    resolved_retention: usize,
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVED_RETENTION)
    }
}

impl ReviewQueue {
    pub fn new(resolved_retention: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            resolved_retention,
        }
    }

    /// Add an item, or update the unresolved item already queued for the
    /// same document. An update replaces score, band, priority, reason,
    /// category and metadata but keeps the original `created_at`.
    pub fn enqueue(&self, mut item: ReviewItem) {
        item.resolved = false;
        item.resolution = None;
        item.resolved_at = None;

        let mut state = self.state.lock();
        let id = item.document_id.clone();

        let key = match state.pending.remove(&id) {
            Some(existing) => {
                state.order.remove(&existing.key);
                item.created_at = existing.item.created_at;
                (item.priority.rank(), existing.key.1, existing.key.2)
            }
            None => {
                state.next_seq += 1;
                (item.priority.rank(), item.created_at, state.next_seq)
            }
        };

        state.order.insert(key, id.clone());
        state.pending.insert(id, Pending { item, key });
    }

    /// Peek at up to `limit` unresolved items in queue order.
    pub fn dequeue_batch(&self, limit: usize) -> Vec<ReviewItem> {
        self.dequeue_batch_filtered(limit, None)
    }

    /// Peek at up to `limit` unresolved items, optionally restricted to one priority.
    pub fn dequeue_batch_filtered(
        &self,
        limit: usize,
        priority: Option<ReviewPriority>,
    ) -> Vec<ReviewItem> {
        let state = self.state.lock();
        let ids: Box<dyn Iterator<Item = &DocumentId> + '_> = match priority {
            None => Box::new(state.order.values()),
            Some(priority) => {
                let rank = priority.rank();
                Box::new(
                    state
                        .order
                        .range(
                            (rank, DateTime::<Utc>::MIN_UTC, 0)
                                ..=(rank, DateTime::<Utc>::MAX_UTC, u64::MAX),
                        )
                        .map(|(_, id)| id),
                )
            }
        };

        ids.take(limit)
            .filter_map(|id| state.pending.get(id).map(|p| p.item.clone()))
            .collect()
    }

    /// Mark the unresolved item for `id` as resolved. Returns `false` when
    /// there is nothing to resolve, whether the id was never queued or was
    /// already resolved.
    pub fn resolve(&self, id: &DocumentId, resolution: impl Into<String>) -> bool {
        self.resolve_at(id, resolution, Utc::now())
    }

    pub fn resolve_at(
        &self,
        id: &DocumentId,
        resolution: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut state = self.state.lock();
        let Some(Pending { mut item, key }) = state.pending.remove(id) else {
            return false;
        };
        state.order.remove(&key);

        item.resolved = true;
        item.resolution = Some(resolution.into());
        item.resolved_at = Some(now);

        state.resolved_total += 1;
        state.resolved.push_back(item);
        while state.resolved.len() > self.resolved_retention {
            state.resolved.pop_front();
        }
        true
    }

    /// The unresolved item for `id`, if any
    pub fn get(&self, id: &DocumentId) -> Option<ReviewItem> {
        self.state.lock().pending.get(id).map(|p| p.item.clone())
    }

    /// Most recently resolved items, newest first
    pub fn resolved_items(&self, limit: usize) -> Vec<ReviewItem> {
        self.state
            .lock()
            .resolved
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> ReviewQueueSnapshot {
        let state = self.state.lock();
        let mut snapshot = ReviewQueueSnapshot {
            unresolved_count: state.pending.len(),
            resolved_count: state.resolved_total,
            ..Default::default()
        };
        for (rank, _, _) in state.order.keys() {
            match rank {
                0 => snapshot.urgent_count += 1,
                1 => snapshot.high_count += 1,
                _ => snapshot.medium_count += 1,
            }
        }
        snapshot
    }

    pub fn unresolved_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}
