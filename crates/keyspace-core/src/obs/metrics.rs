use crate::obs::sink::MetricsEvent;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};
use time::OffsetDateTime;

const NANOS_PER_MILLI: i128 = 1_000_000;

///
/// EventState
/// Ephemeral, in-memory counters for collection operations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: CollectionCounters,
    pub collections: BTreeMap<String, CollectionCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: CollectionCounters::default(),
            collections: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// CollectionCounters
///
/// Counters for one collection, index or tree. `EventState::ops` uses the
/// same shape for process-wide totals.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CollectionCounters {
    // point operations
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
    pub scans: u64,

    // index maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub unique_violations: u64,

    pub tree_rotations: u64,
}

impl CollectionCounters {
    pub(crate) const fn apply(&mut self, event: &MetricsEvent<'_>) {
        match *event {
            MetricsEvent::Read { .. } => self.reads = self.reads.saturating_add(1),
            MetricsEvent::Write { .. } => self.writes = self.writes.saturating_add(1),
            MetricsEvent::Delete { .. } => self.deletes = self.deletes.saturating_add(1),
            MetricsEvent::Scan { .. } => self.scans = self.scans.saturating_add(1),
            MetricsEvent::IndexDelta {
                inserts, removes, ..
            } => {
                self.index_inserts = self.index_inserts.saturating_add(inserts);
                self.index_removes = self.index_removes.saturating_add(removes);
            }
            MetricsEvent::UniqueViolation { .. } => {
                self.unique_violations = self.unique_violations.saturating_add(1);
            }
            MetricsEvent::TreeRotation { .. } => {
                self.tree_rotations = self.tree_rotations.saturating_add(1);
            }
        }
    }

    const fn total_ops(&self) -> u64 {
        self.reads
            .saturating_add(self.writes)
            .saturating_add(self.deletes)
            .saturating_add(self.scans)
    }
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / NANOS_PER_MILLI;

    u64::try_from(millis).unwrap_or_default()
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Snapshot of the current window, with per-collection summaries sorted by
/// activity.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub collection_counters: Vec<CollectionSummary>,
}

///
/// CollectionSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(flatten)]
    pub counters: CollectionCounters,
}

/// Build a report, or an empty one when the window started before
/// `window_start_ms`.
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snapshot = with_state(Clone::clone);
    if let Some(requested) = window_start_ms
        && requested > snapshot.window_start_ms
    {
        return EventReport::default();
    }

    let mut collection_counters: Vec<CollectionSummary> = snapshot
        .collections
        .iter()
        .map(|(name, counters)| CollectionSummary {
            name: name.clone(),
            counters: counters.clone(),
        })
        .collect();

    collection_counters.sort_by(|left, right| {
        match right.counters.total_ops().cmp(&left.counters.total_ops()) {
            Ordering::Equal => left.name.cmp(&right.name),
            other => other,
        }
    });

    EventReport {
        counters: Some(snapshot),
        collection_counters,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.reads = 3;
            m.collections.entry("balances".to_string()).or_default().reads = 3;
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.reads, 0);
            assert!(m.collections.is_empty());
        });
    }

    #[test]
    fn report_sorts_collections_by_activity() {
        reset_all();
        with_state_mut(|m| {
            m.collections.entry("quiet".to_string()).or_default().reads = 1;
            m.collections.entry("busy".to_string()).or_default().writes = 5;
            m.collections.entry("also_quiet".to_string()).or_default().deletes = 1;
        });

        let report = report_window_start(None);
        let names: Vec<&str> = report
            .collection_counters
            .iter()
            .map(|summary| summary.name.as_str())
            .collect();

        assert_eq!(names, vec!["busy", "also_quiet", "quiet"]);
    }
}
