//! Metrics sink boundary.
//!
//! Collection logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// RotationKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RotationKind {
    Left,
    Right,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    Read {
        collection: &'a str,
    },
    Write {
        collection: &'a str,
    },
    Delete {
        collection: &'a str,
    },
    Scan {
        collection: &'a str,
    },
    IndexDelta {
        index: &'a str,
        inserts: u64,
        removes: u64,
    },
    UniqueViolation {
        index: &'a str,
    },
    TreeRotation {
        tree: &'a str,
        kind: RotationKind,
    },
}

impl<'a> MetricsEvent<'a> {
    /// Name of the collection, index or tree the event is about.
    #[must_use]
    pub const fn target(&self) -> &'a str {
        match *self {
            Self::Read { collection }
            | Self::Write { collection }
            | Self::Delete { collection }
            | Self::Scan { collection } => collection,
            Self::IndexDelta { index, .. } | Self::UniqueViolation { index } => index,
            Self::TreeRotation { tree, .. } => tree,
        }
    }
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| {
            m.ops.apply(&event);
            m.collections
                .entry(event.target().to_string())
                .or_default()
                .apply(&event);
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    // Clone out of the slot so a sink may itself install overrides.
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
