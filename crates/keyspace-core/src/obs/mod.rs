//! Observability: runtime counters and the metrics sink boundary.
//!
//! Collections report through `MetricsEvent`; nothing outside `sink`
//! touches the counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{CollectionCounters, CollectionSummary, EventReport, EventState};
pub use sink::{
    MetricsEvent, MetricsSink, RotationKind, metrics_report, metrics_reset_all, with_metrics_sink,
};
