//! EmoLens Telemetry
//!
//! Persistence, monitoring and metrics for EmoLens.
//!
//! Provides:
//! - Append-only logs of page visits and predictions ([`Store`], [`SqliteStore`])
//! - Count-by-category summaries for the monitor view ([`MonitoringAggregator`])
//! - Export of the raw logs for offline analysis
//! - In-process counters

pub mod export;
pub mod metrics;
pub mod monitor;
pub mod sqlite;
pub mod store;

pub use export::{export_predictions, export_visits, ExportFormat};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use monitor::{
    count_first_seen, prediction_counts, visit_counts, CategoryCount, MonitoringAggregator,
};
pub use sqlite::SqliteStore;
pub use store::{PageVisit, PredictionRecord, Store};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::monitor::MonitoringAggregator;
    pub use crate::sqlite::SqliteStore;
    pub use crate::store::{PageVisit, PredictionRecord, Store};
}
