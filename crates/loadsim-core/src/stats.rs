//! Read-only statistics snapshots.

use serde::{Deserialize, Serialize};

use crate::processor::{ProcessorId, ProcessorState};

/// Aggregate view of one simulation run at a point in time.
///
/// Produced by [`LoadBalancer::statistics`](crate::LoadBalancer::statistics).
/// Pure data; taking a snapshot never mutates the engine, so two
/// back-to-back snapshots differ only in `elapsed_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// Number of rebalance passes that found both overloaded and
    /// underloaded processors (counted once per pass, not per migration).
    pub load_balance_count: u64,
    pub total_migrations: u64,
    /// Wall-clock seconds since the engine was constructed.
    pub elapsed_secs: f64,
    /// Mean of per-processor `total_processing_time`; 0 when nothing
    /// has completed yet.
    pub avg_processing_time: f64,
    pub processors: Vec<ProcessorStats>,
}

/// Per-processor slice of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorStats {
    pub id: ProcessorId,
    pub state: ProcessorState,
    pub completed_tasks: u64,
    /// Mean of the rolling load history; 0 if no samples yet.
    pub avg_load: f64,
    /// Mean of the rolling queue-length history; 0 if no samples yet.
    pub avg_queue_length: f64,
}
