//! A simulated processing unit.
//!
//! Each processor tracks a bounded FIFO work queue, a cumulative load
//! accumulator, a derived state classification, and rolling histories of
//! load and queue length for the statistics report.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BalancerError, BalancerResult};
use crate::history::RollingHistory;
use crate::task::Task;

/// Stable processor index within the engine's pool (0..N-1).
pub type ProcessorId = usize;

/// Load threshold above which a processor is classified overloaded.
const OVERLOAD_THRESHOLD: f64 = 0.8;

/// Classification derived from `current_load`; recomputed whenever load
/// changes, never stored authoritatively anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessorState {
    Idle,
    Busy,
    Overloaded,
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessorState::Idle => "IDLE",
            ProcessorState::Busy => "BUSY",
            ProcessorState::Overloaded => "OVERLOADED",
        };
        f.write_str(s)
    }
}

/// Per-processor tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Work units processed per simulated time unit; must be positive.
    pub processing_speed: f64,
    /// Maximum queue length before the processor stops accepting tasks.
    pub queue_size_limit: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            processing_speed: 1.0,
            queue_size_limit: 20,
        }
    }
}

impl ProcessorConfig {
    /// Fail fast on non-positive speed or a zero queue limit.
    pub fn validate(&self) -> BalancerResult<()> {
        if !self.processing_speed.is_finite() || self.processing_speed <= 0.0 {
            return Err(BalancerError::InvalidConfiguration(format!(
                "processing_speed must be positive, got {}",
                self.processing_speed
            )));
        }
        if self.queue_size_limit == 0 {
            return Err(BalancerError::InvalidConfiguration(
                "queue_size_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One processing unit in the pool.
#[derive(Debug)]
pub struct Processor {
    pub id: ProcessorId,
    /// Cumulative load accounting. Increases on assignment and
    /// migration-in, decreases on migration-out only; task completion
    /// does not reduce it (see the engine docs on the load asymmetry).
    pub current_load: f64,
    pub state: ProcessorState,
    /// Pending tasks in FIFO execution order.
    pub queue: VecDeque<Task>,
    pub load_history: RollingHistory,
    pub queue_length_history: RollingHistory,
    pub completed_tasks: u64,
    /// Sum of estimated processing times of every task this processor
    /// has completed.
    pub total_processing_time: f64,
    pub config: ProcessorConfig,
}

impl Processor {
    pub fn new(id: ProcessorId, config: ProcessorConfig) -> Self {
        Self {
            id,
            current_load: 0.0,
            state: ProcessorState::Idle,
            queue: VecDeque::new(),
            load_history: RollingHistory::new(),
            queue_length_history: RollingHistory::new(),
            completed_tasks: 0,
            total_processing_time: 0.0,
            config,
        }
    }

    /// Recompute `state` from `current_load`:
    /// zero load is idle, load above 0.8 is overloaded, anything else busy.
    pub fn classify(&mut self) {
        self.state = if self.current_load == 0.0 {
            ProcessorState::Idle
        } else if self.current_load > OVERLOAD_THRESHOLD {
            ProcessorState::Overloaded
        } else {
            ProcessorState::Busy
        };
    }

    /// Whether the queue can take one more task.
    pub fn has_capacity(&self) -> bool {
        self.queue.len() < self.config.queue_size_limit
    }

    /// Simulated time to process `task` at this processor's speed.
    /// Pure; `processing_speed` is validated positive at construction.
    pub fn estimated_processing_time(&self, task: &Task) -> f64 {
        task.workload / self.config.processing_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_idle_busy_overloaded() {
        let mut p = Processor::new(0, ProcessorConfig::default());

        p.classify();
        assert_eq!(p.state, ProcessorState::Idle);

        p.current_load = 0.5;
        p.classify();
        assert_eq!(p.state, ProcessorState::Busy);

        // The boundary itself is still busy; only strictly above is overloaded.
        p.current_load = 0.8;
        p.classify();
        assert_eq!(p.state, ProcessorState::Busy);

        p.current_load = 0.81;
        p.classify();
        assert_eq!(p.state, ProcessorState::Overloaded);
    }

    #[test]
    fn capacity_tracks_queue_limit() {
        let config = ProcessorConfig {
            queue_size_limit: 2,
            ..Default::default()
        };
        let mut p = Processor::new(0, config);
        assert!(p.has_capacity());

        p.queue.push_back(Task::new(0, 0.1, 0));
        assert!(p.has_capacity());

        p.queue.push_back(Task::new(1, 0.1, 0));
        assert!(!p.has_capacity());
    }

    #[test]
    fn processing_time_scales_with_speed() {
        let mut p = Processor::new(0, ProcessorConfig::default());
        let task = Task::new(0, 1.0, 0);
        assert_eq!(p.estimated_processing_time(&task), 1.0);

        p.config.processing_speed = 2.0;
        assert_eq!(p.estimated_processing_time(&task), 0.5);
    }

    #[test]
    fn config_rejects_non_positive_values() {
        let bad_speed = ProcessorConfig {
            processing_speed: 0.0,
            ..Default::default()
        };
        assert!(bad_speed.validate().is_err());

        let nan_speed = ProcessorConfig {
            processing_speed: f64::NAN,
            ..Default::default()
        };
        assert!(nan_speed.validate().is_err());

        let bad_limit = ProcessorConfig {
            queue_size_limit: 0,
            ..Default::default()
        };
        assert!(bad_limit.validate().is_err());

        assert!(ProcessorConfig::default().validate().is_ok());
    }

    #[test]
    fn state_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&ProcessorState::Overloaded).unwrap(),
            "\"OVERLOADED\""
        );
        assert_eq!(ProcessorState::Idle.to_string(), "IDLE");
    }
}
