//! The unit of simulated work.

use std::time::Instant;

use crate::processor::ProcessorId;

/// Unique, monotonically increasing task identifier.
pub type TaskId = u64;

/// One unit of work moving through the simulation.
///
/// A task is minted by the engine, owned by exactly one processor queue
/// while pending, and handed back to the caller once completed. Identity
/// (`id`) is fixed at creation; `assigned_processor` and `migration_count`
/// change as the task moves between processors.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    /// Simulated amount of work; always positive.
    pub workload: f64,
    /// Higher priority tasks are preferred when picking a migration victim.
    pub priority: i32,
    /// Index of the processor currently holding the task, once assigned.
    pub assigned_processor: Option<ProcessorId>,
    pub created_at: Instant,
    /// Set exactly once, when the task is dequeued by a tick.
    pub completed_at: Option<Instant>,
    /// Number of times the task moved between processors.
    pub migration_count: u32,
}

impl Task {
    pub(crate) fn new(id: TaskId, workload: f64, priority: i32) -> Self {
        Self {
            id,
            workload,
            priority,
            assigned_processor: None,
            created_at: Instant::now(),
            completed_at: None,
            migration_count: 0,
        }
    }

    /// Whether the task has finished processing.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_unassigned() {
        let task = Task::new(0, 0.5, 0);

        assert_eq!(task.id, 0);
        assert_eq!(task.workload, 0.5);
        assert_eq!(task.priority, 0);
        assert_eq!(task.assigned_processor, None);
        assert_eq!(task.migration_count, 0);
        assert!(!task.is_completed());
    }
}
