//! The load-balancing engine.
//!
//! Owns the processor pool and drives the simulation one tick at a time:
//!
//! - [`LoadBalancer::create_task`] mints tasks with fresh ids
//! - [`LoadBalancer::assign_task`] places a task on the least-loaded
//!   processor that still has queue capacity
//! - [`LoadBalancer::rebalance`] migrates tasks from overloaded to
//!   underloaded processors using mean/standard-deviation thresholds
//! - [`LoadBalancer::advance_tick`] completes at most one task per
//!   processor and records history samples
//! - [`LoadBalancer::statistics`] aggregates a read-only snapshot
//!
//! The engine is synchronous and single-writer: it performs no I/O, owns
//! no timers, and never reads ambient randomness. Pacing and task arrival
//! are the driver's job.
//!
//! Load accounting is asymmetric on purpose: `current_load` grows on
//! assignment and migration-in and shrinks on migration-out, but task
//! completion during a tick does not reduce it, so over a long run it
//! diverges upward from the workload actually queued. This mirrors the
//! behavior the simulation is specified to reproduce; do not "fix" it.

use std::time::Instant;

use tracing::debug;

use crate::error::{BalancerError, BalancerResult};
use crate::processor::{Processor, ProcessorConfig, ProcessorId};
use crate::stats::{ProcessorStats, StatisticsSnapshot};
use crate::task::{Task, TaskId};

/// Outcome of offering a task to the pool.
///
/// Rejection is a normal policy outcome, not an error: when no processor
/// has spare queue capacity the task is handed back to the caller, who
/// decides whether to drop it or re-offer it later.
#[derive(Debug)]
pub enum AssignOutcome {
    /// Task enqueued on the given processor.
    Assigned(ProcessorId),
    /// No processor had capacity; ownership returns to the caller.
    Rejected(Task),
}

/// The simulation engine. One instance per run; single logical writer.
#[derive(Debug)]
pub struct LoadBalancer {
    processors: Vec<Processor>,
    task_counter: TaskId,
    started_at: Instant,
    total_tasks: u64,
    completed_tasks: u64,
    load_balance_count: u64,
    total_migrations: u64,
}

impl LoadBalancer {
    /// Create an engine with `num_processors` identical processors.
    pub fn new(num_processors: usize, config: ProcessorConfig) -> BalancerResult<Self> {
        Self::with_processor_configs(vec![config; num_processors])
    }

    /// Create an engine with one processor per supplied config, allowing
    /// per-processor speed and queue-limit overrides.
    pub fn with_processor_configs(configs: Vec<ProcessorConfig>) -> BalancerResult<Self> {
        if configs.is_empty() {
            return Err(BalancerError::InvalidConfiguration(
                "at least one processor is required".to_string(),
            ));
        }
        for config in &configs {
            config.validate()?;
        }

        Ok(Self {
            processors: configs
                .into_iter()
                .enumerate()
                .map(|(id, config)| Processor::new(id, config))
                .collect(),
            task_counter: 0,
            started_at: Instant::now(),
            total_tasks: 0,
            completed_tasks: 0,
            load_balance_count: 0,
            total_migrations: 0,
        })
    }

    /// Mint a new task with the next id. The task is not yet attached to
    /// any processor; offer it to the pool with [`assign_task`].
    ///
    /// Fails with [`BalancerError::InvalidWorkload`] when `workload` is
    /// not a positive, finite value.
    ///
    /// [`assign_task`]: LoadBalancer::assign_task
    pub fn create_task(&mut self, workload: f64, priority: i32) -> BalancerResult<Task> {
        if !workload.is_finite() || workload <= 0.0 {
            return Err(BalancerError::InvalidWorkload(workload));
        }

        let task = Task::new(self.task_counter, workload, priority);
        self.task_counter += 1;
        self.total_tasks += 1;
        Ok(task)
    }

    /// Place `task` on the least-loaded processor that still has queue
    /// capacity. Ties are broken by the lowest processor index.
    pub fn assign_task(&mut self, mut task: Task) -> AssignOutcome {
        let mut target: Option<ProcessorId> = None;
        for (idx, processor) in self.processors.iter().enumerate() {
            if !processor.has_capacity() {
                continue;
            }
            // Strict less-than keeps the first occurrence of the minimum.
            match target {
                Some(best) if processor.current_load >= self.processors[best].current_load => {}
                _ => target = Some(idx),
            }
        }

        let Some(idx) = target else {
            debug!(task = task.id, "no processor has capacity; task rejected");
            return AssignOutcome::Rejected(task);
        };

        task.assigned_processor = Some(idx);
        debug!(
            task = task.id,
            workload = task.workload,
            processor = idx,
            "task assigned"
        );

        let processor = &mut self.processors[idx];
        processor.current_load += task.workload;
        processor.queue.push_back(task);
        processor.classify();

        AssignOutcome::Assigned(idx)
    }

    /// Run one rebalancing pass and return the number of migrations.
    ///
    /// Thresholds are recomputed from the current load distribution:
    /// processors above mean + std dev are overloaded, processors below
    /// mean - std dev (with spare capacity) are underloaded. Every
    /// overloaded processor donates its highest-priority queued task to
    /// each underloaded target in index order, so a single donor can
    /// shed one task per target within one call.
    pub fn rebalance(&mut self) -> usize {
        let loads = self.processor_loads();
        let mu = mean(&loads);
        let sigma = population_std_dev(&loads, mu);
        let upper = mu + sigma;
        let lower = mu - sigma;

        let overloaded: Vec<ProcessorId> = (0..self.processors.len())
            .filter(|&i| loads[i] > upper)
            .collect();
        let underloaded: Vec<ProcessorId> = (0..self.processors.len())
            .filter(|&i| loads[i] < lower && self.processors[i].has_capacity())
            .collect();

        if !overloaded.is_empty() && !underloaded.is_empty() {
            self.load_balance_count += 1;
        }

        let mut migrations = 0;
        for &over in &overloaded {
            for &under in &underloaded {
                if self.processors[over].queue.is_empty() {
                    continue;
                }
                // The set was capacity-filtered up front, but earlier
                // migrations in this same pass may have filled the target.
                if !self.processors[under].has_capacity() {
                    continue;
                }
                self.migrate(over, under);
                migrations += 1;
            }
        }

        debug!(
            mean = mu,
            std_dev = sigma,
            overloaded = overloaded.len(),
            underloaded = underloaded.len(),
            migrations,
            "rebalance pass complete"
        );

        migrations
    }

    /// Move the donor's highest-priority task to `under`, transferring
    /// its workload between the two load accumulators.
    fn migrate(&mut self, over: ProcessorId, under: ProcessorId) {
        // First occurrence of the maximum priority wins, preserving
        // queue order among equal priorities.
        let mut victim_idx = 0;
        for (i, task) in self.processors[over].queue.iter().enumerate() {
            if task.priority > self.processors[over].queue[victim_idx].priority {
                victim_idx = i;
            }
        }

        let mut task = self.processors[over]
            .queue
            .remove(victim_idx)
            .expect("victim index is in bounds");
        self.processors[over].current_load -= task.workload;
        self.processors[over].classify();

        task.assigned_processor = Some(under);
        task.migration_count += 1;
        self.total_migrations += 1;

        debug!(
            task = task.id,
            priority = task.priority,
            from = over,
            to = under,
            "task migrated"
        );

        let target = &mut self.processors[under];
        target.current_load += task.workload;
        target.queue.push_back(task);
        target.classify();
    }

    /// Advance the simulation by one tick.
    ///
    /// For each processor in index order: record load and queue-length
    /// history samples, refresh the state classification, and complete
    /// the task at the head of the queue (FIFO, regardless of priority).
    /// Finished tasks are stamped and handed back to the caller; the
    /// caller usually just drops them.
    pub fn advance_tick(&mut self) -> Vec<Task> {
        let mut finished = Vec::new();

        for processor in &mut self.processors {
            processor.load_history.push(processor.current_load);
            processor
                .queue_length_history
                .push(processor.queue.len() as f64);
            processor.classify();

            if let Some(mut task) = processor.queue.pop_front() {
                let processing_time = processor.estimated_processing_time(&task);
                processor.total_processing_time += processing_time;
                processor.completed_tasks += 1;
                self.completed_tasks += 1;
                task.completed_at = Some(Instant::now());
                finished.push(task);
            }
        }

        finished
    }

    /// Aggregate a read-only snapshot of the run so far.
    pub fn statistics(&self) -> StatisticsSnapshot {
        let avg_processing_time = if self.completed_tasks > 0 {
            let totals: Vec<f64> = self
                .processors
                .iter()
                .map(|p| p.total_processing_time)
                .collect();
            mean(&totals)
        } else {
            0.0
        };

        StatisticsSnapshot {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            load_balance_count: self.load_balance_count,
            total_migrations: self.total_migrations,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
            avg_processing_time,
            processors: self
                .processors
                .iter()
                .map(|p| ProcessorStats {
                    id: p.id,
                    state: p.state,
                    completed_tasks: p.completed_tasks,
                    avg_load: p.load_history.mean(),
                    avg_queue_length: p.queue_length_history.mean(),
                })
                .collect(),
        }
    }

    /// Current load of every processor, in index order.
    pub fn processor_loads(&self) -> Vec<f64> {
        self.processors.iter().map(|p| p.current_load).collect()
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn total_tasks(&self) -> u64 {
        self.total_tasks
    }

    pub fn completed_tasks(&self) -> u64 {
        self.completed_tasks
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N, not N-1).
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
