//! The driver loop.
//!
//! Feeds the engine one tick at a time: randomized task arrival, periodic
//! rebalancing, then a processing tick. Randomness comes only from the
//! caller-supplied generator, so a fixed seed reproduces a run exactly.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use loadsim_core::{AssignOutcome, LoadBalancer};

/// Parameters for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Stop once this many tasks have been created.
    pub task_budget: u64,
    /// Chance of a new task arriving on any given tick, in (0, 1].
    pub arrival_probability: f64,
    /// Run a rebalancing pass every this many ticks.
    pub rebalance_interval: u64,
    /// Optional pacing sleep per tick; zero runs flat out.
    pub tick_ms: u64,
}

/// What happened over the run, beyond what the engine itself tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub ticks: u64,
    /// Tasks dropped because no processor had queue capacity.
    pub rejected_tasks: u64,
}

/// Drive `balancer` until its task budget is spent.
///
/// Rejected tasks are dropped after logging, matching the engine's
/// drop-on-reject policy; they still count against the budget.
pub fn run(
    balancer: &mut LoadBalancer,
    opts: &SimulationOptions,
    rng: &mut impl Rng,
) -> anyhow::Result<SimulationOutcome> {
    let mut tick: u64 = 0;
    let mut rejected_tasks: u64 = 0;

    while balancer.total_tasks() < opts.task_budget {
        if rng.r#gen::<f64>() < opts.arrival_probability {
            let workload = rng.gen_range(0.1..1.0);
            let task = balancer.create_task(workload, 0)?;
            match balancer.assign_task(task) {
                AssignOutcome::Assigned(processor) => {
                    debug!(tick, processor, workload, "task assigned");
                }
                AssignOutcome::Rejected(task) => {
                    rejected_tasks += 1;
                    warn!(tick, task = task.id, "pool saturated, dropping task");
                }
            }
        }

        if tick % opts.rebalance_interval == 0 {
            let migrations = balancer.rebalance();
            debug!(
                tick,
                migrations,
                loads = ?balancer.processor_loads(),
                "rebalance checkpoint"
            );
        }

        balancer.advance_tick();

        if opts.tick_ms > 0 {
            std::thread::sleep(Duration::from_millis(opts.tick_ms));
        }
        tick += 1;
    }

    Ok(SimulationOutcome {
        ticks: tick,
        rejected_tasks,
    })
}
