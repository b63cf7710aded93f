//! loadsim — drive the load-balancing simulation from the command line.
//!
//! ```text
//! loadsim --processors 4 --tasks 200 --arrival-probability 0.6 --seed 7
//! ```
//!
//! The binary owns everything the engine deliberately does not: parameter
//! handling, the seeded arrival process, tick pacing, and the final
//! statistics report (human-readable or `--json`).

mod sim;

use anyhow::bail;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use loadsim_core::{LoadBalancer, ProcessorConfig, StatisticsSnapshot};

use crate::sim::{SimulationOptions, SimulationOutcome};

#[derive(Parser)]
#[command(name = "loadsim", about = "Dynamic load-balancing simulator")]
struct Cli {
    /// Number of processors in the pool.
    #[arg(long, default_value_t = 4)]
    processors: usize,

    /// Total number of tasks to create before stopping.
    #[arg(long, default_value_t = 100)]
    tasks: u64,

    /// Probability of a new task arriving on each tick (0 < p <= 1).
    #[arg(long, default_value_t = 0.5)]
    arrival_probability: f64,

    /// Ticks between rebalancing passes.
    #[arg(long, default_value_t = 10)]
    rebalance_interval: u64,

    /// Work units each processor completes per time unit.
    #[arg(long, default_value_t = 1.0)]
    processing_speed: f64,

    /// Maximum queue length per processor.
    #[arg(long, default_value_t = 20)]
    queue_limit: usize,

    /// RNG seed; the same seed reproduces the same run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Sleep this many milliseconds per tick (0 = run flat out).
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,

    /// Print the final statistics as pretty JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    if !(cli.arrival_probability > 0.0 && cli.arrival_probability <= 1.0) {
        bail!(
            "arrival probability must be in (0, 1], got {}",
            cli.arrival_probability
        );
    }
    if cli.rebalance_interval == 0 {
        bail!("rebalance interval must be at least 1 tick");
    }

    let config = ProcessorConfig {
        processing_speed: cli.processing_speed,
        queue_size_limit: cli.queue_limit,
    };
    let mut balancer = LoadBalancer::new(cli.processors, config)?;

    let opts = SimulationOptions {
        task_budget: cli.tasks,
        arrival_probability: cli.arrival_probability,
        rebalance_interval: cli.rebalance_interval,
        tick_ms: cli.tick_ms,
    };

    info!(
        processors = cli.processors,
        tasks = cli.tasks,
        arrival_probability = cli.arrival_probability,
        seed = cli.seed,
        "simulation starting"
    );

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let outcome = sim::run(&mut balancer, &opts, &mut rng)?;

    let stats = balancer.statistics();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_report(&stats, &outcome);
    }

    Ok(())
}

fn print_report(stats: &StatisticsSnapshot, outcome: &SimulationOutcome) {
    println!("=== Simulation complete ===");
    println!("ticks:               {}", outcome.ticks);
    println!("tasks created:       {}", stats.total_tasks);
    println!("tasks completed:     {}", stats.completed_tasks);
    println!("tasks rejected:      {}", outcome.rejected_tasks);
    println!("rebalance passes:    {}", stats.load_balance_count);
    println!("migrations:          {}", stats.total_migrations);
    println!("elapsed:             {:.3}s", stats.elapsed_secs);
    println!("avg processing time: {:.3}", stats.avg_processing_time);
    println!();
    println!("{:>4}  {:>10}  {:>9}  {:>8}  {:>9}", "proc", "state", "completed", "avg load", "avg queue");
    for p in &stats.processors {
        println!(
            "{:>4}  {:>10}  {:>9}  {:>8.3}  {:>9.2}",
            p.id, p.state, p.completed_tasks, p.avg_load, p.avg_queue_length
        );
    }
}
