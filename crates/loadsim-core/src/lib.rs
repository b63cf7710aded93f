//! loadsim-core — a dynamic load-balancing simulation engine.
//!
//! Models the distribution of discrete tasks across a fixed pool of
//! processors: least-loaded assignment with bounded queues, periodic
//! threshold-based rebalancing via task migration, one-task-per-processor
//! tick processing, and aggregate statistics.
//!
//! # Architecture
//!
//! ```text
//! LoadBalancer
//!   ├── Vec<Processor> (fixed pool, index-ordered)
//!   │     ├── VecDeque<Task> (bounded FIFO queue)
//!   │     └── RollingHistory x2 (load, queue length)
//!   └── run counters (tasks, completions, migrations)
//! ```
//!
//! The engine is synchronous and performs no I/O: an external driver
//! decides when tasks arrive, when to rebalance, and how fast the
//! simulated clock ticks. See the `loadsim` binary for the reference
//! driver loop.

pub mod balancer;
pub mod error;
pub mod history;
pub mod processor;
pub mod stats;
pub mod task;

pub use balancer::{AssignOutcome, LoadBalancer};
pub use error::{BalancerError, BalancerResult};
pub use history::{HISTORY_CAPACITY, RollingHistory};
pub use processor::{Processor, ProcessorConfig, ProcessorId, ProcessorState};
pub use stats::{ProcessorStats, StatisticsSnapshot};
pub use task::{Task, TaskId};
