//! Engine error types.

use thiserror::Error;

/// Errors that can occur while constructing or feeding the engine.
///
/// Assignment rejection is deliberately not represented here: a full pool
/// is an expected policy outcome, returned through
/// [`AssignOutcome::Rejected`](crate::balancer::AssignOutcome), not an error.
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid workload: {0} (must be a positive, finite value)")]
    InvalidWorkload(f64),
}

pub type BalancerResult<T> = Result<T, BalancerError>;
