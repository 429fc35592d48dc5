use std::error::Error as StdError;

use spindle_solvers::sdp::{ConstraintReport, ProblemError, Status};
use thiserror::Error;

use crate::ConfigError;

/// Errors raised while synthesizing a robust gain.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to assemble the certificate: {0}")]
    Problem(#[from] ProblemError),

    #[error("no certificate exists; violated: {}", violated(.constraints))]
    Infeasible { constraints: Vec<ConstraintReport> },

    #[error("certificate problem is unbounded")]
    Unbounded,

    #[error("solver did not converge (status {status:?})")]
    NumericFailure { status: Status },

    #[error("certificate matrix Pd is not invertible")]
    SingularCertificate,

    #[error("recovered gain has NaN or infinite entries")]
    NonFinite,

    #[error("solver backend failed: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

fn violated(constraints: &[ConstraintReport]) -> String {
    let labels: Vec<&str> = constraints
        .iter()
        .filter(|report| report.min_eigenvalue < 0.0)
        .map(|report| report.label.as_str())
        .collect();

    if labels.is_empty() {
        "none at the returned point".to_owned()
    } else {
        labels.join(", ")
    }
}
