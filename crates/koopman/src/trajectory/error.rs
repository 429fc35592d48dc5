use spindle_solvers::transient::rk4;
use thiserror::Error;

use crate::PolicyError;

/// Errors raised while simulating a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("feedback policy failed in trajectory {index}")]
    Policy {
        index: usize,
        #[source]
        source: PolicyError,
    },

    #[error("integration failed in trajectory {index}")]
    Integration {
        index: usize,
        #[source]
        source: rk4::Error,
    },
}

impl TrajectoryError {
    /// Returns the index of the trajectory that failed.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Policy { index, .. } | Self::Integration { index, .. } => *index,
        }
    }
}
