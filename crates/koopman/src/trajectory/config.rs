use std::f64::consts::PI;

use uom::si::{f64::Time, time::second};

use crate::ConfigError;

/// Seed of the reference detumbling experiment.
pub const DEFAULT_SEED: u64 = 7899;

/// Guards `ceil(duration / dt)` against round-off when `dt` divides `duration`.
const SAMPLE_GUARD: f64 = 1e-9;

/// Configuration for a batch of simulated trajectories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    count: usize,
    duration: Time,
    dt: Time,
    seed: u64,
    omega_bound: f64,
}

impl TrajectoryConfig {
    /// Creates a config for `count` trajectories of length `duration`
    /// sampled every `dt`.
    ///
    /// The seed defaults to [`DEFAULT_SEED`] and initial angular velocities
    /// are drawn from `[−0.2π, 0.2π]` rad/s on each axis.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `count` is zero, if `duration` or `dt` is
    /// not finite and positive, or if `dt` exceeds `duration`.
    pub fn new(count: usize, duration: Time, dt: Time) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::TrajectoryCount);
        }

        let duration_s = duration.get::<second>();
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(ConfigError::Duration);
        }

        let dt_s = dt.get::<second>();
        if !dt_s.is_finite() || dt_s <= 0.0 || dt_s > duration_s {
            return Err(ConfigError::TimeStep);
        }

        Ok(Self {
            count,
            duration,
            dt,
            seed: DEFAULT_SEED,
            omega_bound: 0.2 * PI,
        })
    }

    /// Sets the base seed.
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Sets the per-axis bound on initial angular velocity, in rad/s.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OmegaBound`] unless `bound` is finite and non-negative.
    pub fn omega_bound(self, bound: f64) -> Result<Self, ConfigError> {
        if !bound.is_finite() || bound < 0.0 {
            return Err(ConfigError::OmegaBound);
        }
        Ok(Self {
            omega_bound: bound,
            ..self
        })
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn duration(&self) -> Time {
        self.duration
    }

    #[must_use]
    pub fn dt(&self) -> Time {
        self.dt
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn bound(&self) -> f64 {
        self.omega_bound
    }

    /// Number of samples per trajectory, one for each `t = k·dt < duration`.
    #[must_use]
    pub fn samples(&self) -> usize {
        let ratio = self.duration.get::<second>() / self.dt.get::<second>();
        (ratio - SAMPLE_GUARD).ceil() as usize
    }

    /// Seed for trajectory `index`, independent of generation order.
    #[must_use]
    pub fn trajectory_seed(&self, index: usize) -> u64 {
        self.seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}
