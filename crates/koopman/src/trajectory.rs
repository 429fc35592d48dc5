//! Randomized trajectory generation.
//!
//! Each trajectory starts from a uniformly random angular velocity and runs a
//! feedback policy in a sample-and-hold loop:
//!
//! ```text
//! for k in 0..samples:
//!     record ω_k
//!     τ_k = policy(g(ω_k))
//!     record τ_k
//!     ω_{k+1} = rk4(ω_k, τ_k, dt)
//! ```
//!
//! Trajectory `i` uses its own generator seeded from `(seed, i)`, so results
//! do not depend on the order in which trajectories are simulated.
//!
//! # Observer Events
//!
//! [`generate`] emits [`Event::Started`] once and then
//! [`Event::TrajectoryCompleted`] after each trajectory is appended to the
//! dataset. Observers can return [`Action::StopEarly`] to halt; trajectories
//! completed so far are kept.

mod action;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use config::{DEFAULT_SEED, TrajectoryConfig};
pub use error::TrajectoryError;
pub use event::Event;
pub use solution::{Solution, Status};

use nalgebra::Vector3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use spindle_core::Observer;
use uom::si::{f64::Time, time::second};

use crate::{ConfigError, DatasetBuilder, FeedbackPolicy, Inertia, Observables, RigidBody};

/// A sampled angular velocity and torque history.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dt: Time,
    omega: Vec<Vector3<f64>>,
    torque: Vec<Vector3<f64>>,
}

impl Trajectory {
    /// Creates a trajectory from samples taken every `dt`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SampleCount`] if `omega` and `torque` have
    /// different lengths.
    pub fn new(
        dt: Time,
        omega: Vec<Vector3<f64>>,
        torque: Vec<Vector3<f64>>,
    ) -> Result<Self, ConfigError> {
        if omega.len() != torque.len() {
            return Err(ConfigError::SampleCount {
                omega: omega.len(),
                torque: torque.len(),
            });
        }
        Ok(Self { dt, omega, torque })
    }

    #[must_use]
    pub fn dt(&self) -> Time {
        self.dt
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// Angular velocity at each sample, in rad/s.
    #[must_use]
    pub fn omega(&self) -> &[Vector3<f64>] {
        &self.omega
    }

    /// Torque applied over each sample interval, in N·m.
    #[must_use]
    pub fn torque(&self) -> &[Vector3<f64>] {
        &self.torque
    }

    /// Sample times `k·dt` in seconds.
    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        let dt = self.dt.get::<second>();
        (0..self.len()).map(|k| k as f64 * dt).collect()
    }
}

/// Simulates trajectory `index` of a batch.
///
/// # Errors
///
/// Returns an error if the policy cannot produce a torque or the dynamics
/// become non-finite.
pub fn simulate<P: FeedbackPolicy>(
    index: usize,
    config: &TrajectoryConfig,
    inertia: &Inertia,
    policy: &P,
) -> Result<Trajectory, TrajectoryError> {
    let mut rng = StdRng::seed_from_u64(config.trajectory_seed(index));
    let bound = config.bound();
    let initial = Vector3::from_fn(|_, _| rng.gen_range(-bound..=bound));

    let samples = config.samples();
    let mut body = RigidBody::new(*inertia, initial);
    let mut omega = Vec::with_capacity(samples);
    let mut torque = Vec::with_capacity(samples);

    for _ in 0..samples {
        let current = body.omega();
        omega.push(current);

        let tau = policy
            .torque(&Observables::lift(&current), &mut rng)
            .map_err(|source| TrajectoryError::Policy { index, source })?;
        torque.push(tau);

        body.step(tau, config.dt())
            .map_err(|source| TrajectoryError::Integration { index, source })?;
    }

    Ok(Trajectory {
        dt: config.dt(),
        omega,
        torque,
    })
}

/// Simulates a batch of trajectories and appends each one to `builder`.
///
/// See the [module docs](self) for the simulation loop and observer events.
///
/// # Errors
///
/// Returns the first [`TrajectoryError`]. Trajectories completed before the
/// failure have already been appended to `builder`.
pub fn generate<P, Obs>(
    config: &TrajectoryConfig,
    inertia: &Inertia,
    policy: &P,
    builder: &mut DatasetBuilder,
    mut observer: Obs,
) -> Result<Solution, TrajectoryError>
where
    P: FeedbackPolicy,
    Obs: Observer<Event, Action>,
{
    let total = config.count();
    let mut trajectories = Vec::with_capacity(total);

    let started = Event::Started {
        total,
        samples: config.samples(),
    };
    if let Some(Action::StopEarly) = observer.observe(&started) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            trajectories,
        });
    }

    for index in 0..total {
        let trajectory = simulate(index, config, inertia, policy)?;
        if let Some(status) = append(trajectory, builder, &mut trajectories, &mut observer, total) {
            return Ok(Solution {
                status,
                trajectories,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        trajectories,
    })
}

/// Simulates a batch without observation.
///
/// # Errors
///
/// Returns the first [`TrajectoryError`].
pub fn generate_unobserved<P: FeedbackPolicy>(
    config: &TrajectoryConfig,
    inertia: &Inertia,
    policy: &P,
    builder: &mut DatasetBuilder,
) -> Result<Solution, TrajectoryError> {
    generate(config, inertia, policy, builder, ())
}

/// Simulates a batch on the rayon thread pool.
///
/// Trajectories are simulated independently and then appended in index
/// order, so the dataset matches [`generate`] exactly. Observer events are
/// emitted during the ordered append.
///
/// # Errors
///
/// Returns the [`TrajectoryError`] of the lowest failing index. Nothing is
/// appended to `builder` in that case.
#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub fn generate_parallel<P, Obs>(
    config: &TrajectoryConfig,
    inertia: &Inertia,
    policy: &P,
    builder: &mut DatasetBuilder,
    mut observer: Obs,
) -> Result<Solution, TrajectoryError>
where
    P: FeedbackPolicy + Sync,
    Obs: Observer<Event, Action>,
{
    use rayon::prelude::*;

    let total = config.count();
    let started = Event::Started {
        total,
        samples: config.samples(),
    };
    if let Some(Action::StopEarly) = observer.observe(&started) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            trajectories: Vec::new(),
        });
    }

    let simulated = (0..total)
        .into_par_iter()
        .map(|index| simulate(index, config, inertia, policy))
        .collect::<Result<Vec<_>, _>>()?;

    let mut trajectories = Vec::with_capacity(total);
    for trajectory in simulated {
        if let Some(status) = append(trajectory, builder, &mut trajectories, &mut observer, total) {
            return Ok(Solution {
                status,
                trajectories,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        trajectories,
    })
}

/// Appends a finished trajectory and notifies the observer.
///
/// Returns a status when the observer asks to stop.
fn append<Obs: Observer<Event, Action>>(
    trajectory: Trajectory,
    builder: &mut DatasetBuilder,
    trajectories: &mut Vec<Trajectory>,
    observer: &mut Obs,
    total: usize,
) -> Option<Status> {
    builder.push(&trajectory);
    trajectories.push(trajectory);

    let event = Event::TrajectoryCompleted {
        index: trajectories.len() - 1,
        total,
    };
    match observer.observe(&event) {
        Some(Action::StopEarly) => Some(Status::StoppedByObserver),
        None => None,
    }
}
