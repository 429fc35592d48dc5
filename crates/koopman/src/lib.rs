//! Koopman lifted models of rigid-body rotation and robust feedback synthesis.
//!
//! The crate covers one identification-and-control loop:
//!
//! 1. [`trajectory::generate`] simulates a rigid body under a
//!    [`FeedbackPolicy`] and appends the samples to a [`DatasetBuilder`].
//! 2. [`Estimator`] lifts the data through the quadratic [`Observables`]
//!    dictionary and fits a [`LiftedModel`] by least squares (EDMD).
//! 3. [`RobustGainSynthesizer`] solves a bounded-real LMI for the lifted model
//!    and recovers a [`RobustGain`].
//! 4. [`analysis`] checks the open- and closed-loop spectra.
//!
//! Every long-running step reports progress through a
//! [`spindle_core::Observer`]; nothing is printed or logged directly.

pub mod analysis;
mod dataset;
pub mod edmd;
mod error;
mod inertia;
pub mod observables;
mod policy;
pub mod rigid_body;
pub mod synthesis;
pub mod trajectory;

pub use dataset::{Dataset, DatasetBuilder, LiftedDataset};
pub use edmd::{Diagnostics, EstimationError, Estimator, EstimatorConfig, Fit, LiftedModel};
pub use error::ConfigError;
pub use inertia::Inertia;
pub use observables::Observables;
pub use policy::{ClosedLoop, Excitation, FeedbackPolicy, LiftedGain, PolicyError};
pub use rigid_body::{DynamicsError, EulerRotation, RigidBody};
pub use synthesis::{RobustGain, RobustGainSynthesizer, SynthesisConfig, SynthesisError};
pub use trajectory::{Trajectory, TrajectoryConfig, TrajectoryError};
