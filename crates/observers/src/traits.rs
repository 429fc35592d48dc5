//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, enabling
//! observers to work generically across different solvers.
//!
//! # Event traits
//!
//! - [`HasResidual`] — events that carry a residual value
//! - [`HasObjective`] — events that carry an objective value
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use spindle_core::Observer;
//! use spindle_observers::traits::{CanStopEarly, HasObjective};
//!
//! struct GoodEnough {
//!     target: f64,
//! }
//!
//! impl<E: HasObjective, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.objective() < self.target).then(A::stop_early)
//!     }
//! }
//! ```

use spindle_koopman::{edmd, trajectory};
use spindle_solvers::{sdp::barrier, transient::rk4};

/// An event that carries a residual value.
pub trait HasResidual {
    /// Returns the residual for this event.
    ///
    /// Returns `f64::NAN` when the event carries no residual.
    fn residual(&self) -> f64;
}

/// An event that carries an objective value.
pub trait HasObjective {
    /// Returns the objective for this event.
    ///
    /// Returns `f64::NAN` when the event carries no objective.
    fn objective(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the operation early.
    fn stop_early() -> Self;
}

// --- HasResidual ---

impl HasResidual for edmd::Event {
    fn residual(&self) -> f64 {
        match self {
            edmd::Event::Fitted { residual, .. } => *residual,
            edmd::Event::Lifted { .. } | edmd::Event::IllConditioned { .. } => f64::NAN,
        }
    }
}

impl HasResidual for barrier::Event {
    /// The duality gap bound.
    fn residual(&self) -> f64 {
        self.gap
    }
}

// --- HasObjective ---

impl HasObjective for barrier::Event {
    fn objective(&self) -> f64 {
        self.objective
    }
}

// --- CanStopEarly impls ---

impl CanStopEarly for barrier::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for rk4::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for trajectory::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
