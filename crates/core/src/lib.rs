//! Core traits and types for the Spindle workspace.
//!
//! This crate defines the shared abstractions that integrators, estimators,
//! synthesizers, and observers build on:
//!
//! - [`Model`] — a callable that maps a typed input to a typed output
//! - [`Snapshot`] — a captured input/output pair from a model call
//! - [`Observer`] — receives events and optionally returns control actions
//! - [`OdeProblem`] — adapts a model to generic time integrators
//! - [`StepIntegrable`] — a state that can be stepped by its derivative

mod model;
mod observer;
mod problems;
mod step;

pub use observer::Observer;
pub use problems::OdeProblem;
pub use step::{DerivativeOf, StepIntegrable};
pub use {model::Model, model::Snapshot};
