//! Solvers for ODE problems that step a model forward in time.
//!
//! # Solvers
//!
//! - [`rk4`] — classical fixed-step fourth-order Runge–Kutta

pub mod rk4;
