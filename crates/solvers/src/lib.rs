//! Numerical solvers for the Spindle workspace.
//!
//! - [`transient`] — fixed-step time integration of [`OdeProblem`]s
//! - [`sdp`] — semidefinite programs with linear matrix inequality
//!   constraints, behind a swappable [`sdp::Backend`]
//!
//! [`OdeProblem`]: spindle_core::OdeProblem

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod sdp;
pub mod transient;
