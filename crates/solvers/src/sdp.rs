//! Semidefinite programs with linear matrix inequality constraints.
//!
//! A [`Problem`] minimizes a linear objective `cᵀx` over real decision
//! variables `x` subject to labelled LMIs of the form
//!
//! ```text
//! F(x) = F₀ + x₁F₁ + … + xₙFₙ ⪰ 0
//! ```
//!
//! Problems are solved through the narrow [`Backend`] interface, so callers
//! that build a problem never depend on a particular solver:
//!
//! - [`barrier`] — built-in log-det barrier interior-point method
//! - [`clarabel`] — the Clarabel conic solver (feature `clarabel`)

mod backend;
mod problem;
mod solution;

pub mod barrier;

#[cfg(feature = "clarabel")]
#[cfg_attr(docsrs, doc(cfg(feature = "clarabel")))]
pub mod clarabel;

pub use backend::Backend;
pub use problem::{Lmi, Problem, ProblemError};
pub use solution::{ConstraintReport, Solution, Status};
