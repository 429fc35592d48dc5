use nalgebra::{DMatrix, DVector};

/// Indicates how an SDP solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Converged to the requested tolerance.
    Optimal,

    /// Converged to a reduced accuracy only.
    ///
    /// The barrier backend reports this when a centering runs out of Newton
    /// steps or line-search progress after the gap bound is already within
    /// its inexact tolerance; Clarabel reports it as `AlmostSolved`. The
    /// point is feasible and usable, with a looser optimality guarantee.
    OptimalInexact,

    /// No strictly feasible point exists.
    Infeasible,

    /// The objective decreases without bound over the feasible set.
    Unbounded,

    /// Reached the iteration limit before reaching any accuracy target.
    IterationLimit,

    /// The solver hit a numerical breakdown.
    NumericalError,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

impl Status {
    /// Returns `true` for [`Status::Optimal`] and [`Status::OptimalInexact`].
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Optimal | Self::OptimalInexact)
    }
}

/// Per-constraint detail attached to a solution.
#[derive(Debug, Clone)]
pub struct ConstraintReport {
    /// The constraint label given when the problem was built.
    pub label: String,

    /// Smallest eigenvalue of `F(x)` at the reported point.
    ///
    /// Negative values identify violated constraints.
    pub min_eigenvalue: f64,

    /// Dual matrix estimate, when the backend provides one.
    pub dual: Option<DMatrix<f64>>,
}

/// The result of an SDP solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// How the solver terminated.
    pub status: Status,

    /// The final iterate.
    ///
    /// Only meaningful when [`Status::is_success`] is `true`; for an
    /// infeasible problem it is the least-violating point the solver found.
    pub x: DVector<f64>,

    /// Objective value `cᵀx` at the final iterate.
    pub objective: f64,

    /// Iteration count reported by the backend.
    pub iterations: usize,

    /// One report per constraint, in problem order.
    pub constraints: Vec<ConstraintReport>,
}

impl Solution {
    /// Returns the reports of constraints violated by more than `tol`.
    pub fn violated(&self, tol: f64) -> impl Iterator<Item = &ConstraintReport> {
        self.constraints
            .iter()
            .filter(move |report| report.min_eigenvalue < -tol)
    }
}
