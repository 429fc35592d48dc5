use super::{Problem, Solution};

/// A solver that accepts an SDP [`Problem`] and reports a [`Solution`].
///
/// Solver outcomes (optimal, infeasible, unbounded, ...) are reported through
/// [`Solution::status`]. The `Err` path is reserved for the backend itself
/// failing to run, such as rejecting the problem data during setup.
pub trait Backend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Solves the problem.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the backend cannot process the problem.
    fn solve(&self, problem: &Problem) -> Result<Solution, Self::Error>;
}

impl<B: Backend + ?Sized> Backend for &B {
    type Error = B::Error;

    fn solve(&self, problem: &Problem) -> Result<Solution, Self::Error> {
        (**self).solve(problem)
    }
}
