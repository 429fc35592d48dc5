use spindle_core::Observer;

use crate::traits::CanStopEarly;

/// Stops an operation once it has emitted a fixed number of events.
///
/// Works with any operation whose action type implements [`CanStopEarly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopAfter {
    limit: usize,
    seen: usize,
}

impl StopAfter {
    /// Creates an observer that stops on the `limit`-th event.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit, seen: 0 }
    }

    /// Returns the number of events observed so far.
    #[must_use]
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl<E, A: CanStopEarly> Observer<E, A> for StopAfter {
    fn observe(&mut self, _event: &E) -> Option<A> {
        self.seen += 1;
        (self.seen >= self.limit).then(A::stop_early)
    }
}

impl<E, A: CanStopEarly> Observer<E, A> for &mut StopAfter {
    fn observe(&mut self, event: &E) -> Option<A> {
        <StopAfter as Observer<E, A>>::observe(&mut **self, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::{DMatrix, DVector};
    use spindle_solvers::sdp::{Lmi, Problem, Status, barrier};

    #[test]
    fn stops_barrier_solver_after_limit() {
        let lmi = Lmi::from_affine("x >= 1", 1, |x| DMatrix::from_element(1, 1, x[0] - 1.0))
            .unwrap();
        let problem = Problem::minimize(DVector::from_element(1, 1.0))
            .and_then(|p| p.subject_to(lmi))
            .unwrap();

        let mut observer = StopAfter::new(2);
        let solution = barrier::solve(&problem, &barrier::Config::default(), &mut observer);

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(observer.seen(), 2);
    }
}
