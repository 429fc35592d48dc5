/// A trait for types that can be stepped using their derivative.
///
/// Implementing this trait enables generic integrators to work with the type
/// by stepping it via `derivative * delta`, where the derivative is taken with
/// respect to `Delta`. Higher-order integrators chain several calls, so the
/// step must be linear in `derivative * delta`.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping with a derivative and step size.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Angle(f64);
    struct Rate(f64);

    impl StepIntegrable<f64> for Angle {
        type Derivative = Rate;

        fn step(&self, derivative: Rate, delta: f64) -> Self {
            Angle(self.0 + derivative.0 * delta)
        }
    }

    #[derive(Debug, PartialEq)]
    struct Rates([f64; 3]);
    struct Accelerations([f64; 3]);

    impl StepIntegrable<f64> for Rates {
        type Derivative = Accelerations;

        fn step(&self, derivative: Accelerations, delta: f64) -> Self {
            let mut next = self.0;
            for (value, rate) in next.iter_mut().zip(derivative.0) {
                *value += rate * delta;
            }
            Rates(next)
        }
    }

    #[test]
    fn step_scalar_state() {
        let next = Angle(0.5).step(Rate(2.0), 0.25);
        assert_eq!(next, Angle(1.0));
    }

    #[test]
    fn step_vector_state() {
        let next = Rates([1.0, 2.0, 3.0]).step(Accelerations([0.1, 0.2, 0.3]), 10.0);
        assert_eq!(next, Rates([2.0, 4.0, 6.0]));
    }

    #[test]
    fn chained_steps_compose_linearly() {
        let direct = Angle(1.0).step(Rate(3.0), 0.5);
        let chained = Angle(1.0).step(Rate(3.0), 0.25).step(Rate(3.0), 0.25);
        assert_eq!(direct, chained);
    }
}
