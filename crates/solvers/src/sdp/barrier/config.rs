use thiserror::Error;

/// Configuration for the barrier solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    tolerance: f64,
    max_outer_iters: usize,
    max_newton_iters: usize,
    growth: f64,
}

/// Errors that can occur when validating a barrier solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tolerance must be finite and positive")]
    Tolerance,

    #[error("iteration limits must be at least one")]
    Iterations,

    #[error("barrier growth factor must be finite and greater than one")]
    Growth,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-4, 60, 200).unwrap()
    }
}

impl Config {
    /// Creates a new config with a validated duality-gap tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is not positive and finite, or if
    /// either iteration limit is zero.
    pub fn new(
        tolerance: f64,
        max_outer_iters: usize,
        max_newton_iters: usize,
    ) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Tolerance);
        }
        if max_outer_iters == 0 || max_newton_iters == 0 {
            return Err(ConfigError::Iterations);
        }

        Ok(Self {
            tolerance,
            max_outer_iters,
            max_newton_iters,
            growth: 20.0,
        })
    }

    /// Sets the factor by which the barrier weight grows per outer iteration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Growth`] unless `growth` is finite and above one.
    pub fn with_growth(mut self, growth: f64) -> Result<Self, ConfigError> {
        if !growth.is_finite() || growth <= 1.0 {
            return Err(ConfigError::Growth);
        }
        self.growth = growth;
        Ok(self)
    }

    /// Returns the duality-gap tolerance for [`Status::Optimal`].
    ///
    /// [`Status::Optimal`]: crate::sdp::Status::Optimal
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the duality-gap tolerance for [`Status::OptimalInexact`].
    ///
    /// [`Status::OptimalInexact`]: crate::sdp::Status::OptimalInexact
    #[must_use]
    pub fn inexact_tolerance(&self) -> f64 {
        self.tolerance * 100.0
    }

    /// Returns the maximum number of outer (barrier weight) iterations per phase.
    #[must_use]
    pub fn max_outer_iters(&self) -> usize {
        self.max_outer_iters
    }

    /// Returns the maximum number of Newton iterations per centering.
    #[must_use]
    pub fn max_newton_iters(&self) -> usize {
        self.max_newton_iters
    }

    /// Returns the barrier weight growth factor.
    #[must_use]
    pub fn growth(&self) -> f64 {
        self.growth
    }
}
