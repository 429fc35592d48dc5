//! Extended dynamic mode decomposition.
//!
//! Fits a linear model in observable space,
//!
//! ```text
//! Y ≈ A·X + B·U
//! ```
//!
//! by least squares: stacking `Z = [X; U]`, the solution is
//! `Θ = Y·Z⁺ = [A B]` with `Z⁺` the Moore–Penrose pseudo-inverse computed
//! from an SVD.
//!
//! # Observer Events
//!
//! The estimator emits [`Event::Lifted`] once the regressor is assembled,
//! [`Event::IllConditioned`] when it is rank deficient or its condition
//! number exceeds the configured limit, and [`Event::Fitted`] on success.
//! An ill-conditioned regressor is not an error.

mod config;
mod error;
mod event;

#[cfg(test)]
mod tests;

pub use config::EstimatorConfig;
pub use error::EstimationError;
pub use event::Event;

use std::convert::Infallible;

use nalgebra::{DMatrix, DVector};
use spindle_core::Observer;

use crate::{Dataset, LiftedDataset};

/// A linear model `x⁺ = A·x + B·u` in observable space.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedModel {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
}

impl LiftedModel {
    /// Creates a model from its state and input matrices.
    ///
    /// # Errors
    ///
    /// Returns an error if `a` is not square, `b` has a different number of
    /// rows, or either matrix has non-finite entries.
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>) -> Result<Self, EstimationError> {
        if !a.is_square() || b.nrows() != a.nrows() {
            return Err(EstimationError::ModelShape {
                a: a.shape(),
                b: b.shape(),
            });
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(EstimationError::NonFinite("fitted model"));
        }
        Ok(Self { a, b })
    }

    #[must_use]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[must_use]
    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.a.nrows()
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.b.ncols()
    }

    /// One-step prediction `A·x + B·u`.
    #[must_use]
    pub fn predict(&self, x: &DVector<f64>, u: &DVector<f64>) -> DVector<f64> {
        &self.a * x + &self.b * u
    }
}

/// Numerical health of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// Number of samples `N`.
    pub samples: usize,

    /// Singular values of `Z`, in descending order.
    pub singular_values: DVector<f64>,

    /// Singular values above the pseudo-inverse cutoff.
    pub rank: usize,

    /// `σ_max / σ_min` over all `min(rows, N)` singular values.
    pub condition_number: f64,

    /// Frobenius norm of `Y − A·X − B·U`.
    pub residual: f64,

    /// Whether `Z` is rank deficient or exceeds the condition limit.
    pub ill_conditioned: bool,
}

/// A fitted model together with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub model: LiftedModel,
    pub diagnostics: Diagnostics,
}

/// Least-squares estimator of lifted linear models.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    #[must_use]
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Lifts a raw dataset through the observable dictionary and fits it.
    ///
    /// # Errors
    ///
    /// See [`Estimator::fit_lifted`].
    pub fn fit<Obs>(&self, data: &Dataset, observer: Obs) -> Result<Fit, EstimationError>
    where
        Obs: Observer<Event, Infallible>,
    {
        self.fit_lifted(&data.lift(), observer)
    }

    /// Fits `A` and `B` to data already in observable space.
    ///
    /// See the [module docs](self) for the regression and observer events.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationError::Empty`] for a dataset without samples,
    /// [`EstimationError::NonFinite`] if the data or the fitted model contain
    /// NaN or infinite values, and [`EstimationError::Pseudoinverse`] if the
    /// SVD cannot be computed.
    pub fn fit_lifted<Obs>(
        &self,
        data: &LiftedDataset,
        mut observer: Obs,
    ) -> Result<Fit, EstimationError>
    where
        Obs: Observer<Event, Infallible>,
    {
        let samples = data.len();
        if samples == 0 {
            return Err(EstimationError::Empty);
        }

        let (x, y, u) = (data.x(), data.y(), data.u());
        if [x, y, u].iter().any(|m| m.iter().any(|v| !v.is_finite())) {
            return Err(EstimationError::NonFinite("dataset"));
        }

        let states = x.nrows();
        let inputs = u.nrows();
        let rows = states + inputs;

        let mut z = DMatrix::zeros(rows, samples);
        z.rows_mut(0, states).copy_from(x);
        z.rows_mut(states, inputs).copy_from(u);

        observer.observe(&Event::Lifted {
            samples,
            states,
            inputs,
        });

        let svd = z
            .clone()
            .try_svd(true, true, f64::EPSILON, 0)
            .ok_or_else(|| EstimationError::Pseudoinverse("SVD did not converge".into()))?;

        let singular_values = svd.singular_values.clone();
        let sigma_max = singular_values.max();
        let cutoff = self.config.relative_cutoff(rows, samples) * sigma_max;
        let rank = singular_values.iter().filter(|s| **s > cutoff).count();

        let sigma_min = singular_values.min();
        let condition_number = if sigma_min > 0.0 {
            sigma_max / sigma_min
        } else {
            f64::INFINITY
        };

        let ill_conditioned =
            rank < rows || condition_number > self.config.condition_limit();
        if ill_conditioned {
            observer.observe(&Event::IllConditioned {
                rank,
                rows,
                condition: condition_number,
            });
        }

        let pinv = svd
            .pseudo_inverse(cutoff)
            .map_err(|msg| EstimationError::Pseudoinverse(msg.to_owned()))?;
        let theta = y * pinv;

        let model = LiftedModel::new(
            theta.columns(0, states).into_owned(),
            theta.columns(states, inputs).into_owned(),
        )?;

        let residual = (y - model.a() * x - model.b() * u).norm();

        observer.observe(&Event::Fitted {
            residual,
            condition: condition_number,
        });

        Ok(Fit {
            model,
            diagnostics: Diagnostics {
                samples,
                singular_values,
                rank,
                condition_number,
                residual,
                ill_conditioned,
            },
        })
    }

    /// Fits a raw dataset without observation.
    ///
    /// # Errors
    ///
    /// See [`Estimator::fit_lifted`].
    pub fn fit_unobserved(&self, data: &Dataset) -> Result<Fit, EstimationError> {
        self.fit(data, ())
    }

    /// Fits a lifted dataset without observation.
    ///
    /// # Errors
    ///
    /// See [`Estimator::fit_lifted`].
    pub fn fit_lifted_unobserved(&self, data: &LiftedDataset) -> Result<Fit, EstimationError> {
        self.fit_lifted(data, ())
    }
}
