//! Spectral checks on open- and closed-loop lifted models.

use nalgebra::{Complex, DMatrix};
use thiserror::Error;

use crate::{LiftedModel, RobustGain};

/// Iteration cap for the real Schur decomposition.
const SCHUR_MAX_ITERS: usize = 10_000;

/// Errors raised during spectral analysis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix has NaN or infinite entries")]
    NonFinite,

    #[error("gain is {found:?}, expected {expected:?}")]
    GainShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("eigenvalue iteration did not converge")]
    NoConvergence,
}

/// The eigenvalues of a square matrix, sorted by decreasing modulus.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    eigenvalues: Vec<Complex<f64>>,
}

impl Spectrum {
    /// Computes the spectrum of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is not square, has non-finite entries,
    /// or its Schur decomposition does not converge.
    pub fn of(matrix: &DMatrix<f64>) -> Result<Self, AnalysisError> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(AnalysisError::NotSquare { rows, cols });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFinite);
        }

        let schur = matrix
            .clone()
            .try_schur(f64::EPSILON, SCHUR_MAX_ITERS)
            .ok_or(AnalysisError::NoConvergence)?;

        let mut eigenvalues: Vec<Complex<f64>> = schur.complex_eigenvalues().iter().copied().collect();
        eigenvalues.sort_by(|a, b| b.norm().total_cmp(&a.norm()));

        Ok(Self { eigenvalues })
    }

    #[must_use]
    pub fn eigenvalues(&self) -> &[Complex<f64>] {
        &self.eigenvalues
    }

    /// Largest eigenvalue modulus, or zero for an empty matrix.
    #[must_use]
    pub fn spectral_radius(&self) -> f64 {
        self.eigenvalues.first().map_or(0.0, |z| z.norm())
    }

    /// Whether every eigenvalue lies inside the unit circle, allowing `tol`
    /// of slack on its radius.
    #[must_use]
    pub fn is_schur_stable(&self, tol: f64) -> bool {
        self.spectral_radius() < 1.0 + tol
    }
}

/// Returns `A − B·K`.
///
/// # Errors
///
/// Returns [`AnalysisError::GainShape`] unless `k` is `inputs × states`.
pub fn feedback(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    k: &DMatrix<f64>,
) -> Result<DMatrix<f64>, AnalysisError> {
    let expected = (b.ncols(), a.ncols());
    if k.shape() != expected {
        return Err(AnalysisError::GainShape {
            expected,
            found: k.shape(),
        });
    }
    Ok(a - b * k)
}

/// Returns the closed-loop matrix `Alift − Blift·Kd`.
///
/// # Errors
///
/// Returns [`AnalysisError::GainShape`] if the gain does not match the model.
pub fn closed_loop(model: &LiftedModel, gain: &RobustGain) -> Result<DMatrix<f64>, AnalysisError> {
    feedback(model.a(), model.b(), &gain.k)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    #[test]
    fn rotation_has_unit_modulus_pair() {
        let theta: f64 = 0.3;
        let rotation = dmatrix![theta.cos(), -theta.sin(); theta.sin(), theta.cos()];

        let spectrum = Spectrum::of(&rotation).expect("should decompose");

        assert_eq!(spectrum.eigenvalues().len(), 2);
        assert_relative_eq!(spectrum.spectral_radius(), 1.0, epsilon = 1e-12);
        for z in spectrum.eigenvalues() {
            assert_relative_eq!(z.im.abs(), theta.sin(), epsilon = 1e-12);
        }
        assert!(spectrum.is_schur_stable(1e-9));
        assert!(!spectrum.is_schur_stable(-1e-9));
    }

    #[test]
    fn sorts_by_modulus() {
        let spectrum = Spectrum::of(&dmatrix![0.5, 0.0; 0.0, -1.5]).unwrap();
        assert_relative_eq!(spectrum.eigenvalues()[0].re, -1.5, epsilon = 1e-12);
        assert_relative_eq!(spectrum.eigenvalues()[1].re, 0.5, epsilon = 1e-12);
        assert!(!spectrum.is_schur_stable(0.0));
    }

    #[test]
    fn feedback_moves_scalar_pole() {
        let closed = feedback(&dmatrix![2.0], &dmatrix![1.0], &dmatrix![1.5]).unwrap();
        assert_relative_eq!(closed[(0, 0)], 0.5);

        let result = feedback(&dmatrix![2.0], &dmatrix![1.0], &dmatrix![1.0, 2.0]);
        assert!(matches!(result, Err(AnalysisError::GainShape { .. })));
    }

    #[test]
    fn rejects_bad_matrices() {
        assert_eq!(
            Spectrum::of(&DMatrix::zeros(2, 3)),
            Err(AnalysisError::NotSquare { rows: 2, cols: 3 })
        );
        assert_eq!(
            Spectrum::of(&dmatrix![f64::INFINITY]),
            Err(AnalysisError::NonFinite)
        );
    }
}
