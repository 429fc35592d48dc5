use nalgebra::{Matrix3, Vector3};

use crate::ConfigError;

/// Relative asymmetry tolerated in an inertia matrix.
const SYMMETRY_TOL: f64 = 1e-9;

/// A validated body-frame inertia tensor in kg·m².
///
/// The matrix is finite, symmetric, and positive definite. Its inverse is
/// computed once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl Inertia {
    /// Validates an inertia matrix.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the matrix has non-finite entries, is not
    /// symmetric, or is not positive definite.
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, ConfigError> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteInertia);
        }

        let asymmetry = (matrix - matrix.transpose()).amax();
        if asymmetry > SYMMETRY_TOL * matrix.amax() {
            return Err(ConfigError::AsymmetricInertia { asymmetry });
        }

        let cholesky = matrix
            .cholesky()
            .ok_or(ConfigError::IndefiniteInertia)?;

        Ok(Self {
            matrix,
            inverse: cholesky.inverse(),
        })
    }

    /// Creates an inertia tensor from principal moments.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] unless all moments are finite and positive.
    pub fn principal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, ConfigError> {
        Self::new(Matrix3::from_diagonal(&Vector3::new(ixx, iyy, izz)))
    }

    /// Returns the inertia matrix `J`.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Returns `J⁻¹`.
    #[must_use]
    pub fn inverse(&self) -> &Matrix3<f64> {
        &self.inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn accepts_positive_definite_matrix() {
        let matrix = Matrix3::new(40.0, 1.2, 0.9, 1.2, 17.0, 1.4, 0.9, 1.4, 15.0);
        let inertia = Inertia::new(matrix).expect("should be a valid inertia");

        assert_relative_eq!(
            inertia.matrix() * inertia.inverse(),
            Matrix3::identity(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn rejects_singular_matrix() {
        let singular = Matrix3::new(1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(Inertia::new(singular), Err(ConfigError::IndefiniteInertia));
        assert_eq!(
            Inertia::principal(1.0, 0.0, 1.0),
            Err(ConfigError::IndefiniteInertia)
        );
    }

    #[test]
    fn rejects_asymmetric_matrix() {
        let skewed = Matrix3::new(2.0, 0.5, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0);
        assert!(matches!(
            Inertia::new(skewed),
            Err(ConfigError::AsymmetricInertia { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_entries() {
        assert_eq!(
            Inertia::principal(1.0, f64::NAN, 1.0),
            Err(ConfigError::NonFiniteInertia)
        );
    }
}
