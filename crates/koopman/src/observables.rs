use nalgebra::{DMatrix, SVector, Vector3};

/// Number of observables in the dictionary.
pub const DIM: usize = 9;

/// The quadratic-monomial dictionary evaluated at an angular velocity.
///
/// Entries are ordered `[ωx, ωy, ωz, ωx², ωxωy, ωxωz, ωy², ωyωz, ωz²]`: the
/// linear terms followed by the upper triangle of `ω·ωᵀ`, row by row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observables(SVector<f64, DIM>);

impl Observables {
    /// Lifts an angular velocity into observable space.
    #[must_use]
    pub fn lift(omega: &Vector3<f64>) -> Self {
        let [x, y, z] = [omega.x, omega.y, omega.z];
        Self(SVector::from([
            x,
            y,
            z,
            x * x,
            x * y,
            x * z,
            y * y,
            y * z,
            z * z,
        ]))
    }

    #[must_use]
    pub fn vector(&self) -> &SVector<f64, DIM> {
        &self.0
    }

    /// Returns the linear part, which is the angular velocity itself.
    #[must_use]
    pub fn omega(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).into_owned()
    }
}

/// Lifts every column of a `3 × N` matrix into a `9 × N` matrix.
///
/// # Panics
///
/// Panics if `states` does not have three rows.
#[must_use]
pub fn lift_columns(states: &DMatrix<f64>) -> DMatrix<f64> {
    assert_eq!(states.nrows(), 3, "states must have three rows");

    let mut lifted = DMatrix::zeros(DIM, states.ncols());
    for (j, column) in states.column_iter().enumerate() {
        let omega = Vector3::new(column[0], column[1], column[2]);
        lifted.set_column(j, Observables::lift(&omega).vector());
    }
    lifted
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::dmatrix;

    #[test]
    fn lifts_to_quadratic_monomials() {
        let lifted = Observables::lift(&Vector3::new(1.0, 2.0, 3.0));

        assert_eq!(
            lifted.vector().as_slice(),
            &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0]
        );
        assert_eq!(lifted.omega(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn lifting_is_deterministic() {
        let omega = Vector3::new(0.3, -0.7, 0.11);
        assert_eq!(Observables::lift(&omega), Observables::lift(&omega));
    }

    #[test]
    fn lifts_matrix_columns() {
        let states = dmatrix![1.0, 0.0; 0.0, -2.0; 0.0, 0.5];
        let lifted = lift_columns(&states);

        assert_eq!(lifted.shape(), (DIM, 2));
        assert_eq!(lifted.column(0).as_slice(), &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(lifted.column(1).as_slice(), &[0.0, -2.0, 0.5, 0.0, 0.0, 0.0, 4.0, -1.0, 0.25]);
    }
}
