use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use super::ConstraintReport;

/// Relative asymmetry tolerated before a matrix is rejected.
const SYMMETRY_TOL: f64 = 1e-10;

/// Errors raised while assembling an SDP problem.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    #[error("constraint `{label}` is {rows}x{cols}, expected a square matrix")]
    NotSquare {
        label: String,
        rows: usize,
        cols: usize,
    },

    #[error("constraint `{label}` has a {found}x{found} term, expected {expected}x{expected}")]
    SizeMismatch {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("constraint `{label}` is not symmetric (asymmetry {asymmetry:e})")]
    NotSymmetric { label: String, asymmetry: f64 },

    #[error("constraint `{label}` has non-finite entries")]
    NonFinite { label: String },

    #[error("constraint `{label}` uses {found} variables, the problem has {expected}")]
    VariableCount {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("objective has non-finite entries")]
    NonFiniteObjective,
}

/// A labelled linear matrix inequality `F₀ + Σ xᵢFᵢ ⪰ 0`.
///
/// All terms are symmetric matrices of the same size. Small asymmetries from
/// floating-point assembly are tolerated and removed by symmetrization.
#[derive(Debug, Clone)]
pub struct Lmi {
    label: String,
    constant: DMatrix<f64>,
    coefficients: Vec<DMatrix<f64>>,
}

impl Lmi {
    /// Creates an LMI from its constant term and one coefficient per variable.
    ///
    /// # Errors
    ///
    /// Returns an error if any term is non-square, differs in size from the
    /// constant, is not symmetric, or has non-finite entries.
    pub fn new(
        label: impl Into<String>,
        constant: DMatrix<f64>,
        coefficients: Vec<DMatrix<f64>>,
    ) -> Result<Self, ProblemError> {
        let label = label.into();

        let (rows, cols) = constant.shape();
        if rows != cols {
            return Err(ProblemError::NotSquare { label, rows, cols });
        }

        let constant = symmetrized(&label, constant)?;
        let coefficients = coefficients
            .into_iter()
            .map(|term| {
                if term.shape() != (rows, rows) {
                    return Err(ProblemError::SizeMismatch {
                        label: label.clone(),
                        expected: rows,
                        found: term.nrows().max(term.ncols()),
                    });
                }
                symmetrized(&label, term)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            label,
            constant,
            coefficients,
        })
    }

    /// Creates an LMI from an affine matrix-valued map of `num_vars` variables.
    ///
    /// The map is sampled at the origin to obtain `F₀` and at each unit vector
    /// `eᵢ` to obtain `Fᵢ = map(eᵢ) − F₀`. The result is exact whenever `map`
    /// is affine in `x`, which is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Lmi::new`].
    pub fn from_affine<F>(
        label: impl Into<String>,
        num_vars: usize,
        map: F,
    ) -> Result<Self, ProblemError>
    where
        F: Fn(&DVector<f64>) -> DMatrix<f64>,
    {
        let label = label.into();
        let mut x = DVector::zeros(num_vars);
        let constant = map(&x);

        let mut coefficients = Vec::with_capacity(num_vars);
        for i in 0..num_vars {
            x[i] = 1.0;
            let sampled = map(&x);
            x[i] = 0.0;

            if sampled.shape() != constant.shape() {
                return Err(ProblemError::SizeMismatch {
                    label,
                    expected: constant.nrows(),
                    found: sampled.nrows().max(sampled.ncols()),
                });
            }
            coefficients.push(sampled - &constant);
        }

        Self::new(label, constant, coefficients)
    }

    /// Returns the constraint label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the size of the (square) constraint matrix.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.constant.nrows()
    }

    /// Returns the number of decision variables the constraint is written in.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns `F₀`.
    #[must_use]
    pub fn constant(&self) -> &DMatrix<f64> {
        &self.constant
    }

    /// Returns `[F₁, …, Fₙ]`.
    #[must_use]
    pub fn coefficients(&self) -> &[DMatrix<f64>] {
        &self.coefficients
    }

    /// Evaluates `F(x)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not have [`Lmi::num_vars`] entries.
    #[must_use]
    pub fn evaluate(&self, x: &DVector<f64>) -> DMatrix<f64> {
        assert_eq!(x.len(), self.num_vars(), "variable count mismatch");

        let mut value = self.constant.clone();
        for (xi, term) in x.iter().zip(&self.coefficients) {
            if *xi != 0.0 {
                value += term * *xi;
            }
        }
        value
    }
}

/// Minimize `cᵀx` subject to a list of LMIs.
#[derive(Debug, Clone)]
pub struct Problem {
    objective: DVector<f64>,
    constraints: Vec<Lmi>,
}

impl Problem {
    /// Starts a minimization problem with objective vector `c`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::NonFiniteObjective`] if `c` has NaN or infinite entries.
    pub fn minimize(objective: DVector<f64>) -> Result<Self, ProblemError> {
        if objective.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFiniteObjective);
        }

        Ok(Self {
            objective,
            constraints: Vec::new(),
        })
    }

    /// Adds a constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::VariableCount`] if the LMI is written in a
    /// different number of variables than the objective.
    pub fn subject_to(mut self, lmi: Lmi) -> Result<Self, ProblemError> {
        if lmi.num_vars() != self.num_vars() {
            return Err(ProblemError::VariableCount {
                label: lmi.label,
                expected: self.num_vars(),
                found: lmi.coefficients.len(),
            });
        }

        self.constraints.push(lmi);
        Ok(self)
    }

    /// Returns the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Returns the objective vector `c`.
    #[must_use]
    pub fn objective(&self) -> &DVector<f64> {
        &self.objective
    }

    /// Returns the constraints in the order they were added.
    #[must_use]
    pub fn constraints(&self) -> &[Lmi] {
        &self.constraints
    }

    /// Returns the sum of all constraint sizes.
    ///
    /// This is the degree of the log-det barrier and bounds the duality gap
    /// of a centered point by `degree / t`.
    #[must_use]
    pub fn barrier_degree(&self) -> usize {
        self.constraints.iter().map(Lmi::dim).sum()
    }

    /// Evaluates `cᵀx`.
    #[must_use]
    pub fn objective_value(&self, x: &DVector<f64>) -> f64 {
        self.objective.dot(x)
    }

    /// Builds one [`ConstraintReport`] per constraint at `x`.
    ///
    /// `duals`, when given, must hold one matrix per constraint.
    #[must_use]
    pub fn report(
        &self,
        x: &DVector<f64>,
        duals: Option<Vec<DMatrix<f64>>>,
    ) -> Vec<ConstraintReport> {
        let mut duals = duals.map(Vec::into_iter);

        self.constraints
            .iter()
            .map(|lmi| {
                let min_eigenvalue = lmi.evaluate(x).symmetric_eigenvalues().min();
                ConstraintReport {
                    label: lmi.label.clone(),
                    min_eigenvalue,
                    dual: duals.as_mut().and_then(Iterator::next),
                }
            })
            .collect()
    }
}

/// Checks symmetry and finiteness, then returns `(M + Mᵀ) / 2`.
fn symmetrized(label: &str, matrix: DMatrix<f64>) -> Result<DMatrix<f64>, ProblemError> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(ProblemError::NonFinite {
            label: label.to_owned(),
        });
    }

    let scale = matrix.amax().max(1.0);
    let asymmetry = (&matrix - matrix.transpose()).amax();
    if asymmetry > SYMMETRY_TOL * scale {
        return Err(ProblemError::NotSymmetric {
            label: label.to_owned(),
            asymmetry,
        });
    }

    Ok((&matrix + matrix.transpose()) * 0.5)
}
