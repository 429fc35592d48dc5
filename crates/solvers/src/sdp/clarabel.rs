//! [Clarabel](https://clarabel.org) as an SDP [`Backend`].
//!
//! Each LMI becomes one `PSDTriangleConeT` block. Clarabel solves
//! `min cᵀx` subject to `A·x + s = b` with `s` in the cone, so for
//! `F(x) = F₀ + Σ xᵢFᵢ ⪰ 0` the block rows are `b = svec(F₀)` and
//! `A[:, i] = −svec(Fᵢ)`, where `svec` stacks the upper triangle column by
//! column and scales off-diagonal entries by `√2`.

use std::f64::consts::SQRT_2;

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT::PSDTriangleConeT,
};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::sdp::{Backend, Problem, Solution, Status};

/// Errors raised while handing a problem to Clarabel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid Clarabel settings: {0}")]
    Settings(String),

    #[error("Clarabel rejected the problem: {0}")]
    Setup(String),
}

/// Clarabel interior-point backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clarabel {
    tolerance: f64,
    max_iter: u32,
}

impl Default for Clarabel {
    /// Matches the barrier backend's gap tolerance of `1e-4`.
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iter: 200,
        }
    }
}

impl Clarabel {
    /// Creates a backend with the given gap/feasibility tolerance and iteration limit.
    #[must_use]
    pub fn new(tolerance: f64, max_iter: u32) -> Self {
        Self {
            tolerance,
            max_iter,
        }
    }
}

impl Backend for Clarabel {
    type Error = Error;

    fn solve(&self, problem: &Problem) -> Result<Solution, Self::Error> {
        let n = problem.num_vars();

        let mut cones = Vec::with_capacity(problem.constraints().len());
        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut b = Vec::new();

        for lmi in problem.constraints() {
            let offset = b.len();
            b.extend(svec(lmi.constant()));

            for (i, term) in lmi.coefficients().iter().enumerate() {
                for (row, value) in svec(term).into_iter().enumerate() {
                    if value != 0.0 {
                        columns[i].push((offset + row, -value));
                    }
                }
            }

            cones.push(PSDTriangleConeT(lmi.dim()));
        }

        let a = csc(b.len(), &columns);
        let p = CscMatrix::zeros((n, n));
        let q: Vec<f64> = problem.objective().iter().copied().collect();

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .max_iter(self.max_iter)
            .tol_gap_abs(self.tolerance)
            .tol_gap_rel(self.tolerance)
            .tol_feas(self.tolerance)
            .build()
            .map_err(|err| Error::Settings(err.to_string()))?;

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings)
            .map_err(|err| Error::Setup(err.to_string()))?;
        solver.solve();

        let result = &solver.solution;
        let status = status(result.status);

        // Infeasibility certificates leave `x` as NaN.
        let x = if result.x.iter().all(|v| v.is_finite()) {
            DVector::from_column_slice(&result.x)
        } else {
            DVector::zeros(n)
        };

        let duals = if status.is_success() || status == Status::Infeasible {
            let mut offset = 0;
            let duals = problem
                .constraints()
                .iter()
                .map(|lmi| {
                    let len = lmi.dim() * (lmi.dim() + 1) / 2;
                    let dual = unsvec(lmi.dim(), &result.z[offset..offset + len]);
                    offset += len;
                    dual
                })
                .collect::<Vec<_>>();
            duals
                .iter()
                .all(|dual| dual.iter().all(|v| v.is_finite()))
                .then_some(duals)
        } else {
            None
        };

        Ok(Solution {
            status,
            objective: problem.objective_value(&x),
            constraints: problem.report(&x, duals),
            x,
            iterations: result.iterations as usize,
        })
    }
}

fn status(status: SolverStatus) -> Status {
    match status {
        SolverStatus::Solved => Status::Optimal,
        SolverStatus::AlmostSolved => Status::OptimalInexact,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            Status::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => Status::Unbounded,
        SolverStatus::MaxIterations | SolverStatus::MaxTime => Status::IterationLimit,
        _ => Status::NumericalError,
    }
}

/// Scaled upper-triangular vectorization, column-major.
fn svec(matrix: &DMatrix<f64>) -> Vec<f64> {
    let dim = matrix.nrows();
    let mut out = Vec::with_capacity(dim * (dim + 1) / 2);
    for col in 0..dim {
        for row in 0..=col {
            let value = matrix[(row, col)];
            out.push(if row == col { value } else { value * SQRT_2 });
        }
    }
    out
}

fn unsvec(dim: usize, values: &[f64]) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(dim, dim);
    let mut k = 0;
    for col in 0..dim {
        for row in 0..=col {
            let value = if row == col {
                values[k]
            } else {
                values[k] / SQRT_2
            };
            matrix[(row, col)] = value;
            matrix[(col, row)] = value;
            k += 1;
        }
    }
    matrix
}

/// Assembles a CSC matrix from per-column `(row, value)` lists sorted by row.
fn csc(nrows: usize, columns: &[Vec<(usize, f64)>]) -> CscMatrix<f64> {
    let mut colptr = Vec::with_capacity(columns.len() + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    colptr.push(0);
    for column in columns {
        for &(row, value) in column {
            rowval.push(row);
            nzval.push(value);
        }
        colptr.push(rowval.len());
    }

    CscMatrix::new(nrows, columns.len(), colptr, rowval, nzval)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    use crate::sdp::Lmi;

    #[test]
    fn svec_round_trips_symmetric_matrices() {
        let m = dmatrix![1.0, 2.0, 3.0; 2.0, 4.0, 5.0; 3.0, 5.0, 6.0];
        let v = svec(&m);

        assert_eq!(v.len(), 6);
        assert_relative_eq!(v[1], 2.0 * SQRT_2);
        assert_relative_eq!(unsvec(3, &v), m);
    }

    #[test]
    fn minimizes_largest_eigenvalue() {
        let a = dmatrix![2.0, 1.0; 1.0, 2.0];
        let lmi = Lmi::from_affine("gamma I - A", 1, |x| DMatrix::identity(2, 2) * x[0] - &a)
            .unwrap();
        let problem = Problem::minimize(DVector::from_element(1, 1.0))
            .and_then(|p| p.subject_to(lmi))
            .unwrap();

        let solution = Clarabel::default().solve(&problem).expect("should solve");

        assert!(solution.status.is_success());
        assert_relative_eq!(solution.objective, 3.0, epsilon = 1e-3);
    }

    #[test]
    fn default_tolerance_matches_barrier() {
        assert_relative_eq!(
            Clarabel::default().tolerance,
            crate::sdp::barrier::Config::default().tolerance()
        );
    }

    #[test]
    fn reports_infeasible_constraints() {
        let lower = Lmi::from_affine("x >= 1", 1, |x| dmatrix![x[0] - 1.0]).unwrap();
        let upper = Lmi::from_affine("x <= 0", 1, |x| dmatrix![-x[0]]).unwrap();
        let problem = Problem::minimize(DVector::from_element(1, 1.0))
            .and_then(|p| p.subject_to(lower))
            .and_then(|p| p.subject_to(upper))
            .unwrap();

        let solution = Clarabel::default().solve(&problem).expect("should run");

        assert_eq!(solution.status, Status::Infeasible);
        assert!(solution.x.iter().all(|v| v.is_finite()));
        assert_eq!(solution.constraints.len(), 2);
    }
}
