use nalgebra::{DMatrix, DVector};
use spindle_solvers::sdp::{Lmi, Problem, ProblemError};

/// Layout of the decision vector `[vech(Pd), vec(Fd), γ]`.
///
/// `Pd` is stored by its upper triangle, row by row, and `Fd` row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Layout {
    states: usize,
    inputs: usize,
}

impl Layout {
    pub(super) fn new(states: usize, inputs: usize) -> Self {
        Self { states, inputs }
    }

    fn pd_len(self) -> usize {
        self.states * (self.states + 1) / 2
    }

    pub(super) fn len(self) -> usize {
        self.pd_len() + self.inputs * self.states + 1
    }

    pub(super) fn gamma(self) -> usize {
        self.len() - 1
    }

    pub(super) fn pd(self, x: &DVector<f64>) -> DMatrix<f64> {
        let n = self.states;
        let mut pd = DMatrix::zeros(n, n);
        let mut k = 0;
        for i in 0..n {
            for j in i..n {
                pd[(i, j)] = x[k];
                pd[(j, i)] = x[k];
                k += 1;
            }
        }
        pd
    }

    pub(super) fn fd(self, x: &DVector<f64>) -> DMatrix<f64> {
        let offset = self.pd_len();
        DMatrix::from_fn(self.inputs, self.states, |i, j| x[offset + i * self.states + j])
    }
}

/// The plant and disturbance data the certificate is written for.
pub(super) struct Plant<'a> {
    pub(super) a: &'a DMatrix<f64>,
    pub(super) b: &'a DMatrix<f64>,
    pub(super) c: &'a DMatrix<f64>,
    pub(super) bd: &'a DMatrix<f64>,
}

impl Plant<'_> {
    /// Size of the bounded-real block `2n + q + p`.
    pub(super) fn block_dim(&self) -> usize {
        2 * self.a.nrows() + self.bd.ncols() + self.c.nrows()
    }

    /// Evaluates
    ///
    /// ```text
    /// [ Pd            A·Pd − B·Fd   Bd    0      ]
    /// [ (A·Pd−B·Fd)ᵀ  Pd            0     Pd·Cᵀ  ]
    /// [ Bdᵀ           0             γ·I   0      ]
    /// [ 0             C·Pd          0     γ·I    ]
    /// ```
    fn bounded_real(&self, layout: Layout, x: &DVector<f64>) -> DMatrix<f64> {
        let n = self.a.nrows();
        let q = self.bd.ncols();
        let p = self.c.nrows();
        let gamma = x[layout.gamma()];

        let pd = layout.pd(x);
        let closed = self.a * &pd - self.b * layout.fd(x);
        let cp = self.c * &pd;

        let mut m = DMatrix::zeros(self.block_dim(), self.block_dim());
        m.view_mut((0, 0), (n, n)).copy_from(&pd);
        m.view_mut((n, n), (n, n)).copy_from(&pd);
        m.view_mut((0, n), (n, n)).copy_from(&closed);
        m.view_mut((n, 0), (n, n)).copy_from(&closed.transpose());
        m.view_mut((0, 2 * n), (n, q)).copy_from(self.bd);
        m.view_mut((2 * n, 0), (q, n)).copy_from(&self.bd.transpose());
        m.view_mut((n, 2 * n + q), (n, p)).copy_from(&cp.transpose());
        m.view_mut((2 * n + q, n), (p, n)).copy_from(&cp);
        m.view_mut((2 * n, 2 * n), (q + p, q + p)).fill_diagonal(gamma);
        m
    }

    /// Builds: minimize `γ` subject to `M ⪰ 0`, `Pd ⪰ ε·I`, and `γ ≥ ε`.
    pub(super) fn problem(&self, layout: Layout, margin: f64) -> Result<Problem, ProblemError> {
        let n = self.a.nrows();
        let num_vars = layout.len();

        let bounded_real = Lmi::from_affine("bounded real", num_vars, |x| {
            self.bounded_real(layout, x)
        })?;
        let positive = Lmi::from_affine("Pd positive definite", num_vars, |x| {
            layout.pd(x) - DMatrix::identity(n, n) * margin
        })?;
        let gamma = Lmi::from_affine("gamma positive", num_vars, |x| {
            DMatrix::from_element(1, 1, x[layout.gamma()] - margin)
        })?;

        let mut objective = DVector::zeros(num_vars);
        objective[layout.gamma()] = 1.0;

        Problem::minimize(objective)?
            .subject_to(bounded_real)?
            .subject_to(positive)?
            .subject_to(gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::dmatrix;

    #[test]
    fn unpacks_decision_vector() {
        let layout = Layout::new(2, 1);
        assert_eq!(layout.len(), 6);

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(layout.pd(&x), dmatrix![1.0, 2.0; 2.0, 3.0]);
        assert_eq!(layout.fd(&x), dmatrix![4.0, 5.0]);
        assert_eq!(x[layout.gamma()], 6.0);
    }

    #[test]
    fn lifted_certificate_is_thirty_six_square() {
        let a = DMatrix::identity(9, 9);
        let b = DMatrix::zeros(9, 3);
        let c = DMatrix::identity(9, 9);
        let bd = DMatrix::zeros(9, 9);
        let plant = Plant {
            a: &a,
            b: &b,
            c: &c,
            bd: &bd,
        };

        let layout = Layout::new(9, 3);
        let problem = plant.problem(layout, 1e-6).expect("certificate is symmetric");

        assert_eq!(plant.block_dim(), 36);
        assert_eq!(problem.num_vars(), 45 + 27 + 1);
        assert_eq!(problem.constraints()[0].dim(), 36);
        assert_eq!(problem.barrier_degree(), 36 + 9 + 1);
    }

    #[test]
    fn block_matrix_places_every_term() {
        let a = dmatrix![2.0];
        let b = dmatrix![1.0];
        let c = dmatrix![3.0];
        let bd = dmatrix![0.5];
        let plant = Plant {
            a: &a,
            b: &b,
            c: &c,
            bd: &bd,
        };

        // Pd = 4, Fd = 1, γ = 7
        let layout = Layout::new(1, 1);
        let x = DVector::from_vec(vec![4.0, 1.0, 7.0]);

        let expected = dmatrix![
            4.0, 7.0, 0.5, 0.0;
            7.0, 4.0, 0.0, 12.0;
            0.5, 0.0, 7.0, 0.0;
            0.0, 12.0, 0.0, 7.0
        ];
        assert_eq!(plant.bounded_real(layout, &x), expected);
    }
}
