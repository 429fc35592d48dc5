use nalgebra::{Cholesky, DMatrix, DVector, Dyn};

use crate::sdp::Problem;

/// Armijo sufficient-decrease fraction.
const ALPHA: f64 = 0.01;

/// Backtracking shrink factor.
const BETA: f64 = 0.5;

/// Smallest step tried before a line search gives up.
const MIN_STEP: f64 = 1e-14;

/// Centering ends once half the squared Newton decrement drops below this.
const NEWTON_TOL: f64 = 1e-10;

/// Objective magnitude treated as evidence of an unbounded problem.
const UNBOUNDED_BOUND: f64 = 1e10;

/// Box bound `|xᵢ| ≤ R` that keeps the feasibility problem compact.
const PHASE_ONE_BOX: f64 = 1e6;

/// An LMI with only its nonzero coefficient terms kept.
struct Block {
    constant: DMatrix<f64>,
    terms: Vec<(usize, DMatrix<f64>)>,
}

impl Block {
    fn dim(&self) -> usize {
        self.constant.nrows()
    }

    fn slack(&self, x: &DVector<f64>) -> DMatrix<f64> {
        let mut slack = self.constant.clone();
        for (i, term) in &self.terms {
            let xi = x[*i];
            if xi != 0.0 {
                slack += term * xi;
            }
        }
        slack
    }
}

/// How a centering run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Centering {
    /// The Newton decrement fell below tolerance.
    Centered { iters: usize },

    /// The caller's stop predicate fired.
    Stopped { iters: usize },

    /// The line search could not make progress, or the Newton budget ran out.
    Stalled { iters: usize },

    /// The objective passed the unboundedness threshold.
    Diverged { iters: usize },

    /// The Newton system could not be solved.
    Breakdown { iters: usize },
}

impl Centering {
    pub(super) fn iters(self) -> usize {
        match self {
            Self::Centered { iters }
            | Self::Stopped { iters }
            | Self::Stalled { iters }
            | Self::Diverged { iters }
            | Self::Breakdown { iters } => iters,
        }
    }
}

struct NewtonStep {
    value: f64,
    gradient: DVector<f64>,
    direction: DVector<f64>,
}

/// The working form of a [`Problem`] used by the barrier method.
///
/// Minimizes `cᵀx` subject to `Fⱼ(x) ≻ 0` through the barrier function
/// `t·cᵀx − Σⱼ log det Fⱼ(x)`.
pub(super) struct Program {
    objective: DVector<f64>,
    blocks: Vec<Block>,
}

impl Program {
    pub(super) fn new(problem: &Problem) -> Self {
        let blocks = problem
            .constraints()
            .iter()
            .map(|lmi| Block {
                constant: lmi.constant().clone(),
                terms: lmi
                    .coefficients()
                    .iter()
                    .enumerate()
                    .filter(|(_, term)| term.amax() > 0.0)
                    .map(|(i, term)| (i, term.clone()))
                    .collect(),
            })
            .collect();

        Self {
            objective: problem.objective().clone(),
            blocks,
        }
    }

    /// Builds the feasibility problem: minimize `s` subject to
    /// `Fⱼ(x) + s·I ⪰ 0`, `s ≥ −1`, and `|xᵢ| ≤ R`.
    ///
    /// The slack is appended as the last variable, and the original blocks
    /// keep their positions at the front.
    pub(super) fn phase_one(&self) -> Self {
        let n = self.num_vars();

        let mut blocks: Vec<Block> = self
            .blocks
            .iter()
            .map(|block| {
                let mut terms = block.terms.clone();
                terms.push((n, DMatrix::identity(block.dim(), block.dim())));
                Block {
                    constant: block.constant.clone(),
                    terms,
                }
            })
            .collect();

        blocks.push(scalar_bound(n, 1.0, 1.0));
        for i in 0..n {
            blocks.push(scalar_bound(i, PHASE_ONE_BOX, 1.0));
            blocks.push(scalar_bound(i, PHASE_ONE_BOX, -1.0));
        }

        let mut objective = DVector::zeros(n + 1);
        objective[n] = 1.0;

        Self { objective, blocks }
    }

    pub(super) fn num_vars(&self) -> usize {
        self.objective.len()
    }

    pub(super) fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Sum of block sizes; the barrier degree.
    pub(super) fn degree(&self) -> f64 {
        self.blocks.iter().map(Block::dim).sum::<usize>() as f64
    }

    /// Smallest eigenvalue of each block at `x`.
    pub(super) fn min_eigenvalues(&self, x: &DVector<f64>) -> Vec<f64> {
        self.blocks
            .iter()
            .map(|block| block.slack(x).symmetric_eigenvalues().min())
            .collect()
    }

    /// Dual estimates `Zⱼ = Fⱼ(x)⁻¹ / t`, one per block.
    pub(super) fn duals(&self, x: &DVector<f64>, t: f64) -> Option<Vec<DMatrix<f64>>> {
        self.blocks
            .iter()
            .map(|block| {
                let cholesky = block.slack(x).cholesky()?;
                Some(cholesky.inverse() / t)
            })
            .collect()
    }

    /// Barrier function value, or `None` outside the strict interior.
    fn barrier(&self, x: &DVector<f64>, t: f64) -> Option<f64> {
        let mut value = t * self.objective.dot(x);
        for block in &self.blocks {
            let cholesky = block.slack(x).cholesky()?;
            value -= log_det(&cholesky);
        }
        Some(value)
    }

    /// Computes the Newton direction of the barrier function at `x`.
    ///
    /// With `S = F(x)` and coefficient `Aᵢ`, each block contributes
    /// `−tr(S⁻¹Aᵢ)` to the gradient and `tr(S⁻¹AᵢS⁻¹Aₖ)` to the Hessian.
    fn newton_step(&self, x: &DVector<f64>, t: f64) -> Option<NewtonStep> {
        let n = x.len();
        let mut value = t * self.objective.dot(x);
        let mut gradient = &self.objective * t;
        let mut hessian = DMatrix::zeros(n, n);

        for block in &self.blocks {
            let cholesky = block.slack(x).cholesky()?;
            value -= log_det(&cholesky);
            let inverse = cholesky.inverse();

            let weighted: Vec<DMatrix<f64>> = block
                .terms
                .iter()
                .map(|(_, term)| &inverse * term * &inverse)
                .collect();

            for (a, (i, term_i)) in block.terms.iter().enumerate() {
                gradient[*i] -= inverse.dot(term_i);

                for (j, term_j) in &block.terms[a..] {
                    let h = weighted[a].dot(term_j);
                    hessian[(*i, *j)] += h;
                    if i != j {
                        hessian[(*j, *i)] += h;
                    }
                }
            }
        }

        let direction = solve_regularized(hessian, &(-&gradient))?;

        Some(NewtonStep {
            value,
            gradient,
            direction,
        })
    }

    /// Runs damped Newton on the barrier function at weight `t`.
    ///
    /// `x` must be strictly feasible on entry and stays strictly feasible.
    /// `stop` is checked before every Newton iteration.
    ///
    /// The point counts as centered once half the squared Newton decrement
    /// `λ²/2` falls below [`NEWTON_TOL`], or once `λ ≤ accept`. Callers pass
    /// a positive `accept` when an approximately central point already meets
    /// their gap target.
    pub(super) fn center<F>(
        &self,
        x: &mut DVector<f64>,
        t: f64,
        max_iters: usize,
        accept: f64,
        stop: F,
    ) -> Centering
    where
        F: Fn(&DVector<f64>) -> bool,
    {
        for iters in 0..max_iters {
            if stop(x) {
                return Centering::Stopped { iters };
            }

            let Some(step) = self.newton_step(x, t) else {
                return Centering::Breakdown { iters };
            };

            let slope = step.gradient.dot(&step.direction);
            if -slope / 2.0 <= NEWTON_TOL || (-slope).max(0.0).sqrt() <= accept {
                return Centering::Centered { iters };
            }

            let mut size = 1.0;
            loop {
                let candidate = &*x + &step.direction * size;
                if let Some(value) = self.barrier(&candidate, t) {
                    if value <= step.value + ALPHA * size * slope {
                        *x = candidate;
                        break;
                    }
                }

                size *= BETA;
                if size < MIN_STEP {
                    return Centering::Stalled { iters };
                }
            }

            if self.objective.dot(x) < -UNBOUNDED_BOUND {
                return Centering::Diverged { iters: iters + 1 };
            }
        }

        if stop(x) {
            return Centering::Stopped { iters: max_iters };
        }
        Centering::Stalled { iters: max_iters }
    }
}

/// The 1×1 block `offset + sign·xᵢ ≥ 0`.
fn scalar_bound(i: usize, offset: f64, sign: f64) -> Block {
    Block {
        constant: DMatrix::from_element(1, 1, offset),
        terms: vec![(i, DMatrix::from_element(1, 1, sign))],
    }
}

fn log_det(cholesky: &Cholesky<f64, Dyn>) -> f64 {
    2.0 * cholesky.l_dirty().diagonal().iter().map(|d| d.ln()).sum::<f64>()
}

/// Solves `H·d = rhs` for a symmetric positive semidefinite `H`.
///
/// A growing diagonal shift is added if `H` is numerically singular, which
/// happens when some variable does not appear in any constraint.
fn solve_regularized(hessian: DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(cholesky) = hessian.clone().cholesky() {
        return Some(cholesky.solve(rhs));
    }

    let n = hessian.nrows();
    let scale = hessian.diagonal().amax().max(1.0);
    let mut shift = scale * 1e-12;

    for _ in 0..8 {
        let shifted = &hessian + DMatrix::identity(n, n) * shift;
        if let Some(cholesky) = shifted.cholesky() {
            return Some(cholesky.solve(rhs));
        }
        shift *= 100.0;
    }

    None
}
