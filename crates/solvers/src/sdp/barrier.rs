//! Log-det barrier interior-point method for small dense SDPs.
//!
//! # Algorithm
//!
//! The solver runs in two phases, each following a central path:
//!
//! 1. **Feasibility.** Unless `x = 0` is already strictly feasible, minimize
//!    an auxiliary slack `s` subject to `Fⱼ(x) + s·I ⪰ 0` and `s ≥ −1`. The
//!    phase ends as soon as `s` is negative, which makes `x` strictly
//!    feasible. If the optimal slack is provably non-negative the problem is
//!    reported [`Status::Infeasible`], with per-constraint eigenvalues and
//!    dual estimates at the least-violating point.
//! 2. **Optimality.** Minimize `t·cᵀx − Σⱼ log det Fⱼ(x)` with damped Newton
//!    steps, multiplying `t` by the growth factor after each centering, until
//!    the duality gap bound `degree / t` is within tolerance. Once `t` is
//!    large enough, the last centering stops as soon as the Newton decrement
//!    `λ` satisfies `(degree + λ·√degree) / t ≤ tolerance`, so the final
//!    outer iteration does not polish a point that is already good enough.
//!
//! Each Newton system costs one Cholesky factorization per constraint plus
//! `O(k²·m²)` work for a constraint of size `m` with `k` nonzero terms, which
//! suits problems with tens of variables and blocks up to a few dozen rows.
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] after every centering in either phase.
//! Observers can return [`Action::StopEarly`] to halt; the solution then
//! carries [`Status::StoppedByObserver`].

mod action;
mod config;
mod event;
mod program;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use event::{Event, Phase};

use std::convert::Infallible;

use nalgebra::{DMatrix, DVector};
use spindle_core::Observer;

use crate::sdp::{Backend, Problem, Solution, Status};

use program::{Centering, Program};

/// Smallest negative slack accepted as strict feasibility.
const FEASIBILITY_MARGIN: f64 = 1e-9;

/// Cap on the Newton decrement of an accepted near-central point.
const MAX_ACCEPTED_DECREMENT: f64 = 0.5;

/// The barrier method as an [`sdp::Backend`](crate::sdp::Backend).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Barrier {
    config: Config,
}

impl Barrier {
    /// Creates a backend with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the backend configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Backend for Barrier {
    type Error = Infallible;

    fn solve(&self, problem: &Problem) -> Result<Solution, Self::Error> {
        Ok(solve_unobserved(problem, &self.config))
    }
}

/// Solves an SDP with the barrier method.
///
/// See the [module docs](self) for the algorithm and observer events.
pub fn solve<Obs>(problem: &Problem, config: &Config, mut observer: Obs) -> Solution
where
    Obs: Observer<Event, Action>,
{
    let n = problem.num_vars();

    if problem.constraints().is_empty() {
        let status = if problem.objective().iter().all(|c| *c == 0.0) {
            Status::Optimal
        } else {
            Status::Unbounded
        };
        return finish(problem, status, DVector::zeros(n), None, 0);
    }

    let program = Program::new(problem);
    let mut iterations = 0;

    let start = match find_feasible(&program, config, &mut observer, &mut iterations) {
        Feasibility::Found(x) => x,
        Feasibility::Infeasible { x, duals } => {
            return finish(problem, Status::Infeasible, x, duals, iterations);
        }
        Feasibility::Failed { status, x } => {
            return finish(problem, status, x, None, iterations);
        }
    };

    optimize(problem, &program, config, start, &mut observer, iterations)
}

/// Solves an SDP with the barrier method without observer support.
#[must_use]
pub fn solve_unobserved(problem: &Problem, config: &Config) -> Solution {
    solve(problem, config, ())
}

enum Feasibility {
    Found(DVector<f64>),
    Infeasible {
        x: DVector<f64>,
        duals: Option<Vec<DMatrix<f64>>>,
    },
    Failed {
        status: Status,
        x: DVector<f64>,
    },
}

/// Phase one: find a strictly feasible point or prove there is none.
fn find_feasible<Obs>(
    program: &Program,
    config: &Config,
    observer: &mut Obs,
    iterations: &mut usize,
) -> Feasibility
where
    Obs: Observer<Event, Action>,
{
    let n = program.num_vars();
    let origin = DVector::zeros(n);

    let lowest = program
        .min_eigenvalues(&origin)
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    if lowest > 0.0 {
        return Feasibility::Found(origin);
    }

    let auxiliary = program.phase_one();
    let degree = auxiliary.degree();
    let strictly_feasible = |z: &DVector<f64>| z[n] < -FEASIBILITY_MARGIN;

    let mut z = DVector::zeros(n + 1);
    z[n] = 1.0 - lowest;
    let mut t = 1.0;

    for outer in 1..=config.max_outer_iters() {
        let outcome =
            auxiliary.center(&mut z, t, config.max_newton_iters(), 0.0, strictly_feasible);
        *iterations += outcome.iters();

        let slack = z[n];
        let gap = degree / t;
        let x = z.rows(0, n).into_owned();

        let event = Event {
            phase: Phase::Feasibility,
            outer,
            t,
            objective: slack,
            gap,
            newton_iters: outcome.iters(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Feasibility::Failed {
                status: Status::StoppedByObserver,
                x,
            };
        }

        match outcome {
            Centering::Stopped { .. } => return Feasibility::Found(x),
            Centering::Centered { .. } if slack - gap >= -FEASIBILITY_MARGIN => {
                let duals = auxiliary.duals(&z, t).map(|mut duals| {
                    duals.truncate(program.num_blocks());
                    duals
                });
                return Feasibility::Infeasible { x, duals };
            }
            Centering::Stalled { .. } if gap <= config.inexact_tolerance() => {
                return Feasibility::Infeasible { x, duals: None };
            }
            Centering::Breakdown { .. } | Centering::Diverged { .. } => {
                return Feasibility::Failed {
                    status: Status::NumericalError,
                    x,
                };
            }
            Centering::Centered { .. } | Centering::Stalled { .. } => {}
        }

        t *= config.growth();
    }

    Feasibility::Failed {
        status: Status::IterationLimit,
        x: z.rows(0, n).into_owned(),
    }
}

/// Phase two: follow the central path from a strictly feasible start.
fn optimize<Obs>(
    problem: &Problem,
    program: &Program,
    config: &Config,
    start: DVector<f64>,
    observer: &mut Obs,
    mut iterations: usize,
) -> Solution
where
    Obs: Observer<Event, Action>,
{
    let degree = program.degree();
    let mut x = start;
    let mut t = 1.0;
    let mut gap = f64::INFINITY;

    for outer in 1..=config.max_outer_iters() {
        let accept = near_central_decrement(degree, t, config.tolerance());
        let outcome = program.center(&mut x, t, config.max_newton_iters(), accept, |_| false);
        iterations += outcome.iters();
        gap = degree / t;

        let event = Event {
            phase: Phase::Optimality,
            outer,
            t,
            objective: problem.objective_value(&x),
            gap,
            newton_iters: outcome.iters(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return finish(problem, Status::StoppedByObserver, x, None, iterations);
        }

        match outcome {
            Centering::Centered { .. } if gap <= config.tolerance() => {
                let duals = program.duals(&x, t);
                return finish(problem, Status::Optimal, x, duals, iterations);
            }
            Centering::Diverged { .. } => {
                return finish(problem, Status::Unbounded, x, None, iterations);
            }
            Centering::Breakdown { .. } => {
                let status = if gap <= config.inexact_tolerance() {
                    Status::OptimalInexact
                } else {
                    Status::NumericalError
                };
                return finish(problem, status, x, None, iterations);
            }
            Centering::Stalled { .. } if gap <= config.tolerance() => {
                let duals = program.duals(&x, t);
                return finish(problem, Status::OptimalInexact, x, duals, iterations);
            }
            Centering::Centered { .. } | Centering::Stalled { .. } | Centering::Stopped { .. } => {}
        }

        t *= config.growth();
    }

    let status = if gap <= config.inexact_tolerance() {
        Status::OptimalInexact
    } else {
        Status::IterationLimit
    };
    finish(problem, status, x, None, iterations)
}

/// Largest Newton decrement at which a point still certifies the gap target.
///
/// For `λ < 1` the duality gap of an approximately central point is bounded
/// by `(θ + λ·√θ) / t`, with `θ` the barrier degree. Returns zero while the
/// exact central point would still miss `tolerance`.
fn near_central_decrement(degree: f64, t: f64, tolerance: f64) -> f64 {
    let slack = tolerance * t - degree;
    if slack <= 0.0 {
        return 0.0;
    }
    (slack / degree.sqrt()).min(MAX_ACCEPTED_DECREMENT)
}

fn finish(
    problem: &Problem,
    status: Status,
    x: DVector<f64>,
    duals: Option<Vec<DMatrix<f64>>>,
    iterations: usize,
) -> Solution {
    Solution {
        status,
        objective: problem.objective_value(&x),
        constraints: problem.report(&x, duals),
        x,
        iterations,
    }
}
