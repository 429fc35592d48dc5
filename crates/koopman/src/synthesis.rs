//! Disturbance-robust state-feedback synthesis.
//!
//! For a discrete-time plant `x⁺ = A·x + B·u + Bd·w` with performance output
//! `z = C·x`, the synthesizer searches for `Pd = Pdᵀ ≻ 0`, `Fd`, and `γ`
//! such that the bounded-real block matrix
//!
//! ```text
//! M = [ Pd            A·Pd − B·Fd   Bd    0      ]
//!     [ (A·Pd−B·Fd)ᵀ  Pd            0     Pd·Cᵀ  ]
//!     [ Bdᵀ           0             γ·I   0      ]
//!     [ 0             C·Pd          0     γ·I    ]
//! ```
//!
//! is positive semidefinite, minimizing `γ`. Equivalently `−M ⪯ 0`. The
//! gain is then `Kd = Fd·Pd⁻¹`, and the closed loop `A − B·Kd` is Schur
//! stable whenever `M` is strictly positive definite.
//!
//! # Observer Events
//!
//! The synthesizer emits [`Event::ProblemBuilt`] before calling the backend,
//! [`Event::Solved`] with the backend status, and [`Event::GainRecovered`]
//! on success.

mod certificate;
mod config;
mod error;
mod event;

#[cfg(test)]
mod tests;

pub use config::SynthesisConfig;
pub use error::SynthesisError;
pub use event::Event;

use std::convert::Infallible;

use nalgebra::DMatrix;
use spindle_core::Observer;
use spindle_solvers::sdp::{Backend, Status, barrier::Barrier};

use crate::{ConfigError, LiftedModel};

use certificate::{Layout, Plant};

/// A state-feedback gain with the certificate that proves it.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustGain {
    /// The gain `Kd` (`inputs × states`); apply as `u = −Kd·x`.
    pub k: DMatrix<f64>,

    /// The minimized bound `γ`.
    pub gamma: f64,

    /// The certificate matrix `Pd`.
    pub pd: DMatrix<f64>,

    /// The auxiliary variable `Fd = Kd·Pd`.
    pub fd: DMatrix<f64>,

    /// Backend status; either optimal or optimal to reduced accuracy.
    pub status: Status,

    /// Backend iteration count.
    pub iterations: usize,
}

/// Synthesizes robust gains through an SDP backend.
#[derive(Debug, Clone, Default)]
pub struct RobustGainSynthesizer<B = Barrier> {
    backend: B,
    config: SynthesisConfig,
}

impl<B: Backend> RobustGainSynthesizer<B> {
    #[must_use]
    pub fn new(backend: B, config: SynthesisConfig) -> Self {
        Self { backend, config }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesizes a gain for `x⁺ = A·x + B·u + Bd·w`, `z = C·x`.
    ///
    /// See the [module docs](self) for the certificate and observer events.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Config`] for mismatched dimensions,
    /// [`SynthesisError::Infeasible`] when no certificate exists, and the
    /// remaining [`SynthesisError`] variants when the backend fails or the
    /// certificate cannot be inverted.
    pub fn synthesize<Obs>(
        &self,
        a: &DMatrix<f64>,
        b: &DMatrix<f64>,
        c: &DMatrix<f64>,
        bd: &DMatrix<f64>,
        mut observer: Obs,
    ) -> Result<RobustGain, SynthesisError>
    where
        Obs: Observer<Event, Infallible>,
    {
        check_dimensions(a, b, c, bd)?;

        let plant = Plant { a, b, c, bd };
        let layout = Layout::new(a.nrows(), b.ncols());
        let problem = plant.problem(layout, self.config.margin())?;

        observer.observe(&Event::ProblemBuilt {
            variables: layout.len(),
            lmi_dim: plant.block_dim(),
        });

        let solution = self
            .backend
            .solve(&problem)
            .map_err(|err| SynthesisError::Backend(Box::new(err)))?;

        observer.observe(&Event::Solved {
            status: solution.status,
            objective: solution.objective,
            iterations: solution.iterations,
        });

        match solution.status {
            Status::Optimal | Status::OptimalInexact => {}
            Status::Infeasible => {
                return Err(SynthesisError::Infeasible {
                    constraints: solution.constraints,
                });
            }
            Status::Unbounded => return Err(SynthesisError::Unbounded),
            status => return Err(SynthesisError::NumericFailure { status }),
        }

        let pd = layout.pd(&solution.x);
        let fd = layout.fd(&solution.x);
        let gamma = solution.x[layout.gamma()];

        let pd_inverse = pd
            .clone()
            .cholesky()
            .ok_or(SynthesisError::SingularCertificate)?
            .inverse();
        let k = &fd * pd_inverse;
        if k.iter().any(|v| !v.is_finite()) || !gamma.is_finite() {
            return Err(SynthesisError::NonFinite);
        }

        observer.observe(&Event::GainRecovered { gamma });

        Ok(RobustGain {
            k,
            gamma,
            pd,
            fd,
            status: solution.status,
            iterations: solution.iterations,
        })
    }

    /// Synthesizes a gain for a fitted lifted model.
    ///
    /// # Errors
    ///
    /// See [`RobustGainSynthesizer::synthesize`].
    pub fn synthesize_lifted<Obs>(
        &self,
        model: &LiftedModel,
        c: &DMatrix<f64>,
        bd: &DMatrix<f64>,
        observer: Obs,
    ) -> Result<RobustGain, SynthesisError>
    where
        Obs: Observer<Event, Infallible>,
    {
        self.synthesize(model.a(), model.b(), c, bd, observer)
    }

    /// Synthesizes a gain without observation.
    ///
    /// # Errors
    ///
    /// See [`RobustGainSynthesizer::synthesize`].
    pub fn synthesize_unobserved(
        &self,
        a: &DMatrix<f64>,
        b: &DMatrix<f64>,
        c: &DMatrix<f64>,
        bd: &DMatrix<f64>,
    ) -> Result<RobustGain, SynthesisError> {
        self.synthesize(a, b, c, bd, ())
    }
}

fn check_dimensions(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    c: &DMatrix<f64>,
    bd: &DMatrix<f64>,
) -> Result<(), ConfigError> {
    let n = a.nrows();
    let expect = |name, matrix: &DMatrix<f64>, expected: (usize, usize)| {
        if matrix.shape() == expected {
            Ok(())
        } else {
            Err(ConfigError::Dimension {
                name,
                expected,
                found: matrix.shape(),
            })
        }
    };

    if n == 0 {
        return Err(ConfigError::Dimension {
            name: "a",
            expected: (1, 1),
            found: a.shape(),
        });
    }
    expect("a", a, (n, n))?;
    expect("b", b, (n, b.ncols()))?;
    expect("c", c, (c.nrows(), n))?;
    expect("bd", bd, (n, bd.ncols()))?;
    Ok(())
}
