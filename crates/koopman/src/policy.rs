//! Feedback policies that map lifted observables to a control torque.
//!
//! [`Excitation`] drives data collection with randomized feedback, and
//! [`ClosedLoop`] applies a synthesized gain. Both compute `τ = −K·g(ω)` for
//! a `3 × 9` gain `K`.

use nalgebra::{DMatrix, SMatrix, Vector3};
use rand::Rng;
use thiserror::Error;

use crate::observables::{self, Observables};

/// A `3 × 9` feedback gain on the lifted state.
pub type LiftedGain = SMatrix<f64, 3, { observables::DIM }>;

/// Errors raised when querying or configuring a feedback policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("no feedback gain is available yet")]
    GainUnavailable,

    #[error("feedback gain is {rows}x{cols}, expected 3x9")]
    GainShape { rows: usize, cols: usize },

    #[error("feedback gain has non-finite entries")]
    NonFiniteGain,
}

/// Computes a control torque from the current observables.
pub trait FeedbackPolicy {
    /// Returns the torque to apply for this sample.
    ///
    /// `rng` is the trajectory's own generator, so randomized policies stay
    /// reproducible for a fixed seed.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the policy cannot produce a torque.
    fn torque<R: Rng>(
        &self,
        observables: &Observables,
        rng: &mut R,
    ) -> Result<Vector3<f64>, PolicyError>;
}

/// Random-gain excitation used to collect identification data.
///
/// Every query draws a fresh gain with entries uniform in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Excitation;

impl FeedbackPolicy for Excitation {
    fn torque<R: Rng>(
        &self,
        observables: &Observables,
        rng: &mut R,
    ) -> Result<Vector3<f64>, PolicyError> {
        let gain = LiftedGain::from_fn(|_, _| rng.gen_range(0.0..1.0));
        Ok(-(gain * observables.vector()))
    }
}

/// State feedback with a fixed gain, once one is available.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClosedLoop {
    gain: Option<LiftedGain>,
}

impl ClosedLoop {
    /// Creates a policy that has no gain yet.
    ///
    /// Querying it fails with [`PolicyError::GainUnavailable`] until
    /// [`ClosedLoop::set_gain`] is called.
    #[must_use]
    pub fn pending() -> Self {
        Self { gain: None }
    }

    /// Creates a policy from a `3 × 9` gain.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the gain has the wrong shape or non-finite entries.
    pub fn new(gain: &DMatrix<f64>) -> Result<Self, PolicyError> {
        Ok(Self {
            gain: Some(validate(gain)?),
        })
    }

    /// Replaces the gain.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the gain has the wrong shape or non-finite
    /// entries, in which case the previous gain is kept.
    pub fn set_gain(&mut self, gain: &DMatrix<f64>) -> Result<(), PolicyError> {
        self.gain = Some(validate(gain)?);
        Ok(())
    }

    #[must_use]
    pub fn gain(&self) -> Option<&LiftedGain> {
        self.gain.as_ref()
    }
}

impl FeedbackPolicy for ClosedLoop {
    fn torque<R: Rng>(
        &self,
        observables: &Observables,
        _rng: &mut R,
    ) -> Result<Vector3<f64>, PolicyError> {
        let gain = self.gain.as_ref().ok_or(PolicyError::GainUnavailable)?;
        Ok(-(gain * observables.vector()))
    }
}

fn validate(gain: &DMatrix<f64>) -> Result<LiftedGain, PolicyError> {
    let (rows, cols) = gain.shape();
    if (rows, cols) != (3, observables::DIM) {
        return Err(PolicyError::GainShape { rows, cols });
    }
    if gain.iter().any(|v| !v.is_finite()) {
        return Err(PolicyError::NonFiniteGain);
    }
    Ok(gain.fixed_view::<3, { observables::DIM }>(0, 0).into_owned())
}
