//! Rotational dynamics of a rigid body.
//!
//! Euler's rotation equation in the body frame,
//!
//! ```text
//! J·ω̇ = τ − ω × (J·ω)
//! ```
//!
//! is expressed as the [`EulerRotation`] model and integrated with the
//! generic RK4 solver through the [`Spin`] problem. The applied torque is
//! held constant over each step.

use std::convert::Infallible;

use nalgebra::Vector3;
use spindle_core::{Model, OdeProblem, Snapshot, StepIntegrable};
use spindle_solvers::transient::rk4;
use thiserror::Error;
use uom::si::{f64::Time, time::second};

use crate::Inertia;

/// Body-frame angular velocity in rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularVelocity(pub Vector3<f64>);

/// Body-frame angular acceleration in rad/s².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularAcceleration(pub Vector3<f64>);

impl StepIntegrable<Time> for AngularVelocity {
    type Derivative = AngularAcceleration;

    fn step(&self, derivative: AngularAcceleration, delta: Time) -> Self {
        Self(self.0 + derivative.0 * delta.get::<second>())
    }
}

/// Input to [`EulerRotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationInput {
    pub omega: AngularVelocity,

    /// Applied body-frame torque in N·m.
    pub torque: Vector3<f64>,
}

/// Output of [`EulerRotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationOutput {
    pub omega_dot: AngularAcceleration,
}

/// Errors raised when evaluating rotational dynamics.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DynamicsError {
    #[error("angular velocity or torque is not finite")]
    NonFinite,
}

/// Euler's rotation equation for a body with a fixed inertia tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerRotation {
    inertia: Inertia,
}

impl EulerRotation {
    #[must_use]
    pub fn new(inertia: Inertia) -> Self {
        Self { inertia }
    }

    #[must_use]
    pub fn inertia(&self) -> &Inertia {
        &self.inertia
    }

    /// Advances `omega` by one RK4 step of size `dt` under a constant torque.
    ///
    /// # Errors
    ///
    /// Returns an error if the state or torque is not finite at any stage.
    pub fn step(
        &self,
        omega: Vector3<f64>,
        torque: Vector3<f64>,
        dt: Time,
    ) -> Result<Vector3<f64>, rk4::Error> {
        let input = RotationInput {
            omega: AngularVelocity(omega),
            torque,
        };
        let output = self.call(&input).map_err(|err| rk4::Error::Model(Box::new(err)))?;

        let next = rk4::step(self, &Spin, &Snapshot::new(input, output), dt)?;
        Ok(next.input.omega.0)
    }
}

impl Model for EulerRotation {
    type Input = RotationInput;
    type Output = RotationOutput;
    type Error = DynamicsError;

    fn call(&self, input: &RotationInput) -> Result<RotationOutput, DynamicsError> {
        let omega = input.omega.0;
        let torque = input.torque;
        if omega.iter().chain(torque.iter()).any(|v| !v.is_finite()) {
            return Err(DynamicsError::NonFinite);
        }

        let momentum = self.inertia.matrix() * omega;
        let omega_dot = self.inertia.inverse() * (torque - omega.cross(&momentum));

        Ok(RotationOutput {
            omega_dot: AngularAcceleration(omega_dot),
        })
    }
}

/// Integrates [`EulerRotation`] with angular velocity as the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spin;

impl OdeProblem for Spin {
    type Input = RotationInput;
    type Output = RotationOutput;
    type Delta = Time;
    type State = AngularVelocity;
    type Error = Infallible;

    fn state(&self, input: &RotationInput) -> Result<AngularVelocity, Self::Error> {
        Ok(input.omega)
    }

    fn derivative(
        &self,
        _input: &RotationInput,
        output: &RotationOutput,
    ) -> Result<AngularAcceleration, Self::Error> {
        Ok(output.omega_dot)
    }

    fn build_input(
        &self,
        base: &RotationInput,
        state: &AngularVelocity,
        _delta: &Time,
    ) -> Result<RotationInput, Self::Error> {
        Ok(RotationInput {
            omega: *state,
            torque: base.torque,
        })
    }
}

/// A rotating rigid body that owns its angular velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    dynamics: EulerRotation,
    omega: Vector3<f64>,
}

impl RigidBody {
    /// Creates a body spinning at `omega` (rad/s).
    #[must_use]
    pub fn new(inertia: Inertia, omega: Vector3<f64>) -> Self {
        Self {
            dynamics: EulerRotation::new(inertia),
            omega,
        }
    }

    /// Returns the current angular velocity in rad/s.
    #[must_use]
    pub fn omega(&self) -> Vector3<f64> {
        self.omega
    }

    #[must_use]
    pub fn inertia(&self) -> &Inertia {
        self.dynamics.inertia()
    }

    /// Applies `torque` for `dt` and returns the new angular velocity.
    ///
    /// The body is left unchanged if the step fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the angular velocity or torque is not finite.
    pub fn step(&mut self, torque: Vector3<f64>, dt: Time) -> Result<Vector3<f64>, rk4::Error> {
        self.omega = self.dynamics.step(self.omega, torque, dt)?;
        Ok(self.omega)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn seconds(value: f64) -> Time {
        Time::new::<second>(value)
    }

    /// `J = diag(2, 2, 4)`: with `ω_z = 1` the transverse rate precesses at 1 rad/s.
    fn axisymmetric() -> Inertia {
        Inertia::principal(2.0, 2.0, 4.0).unwrap()
    }

    fn precession_error(dt: f64) -> f64 {
        let mut body = RigidBody::new(axisymmetric(), Vector3::new(0.5, 0.0, 1.0));
        let steps = (2.0 / dt).round() as usize;
        for _ in 0..steps {
            body.step(Vector3::zeros(), seconds(dt))
                .expect("torque-free motion should integrate");
        }

        // ω_x = a·cos(λt), ω_y = a·sin(λt) with λ = (I₃ − I)·ω_z / I = 1.
        let expected = Vector3::new(0.5 * 2.0_f64.cos(), 0.5 * 2.0_f64.sin(), 1.0);
        (body.omega() - expected).norm()
    }

    #[test]
    fn rest_stays_at_rest() {
        let mut body = RigidBody::new(axisymmetric(), Vector3::zeros());
        for _ in 0..100 {
            body.step(Vector3::zeros(), seconds(0.01)).unwrap();
        }
        assert_eq!(body.omega(), Vector3::zeros());
    }

    #[test]
    fn torque_free_precession_matches_closed_form() {
        assert!(precession_error(0.01) < 1e-8);
    }

    #[test]
    fn halving_step_shrinks_error_sixteenfold() {
        let ratio = precession_error(0.1) / precession_error(0.05);
        assert!(ratio > 13.0 && ratio < 19.0, "error ratio was {ratio}");
    }

    #[test]
    fn torque_spins_up_principal_axis() {
        let dynamics = EulerRotation::new(axisymmetric());
        let next = dynamics
            .step(Vector3::zeros(), Vector3::new(0.0, 0.0, 2.0), seconds(0.5))
            .unwrap();

        // ω̇_z = τ_z / I₃ = 0.5 rad/s².
        assert_relative_eq!(next, Vector3::new(0.0, 0.0, 0.25), epsilon = 1e-14);
    }

    #[test]
    fn model_matches_euler_equation() {
        let inertia = Inertia::new(nalgebra::Matrix3::new(
            40.0, 1.2, 0.9, 1.2, 17.0, 1.4, 0.9, 1.4, 15.0,
        ))
        .unwrap();
        let omega = Vector3::new(0.1, -0.2, 0.3);
        let torque = Vector3::new(1.0, 0.0, -1.0);

        let output = EulerRotation::new(inertia)
            .call(&RotationInput {
                omega: AngularVelocity(omega),
                torque,
            })
            .unwrap();

        let residual =
            inertia.matrix() * output.omega_dot.0 + omega.cross(&(inertia.matrix() * omega));
        assert_relative_eq!(residual, torque, epsilon = 1e-12);
    }

    #[test]
    fn rejects_non_finite_torque() {
        let mut body = RigidBody::new(axisymmetric(), Vector3::new(0.1, 0.0, 0.0));
        let result = body.step(Vector3::new(f64::NAN, 0.0, 0.0), seconds(0.01));

        assert!(matches!(result, Err(rk4::Error::Model(_))));
        assert_eq!(body.omega(), Vector3::new(0.1, 0.0, 0.0));
    }
}
