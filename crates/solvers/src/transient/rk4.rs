//! Classical fourth-order Runge–Kutta solver for ODE problems.
//!
//! Each step evaluates the derivative at four stage points and combines them:
//!
//! ```text
//! k1 = f(y_n)
//! k2 = f(y_n + dt/2 * k1)
//! k3 = f(y_n + dt/2 * k2)
//! k4 = f(y_n + dt * k3)
//! y_{n+1} = y_n + dt/6 * (k1 + 2*k2 + 2*k3 + k4)
//! ```
//!
//! Inputs that are not part of the integrated state are held constant across
//! all four stages (see [`OdeProblem::build_input`]).
//!
//! # Example
//!
//! ```ignore
//! use spindle_solvers::transient::rk4;
//!
//! let next = rk4::step(&model, &problem, &current, dt)?;
//! let solution = rk4::solve_unobserved(&model, &problem, initial_input, dt, steps)?;
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use std::ops::Mul;

use spindle_core::{DerivativeOf, Model, Observer, OdeProblem, Snapshot, StepIntegrable};

/// Advances a snapshot by one RK4 step.
///
/// The stepped state is combined as a chain of linear steps
/// (`k1·dt/6`, `k2·dt/3`, `k3·dt/3`, `k4·dt/6`), so any
/// [`StepIntegrable`] state whose step is linear in `derivative * delta` works.
///
/// [`OdeProblem::finalize_step`] is applied to the resulting input before the
/// model is evaluated at the new state.
///
/// # Errors
///
/// Returns an error if the model or problem fails at any stage.
pub fn step<M, P>(
    model: &M,
    problem: &P,
    current: &Snapshot<M::Input, M::Output>,
    dt: P::Delta,
) -> Result<Snapshot<M::Input, M::Output>, Error>
where
    M: Model,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone + Mul<f64, Output = P::Delta>,
    DerivativeOf<P::State, P::Delta>: Clone,
{
    let state = problem.state(&current.input).map_err(Error::problem)?;
    let half = dt.clone() * 0.5;

    let k1 = problem
        .derivative(&current.input, &current.output)
        .map_err(Error::problem)?;
    let k2 = stage(model, problem, &current.input, &state, k1.clone(), &half)?;
    let k3 = stage(model, problem, &current.input, &state, k2.clone(), &half)?;
    let k4 = stage(model, problem, &current.input, &state, k3.clone(), &dt)?;

    let next_state = state
        .step(k1, dt.clone() * (1.0 / 6.0))
        .step(k2, dt.clone() * (1.0 / 3.0))
        .step(k3, dt.clone() * (1.0 / 3.0))
        .step(k4, dt.clone() * (1.0 / 6.0));

    let next_input = problem
        .build_input(&current.input, &next_state, &dt)
        .map_err(Error::problem)?;
    let next_input = problem
        .finalize_step(next_input, &current.input, &current.output, &dt)
        .map_err(Error::problem)?;

    let next_output = model.call(&next_input).map_err(Error::model)?;
    Ok(Snapshot::new(next_input, next_output))
}

/// Evaluates the derivative at `state + derivative * delta`.
fn stage<M, P>(
    model: &M,
    problem: &P,
    base: &M::Input,
    state: &P::State,
    derivative: DerivativeOf<P::State, P::Delta>,
    delta: &P::Delta,
) -> Result<DerivativeOf<P::State, P::Delta>, Error>
where
    M: Model,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone,
{
    let stage_state = state.step(derivative, delta.clone());
    let input = problem
        .build_input(base, &stage_state, delta)
        .map_err(Error::problem)?;
    let output = model.call(&input).map_err(Error::model)?;
    problem.derivative(&input, &output).map_err(Error::problem)
}

/// Integrates an ODE problem for a fixed number of RK4 steps.
///
/// # Observer
///
/// The observer receives an [`Event`] for the initial snapshot and after each
/// accepted step, and may return [`Action::StopEarly`] to end the integration.
///
/// # Errors
///
/// Returns an error if the model or problem returns an error at any point.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: P::Delta,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone + Mul<f64, Output = P::Delta>,
    DerivativeOf<P::State, P::Delta>: Clone,
    Obs: Observer<Event<M::Input, M::Output>, Action>,
{
    let initial_output = model.call(&initial).map_err(Error::model)?;
    let mut current = Snapshot::new(initial, initial_output);

    let mut history = Vec::with_capacity(steps + 1);
    history.push(current.clone());

    let event = Event {
        step: 0,
        snapshot: current.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    for step_number in 1..=steps {
        let next = step(model, problem, &current, dt.clone())?;
        history.push(next.clone());

        let event = Event {
            step: step_number,
            snapshot: next.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step_number,
            });
        }

        current = next;
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps,
    })
}

/// Integrates an ODE problem without observation.
///
/// # Errors
///
/// Returns an error if the model or problem returns an error at any point.
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    initial: M::Input,
    dt: P::Delta,
    steps: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    M::Input: Clone,
    M::Output: Clone,
    P: OdeProblem<Input = M::Input, Output = M::Output>,
    P::Delta: Clone + Mul<f64, Output = P::Delta>,
    DerivativeOf<P::State, P::Delta>: Clone,
{
    solve(model, problem, initial, dt, steps, ())
}
