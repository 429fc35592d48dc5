use std::{convert::Infallible, fmt::Debug};

use spindle_core::Observer;
use spindle_koopman::{edmd, synthesis, trajectory};
use spindle_solvers::{
    sdp::barrier::{self, Phase},
    transient::rk4,
};
use tracing::{debug, info, trace, warn};

/// Forwards events to [`tracing`] and never intervenes.
///
/// Progress goes to `info`, solver iterations to `debug`, integrator steps
/// to `trace`, and ill-conditioning or failed solves to `warn`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogObserver;

impl Observer<trajectory::Event, trajectory::Action> for LogObserver {
    fn observe(&mut self, event: &trajectory::Event) -> Option<trajectory::Action> {
        match *event {
            trajectory::Event::Started { total, samples } => {
                info!(total, samples, "Generating trajectories");
            }
            trajectory::Event::TrajectoryCompleted { index, total } => {
                info!("Completed trajectory {}/{}", index + 1, total);
            }
        }
        None
    }
}

impl Observer<edmd::Event, Infallible> for LogObserver {
    fn observe(&mut self, event: &edmd::Event) -> Option<Infallible> {
        match *event {
            edmd::Event::Lifted {
                samples,
                states,
                inputs,
            } => {
                info!(samples, states, inputs, "Lifted snapshot matrices");
            }
            edmd::Event::IllConditioned {
                rank,
                rows,
                condition,
            } => {
                warn!(rank, rows, condition, "Regressor is ill conditioned");
            }
            edmd::Event::Fitted {
                residual,
                condition,
            } => {
                info!(residual, condition, "Fitted lifted model");
            }
        }
        None
    }
}

impl Observer<synthesis::Event, Infallible> for LogObserver {
    fn observe(&mut self, event: &synthesis::Event) -> Option<Infallible> {
        match *event {
            synthesis::Event::ProblemBuilt { variables, lmi_dim } => {
                info!(variables, lmi_dim, "Built robust synthesis problem");
            }
            synthesis::Event::Solved {
                status,
                objective,
                iterations,
            } => {
                if status.is_success() {
                    info!(?status, objective, iterations, "Solved certificate");
                } else {
                    warn!(?status, objective, iterations, "Certificate solve failed");
                }
            }
            synthesis::Event::GainRecovered { gamma } => {
                info!(gamma, "Recovered feedback gain");
            }
        }
        None
    }
}

impl Observer<barrier::Event, barrier::Action> for LogObserver {
    fn observe(&mut self, event: &barrier::Event) -> Option<barrier::Action> {
        let phase = match event.phase {
            Phase::Feasibility => "feasibility",
            Phase::Optimality => "optimality",
        };
        debug!(
            phase,
            outer = event.outer,
            t = event.t,
            objective = event.objective,
            gap = event.gap,
            newton_iters = event.newton_iters,
            "Barrier centering"
        );
        None
    }
}

impl<I: Debug, O: Debug> Observer<rk4::Event<I, O>, rk4::Action> for LogObserver {
    fn observe(&mut self, event: &rk4::Event<I, O>) -> Option<rk4::Action> {
        trace!(
            step = event.step,
            input = ?event.snapshot.input,
            output = ?event.snapshot.output,
            "RK4 step"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spindle_solvers::sdp::Status;

    #[test]
    fn never_intervenes() {
        let mut observer = LogObserver;

        let action: Option<trajectory::Action> =
            observer.observe(&trajectory::Event::TrajectoryCompleted { index: 0, total: 1 });
        assert!(action.is_none());

        let action: Option<Infallible> = observer.observe(&synthesis::Event::Solved {
            status: Status::Infeasible,
            objective: 0.0,
            iterations: 3,
        });
        assert!(action.is_none());

        let action: Option<barrier::Action> = observer.observe(&barrier::Event {
            phase: Phase::Optimality,
            outer: 1,
            t: 1.0,
            objective: 2.0,
            gap: 0.5,
            newton_iters: 4,
        });
        assert!(action.is_none());
    }
}
