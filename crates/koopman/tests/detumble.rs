//! End-to-end identification and synthesis on the reference spacecraft.

use nalgebra::{DMatrix, Matrix3, Vector3};
use rand::{SeedableRng, rngs::StdRng};
use spindle_koopman::{
    ClosedLoop, DatasetBuilder, Estimator, Excitation, FeedbackPolicy, Inertia, Observables,
    PolicyError, RobustGainSynthesizer, SynthesisConfig, TrajectoryConfig, TrajectoryError,
    analysis::{self, Spectrum},
    trajectory,
};
use spindle_solvers::sdp::{Backend, barrier::Barrier};
use uom::si::{f64::Time, time::second};

fn spacecraft() -> Inertia {
    Inertia::new(Matrix3::new(40.0, 1.2, 0.9, 1.2, 17.0, 1.4, 0.9, 1.4, 15.0))
        .expect("reference inertia is valid")
}

fn seconds(value: f64) -> Time {
    Time::new::<second>(value)
}

/// Identifies a lifted model, synthesizes a gain, and checks the closed loop.
fn identify_and_stabilize<B: Backend>(count: usize, backend: B) {
    let inertia = spacecraft();
    let config = TrajectoryConfig::new(count, seconds(5.0), seconds(0.01)).unwrap();

    let mut builder = DatasetBuilder::new();
    let generated =
        trajectory::generate_unobserved(&config, &inertia, &Excitation, &mut builder)
            .expect("excitation data should generate");
    assert_eq!(generated.trajectories.len(), count);
    assert!(generated.trajectories.iter().all(|t| t.len() == 500));

    let data = builder.build();
    assert_eq!(data.len(), count * 499);

    let fit = Estimator::default()
        .fit_unobserved(&data)
        .expect("lifted model should fit");
    let model = &fit.model;
    assert_eq!(model.a().shape(), (9, 9));
    assert_eq!(model.b().shape(), (9, 3));
    assert!(model.a().iter().chain(model.b().iter()).all(|v| v.is_finite()));

    let open = Spectrum::of(model.a()).expect("open-loop spectrum");
    assert_eq!(open.eigenvalues().len(), 9);

    let c = DMatrix::identity(9, 9);
    let bd = DMatrix::zeros(9, 9);
    let gain = RobustGainSynthesizer::new(backend, SynthesisConfig::default())
        .synthesize_lifted(model, &c, &bd, ())
        .unwrap_or_else(|err| panic!("reference spacecraft should be stabilizable: {err}"));

    assert!(gain.status.is_success());
    assert_eq!(gain.k.shape(), (3, 9));
    assert!(gain.k.iter().all(|v| v.is_finite()));
    assert!(gain.gamma.is_finite() && gain.gamma > 0.0);

    let closed = analysis::closed_loop(model, &gain).unwrap();
    let radius = Spectrum::of(&closed).unwrap().spectral_radius();
    assert!(radius < 1.0, "closed-loop radius was {radius}");

    let policy = ClosedLoop::new(&gain.k).expect("3x9 gain");
    let observables = Observables::lift(&Vector3::new(0.1, -0.1, 0.05));
    let torque = policy
        .torque(&observables, &mut StdRng::seed_from_u64(0))
        .expect("gain is set");
    assert!(torque.iter().all(|t| t.is_finite()));
}

#[test]
fn detumbling_pipeline_on_reduced_data() {
    identify_and_stabilize(8, Barrier::default());
}

#[test]
fn detumbling_pipeline_reference_experiment() {
    identify_and_stabilize(100, Barrier::default());
}

#[cfg(feature = "clarabel")]
#[test]
fn detumbling_pipeline_with_clarabel() {
    identify_and_stabilize(100, spindle_solvers::sdp::clarabel::Clarabel::default());
}

#[test]
fn closed_loop_without_gain_is_an_error() {
    let config = TrajectoryConfig::new(1, seconds(1.0), seconds(0.01)).unwrap();
    let mut builder = DatasetBuilder::new();

    let policy = ClosedLoop::pending();
    let error = trajectory::generate_unobserved(&config, &spacecraft(), &policy, &mut builder)
        .expect_err("a pending policy must not produce torque");

    assert!(matches!(
        error,
        TrajectoryError::Policy {
            index: 0,
            source: PolicyError::GainUnavailable
        }
    ));
    assert!(builder.is_empty());
}
