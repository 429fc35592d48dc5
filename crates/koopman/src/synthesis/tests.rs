use std::convert::Infallible;

use nalgebra::{DMatrix, dmatrix};
use spindle_solvers::sdp::barrier::Barrier;

use crate::{
    ConfigError,
    analysis::{Spectrum, feedback},
};

use super::{Event, RobustGainSynthesizer, SynthesisConfig, SynthesisError};

fn synthesizer() -> RobustGainSynthesizer {
    RobustGainSynthesizer::new(Barrier::default(), SynthesisConfig::default())
}

/// An open-loop unstable, controllable plant.
fn unstable_plant() -> (DMatrix<f64>, DMatrix<f64>) {
    let a = dmatrix![1.1, 0.2; 0.0, 0.9];
    let b = dmatrix![1.0; 0.5];
    (a, b)
}

#[test]
fn stabilizes_unstable_plant() {
    let (a, b) = unstable_plant();
    let c = DMatrix::identity(2, 2);
    let bd = DMatrix::zeros(2, 2);

    let mut events = Vec::new();
    let gain = synthesizer()
        .synthesize(&a, &b, &c, &bd, |event: &Event| -> Option<Infallible> {
            events.push(*event);
            None
        })
        .expect("a controllable plant has a certificate");

    assert!(gain.status.is_success());
    assert_eq!(gain.k.shape(), (1, 2));
    assert!(gain.gamma >= SynthesisConfig::default().margin());

    let closed = feedback(&a, &b, &gain.k).unwrap();
    let spectrum = Spectrum::of(&closed).unwrap();
    assert!(
        spectrum.spectral_radius() < 1.0,
        "closed-loop radius was {}",
        spectrum.spectral_radius()
    );

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        Event::ProblemBuilt {
            variables: 3 + 2 + 1,
            lmi_dim: 2 + 2 + 2 + 2,
        }
    );
    assert!(matches!(events[1], Event::Solved { .. }));
    assert!(matches!(events[2], Event::GainRecovered { .. }));
}

#[test]
fn stabilizes_scalar_plant() {
    let gain = synthesizer()
        .synthesize_unobserved(&dmatrix![2.0], &dmatrix![1.0], &dmatrix![1.0], &dmatrix![0.0])
        .expect("should synthesize");

    // |2 − k| < 1
    let k = gain.k[(0, 0)];
    assert!(k > 1.0 && k < 3.0, "gain was {k}");
}

#[test]
fn shrinking_disturbance_keeps_problem_feasible() {
    let (a, b) = unstable_plant();
    let c = DMatrix::identity(2, 2);
    let bd = dmatrix![0.1; 0.1];

    let mut previous = f64::INFINITY;
    for scale in [1.0, 0.5, 0.0] {
        let gain = synthesizer()
            .synthesize_unobserved(&a, &b, &c, &(&bd * scale))
            .unwrap_or_else(|err| panic!("scale {scale} should stay feasible: {err}"));

        assert!(
            gain.gamma <= previous + 1e-3,
            "gamma rose from {previous} to {}",
            gain.gamma
        );
        previous = gain.gamma;
    }
}

#[test]
fn unstabilizable_plant_is_infeasible() {
    // The unstable mode at 2 is not reachable from the input.
    let a = dmatrix![2.0, 0.0; 0.0, 0.5];
    let b = dmatrix![0.0; 1.0];
    let c = DMatrix::identity(2, 2);
    let bd = DMatrix::zeros(2, 1);

    let synthesizer =
        RobustGainSynthesizer::new(Barrier::default(), SynthesisConfig::new(0.1).unwrap());

    match synthesizer.synthesize_unobserved(&a, &b, &c, &bd) {
        Err(SynthesisError::Infeasible { constraints }) => {
            assert_eq!(constraints.len(), 3);
            assert!(constraints.iter().any(|report| report.min_eigenvalue < 0.0));
        }
        other => panic!("expected infeasibility, got {other:?}"),
    }
}

#[test]
fn rejects_mismatched_dimensions() {
    let (a, b) = unstable_plant();
    let result = synthesizer().synthesize_unobserved(
        &a,
        &b,
        &DMatrix::identity(3, 3),
        &DMatrix::zeros(2, 1),
    );

    assert!(matches!(
        result,
        Err(SynthesisError::Config(ConfigError::Dimension { name: "c", .. }))
    ));
}

#[test]
fn validates_margin() {
    assert_eq!(SynthesisConfig::new(0.0), Err(ConfigError::Margin));
    assert_eq!(SynthesisConfig::new(f64::NAN), Err(ConfigError::Margin));
}

#[cfg(feature = "clarabel")]
mod clarabel {
    use spindle_solvers::sdp::clarabel::Clarabel;

    use super::*;

    fn synthesizer() -> RobustGainSynthesizer<Clarabel> {
        RobustGainSynthesizer::new(Clarabel::default(), SynthesisConfig::default())
    }

    #[test]
    fn stabilizes_unstable_plant() {
        let (a, b) = unstable_plant();
        let gain = synthesizer()
            .synthesize_unobserved(&a, &b, &DMatrix::identity(2, 2), &DMatrix::zeros(2, 2))
            .expect("a controllable plant has a certificate");

        assert!(gain.status.is_success());
        assert_eq!(gain.k.shape(), (1, 2));

        let spectrum = Spectrum::of(&feedback(&a, &b, &gain.k).unwrap()).unwrap();
        assert!(
            spectrum.spectral_radius() < 1.0,
            "closed-loop radius was {}",
            spectrum.spectral_radius()
        );
    }

    #[test]
    fn agrees_with_barrier_on_scalar_plant() {
        let plant = (dmatrix![2.0], dmatrix![1.0], dmatrix![1.0], dmatrix![0.0]);
        let gain = synthesizer()
            .synthesize_unobserved(&plant.0, &plant.1, &plant.2, &plant.3)
            .expect("should synthesize");

        let k = gain.k[(0, 0)];
        assert!(k > 1.0 && k < 3.0, "gain was {k}");
    }

    #[test]
    fn unstabilizable_plant_is_infeasible() {
        let a = dmatrix![2.0, 0.0; 0.0, 0.5];
        let b = dmatrix![0.0; 1.0];
        let synthesizer =
            RobustGainSynthesizer::new(Clarabel::default(), SynthesisConfig::new(0.1).unwrap());

        let result = synthesizer.synthesize_unobserved(
            &a,
            &b,
            &DMatrix::identity(2, 2),
            &DMatrix::zeros(2, 1),
        );
        match result {
            Err(SynthesisError::Infeasible { constraints }) => assert_eq!(constraints.len(), 3),
            other => panic!("expected infeasibility, got {other:?}"),
        }
    }
}
