use std::convert::Infallible;

use approx::assert_relative_eq;
use nalgebra::{DMatrix, Matrix3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use uom::si::{f64::Time, time::second};

use crate::{
    ConfigError, DatasetBuilder, Excitation, Inertia, LiftedDataset, TrajectoryConfig,
    trajectory,
};

use super::{EstimationError, Estimator, EstimatorConfig, Event, LiftedModel};

fn random(rng: &mut StdRng, rows: usize, cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0..1.0))
}

/// Noiseless data generated by a known lifted model.
fn linear_data(samples: usize) -> (DMatrix<f64>, DMatrix<f64>, LiftedDataset) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = random(&mut rng, 9, 9) * 0.3;
    let b = random(&mut rng, 9, 3);
    let x = random(&mut rng, 9, samples);
    let u = random(&mut rng, 3, samples);
    let y = &a * &x + &b * &u;

    let data = LiftedDataset::new(x, y, u).expect("shapes are aligned");
    (a, b, data)
}

#[test]
fn recovers_exact_model_from_noiseless_data() {
    let (a, b, data) = linear_data(200);

    let fit = Estimator::default()
        .fit_lifted_unobserved(&data)
        .expect("should fit");

    assert_relative_eq!(fit.model.a(), &a, epsilon = 1e-6);
    assert_relative_eq!(fit.model.b(), &b, epsilon = 1e-6);
    assert_eq!(fit.diagnostics.rank, 12);
    assert_eq!(fit.diagnostics.singular_values.len(), 12);
    assert!(!fit.diagnostics.ill_conditioned);
    assert!(fit.diagnostics.residual < 1e-9);
}

#[test]
fn reports_events_in_order() {
    let (_, _, data) = linear_data(50);
    let mut events = Vec::new();

    Estimator::default()
        .fit_lifted(&data, |event: &Event| -> Option<Infallible> {
            events.push(*event);
            None
        })
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        Event::Lifted {
            samples: 50,
            states: 9,
            inputs: 3
        }
    );
    assert!(matches!(events[1], Event::Fitted { .. }));
}

#[test]
fn rank_deficiency_is_a_warning_not_an_error() {
    let (a, _, data) = linear_data(60);
    let x = data.x().clone();
    let u = DMatrix::zeros(3, 60);
    let y = &a * &x;
    let data = LiftedDataset::new(x, y, u).unwrap();

    let mut warned = false;
    let fit = Estimator::default()
        .fit_lifted(&data, |event: &Event| -> Option<Infallible> {
            if let Event::IllConditioned { rank, rows, .. } = event {
                assert_eq!((*rank, *rows), (9, 12));
                warned = true;
            }
            None
        })
        .expect("ill-conditioned data should still fit");

    assert!(warned);
    assert!(fit.diagnostics.ill_conditioned);
    assert!(fit.diagnostics.condition_number > 1e10);
    assert_relative_eq!(fit.model.a(), &a, epsilon = 1e-6);
    assert_relative_eq!(fit.model.b(), &DMatrix::zeros(9, 3), epsilon = 1e-9);
}

#[test]
fn rejects_empty_and_non_finite_data() {
    let empty = LiftedDataset::new(
        DMatrix::zeros(9, 0),
        DMatrix::zeros(9, 0),
        DMatrix::zeros(3, 0),
    )
    .unwrap();
    assert_eq!(
        Estimator::default().fit_lifted_unobserved(&empty),
        Err(EstimationError::Empty)
    );

    let (_, _, data) = linear_data(20);
    let mut x = data.x().clone();
    x[(4, 7)] = f64::NAN;
    let poisoned = LiftedDataset::new(x, data.y().clone(), data.u().clone()).unwrap();
    assert_eq!(
        Estimator::default().fit_lifted_unobserved(&poisoned),
        Err(EstimationError::NonFinite("dataset"))
    );
}

#[test]
fn fits_simulated_rigid_body_data() {
    let inertia = Inertia::new(Matrix3::new(40.0, 1.2, 0.9, 1.2, 17.0, 1.4, 0.9, 1.4, 15.0))
        .unwrap();
    let config = TrajectoryConfig::new(
        5,
        Time::new::<second>(1.0),
        Time::new::<second>(0.01),
    )
    .unwrap();

    let mut builder = DatasetBuilder::new();
    trajectory::generate_unobserved(&config, &inertia, &Excitation, &mut builder).unwrap();
    let data = builder.build();

    let fit = Estimator::default().fit_unobserved(&data).expect("should fit");

    assert_eq!(fit.model.a().shape(), (9, 9));
    assert_eq!(fit.model.b().shape(), (9, 3));
    assert_eq!(fit.diagnostics.samples, 5 * 99);

    // The linear rows of the lifted model approximate one RK4 step.
    let column = 10;
    let lifted = data.lift();
    let predicted = fit.model.predict(
        &lifted.x().column(column).into_owned(),
        &lifted.u().column(column).into_owned(),
    );
    for row in 0..3 {
        assert_relative_eq!(predicted[row], data.y()[(row, column)], epsilon = 1e-3);
    }
}

#[test]
fn model_shapes_are_validated() {
    let result = LiftedModel::new(DMatrix::zeros(9, 9), DMatrix::zeros(8, 3));
    assert!(matches!(result, Err(EstimationError::ModelShape { .. })));
}

#[test]
fn validates_config() {
    assert_eq!(EstimatorConfig::new(0.5), Err(ConfigError::ConditionLimit));
    assert_eq!(
        EstimatorConfig::default().with_cutoff(-1.0),
        Err(ConfigError::Cutoff)
    );

    let config = EstimatorConfig::default();
    assert_relative_eq!(config.relative_cutoff(12, 100), 100.0 * f64::EPSILON);
    let config = config.with_cutoff(1e-8).unwrap();
    assert_relative_eq!(config.relative_cutoff(12, 100), 1e-8);
}
