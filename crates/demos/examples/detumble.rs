//! Identifies a Koopman model of a tumbling spacecraft and synthesizes a
//! robust detumbling gain.
//!
//! Run with `cargo run --release --example detumble [config.toml]`. Progress is
//! logged through `tracing` (set `RUST_LOG=debug` for solver iterations), and
//! the time series, matrices, and spectra are written to JSON for plotting.
//!
//! With `--features clarabel` the certificate is solved by Clarabel; otherwise
//! the built-in barrier method is used.

use std::{error::Error, fs, path::PathBuf};

use nalgebra::{Complex, DMatrix, Matrix3};
use serde::{Deserialize, Serialize};
use spindle_koopman::{
    DatasetBuilder, Estimator, Excitation, Inertia, RobustGainSynthesizer, SynthesisConfig,
    TrajectoryConfig,
    analysis::{self, Spectrum},
    trajectory,
};
use spindle_observers::LogObserver;
#[cfg(not(feature = "clarabel"))]
use spindle_solvers::sdp::barrier::{self, Barrier};
#[cfg(feature = "clarabel")]
use spindle_solvers::sdp::clarabel::Clarabel;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uom::si::{f64::Time, time::second};

const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/detumble.toml");

#[derive(Debug, Deserialize)]
struct Config {
    trajectories: usize,
    duration: f64,
    dt: f64,
    seed: u64,
    omega_bound: f64,
    inertia: [[f64; 3]; 3],
    disturbance_scale: f64,
    output: PathBuf,
    #[cfg_attr(feature = "clarabel", allow(dead_code))]
    barrier: BarrierConfig,
    #[cfg_attr(not(feature = "clarabel"), allow(dead_code))]
    #[serde(default)]
    clarabel: ClarabelConfig,
}

#[derive(Debug, Deserialize)]
struct BarrierConfig {
    tolerance: f64,
    max_outer_iters: usize,
    max_newton_iters: usize,
}

#[derive(Debug, Deserialize)]
struct ClarabelConfig {
    tolerance: f64,
    max_iter: u32,
}

impl Default for ClarabelConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iter: 200,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    /// Sample times of the last trajectory, in seconds.
    time: Vec<f64>,
    omega: Vec<[f64; 3]>,
    torque: Vec<[f64; 3]>,
    alift: Vec<Vec<f64>>,
    blift: Vec<Vec<f64>>,
    kd: Option<Vec<Vec<f64>>>,
    gamma: Option<f64>,
    open_loop: Vec<[f64; 2]>,
    closed_loop: Option<Vec<[f64; 2]>>,
    condition_number: f64,
    residual: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config: Config = toml::from_str(&fs::read_to_string(&path)?)?;
    info!(path = %path.display(), "Loaded configuration");

    let inertia = Inertia::new(Matrix3::from_fn(|i, j| config.inertia[i][j]))?;
    let trajectory_config = TrajectoryConfig::new(
        config.trajectories,
        Time::new::<second>(config.duration),
        Time::new::<second>(config.dt),
    )?
    .seed(config.seed)
    .omega_bound(config.omega_bound)?;

    let mut builder = DatasetBuilder::new();
    let generated = trajectory::generate_parallel(
        &trajectory_config,
        &inertia,
        &Excitation,
        &mut builder,
        LogObserver,
    )?;
    let data = builder.build();

    let fit = Estimator::default().fit(&data, LogObserver)?;
    let states = fit.model.num_states();
    info!(
        states,
        inputs = fit.model.num_inputs(),
        samples = fit.diagnostics.samples,
        "Koopman operators computed"
    );

    let c = DMatrix::identity(states, states);
    let bd = DMatrix::identity(states, states) * config.disturbance_scale;

    let synthesizer = synthesizer(&config)?;

    let open_loop = Spectrum::of(fit.model.a())?;
    info!(radius = open_loop.spectral_radius(), "Open-loop spectrum");

    let (kd, gamma, closed_loop) =
        match synthesizer.synthesize_lifted(&fit.model, &c, &bd, LogObserver) {
            Ok(gain) => {
                let closed = Spectrum::of(&analysis::closed_loop(&fit.model, &gain)?)?;
                info!(
                    radius = closed.spectral_radius(),
                    stable = closed.is_schur_stable(1e-9),
                    "Closed-loop spectrum"
                );
                (Some(rows(&gain.k)), Some(gain.gamma), Some(points(&closed)))
            }
            Err(err) => {
                error!(%err, "Robust synthesis failed; no gain is applied");
                (None, None, None)
            }
        };

    let last = generated
        .trajectories
        .last()
        .ok_or("no trajectories were generated")?;

    let report = Report {
        time: last.times(),
        omega: last.omega().iter().map(|w| [w.x, w.y, w.z]).collect(),
        torque: last.torque().iter().map(|t| [t.x, t.y, t.z]).collect(),
        alift: rows(fit.model.a()),
        blift: rows(fit.model.b()),
        kd,
        gamma,
        open_loop: points(&open_loop),
        closed_loop,
        condition_number: fit.diagnostics.condition_number,
        residual: fit.diagnostics.residual,
    };

    fs::write(&config.output, serde_json::to_string_pretty(&report)?)?;
    info!(path = %config.output.display(), "Wrote results");

    Ok(())
}

#[cfg(not(feature = "clarabel"))]
fn synthesizer(config: &Config) -> Result<RobustGainSynthesizer<Barrier>, Box<dyn Error>> {
    let solver = barrier::Config::new(
        config.barrier.tolerance,
        config.barrier.max_outer_iters,
        config.barrier.max_newton_iters,
    )?;
    info!(tolerance = solver.tolerance(), "Using the barrier SDP backend");
    Ok(RobustGainSynthesizer::new(
        Barrier::new(solver),
        SynthesisConfig::default(),
    ))
}

#[cfg(feature = "clarabel")]
fn synthesizer(config: &Config) -> Result<RobustGainSynthesizer<Clarabel>, Box<dyn Error>> {
    let solver = Clarabel::new(config.clarabel.tolerance, config.clarabel.max_iter);
    info!(tolerance = config.clarabel.tolerance, "Using the Clarabel SDP backend");
    Ok(RobustGainSynthesizer::new(solver, SynthesisConfig::default()))
}

fn rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

fn points(spectrum: &Spectrum) -> Vec<[f64; 2]> {
    spectrum
        .eigenvalues()
        .iter()
        .map(|z: &Complex<f64>| [z.re, z.im])
        .collect()
}
