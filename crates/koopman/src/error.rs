use thiserror::Error;

/// Errors raised when validating configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("inertia matrix has non-finite entries")]
    NonFiniteInertia,

    #[error("inertia matrix is not symmetric (asymmetry {asymmetry:e})")]
    AsymmetricInertia { asymmetry: f64 },

    #[error("inertia matrix is not positive definite")]
    IndefiniteInertia,

    #[error("trajectory count must be at least one")]
    TrajectoryCount,

    #[error("duration must be finite and positive")]
    Duration,

    #[error("time step must be finite, positive, and no longer than the duration")]
    TimeStep,

    #[error("initial angular velocity bound must be finite and non-negative")]
    OmegaBound,

    #[error("condition limit must be finite and at least one")]
    ConditionLimit,

    #[error("pseudo-inverse cutoff must be finite and non-negative")]
    Cutoff,

    #[error("certificate margin must be finite and positive")]
    Margin,

    #[error("trajectory has {omega} velocity samples but {torque} torque samples")]
    SampleCount { omega: usize, torque: usize },

    #[error("`{name}` is {found:?}, expected {expected:?}")]
    Dimension {
        name: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
