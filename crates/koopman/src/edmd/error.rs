use thiserror::Error;

/// Errors raised while estimating a lifted model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    #[error("dataset has no samples")]
    Empty,

    #[error("misaligned snapshot matrices: x is {x:?}, y is {y:?}, u is {u:?}")]
    Shape {
        x: (usize, usize),
        y: (usize, usize),
        u: (usize, usize),
    },

    #[error("model matrices do not fit together: a is {a:?}, b is {b:?}")]
    ModelShape {
        a: (usize, usize),
        b: (usize, usize),
    },

    #[error("pseudo-inverse failed: {0}")]
    Pseudoinverse(String),

    #[error("{0} contains NaN or infinite values")]
    NonFinite(&'static str),
}
