//! Snapshot matrices for identification.
//!
//! Trajectories are appended to a [`DatasetBuilder`], which is frozen into an
//! immutable [`Dataset`]. Column `i` of `x`, `y`, and `u` always describes the
//! same transition: state `x`, applied torque `u`, and successor state `y`.

use nalgebra::{DMatrix, Vector3};

use crate::{EstimationError, Trajectory, observables};

/// Accumulates aligned transitions from simulated trajectories.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    x: Vec<Vector3<f64>>,
    y: Vec<Vector3<f64>>,
    u: Vec<Vector3<f64>>,
}

impl DatasetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the `len − 1` transitions of a trajectory.
    pub fn push(&mut self, trajectory: &Trajectory) {
        let omega = trajectory.omega();
        let torque = trajectory.torque();

        for k in 1..omega.len() {
            self.x.push(omega[k - 1]);
            self.y.push(omega[k]);
            self.u.push(torque[k - 1]);
        }
    }

    /// Returns the number of transitions collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Freezes the collected transitions into snapshot matrices.
    #[must_use]
    pub fn build(self) -> Dataset {
        Dataset {
            x: columns(&self.x),
            y: columns(&self.y),
            u: columns(&self.u),
        }
    }
}

fn columns(vectors: &[Vector3<f64>]) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(3, vectors.len());
    for (j, v) in vectors.iter().enumerate() {
        matrix.set_column(j, v);
    }
    matrix
}

/// Raw `3 × N` snapshot matrices of angular velocity and torque.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: DMatrix<f64>,
    y: DMatrix<f64>,
    u: DMatrix<f64>,
}

impl Dataset {
    /// Creates a dataset from existing snapshot matrices.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationError::Shape`] unless all three matrices have
    /// three rows and the same number of columns.
    pub fn new(x: DMatrix<f64>, y: DMatrix<f64>, u: DMatrix<f64>) -> Result<Self, EstimationError> {
        check_shapes(&x, &y, &u, 3, 3)?;
        Ok(Self { x, y, u })
    }

    /// Returns the number of transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.ncols()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &DMatrix<f64> {
        &self.y
    }

    #[must_use]
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }

    /// Applies the observable dictionary to every state column.
    #[must_use]
    pub fn lift(&self) -> LiftedDataset {
        LiftedDataset {
            x: observables::lift_columns(&self.x),
            y: observables::lift_columns(&self.y),
            u: self.u.clone(),
        }
    }
}

/// Snapshot matrices in observable space: `9 × N` states, `3 × N` inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LiftedDataset {
    x: DMatrix<f64>,
    y: DMatrix<f64>,
    u: DMatrix<f64>,
}

impl LiftedDataset {
    /// Creates a lifted dataset from matrices already in observable space.
    ///
    /// The state dimension is taken from `x`, so this also accepts data from
    /// dictionaries other than the quadratic one.
    ///
    /// # Errors
    ///
    /// Returns [`EstimationError::Shape`] if `y` differs in shape from `x` or
    /// `u` has a different number of columns.
    pub fn new(x: DMatrix<f64>, y: DMatrix<f64>, u: DMatrix<f64>) -> Result<Self, EstimationError> {
        check_shapes(&x, &y, &u, x.nrows(), u.nrows())?;
        Ok(Self { x, y, u })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.ncols()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn x(&self) -> &DMatrix<f64> {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &DMatrix<f64> {
        &self.y
    }

    #[must_use]
    pub fn u(&self) -> &DMatrix<f64> {
        &self.u
    }
}

fn check_shapes(
    x: &DMatrix<f64>,
    y: &DMatrix<f64>,
    u: &DMatrix<f64>,
    state_rows: usize,
    input_rows: usize,
) -> Result<(), EstimationError> {
    let n = x.ncols();
    let aligned = x.nrows() == state_rows
        && y.shape() == (state_rows, n)
        && u.shape() == (input_rows, n);

    if aligned {
        Ok(())
    } else {
        Err(EstimationError::Shape {
            x: x.shape(),
            y: y.shape(),
            u: u.shape(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::dmatrix;
    use uom::si::{f64::Time, time::second};

    fn trajectory(omega: &[[f64; 3]], torque: &[[f64; 3]]) -> Trajectory {
        Trajectory::new(
            Time::new::<second>(0.1),
            omega.iter().map(|v| Vector3::from(*v)).collect(),
            torque.iter().map(|v| Vector3::from(*v)).collect(),
        )
        .expect("equal sample counts")
    }

    #[test]
    fn aligns_transitions_across_trajectories() {
        let first = trajectory(
            &[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
            &[[10.0, 0.0, 0.0], [20.0, 0.0, 0.0], [30.0, 0.0, 0.0]],
        );
        let other = trajectory(
            &[[0.0, 5.0, 0.0], [0.0, 6.0, 0.0]],
            &[[0.0, 50.0, 0.0], [0.0, 60.0, 0.0]],
        );

        let mut builder = DatasetBuilder::new();
        builder.push(&first);
        builder.push(&other);
        assert_eq!(builder.len(), 3);

        let data = builder.build();
        assert_eq!(data.x(), &dmatrix![1.0, 2.0, 0.0; 0.0, 0.0, 5.0; 0.0, 0.0, 0.0]);
        assert_eq!(data.y(), &dmatrix![2.0, 3.0, 0.0; 0.0, 0.0, 6.0; 0.0, 0.0, 0.0]);
        assert_eq!(data.u(), &dmatrix![10.0, 20.0, 0.0; 0.0, 0.0, 50.0; 0.0, 0.0, 0.0]);
    }

    #[test]
    fn single_sample_trajectory_adds_nothing() {
        let mut builder = DatasetBuilder::new();
        builder.push(&trajectory(&[[1.0, 2.0, 3.0]], &[[0.0, 0.0, 0.0]]));

        assert!(builder.is_empty());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn lifting_keeps_columns_aligned() {
        let data = Dataset::new(
            dmatrix![1.0, 2.0; 0.0, 0.0; 0.0, 1.0],
            dmatrix![2.0, 3.0; 0.0, 1.0; 1.0, 0.0],
            dmatrix![0.1, 0.2; 0.3, 0.4; 0.5, 0.6],
        )
        .unwrap();

        let lifted = data.lift();
        assert_eq!(lifted.x().shape(), (9, 2));
        assert_eq!(lifted.y().shape(), (9, 2));
        assert_eq!(lifted.u(), data.u());
        assert_eq!(lifted.x()[(5, 1)], 2.0);
        assert_eq!(lifted.y()[(3, 1)], 9.0);
    }

    #[test]
    fn rejects_misaligned_matrices() {
        let result = Dataset::new(
            DMatrix::zeros(3, 4),
            DMatrix::zeros(3, 4),
            DMatrix::zeros(3, 5),
        );
        assert!(matches!(result, Err(EstimationError::Shape { .. })));

        let result = LiftedDataset::new(
            DMatrix::zeros(9, 2),
            DMatrix::zeros(8, 2),
            DMatrix::zeros(3, 2),
        );
        assert!(matches!(result, Err(EstimationError::Shape { .. })));
    }
}
