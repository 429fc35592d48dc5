/// Progress events emitted during trajectory generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Generation is about to start.
    Started { total: usize, samples: usize },

    /// Trajectory `index` has been simulated and appended to the dataset.
    TrajectoryCompleted { index: usize, total: usize },
}
