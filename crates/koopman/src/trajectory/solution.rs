use super::Trajectory;

/// Indicates how generation terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Generated every requested trajectory.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The trajectories produced by a generation run, in index order.
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: Status,
    pub trajectories: Vec<Trajectory>,
}
