/// Actions an observer can return during trajectory generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop generating; trajectories completed so far are kept.
    StopEarly,
}
