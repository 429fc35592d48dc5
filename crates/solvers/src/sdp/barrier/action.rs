/// Actions an observer can take during a barrier solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver and report [`Status::StoppedByObserver`].
    ///
    /// [`Status::StoppedByObserver`]: crate::sdp::Status::StoppedByObserver
    StopEarly,
}
