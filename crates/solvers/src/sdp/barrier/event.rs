/// The two stages of a barrier solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Searching for a strictly feasible starting point.
    ///
    /// The reported objective is the auxiliary slack `s`; the search ends as
    /// soon as `s` drops below zero.
    Feasibility,

    /// Following the central path toward the optimum.
    Optimality,
}

/// Event emitted after each centering step of the barrier method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Which stage of the solve produced the event.
    pub phase: Phase,

    /// Outer iteration within the phase, starting at 1.
    pub outer: usize,

    /// Barrier weight used for this centering.
    pub t: f64,

    /// Objective at the centered point.
    pub objective: f64,

    /// Duality gap bound `degree / t`.
    pub gap: f64,

    /// Newton iterations spent in this centering.
    pub newton_iters: usize,
}
