use spindle_solvers::sdp::Status;

/// Events emitted during robust gain synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The SDP has been assembled.
    ProblemBuilt { variables: usize, lmi_dim: usize },

    /// The backend returned.
    Solved {
        status: Status,
        objective: f64,
        iterations: usize,
    },

    /// A gain has been recovered from the certificate.
    GainRecovered { gamma: f64 },
}
