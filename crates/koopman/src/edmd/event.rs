/// Events emitted while fitting a lifted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The regressor `Z = [X; U]` has been assembled.
    Lifted {
        samples: usize,
        states: usize,
        inputs: usize,
    },

    /// The regressor is rank deficient or badly conditioned.
    ///
    /// Estimation continues; the fitted model may be unreliable.
    IllConditioned {
        rank: usize,
        rows: usize,
        condition: f64,
    },

    /// The model has been fitted.
    Fitted { residual: f64, condition: f64 },
}
