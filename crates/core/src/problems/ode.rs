use crate::{DerivativeOf, StepIntegrable};

/// Adapts a [`Model`](crate::Model) to generic time integrators.
///
/// An ODE problem pulls the integrated state out of a model input, reads the
/// state derivative from the model's output, and rebuilds a model input from
/// a stepped state. Inputs that are not part of the state (an applied torque,
/// for example) are carried over from the base input unchanged, which gives
/// integrators a zero-order hold on them for the duration of a step.
pub trait OdeProblem {
    type Input;
    type Output;
    type Delta;
    type State: StepIntegrable<Self::Delta>;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extracts the state from model input.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the state cannot be extracted from the input.
    fn state(&self, input: &Self::Input) -> Result<Self::State, Self::Error>;

    /// Computes the derivative of the state from model input and output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn derivative(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<DerivativeOf<Self::State, Self::Delta>, Self::Error>;

    /// Builds model input from a state and the step taken to reach it.
    ///
    /// Multi-stage integrators call this for intermediate stage points as
    /// well as for the accepted end of a step, so it must not assume `delta`
    /// is a full step.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the input cannot be constructed from the state.
    fn build_input(
        &self,
        base: &Self::Input,
        state: &Self::State,
        delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error>;

    /// Finalizes input after a step is accepted.
    ///
    /// Called once per accepted step, never for stage points. This is the hook
    /// for discrete updates such as re-sampling a feedback torque.
    ///
    /// The default implementation returns the input unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if finalization fails.
    fn finalize_step(
        &self,
        next_input: Self::Input,
        _prev_input: &Self::Input,
        _prev_output: &Self::Output,
        _step_delta: &Self::Delta,
    ) -> Result<Self::Input, Self::Error> {
        Ok(next_input)
    }
}
