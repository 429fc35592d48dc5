use crate::ConfigError;

/// Configuration for robust gain synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisConfig {
    margin: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        // Known-good value, unwrap is safe
        Self::new(1e-6).unwrap()
    }
}

impl SynthesisConfig {
    /// Creates a config with the positivity margin `ε` used in
    /// `Pd ⪰ ε·I` and `γ ≥ ε`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Margin`] unless `margin` is finite and positive.
    pub fn new(margin: f64) -> Result<Self, ConfigError> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(ConfigError::Margin);
        }
        Ok(Self { margin })
    }

    #[must_use]
    pub fn margin(&self) -> f64 {
        self.margin
    }
}
