use crate::ConfigError;

/// Configuration for the EDMD estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    condition_limit: f64,
    cutoff: Option<f64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        // Known-good value, unwrap is safe
        Self::new(1e10).unwrap()
    }
}

impl EstimatorConfig {
    /// Creates a config that flags regressors with a condition number above
    /// `condition_limit`.
    ///
    /// The pseudo-inverse cutoff defaults to `max(rows, cols)·ε` relative to
    /// the largest singular value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConditionLimit`] unless the limit is finite and
    /// at least one.
    pub fn new(condition_limit: f64) -> Result<Self, ConfigError> {
        if !condition_limit.is_finite() || condition_limit < 1.0 {
            return Err(ConfigError::ConditionLimit);
        }
        Ok(Self {
            condition_limit,
            cutoff: None,
        })
    }

    /// Sets the relative singular-value cutoff of the pseudo-inverse.
    ///
    /// Singular values at or below `cutoff·σ_max` are treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cutoff`] unless `cutoff` is finite and non-negative.
    pub fn with_cutoff(self, cutoff: f64) -> Result<Self, ConfigError> {
        if !cutoff.is_finite() || cutoff < 0.0 {
            return Err(ConfigError::Cutoff);
        }
        Ok(Self {
            cutoff: Some(cutoff),
            ..self
        })
    }

    #[must_use]
    pub fn condition_limit(&self) -> f64 {
        self.condition_limit
    }

    /// Returns the relative cutoff for a regressor of the given shape.
    #[must_use]
    pub fn relative_cutoff(&self, rows: usize, cols: usize) -> f64 {
        self.cutoff
            .unwrap_or_else(|| rows.max(cols) as f64 * f64::EPSILON)
    }
}
