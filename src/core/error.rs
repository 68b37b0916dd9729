/// Errors raised by the simulation engine.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(f64),

    #[error("Simulated outcomes overflowed (sample range {min} to {max})")]
    NonFiniteOutcome { min: f64, max: f64 },

    #[error("Return distribution error: {0}")]
    Distribution(#[from] rand_distr::NormalError),
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
