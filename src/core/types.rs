use serde::Serialize;

use super::error::{SimulationError, SimulationResult};

/// Parameters shared by every portfolio run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    initial_value: f64,
    horizon_years: u32,
    inflation_rate: f64,
    trial_count: u32,
    seed: u64,
    stream: u32,
}

impl SimulationParameters {
    pub fn new(
        initial_value: f64,
        horizon_years: u32,
        inflation_rate: f64,
        trial_count: u32,
        seed: u64,
    ) -> SimulationResult<Self> {
        if !initial_value.is_finite() || initial_value <= 0.0 {
            return Err(SimulationError::invalid(
                "initial_value",
                format!("must be a positive finite number, got {initial_value}"),
            ));
        }
        if !inflation_rate.is_finite() || inflation_rate <= -1.0 {
            return Err(SimulationError::invalid(
                "inflation_rate",
                format!("must be finite and greater than -1, got {inflation_rate}"),
            ));
        }
        if trial_count == 0 {
            return Err(SimulationError::invalid("trial_count", "must be >= 1"));
        }

        Ok(Self {
            initial_value,
            horizon_years,
            inflation_rate,
            trial_count,
            seed,
            stream: 0,
        })
    }

    /// Returns a copy drawing from an independent random stream.
    ///
    /// Portfolios compared side by side should each use their own stream so
    /// their trials are not driven by the same normal draws.
    pub fn for_stream(self, stream: u32) -> Self {
        Self { stream, ..self }
    }

    pub fn with_initial_value(self, initial_value: f64) -> SimulationResult<Self> {
        Self::new(
            initial_value,
            self.horizon_years,
            self.inflation_rate,
            self.trial_count,
            self.seed,
        )
        .map(|params| params.for_stream(self.stream))
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn horizon_years(&self) -> u32 {
        self.horizon_years
    }

    pub fn inflation_rate(&self) -> f64 {
        self.inflation_rate
    }

    pub fn trial_count(&self) -> u32 {
        self.trial_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&self) -> u32 {
        self.stream
    }
}

/// Yearly return distribution of one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioProfile {
    mean_annual_return: f64,
    std_annual_return: f64,
}

impl PortfolioProfile {
    pub fn new(mean_annual_return: f64, std_annual_return: f64) -> SimulationResult<Self> {
        if !mean_annual_return.is_finite() {
            return Err(SimulationError::invalid(
                "mean_annual_return",
                format!("must be finite, got {mean_annual_return}"),
            ));
        }
        if !std_annual_return.is_finite() || std_annual_return < 0.0 {
            return Err(SimulationError::invalid(
                "std_annual_return",
                format!("must be a non-negative finite number, got {std_annual_return}"),
            ));
        }

        Ok(Self {
            mean_annual_return,
            std_annual_return,
        })
    }

    pub fn mean_annual_return(&self) -> f64 {
        self.mean_annual_return
    }

    pub fn std_annual_return(&self) -> f64 {
        self.std_annual_return
    }
}

/// Inflation-adjusted final values of every trial, sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSample {
    values: Vec<f64>,
}

impl OutcomeSample {
    pub fn from_outcomes(mut values: Vec<f64>) -> SimulationResult<Self> {
        if values.is_empty() {
            return Err(SimulationError::invalid(
                "trial_count",
                "sample needs at least one outcome",
            ));
        }
        values.sort_by(|a, b| a.total_cmp(b));
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub mean: f64,
    pub standard_deviation: f64,
    pub median: f64,
    pub ninetieth_percentile: f64,
    pub tenth_percentile: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_reject_zero_trials() {
        let err = SimulationParameters::new(100_000.0, 20, 0.035, 0, 1)
            .expect_err("zero trials must be rejected");
        assert!(err.to_string().contains("trial_count"));
    }

    #[test]
    fn parameters_reject_non_positive_initial_value() {
        for initial in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = SimulationParameters::new(initial, 20, 0.035, 10, 1)
                .expect_err("initial value must be positive and finite");
            assert!(err.to_string().contains("initial_value"));
        }
    }

    #[test]
    fn parameters_reject_inflation_at_or_below_minus_one() {
        let err = SimulationParameters::new(100_000.0, 20, -1.0, 10, 1)
            .expect_err("inflation of -100% must be rejected");
        assert!(err.to_string().contains("inflation_rate"));
    }

    #[test]
    fn profile_rejects_negative_volatility() {
        let err = PortfolioProfile::new(0.05, -0.01).expect_err("negative std must be rejected");
        match err {
            SimulationError::InvalidParameter { name, .. } => assert_eq!(name, "std_annual_return"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parameters_reject_non_finite_or_total_loss_inflation() {
        for inflation in [f64::NAN, f64::INFINITY, -1.5] {
            let err = SimulationParameters::new(100_000.0, 20, inflation, 10, 1)
                .expect_err("inflation must be finite and above -1");
            match err {
                SimulationError::InvalidParameter { name, .. } => assert_eq!(name, "inflation_rate"),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn profile_rejects_non_finite_or_negative_volatility() {
        for std in [f64::NAN, f64::INFINITY, -0.01] {
            let err = PortfolioProfile::new(0.05, std).expect_err("volatility must be valid");
            match err {
                SimulationError::InvalidParameter { name, .. } => {
                    assert_eq!(name, "std_annual_return")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn profile_rejects_non_finite_mean() {
        let err = PortfolioProfile::new(f64::NAN, 0.1).expect_err("NaN mean must be rejected");
        assert!(err.to_string().contains("mean_annual_return"));
    }

    #[test]
    fn for_stream_keeps_everything_but_the_stream() {
        let params = SimulationParameters::new(100_000.0, 20, 0.035, 10, 9).expect("valid");
        let other = params.for_stream(3);
        assert_eq!(other.stream(), 3);
        assert_eq!(other.seed(), params.seed());
        assert_eq!(other.trial_count(), params.trial_count());
    }

    #[test]
    fn outcome_sample_sorts_and_rejects_empty() {
        let sample = OutcomeSample::from_outcomes(vec![3.0, -1.0, 2.0]).expect("non-empty");
        assert_eq!(sample.values(), &[-1.0, 2.0, 3.0]);
        assert_eq!(sample.min(), -1.0);
        assert_eq!(sample.max(), 3.0);
        assert!(OutcomeSample::from_outcomes(Vec::new()).is_err());
    }
}
