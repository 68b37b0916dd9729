mod engine;
mod error;
mod types;

pub use engine::{
    BEST_DECILE, MEDIAN, WORST_DECILE, compute_statistics, deterministic_outcome, percentile,
    present_value, run_sample, run_trial, simulate,
};
pub use error::{SimulationError, SimulationResult};
pub use types::{OutcomeSample, PortfolioProfile, SimulationParameters, SummaryStatistics};
