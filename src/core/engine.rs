use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::error::{SimulationError, SimulationResult};
use super::types::{OutcomeSample, PortfolioProfile, SimulationParameters, SummaryStatistics};

pub const MEDIAN: f64 = 50.0;
pub const BEST_DECILE: f64 = 90.0;
pub const WORST_DECILE: f64 = 10.0;

/// Runs every trial for `profile` and reduces the sample to summary statistics.
pub fn simulate(
    params: &SimulationParameters,
    profile: &PortfolioProfile,
) -> SimulationResult<SummaryStatistics> {
    let sample = run_sample(params, profile)?;
    let stats = compute_statistics(&sample)?;
    tracing::debug!(
        trials = params.trial_count(),
        years = params.horizon_years(),
        stream = params.stream(),
        mean_return = profile.mean_annual_return(),
        std_return = profile.std_annual_return(),
        median = stats.median,
        "Simulation finished"
    );
    Ok(stats)
}

/// Simulates one trajectory and returns its inflation-adjusted final value.
pub fn run_trial<R: Rng + ?Sized>(
    params: &SimulationParameters,
    profile: &PortfolioProfile,
    rng: &mut R,
) -> SimulationResult<f64> {
    let returns = return_distribution(profile)?;
    Ok(compound_trial(params, &returns, rng))
}

/// Runs `trial_count` independent trials and returns the sorted outcomes.
///
/// Trial `i` draws from its own generator seeded by `derive_seed`, so a given
/// seed and stream always reproduce the same sample regardless of whether the
/// trials run sequentially or on the rayon pool.
pub fn run_sample(
    params: &SimulationParameters,
    profile: &PortfolioProfile,
) -> SimulationResult<OutcomeSample> {
    let returns = return_distribution(profile)?;

    #[cfg(feature = "parallel")]
    let outcomes: Vec<f64> = (0..params.trial_count())
        .into_par_iter()
        .map(|trial_id| seeded_trial(params, &returns, trial_id))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<f64> = (0..params.trial_count())
        .map(|trial_id| seeded_trial(params, &returns, trial_id))
        .collect();

    OutcomeSample::from_outcomes(outcomes)
}

/// Fails with `NonFiniteOutcome` when trajectories overflowed to infinity or NaN.
pub fn compute_statistics(sample: &OutcomeSample) -> SimulationResult<SummaryStatistics> {
    let mut acc = WelfordAccumulator::default();
    for &value in sample.values() {
        acc.update(value);
    }
    if !acc.mean.is_finite() {
        return Err(SimulationError::NonFiniteOutcome {
            min: sample.min(),
            max: sample.max(),
        });
    }

    Ok(SummaryStatistics {
        mean: acc.mean,
        standard_deviation: acc.population_variance().sqrt(),
        median: percentile(sample, MEDIAN)?,
        ninetieth_percentile: percentile(sample, BEST_DECILE)?,
        tenth_percentile: percentile(sample, WORST_DECILE)?,
    })
}

/// Nearest-rank style percentile: reads index `ceil(p / 100 * n)` of the
/// sorted sample, clamped to the last element.
pub fn percentile(sample: &OutcomeSample, p: f64) -> SimulationResult<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(SimulationError::InvalidPercentile(p));
    }

    let n = sample.len();
    let rank = ((p / 100.0) * n as f64).ceil() as usize;
    let index = if rank >= n {
        tracing::trace!(percentile = p, rank, len = n, "Percentile rank clamped to sample maximum");
        n - 1
    } else {
        rank
    };

    Ok(sample.values()[index])
}

/// Discounts a nominal future value back to today's purchasing power.
pub fn present_value(future_value: f64, years: u32, inflation_rate: f64) -> f64 {
    future_value / (1.0 + inflation_rate).powf(f64::from(years))
}

/// Outcome of a trial whose every yearly return equals the profile mean.
pub fn deterministic_outcome(params: &SimulationParameters, profile: &PortfolioProfile) -> f64 {
    let years = f64::from(params.horizon_years());
    let nominal = params.initial_value() * (1.0 + profile.mean_annual_return()).powf(years);
    present_value(nominal, params.horizon_years(), params.inflation_rate())
}

fn return_distribution(profile: &PortfolioProfile) -> SimulationResult<Normal<f64>> {
    Ok(Normal::new(
        profile.mean_annual_return(),
        profile.std_annual_return(),
    )?)
}

fn compound_trial<R: Rng + ?Sized>(
    params: &SimulationParameters,
    returns: &Normal<f64>,
    rng: &mut R,
) -> f64 {
    let mut value = params.initial_value();
    for _ in 0..params.horizon_years() {
        value *= 1.0 + returns.sample(rng);
    }
    present_value(value, params.horizon_years(), params.inflation_rate())
}

fn seeded_trial(params: &SimulationParameters, returns: &Normal<f64>, trial_id: u32) -> f64 {
    compound_trial(params, returns, &mut trial_rng(params, trial_id))
}

fn trial_rng(params: &SimulationParameters, trial_id: u32) -> SmallRng {
    SmallRng::seed_from_u64(derive_seed(params.seed(), params.stream(), trial_id))
}

/// Feeds the seed, stream and trial index through the mixer one part at a
/// time, so a change in one part cannot be undone by a change in another.
fn derive_seed(base_seed: u64, stream: u32, trial_id: u32) -> u64 {
    let seed_state = splitmix64(base_seed);
    let stream_state = splitmix64(seed_state ^ u64::from(stream));
    splitmix64(stream_state ^ u64::from(trial_id))
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn splitmix64(x: u64) -> u64 {
    let z = x.wrapping_add(GOLDEN_GAMMA);
    let z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Single-pass mean and sum of squared deviations.
///
/// A constant sample keeps `m2` at exactly zero.
#[derive(Debug, Default)]
struct WelfordAccumulator {
    count: u64,
    mean: f64,
    m2: f64,
}

impl WelfordAccumulator {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    fn population_variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.m2 / self.count as f64
    }
}
