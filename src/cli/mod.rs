use clap::Parser;
use serde::Serialize;

use crate::core::{
    PortfolioProfile, SimulationParameters, SimulationResult, SummaryStatistics,
    deterministic_outcome, simulate,
};

pub const AGGRESSIVE_LABEL: &str = "Aggressive";
pub const CONSERVATIVE_LABEL: &str = "Very Conservative";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mpt",
    about = "Monte Carlo comparison of an aggressive and a conservative portfolio in today's money"
)]
pub struct Cli {
    #[arg(long, default_value_t = 100_000.0, help = "Starting portfolio value")]
    pub initial_value: f64,
    #[arg(long, default_value_t = 20, help = "Simulation horizon in years")]
    pub years: u32,
    #[arg(long, default_value_t = 3.5, help = "Annual inflation in percent")]
    pub inflation: f64,
    #[arg(long, default_value_t = 10_000, help = "Number of Monte Carlo trials")]
    pub trials: u32,
    #[arg(long, default_value_t = 42, help = "Base seed for the per-trial random generators")]
    pub seed: u64,
    #[arg(
        long,
        default_value_t = 9.4324,
        help = "Aggressive portfolio expected annual return in percent"
    )]
    pub aggressive_mean: f64,
    #[arg(
        long,
        default_value_t = 15.675,
        help = "Aggressive portfolio annual return volatility in percent"
    )]
    pub aggressive_volatility: f64,
    #[arg(
        long,
        default_value_t = 6.189,
        help = "Conservative portfolio expected annual return in percent"
    )]
    pub conservative_mean: f64,
    #[arg(
        long,
        default_value_t = 6.3438,
        help = "Conservative portfolio annual return volatility in percent"
    )]
    pub conservative_volatility: f64,
    #[arg(long, help = "Also print the zero-volatility benchmark outcome")]
    pub show_expected: bool,
    #[arg(long, help = "Emit the reports as JSON")]
    pub json: bool,
    #[arg(
        long,
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"],
        help = "Log level for stderr output, overridden by RUST_LOG"
    )]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Portfolio {
    pub label: &'static str,
    pub profile: PortfolioProfile,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub label: &'static str,
    pub mean_annual_return: f64,
    pub std_annual_return: f64,
    pub deterministic_outcome: f64,
    pub statistics: SummaryStatistics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    horizon_years: u32,
    trials: u32,
    seed: u64,
    portfolios: &'a [PortfolioReport],
}

pub fn build_params(cli: &Cli) -> SimulationResult<(SimulationParameters, Vec<Portfolio>)> {
    let params = SimulationParameters::new(
        cli.initial_value,
        cli.years,
        cli.inflation / 100.0,
        cli.trials,
        cli.seed,
    )?;

    let portfolios = vec![
        Portfolio {
            label: AGGRESSIVE_LABEL,
            profile: PortfolioProfile::new(
                cli.aggressive_mean / 100.0,
                cli.aggressive_volatility / 100.0,
            )?,
        },
        Portfolio {
            label: CONSERVATIVE_LABEL,
            profile: PortfolioProfile::new(
                cli.conservative_mean / 100.0,
                cli.conservative_volatility / 100.0,
            )?,
        },
    ];

    Ok((params, portfolios))
}

/// Validates every input up front, then simulates each portfolio on its own
/// random stream.
pub fn run(cli: &Cli) -> SimulationResult<Vec<PortfolioReport>> {
    let (params, portfolios) = build_params(cli)?;

    portfolios
        .iter()
        .enumerate()
        .map(|(index, portfolio)| -> SimulationResult<PortfolioReport> {
            let stream_params = params.for_stream(index as u32);
            tracing::info!(
                portfolio = portfolio.label,
                trials = params.trial_count(),
                "Running Monte Carlo simulation"
            );
            let statistics = simulate(&stream_params, &portfolio.profile)?;
            Ok(PortfolioReport {
                label: portfolio.label,
                mean_annual_return: portfolio.profile.mean_annual_return(),
                std_annual_return: portfolio.profile.std_annual_return(),
                deterministic_outcome: deterministic_outcome(&stream_params, &portfolio.profile),
                statistics,
            })
        })
        .collect()
}

pub fn render_text(reports: &[PortfolioReport], years: u32, show_expected: bool) -> String {
    let blocks: Vec<String> = reports
        .iter()
        .map(|report| {
            let stats = &report.statistics;
            let mut block = format!(
                "Portfolio type: {}\nMedian {years} Yr: {:.6}\n10% best case: {:.6}\n10% worse case: {:.6}",
                report.label, stats.median, stats.ninetieth_percentile, stats.tenth_percentile
            );
            if show_expected {
                block.push_str(&format!(
                    "\nZero-volatility benchmark: {:.6}",
                    report.deterministic_outcome
                ));
            }
            block
        })
        .collect();

    format!("{}\n", blocks.join("\n\n"))
}

pub fn render_json(cli: &Cli, reports: &[PortfolioReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportDocument {
        horizon_years: cli.years,
        trials: cli.trials,
        seed: cli.seed,
        portfolios: reports,
    })
}
