// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FlexION.

//! CLI argument definitions using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use flexion_core::config::DEFAULT_CONFIG_PATH;
use flexion_types::Metric;

#[derive(Debug, Parser)]
#[command(name = "flexion")]
#[command(author, version, about = "FlexION electricity flexibility analytics")]
#[command(
    long_about = "Compute how much shifting electricity use in time is worth, from hourly\n\
    day-ahead prices and grid carbon intensity.\n\
    \nAll results are printed as JSON on stdout; logs go to stderr (RUST_LOG).\n\
    \nExamples:\n  \
    flexion daily --country DE --metric price --from 2024-03-01 --to 2024-03-31\n  \
    flexion flexibility --country DE --metric carbon --from 2024-03-01 --to 2024-03-07\n  \
    flexion summary --country FR\n  \
    flexion precompute --output-dir ./snapshots"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH, value_name = "PATH")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Daily average, minimum and maximum for one country and metric
    Daily(DailyArgs),

    /// Savings for shifting load within given windows over a period
    #[command(
        long_about = "Compute flexibility metrics for a period.\n\
        \nUses merged archive and live hourly data when at least `min_hourly_points`\n\
        observations fall in the period. Otherwise the result is estimated from daily\n\
        spreads and marked with `isEstimated: true`.\n\
        \nExamples:\n  \
        flexion flexibility --country DE --metric price --from 2024-03-01 --to 2024-03-07\n  \
        flexion flexibility --country DE --metric price --from 2024-03-01 --to 2024-03-07 --windows 1,3,6"
    )]
    Flexibility(FlexibilityArgs),

    /// Latest value and recent average of price and carbon intensity
    Summary(SummaryArgs),

    /// Build snapshots for every configured country
    #[command(
        long_about = "Build summary and flexibility snapshots for every configured entity.\n\
        \nWith --output-dir, writes one <COUNTRY>.json per country; otherwise prints a\n\
        single JSON array. Entities whose feeds cannot be read are skipped with a warning."
    )]
    Precompute(PrecomputeArgs),
}

/// Country and metric selecting one entity
#[derive(Debug, Clone, Args)]
pub struct EntityArgs {
    /// Country or bidding zone code (e.g. DE, CZ)
    #[arg(long)]
    pub country: String,

    /// price or carbon
    #[arg(long)]
    pub metric: Metric,
}

#[derive(Debug, Args)]
pub struct DailyArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct FlexibilityArgs {
    #[command(flatten)]
    pub entity: EntityArgs,

    /// First day of the period (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: NaiveDate,

    /// Last day of the period (YYYY-MM-DD)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: NaiveDate,

    /// Window sizes in hours, overriding the configured ones
    #[arg(long, value_delimiter = ',', value_name = "HOURS")]
    pub windows: Option<Vec<u32>>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Country or bidding zone code
    #[arg(long)]
    pub country: String,

    /// Days covered by the average, overriding the configured value
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Debug, Args)]
pub struct PrecomputeArgs {
    /// Directory for per-country JSON files
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flexibility() {
        let cli = Cli::try_parse_from([
            "flexion",
            "flexibility",
            "--country",
            "DE",
            "--metric",
            "carbon",
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-07",
            "--windows",
            "1,3",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        let Commands::Flexibility(args) = cli.command else {
            panic!("expected flexibility command");
        };
        assert_eq!(args.entity.metric, Metric::Carbon);
        assert_eq!(args.windows, Some(vec![1, 3]));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let result = Cli::try_parse_from([
            "flexion", "daily", "--country", "DE", "--metric", "wind",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["flexion", "precompute", "--config", "other.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
