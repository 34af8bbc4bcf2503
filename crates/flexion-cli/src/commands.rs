// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FlexION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Command handlers
//!
//! Each handler resolves its entity through the feed registry, runs the
//! shared analytics and returns a serializable report. Printing is left to
//! `main`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use flexion_core::hybrid::{HybridInput, evaluate};
use flexion_core::snapshot::{EntitySnapshot, build_all};
use flexion_core::{
    AnalysisSettings, AnalyticsError, AppConfig, FeedRegistry, aggregate_daily, merge_daily,
    summarize,
};
use flexion_types::{DailyRecord, DateRange, HybridResult, Metric, Summary};
use serde::Serialize;
use tracing::info;

use crate::args::{DailyArgs, FlexibilityArgs, PrecomputeArgs, SummaryArgs};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub country: String,
    pub metric: Metric,
    pub unit: &'static str,
    pub records: Vec<DailyRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibilityReport {
    pub country: String,
    pub metric: Metric,
    pub unit: &'static str,
    pub period: DateRange,
    #[serde(flatten)]
    pub result: HybridResult,
}

/// Printed instead of metrics when there is nothing to compute from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientDataReport {
    pub status: &'static str,
    pub country: String,
    pub metric: Metric,
    pub period: DateRange,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FlexibilityOutcome {
    Computed(FlexibilityReport),
    InsufficientData(InsufficientDataReport),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub country: String,
    pub days: u32,
    pub price: Summary,
    pub carbon: Summary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySnapshots {
    pub country: String,
    pub generated_at: DateTime<Utc>,
    pub snapshots: Vec<EntitySnapshot>,
}

fn date_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange> {
    DateRange::new(start, end).ok_or_else(|| AnalyticsError::InvalidRange { start, end }.into())
}

pub fn daily(registry: &FeedRegistry, args: &DailyArgs) -> Result<DailyReport> {
    let entity = &args.entity;
    let feeds = registry
        .resolve(&entity.country, entity.metric)
        .with_context(|| format!("Failed to load {} data for {}", entity.metric, entity.country))?;

    if let (Some(start), Some(end)) = (args.from, args.to) {
        date_range(start, end)?;
    }

    // Provided daily aggregates win over ones computed from points
    let records = merge_daily(&feeds.daily, &aggregate_daily(&feeds.combined()))
        .into_iter()
        .filter(|r| args.from.is_none_or(|from| r.date >= from))
        .filter(|r| args.to.is_none_or(|to| r.date <= to))
        .collect();

    Ok(DailyReport {
        country: entity.country.to_ascii_uppercase(),
        metric: entity.metric,
        unit: entity.metric.unit(),
        records,
    })
}

pub fn flexibility(
    registry: &FeedRegistry,
    settings: &AnalysisSettings,
    args: &FlexibilityArgs,
) -> Result<FlexibilityOutcome> {
    let entity = &args.entity;
    let period = date_range(args.from, args.to)?;

    let mut settings = settings.clone();
    if let Some(windows) = &args.windows {
        if windows.is_empty() {
            bail!("--windows must list at least one window");
        }
        settings.windows.clone_from(windows);
    }

    let feeds = registry
        .resolve(&entity.country, entity.metric)
        .with_context(|| format!("Failed to load {} data for {}", entity.metric, entity.country))?;

    let input = HybridInput {
        archive: &feeds.archive,
        live: feeds.live.as_ref(),
        daily_archive: &feeds.daily,
    };
    let country = entity.country.to_ascii_uppercase();

    match evaluate(input, &period, &settings) {
        Ok(result) => Ok(FlexibilityOutcome::Computed(FlexibilityReport {
            country,
            metric: entity.metric,
            unit: entity.metric.unit(),
            period,
            result,
        })),
        Err(e) if e.is_insufficient_data() => {
            info!("No flexibility for {}/{}: {}", country, entity.metric, e);
            Ok(FlexibilityOutcome::InsufficientData(InsufficientDataReport {
                status: "insufficient_data",
                country,
                metric: entity.metric,
                period,
                reason: e.to_string(),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn summary(
    registry: &FeedRegistry,
    settings: &AnalysisSettings,
    args: &SummaryArgs,
) -> Result<SummaryReport> {
    let days = args.days.unwrap_or(settings.summary_days);
    if days == 0 {
        bail!("--days must be positive");
    }

    if !Metric::ALL.iter().any(|m| registry.contains(&args.country, *m)) {
        bail!("No feeds configured for country {}", args.country);
    }

    let summary_for = |metric: Metric| -> Result<Summary> {
        if !registry.contains(&args.country, metric) {
            return Ok(Summary::default());
        }
        let feeds = registry
            .resolve(&args.country, metric)
            .with_context(|| format!("Failed to load {} data for {}", metric, args.country))?;
        Ok(summarize(&feeds.combined(), days))
    };

    Ok(SummaryReport {
        country: args.country.to_ascii_uppercase(),
        days,
        price: summary_for(Metric::Price)?,
        carbon: summary_for(Metric::Carbon)?,
    })
}

/// Build all snapshots grouped per country.
///
/// With an output directory the groups are written as `<COUNTRY>.json` and
/// nothing is returned for printing.
pub fn precompute(
    registry: &FeedRegistry,
    settings: &AnalysisSettings,
    args: &PrecomputeArgs,
) -> Result<Option<Vec<CountrySnapshots>>> {
    let generated_at = Utc::now();
    let mut grouped: BTreeMap<String, Vec<EntitySnapshot>> = BTreeMap::new();
    for snapshot in build_all(registry, settings) {
        grouped
            .entry(snapshot.country.clone())
            .or_default()
            .push(snapshot);
    }

    let countries: Vec<CountrySnapshots> = grouped
        .into_iter()
        .map(|(country, snapshots)| CountrySnapshots {
            country,
            generated_at,
            snapshots,
        })
        .collect();

    let Some(dir) = &args.output_dir else {
        return Ok(Some(countries));
    };

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    for country in &countries {
        let path = write_country(dir, country)?;
        info!(
            "Wrote {} snapshots to {}",
            country.snapshots.len(),
            path.display()
        );
    }

    Ok(None)
}

fn write_country(dir: &Path, country: &CountrySnapshots) -> Result<PathBuf> {
    let path = dir.join(format!("{}.json", country.country));
    let json = serde_json::to_string_pretty(country)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Load config and build the registry in one step
pub fn load(config_path: &Path) -> Result<(AppConfig, FeedRegistry)> {
    let config = AppConfig::load(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let registry = FeedRegistry::from_config(&config);
    Ok((config, registry))
}
