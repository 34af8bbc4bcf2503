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

//! Hybrid series merging
//!
//! Reconciles a long-running archive with a short live feed for a requested
//! period and produces flexibility metrics from the result. When the period
//! has too little hourly data, an estimate is derived from daily spreads and
//! tagged as such.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use flexion_types::{DailyRecord, DateRange, FlexibilityMetric, HybridResult, Series};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalysisSettings;
use crate::daily::{aggregate_daily, merge_daily};
use crate::error::{AnalyticsError, DataKind, Result};
use crate::flexibility::calculate_flexibility;
use crate::normalize::combine;
use crate::utils::{mean, percentage_of, round_to};

const ARCHIVE_PRIORITY: u8 = 0;
const LIVE_PRIORITY: u8 = 1;

/// Share of the average daily spread a window is assumed to capture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadFraction {
    pub window_hours: u32,
    pub fraction: f64,
}

/// Heuristic used when only daily aggregates are available.
///
/// The default fractions are a placeholder policy, not a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationPolicy {
    pub fractions: Vec<SpreadFraction>,
}

impl Default for EstimationPolicy {
    fn default() -> Self {
        Self {
            fractions: vec![
                SpreadFraction {
                    window_hours: 1,
                    fraction: 0.15,
                },
                SpreadFraction {
                    window_hours: 2,
                    fraction: 0.25,
                },
                SpreadFraction {
                    window_hours: 4,
                    fraction: 0.40,
                },
                SpreadFraction {
                    window_hours: 8,
                    fraction: 0.60,
                },
            ],
        }
    }
}

impl EstimationPolicy {
    /// Fraction for a window: the largest listed window not above it, else
    /// the smallest listed one. Clamped to [0, 1].
    pub fn fraction_for(&self, window_hours: u32) -> f64 {
        let at_or_below = self
            .fractions
            .iter()
            .filter(|f| f.window_hours <= window_hours)
            .max_by_key(|f| f.window_hours);
        let smallest = self.fractions.iter().min_by_key(|f| f.window_hours);

        at_or_below
            .or(smallest)
            .map_or(0.0, |f| f.fraction.clamp(0.0, 1.0))
    }
}

/// Inputs for one entity and metric
#[derive(Debug, Clone, Copy)]
pub struct HybridInput<'a> {
    /// Static historical series
    pub archive: &'a Series,

    /// Recent live feed, if any
    pub live: Option<&'a Series>,

    /// Precomputed daily aggregates for periods without hourly data
    pub daily_archive: &'a [DailyRecord],
}

/// Merge archive and live data for `range`; live wins on shared instants.
pub fn merge(archive: &Series, live: Option<&Series>, range: &DateRange) -> Series {
    let archive = archive.within(range);
    match live {
        Some(live) => {
            let live = live.within(range);
            combine(&[(ARCHIVE_PRIORITY, &archive), (LIVE_PRIORITY, &live)])
        }
        None => archive,
    }
}

/// Flexibility for a requested period, exact when possible, estimated otherwise.
///
/// - enough merged hourly points: exact metrics, `is_estimated = false`
/// - otherwise: estimate from daily records in the range, `is_estimated = true`;
///   provided daily records win over ones aggregated from the merged series,
///   and days with a single merged reading are not aggregated
/// - no daily records either: [`AnalyticsError::InsufficientData`]
pub fn evaluate(
    input: HybridInput<'_>,
    range: &DateRange,
    settings: &AnalysisSettings,
) -> Result<HybridResult> {
    let merged = merge(input.archive, input.live, range);

    match calculate_flexibility(&merged, &settings.windows, settings.min_hourly_points) {
        Ok(metrics) => {
            debug!(
                "Exact flexibility for {}..{} from {} points",
                range.start(),
                range.end(),
                merged.len()
            );
            return Ok(HybridResult::computed(metrics, merged.len()));
        }
        Err(err) if err.is_insufficient_data() => {}
        Err(err) => return Err(err),
    }

    let daily_in_range: Vec<DailyRecord> = input
        .daily_archive
        .iter()
        .filter(|r| range.contains(r.date))
        .copied()
        .collect();
    let records = merge_daily(&daily_in_range, &days_with_spread(&merged));

    let metrics = estimate_from_daily(&records, &settings.windows, &settings.estimation)?;
    info!(
        "Only {} hourly points for {}..{}, estimated from {} daily records",
        merged.len(),
        range.start(),
        range.end(),
        records.len()
    );

    Ok(HybridResult::estimated(metrics, records.len()))
}

/// Daily aggregates of days with at least two readings.
///
/// A single reading has no observable spread.
fn days_with_spread(series: &Series) -> Vec<DailyRecord> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for obs in series {
        *counts.entry(obs.date()).or_default() += 1;
    }

    aggregate_daily(series)
        .into_iter()
        .filter(|r| counts.get(&r.date).is_some_and(|&n| n > 1))
        .collect()
}

/// Approximate window savings from average daily (max - min) spreads.
#[expect(clippy::cast_possible_truncation)]
pub fn estimate_from_daily(
    records: &[DailyRecord],
    windows: &[u32],
    policy: &EstimationPolicy,
) -> Result<Vec<FlexibilityMetric>> {
    let spreads: Vec<f64> = records.iter().map(DailyRecord::spread).collect();
    let levels: Vec<f64> = records.iter().map(|r| r.avg_value).collect();

    let (Some(avg_spread), Some(level)) = (mean(&spreads), mean(&levels)) else {
        return Err(AnalyticsError::InsufficientData {
            kind: DataKind::Daily,
            required: 1,
            available: 0,
        });
    };

    Ok(windows
        .iter()
        .map(|&window_hours| {
            let avg_savings = avg_spread.max(0.0) * policy.fraction_for(window_hours);
            FlexibilityMetric {
                window_hours,
                avg_savings_per_unit: round_to(avg_savings, 2),
                savings_per_thousand_units: (avg_savings * 1000.0).round() as i64,
                percentage_of_average: round_to(percentage_of(avg_savings, level), 2),
            }
        })
        .collect())
}
