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

//! Precomputed per-entity snapshots
//!
//! Batch path used to refresh overview data: every configured entity gets a
//! summary and flexibility metrics over all of its available data.

use flexion_types::{DailyRecord, DateRange, HybridResult, Metric, Series, Summary};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalysisSettings;
use crate::daily::{aggregate_daily, merge_daily};
use crate::feeds::{FeedRegistry, ResolvedFeeds};
use crate::hybrid::{HybridInput, evaluate};
use crate::summary::summarize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub country: String,
    pub metric: Metric,

    /// Calendar span of the merged and daily data, None when there was none
    pub period: Option<DateRange>,

    pub summary: Summary,

    /// None when neither hourly nor daily data was sufficient
    pub flexibility: Option<HybridResult>,

    pub daily_record_count: usize,
}

/// Build the snapshot for one entity from already resolved feeds
pub fn build_snapshot(
    country: &str,
    metric: Metric,
    feeds: &ResolvedFeeds,
    settings: &AnalysisSettings,
) -> EntitySnapshot {
    let combined = feeds.combined();
    let period = data_period(&combined, &feeds.daily);
    let daily = merge_daily(&feeds.daily, &aggregate_daily(&combined));

    let flexibility = period.and_then(|range| {
        let input = HybridInput {
            archive: &feeds.archive,
            live: feeds.live.as_ref(),
            daily_archive: &feeds.daily,
        };
        match evaluate(input, &range, settings) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("No flexibility for {}/{}: {}", country, metric, e);
                None
            }
        }
    });

    EntitySnapshot {
        country: country.to_owned(),
        metric,
        period,
        summary: summarize(&combined, settings.summary_days),
        flexibility,
        daily_record_count: daily.len(),
    }
}

/// Snapshots for every registered entity.
///
/// Entities whose feeds cannot be read are logged and left out.
pub fn build_all(registry: &FeedRegistry, settings: &AnalysisSettings) -> Vec<EntitySnapshot> {
    let mut snapshots = Vec::new();

    for (country, metric) in registry.entities() {
        match registry.resolve(country, metric) {
            Ok(feeds) => snapshots.push(build_snapshot(country, metric, &feeds, settings)),
            Err(e) => warn!("Skipping {}/{}: {}", country, metric, e),
        }
    }

    info!("Built {} snapshots", snapshots.len());
    snapshots
}

fn data_period(series: &Series, daily: &[DailyRecord]) -> Option<DateRange> {
    let dates = series
        .first()
        .into_iter()
        .chain(series.last())
        .map(|o| o.date())
        .chain(daily.iter().map(|r| r.date));

    let (start, end) = dates.fold(None, |span, date| match span {
        None => Some((date, date)),
        Some((start, end)) => Some((date.min(start), date.max(end))),
    })?;
    DateRange::new(start, end)
}
