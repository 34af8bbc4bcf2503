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

use std::collections::BTreeMap;

use chrono::NaiveDate;
use flexion_types::{DailyRecord, Series};

use crate::utils::{mean, round_to};

/// Decimal places reported for daily aggregates
const DAILY_PRECISION: i32 = 2;

/// Reduce a sub-daily series to one record per calendar date.
///
/// Dates without observations produce no record; the result is sparse and
/// ascending by date. Values are computed at full precision and rounded to
/// two decimals at the end.
pub fn aggregate_daily(series: &Series) -> Vec<DailyRecord> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for obs in series {
        by_date.entry(obs.date()).or_default().push(obs.value);
    }

    by_date
        .into_iter()
        .filter_map(|(date, values)| {
            let avg = mean(&values)?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            Some(DailyRecord {
                date,
                avg_value: round_to(avg, DAILY_PRECISION),
                min_value: round_to(min, DAILY_PRECISION),
                max_value: round_to(max, DAILY_PRECISION),
            })
        })
        .collect()
}

/// Merge two daily record sets; `preferred` wins when both cover a date.
pub fn merge_daily(preferred: &[DailyRecord], fallback: &[DailyRecord]) -> Vec<DailyRecord> {
    let mut by_date: BTreeMap<NaiveDate, DailyRecord> =
        fallback.iter().map(|r| (r.date, *r)).collect();
    for record in preferred {
        by_date.insert(record.date, *record);
    }
    by_date.into_values().collect()
}
