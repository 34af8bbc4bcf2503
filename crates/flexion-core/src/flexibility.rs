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

//! Window savings calculator
//!
//! For every hour of a series, finds the lowest value reachable by shifting
//! consumption up to `w` hours earlier or later, and reports the average
//! saving over the whole period. Used for prices and carbon intensity alike;
//! only the units differ.

use std::collections::VecDeque;

use flexion_types::{FlexibilityMetric, Series};
use tracing::debug;

use crate::error::{AnalyticsError, DataKind, Result};
use crate::utils::{percentage_of, round_to};

/// Flexibility windows evaluated when none are configured (hours)
pub const DEFAULT_WINDOWS: [u32; 4] = [1, 2, 4, 8];

/// Below one day of hourly context the metric is not meaningful
pub const MIN_HOURLY_POINTS: usize = 24;

/// Scale used for the per-thousand figure (MWh -> GWh)
const THOUSAND_UNITS: f64 = 1000.0;

const METRIC_PRECISION: i32 = 2;

/// Per-position savings for a window of `window` steps in each direction.
///
/// `savings[i] = values[i] - min(values[i - window ..= i + window])`, with the
/// window clipped at the series edges. Uses a monotonic deque, so the cost is
/// O(n) regardless of the window size.
pub fn window_savings(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut savings = Vec::with_capacity(n);
    // Indices with increasing values; the front is the current minimum
    let mut candidates: VecDeque<usize> = VecDeque::new();
    let mut next = 0;

    for (i, &current) in values.iter().enumerate() {
        let hi = i.saturating_add(window).min(n - 1);
        while next <= hi {
            while candidates.back().is_some_and(|&j| values[j] >= values[next]) {
                candidates.pop_back();
            }
            candidates.push_back(next);
            next += 1;
        }

        let lo = i.saturating_sub(window);
        while candidates.front().is_some_and(|&j| j < lo) {
            candidates.pop_front();
        }

        let local_min = candidates.front().map_or(current, |&j| values[j]);
        savings.push(current - local_min);
    }

    savings
}

/// Aggregate metric for one window over a full series.
///
/// Only positions with a strictly positive saving add to the numerator, but
/// every position counts in the denominator: the result is the expected
/// saving per hour of the whole period, not conditional on a shift.
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn window_metric(values: &[f64], mean: f64, window_hours: u32) -> FlexibilityMetric {
    let savings = window_savings(values, window_hours as usize);
    let total: f64 = savings.iter().filter(|s| **s > 0.0).sum();
    let avg_savings = if values.is_empty() {
        0.0
    } else {
        total / values.len() as f64
    };

    FlexibilityMetric {
        window_hours,
        avg_savings_per_unit: round_to(avg_savings, METRIC_PRECISION),
        savings_per_thousand_units: (avg_savings * THOUSAND_UNITS).round() as i64,
        percentage_of_average: round_to(percentage_of(avg_savings, mean), METRIC_PRECISION),
    }
}

/// Compute one [`FlexibilityMetric`] per window size.
///
/// Returns [`AnalyticsError::InsufficientData`] when the series is shorter
/// than `min_points`; no partial or zero-filled metrics are produced.
pub fn calculate_flexibility(
    series: &Series,
    windows: &[u32],
    min_points: usize,
) -> Result<Vec<FlexibilityMetric>> {
    if series.len() < min_points {
        return Err(AnalyticsError::InsufficientData {
            kind: DataKind::Hourly,
            required: min_points,
            available: series.len(),
        });
    }

    let values = series.values();
    let Some(mean) = series.mean() else {
        return Err(AnalyticsError::InsufficientData {
            kind: DataKind::Hourly,
            required: min_points.max(1),
            available: 0,
        });
    };

    let metrics: Vec<FlexibilityMetric> = windows
        .iter()
        .map(|&w| window_metric(&values, mean, w))
        .collect();

    debug!(
        "Computed flexibility for {} windows over {} points (mean {:.2})",
        metrics.len(),
        values.len(),
        mean
    );

    Ok(metrics)
}
