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

//! Snapshot statistics for overview displays.

use chrono::Duration;
use flexion_types::{Series, Summary};

use crate::utils::{mean, round_to};

/// Days covered by the rolling average when not configured
pub const DEFAULT_SUMMARY_DAYS: u32 = 7;

/// Current value and recent average of a series.
///
/// The window is the `days` days ending at the latest observation, so the
/// result depends only on the data. An empty series gives an empty summary.
pub fn summarize(series: &Series, days: u32) -> Summary {
    let Some(latest) = series.last() else {
        return Summary::default();
    };

    let cutoff = latest.timestamp - Duration::days(i64::from(days));
    let recent: Vec<f64> = series
        .iter()
        .filter(|o| o.timestamp > cutoff)
        .map(|o| o.value)
        .collect();

    Summary {
        current_value: Some(latest.value),
        average_value: mean(&recent).map(|avg| round_to(avg, 2)),
    }
}
