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
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which quantity a series measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Day-ahead electricity price
    Price,
    /// Grid carbon intensity
    Carbon,
}

impl Metric {
    pub const ALL: [Self; 2] = [Self::Price, Self::Carbon];

    pub fn unit(self) -> &'static str {
        match self {
            Self::Price => "EUR/MWh",
            Self::Carbon => "gCO2/kWh",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Carbon => "carbon",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "carbon" | "co2" => Ok(Self::Carbon),
            other => Err(format!("unknown metric '{other}', expected 'price' or 'carbon'")),
        }
    }
}

/// Daily summary of a sub-daily series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub avg_value: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl DailyRecord {
    /// max - min
    pub fn spread(&self) -> f64 {
        self.max_value - self.min_value
    }
}

/// Savings achievable with a given flexibility window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibilityMetric {
    /// Maximum shift in either direction (hours)
    pub window_hours: u32,

    /// Expected saving per unit of energy over the whole period, never negative
    pub avg_savings_per_unit: f64,

    /// `avg_savings_per_unit * 1000`, rounded (EUR/GWh for prices)
    pub savings_per_thousand_units: i64,

    /// Savings relative to the mean level of the series (%)
    pub percentage_of_average: f64,
}

/// Where a flexibility result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// True when derived from daily spreads rather than an hourly series
    pub is_estimated: bool,

    /// Hourly observations (exact) or daily records (estimated) used
    pub source_point_count: usize,
}

/// Flexibility metrics for one entity, metric and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridResult {
    pub provenance: Provenance,

    /// Keyed by window label ("1h", "2h", ...)
    pub metrics: BTreeMap<String, FlexibilityMetric>,
}

impl HybridResult {
    pub fn computed(metrics: Vec<FlexibilityMetric>, source_point_count: usize) -> Self {
        Self::with_provenance(metrics, false, source_point_count)
    }

    pub fn estimated(metrics: Vec<FlexibilityMetric>, source_point_count: usize) -> Self {
        Self::with_provenance(metrics, true, source_point_count)
    }

    fn with_provenance(
        metrics: Vec<FlexibilityMetric>,
        is_estimated: bool,
        source_point_count: usize,
    ) -> Self {
        Self {
            provenance: Provenance {
                is_estimated,
                source_point_count,
            },
            metrics: metrics
                .into_iter()
                .map(|m| (window_label(m.window_hours), m))
                .collect(),
        }
    }

    pub fn is_estimated(&self) -> bool {
        self.provenance.is_estimated
    }

    pub fn metric(&self, window_hours: u32) -> Option<&FlexibilityMetric> {
        self.metrics.get(&window_label(window_hours))
    }
}

/// "4" -> "4h"
pub fn window_label(window_hours: u32) -> String {
    format!("{window_hours}h")
}

/// Snapshot statistics for overview displays
///
/// Both fields are None when there was no data, which is not the same as a
/// real zero reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub current_value: Option<f64>,
    pub average_value: Option<f64>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.current_value.is_none() && self.average_value.is_none()
    }
}
