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

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

// ============= Time Series Types =============

/// A single timestamped reading
///
/// The timestamp keeps the UTC offset the source encoded, so the calendar
/// date of an observation is always the source's own date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<FixedOffset>,

    /// Price (EUR/MWh) or carbon intensity (gCO2/kWh)
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<FixedOffset>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Calendar date in the observation's own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Reading value as delivered by a feed, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Finite numeric value, or None for anything unusable
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// Unvalidated `(timestamp, value)` pair from a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: String,
    #[serde(default)]
    pub value: Option<RawValue>,
}

impl RawReading {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: Some(RawValue::Number(value)),
        }
    }
}

/// Raw readings from one named feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedBatch {
    pub source: String,

    /// Higher priority wins on timestamp collisions
    pub priority: u8,

    pub readings: Vec<RawReading>,
}

/// Ordered series for one entity and one metric
///
/// Timestamps are strictly increasing and unique, values are finite.
/// The only way to build one is [`Series::from_observations`], which
/// enforces both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Build a series from observations of equal standing.
    ///
    /// Non-finite values are dropped. When two observations share an instant
    /// the one appearing later in the input wins.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut observations: Vec<Observation> = observations
            .into_iter()
            .filter(|o| o.value.is_finite())
            .collect();

        // Stable sort keeps input order among equal instants
        observations.sort_by_key(|o| o.timestamp);

        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.timestamp == obs.timestamp => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self {
            observations: deduped,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Arithmetic mean, None for an empty series
    #[expect(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }
        let sum: f64 = self.observations.iter().map(|o| o.value).sum();
        Some(sum / self.observations.len() as f64)
    }

    /// Observations whose calendar date falls inside `range`
    pub fn within(&self, range: &DateRange) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .filter(|o| range.contains(o.date()))
                .copied()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns None when `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
