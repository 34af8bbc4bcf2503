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

//! Series normalization
//!
//! Turns raw readings from one or more feeds into a [`Series`]: unusable
//! readings are dropped, timestamp collisions are resolved by feed priority
//! and the result is sorted ascending.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use flexion_types::{FeedBatch, Observation, RawReading, Series};
use tracing::debug;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp
///
/// RFC 3339 strings keep their offset. Timestamps without an offset are
/// taken as UTC; a bare date (`2024-03-01`, daily feeds) is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Validate a single reading; None means it is dropped
pub fn parse_reading(reading: &RawReading) -> Option<Observation> {
    let timestamp = parse_timestamp(&reading.timestamp)?;
    let value = reading.value.as_ref()?.as_finite()?;
    Some(Observation::new(timestamp, value))
}

/// Normalize raw batches from feeds with declared priorities
pub fn normalize(batches: &[FeedBatch]) -> Series {
    let mut dropped = 0_usize;
    let mut prioritized = Vec::new();
    for batch in batches {
        for reading in &batch.readings {
            match parse_reading(reading) {
                Some(obs) => prioritized.push((batch.priority, obs)),
                None => dropped += 1,
            }
        }
    }

    let series = resolve_collisions(prioritized.into_iter());

    if dropped > 0 {
        debug!(
            "Dropped {} unusable readings while normalizing {} feeds",
            dropped,
            batches.len()
        );
    }

    series
}

/// Merge already-typed series from feeds with declared priorities
pub fn combine(feeds: &[(u8, &Series)]) -> Series {
    resolve_collisions(
        feeds
            .iter()
            .flat_map(|(priority, series)| series.iter().map(move |obs| (*priority, *obs))),
    )
}

/// Highest priority wins per instant; on equal priority the later one does.
fn resolve_collisions(observations: impl Iterator<Item = (u8, Observation)>) -> Series {
    let mut winners: BTreeMap<DateTime<FixedOffset>, (u8, Observation)> = BTreeMap::new();

    for (priority, obs) in observations {
        match winners.get(&obs.timestamp) {
            Some((existing, _)) if *existing > priority => {}
            _ => {
                winners.insert(obs.timestamp, (priority, obs));
            }
        }
    }

    Series::from_observations(winners.into_values().map(|(_, obs)| obs).collect())
}
