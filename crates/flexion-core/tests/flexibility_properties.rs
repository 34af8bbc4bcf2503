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

//! Properties of the window savings calculator and the normalizer that must
//! hold for any input, checked over deterministic pseudo-random series.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use flexion_core::flexibility::{calculate_flexibility, window_savings};
use flexion_core::hybrid::merge;
use flexion_core::normalize::normalize;
use flexion_types::{DateRange, FeedBatch, Observation, RawReading, Series};

/// Small LCG so the test needs no extra crates and stays reproducible
struct Lcg(u64);

impl Lcg {
    #[expect(clippy::cast_precision_loss)]
    fn next_value(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % 20_000) as f64 / 100.0 - 20.0
    }
}

fn base() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset()
}

fn hourly(values: &[f64]) -> Series {
    Series::from_observations(
        values
            .iter()
            .zip(0_i64..)
            .map(|(v, h)| Observation::new(base() + Duration::hours(h), *v))
            .collect(),
    )
}

fn random_values(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = Lcg(seed);
    (0..len).map(|_| rng.next_value()).collect()
}

#[test]
fn savings_are_never_negative() {
    for seed in 1..20 {
        let values = random_values(seed, 96);
        for window in [0, 1, 3, 8, 200] {
            assert!(window_savings(&values, window).iter().all(|s| *s >= 0.0));
        }

        let metrics = calculate_flexibility(&hourly(&values), &[1, 2, 4, 8], 24).unwrap();
        assert!(metrics.iter().all(|m| m.avg_savings_per_unit >= 0.0));
        assert!(metrics.iter().all(|m| m.savings_per_thousand_units >= 0));
    }
}

#[test]
fn larger_windows_never_save_less() {
    for seed in 1..20 {
        let series = hourly(&random_values(seed, 72));
        let metrics = calculate_flexibility(&series, &[1, 2, 3, 4, 6, 8, 12, 24], 24).unwrap();

        for pair in metrics.windows(2) {
            assert!(
                pair[1].savings_per_thousand_units >= pair[0].savings_per_thousand_units,
                "seed {seed}: {}h saved less than {}h",
                pair[1].window_hours,
                pair[0].window_hours
            );
        }
    }
}

#[test]
fn normalizing_twice_changes_nothing() {
    let raw: Vec<RawReading> = random_values(7, 48)
        .into_iter()
        .zip(0_i64..)
        .map(|(v, h)| RawReading::new((base() + Duration::hours(h % 40)).to_rfc3339(), v))
        .collect();
    let once = normalize(&[FeedBatch {
        source: "raw".to_owned(),
        priority: 0,
        readings: raw,
    }]);

    let again = normalize(&[FeedBatch {
        source: "normalized".to_owned(),
        priority: 0,
        readings: once
            .iter()
            .map(|o| RawReading::new(o.timestamp.to_rfc3339(), o.value))
            .collect(),
    }]);

    assert_eq!(once.len(), 40);
    assert_eq!(once, again);
}

#[test]
fn merged_series_keeps_live_values() {
    let archive = hourly(&random_values(3, 48));
    let live = Series::from_observations(
        archive
            .iter()
            .skip(20)
            .map(|o| Observation::new(o.timestamp, o.value + 1000.0))
            .collect(),
    );
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
    )
    .unwrap();

    let merged = merge(&archive, Some(&live), &range);

    assert_eq!(merged.len(), archive.len());
    for obs in live.iter() {
        let found = merged.iter().find(|o| o.timestamp == obs.timestamp).unwrap();
        assert!((found.value - obs.value).abs() < f64::EPSILON);
    }
}

#[test]
fn constant_day_has_no_flexibility() {
    let metrics = calculate_flexibility(&hourly(&[42.0; 24]), &[1, 2, 4, 8], 24).unwrap();

    assert_eq!(metrics.len(), 4);
    for metric in metrics {
        assert!(metric.avg_savings_per_unit.abs() < f64::EPSILON);
        assert!(metric.percentage_of_average.abs() < f64::EPSILON);
        assert_eq!(metric.savings_per_thousand_units, 0);
    }
}

#[test]
fn alternating_prices_save_half_the_gap() {
    let values: Vec<f64> = (0..24).map(|h| if h % 2 == 0 { 50.0 } else { 40.0 }).collect();
    let metrics = calculate_flexibility(&hourly(&values), &[1], 24).unwrap();

    assert!((metrics[0].avg_savings_per_unit - 5.0).abs() < 1e-9);
    assert_eq!(metrics[0].savings_per_thousand_units, 5000);
    // mean 45
    assert!((metrics[0].percentage_of_average - 11.11).abs() < 1e-9);
}

#[test]
fn short_series_is_reported_not_zeroed() {
    let err = calculate_flexibility(&hourly(&[10.0; 10]), &[1, 2, 4, 8], 24).unwrap_err();
    assert!(err.is_insufficient_data());
    assert!(err.to_string().contains("found 10"));
}
