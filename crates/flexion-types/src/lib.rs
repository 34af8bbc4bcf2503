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

pub mod metrics;
pub mod series;

// Re-export common types for convenience
pub use metrics::{
    DailyRecord, FlexibilityMetric, HybridResult, Metric, Provenance, Summary, window_label,
};
pub use series::{DateRange, FeedBatch, Observation, RawReading, RawValue, Series};
