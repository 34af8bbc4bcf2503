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

//! FlexION Analytics Engine
//!
//! Turns hourly electricity price and carbon-intensity series into figures
//! that describe how much a consumer gains by shifting load in time.
//!
//! ## Features
//!
//! - **Normalization**: Merge raw readings from prioritized feeds into one clean series
//! - **Daily Aggregation**: Per-day average, minimum and maximum
//! - **Flexibility**: Savings for shifting load up to N hours either way
//! - **Hybrid Merge**: Archive plus live data, with a tagged estimate when hourly data is short
//! - **Summaries**: Latest value and rolling average for overview displays
//! - **Feeds**: CSV archive, JSON live and daily-aggregate CSV providers

pub mod config;
pub mod daily;
pub mod error;
pub mod feeds;
pub mod flexibility;
pub mod hybrid;
pub mod normalize;
pub mod snapshot;
pub mod summary;
pub mod utils;

pub use config::{AnalysisSettings, AppConfig, CountryConfig, FeedConfig};
pub use daily::{aggregate_daily, merge_daily};
pub use error::{AnalyticsError, ConfigError, DataKind, FeedError};
pub use feeds::{DailyProvider, FeedKind, FeedProvider, FeedRegistry, FeedRole, ResolvedFeeds};
pub use flexibility::{DEFAULT_WINDOWS, MIN_HOURLY_POINTS, calculate_flexibility};
pub use hybrid::{EstimationPolicy, HybridInput, SpreadFraction, evaluate, merge};
pub use normalize::{combine, normalize};
pub use snapshot::{EntitySnapshot, build_all, build_snapshot};
pub use summary::{DEFAULT_SUMMARY_DAYS, summarize};
