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

//! Feed providers
//!
//! Each upstream source (price archive, carbon API snapshot, ...) is a
//! [`FeedProvider`] with a single capability: return its most recent data as
//! a [`Series`]. Which providers serve which country and metric is decided by
//! the [`FeedRegistry`], so adding a source never touches the analytics.

pub mod aggregate;
pub mod archive;
pub mod live;
pub mod registry;

use flexion_types::{DailyRecord, Series};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

pub use aggregate::DailyCsvFeed;
pub use archive::CsvArchiveFeed;
pub use live::JsonLiveFeed;
pub use registry::{FeedRegistry, RegisteredDailyFeed, RegisteredFeed, ResolvedFeeds};

/// A source of observations for one entity and one metric
pub trait FeedProvider: Send + Sync + std::fmt::Debug {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Fetch whatever the source currently holds, normalized
    fn fetch_recent(&self) -> Result<Series, FeedError>;
}

/// A source of precomputed daily aggregates
///
/// Covers periods where no sub-daily data is kept, so the estimator still
/// sees the real daily minimum and maximum.
pub trait DailyProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Records ascending by date, at most one per date
    fn fetch_daily(&self) -> Result<Vec<DailyRecord>, FeedError>;
}

/// Role of a feed in the hybrid merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedRole {
    /// Long-running static history
    #[default]
    Archive,
    /// Recent data, preferred on overlapping timestamps
    Live,
}

/// File format of a configured feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Csv,
    Json,
    /// `date,avg,min,max` daily aggregates
    #[serde(rename = "daily_csv")]
    DailyCsv,
}
