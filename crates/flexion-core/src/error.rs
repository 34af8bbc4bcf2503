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

//! Error types for the analytics engine

use std::path::PathBuf;

use chrono::NaiveDate;
use flexion_types::Metric;
use thiserror::Error;

/// Granularity of the data that was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Hourly,
    Daily,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hourly => f.write_str("hourly observations"),
            Self::Daily => f.write_str("daily records"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Not enough data to produce any result. Callers must show this state
    /// explicitly instead of a zero metric.
    #[error("insufficient data: need at least {required} {kind}, found {available}")]
    InsufficientData {
        kind: DataKind,
        required: usize,
        available: usize,
    },

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl AnalyticsError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read feed {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV feed {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON feed {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("feed {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("no feeds registered for {country}/{metric}")]
    UnknownEntity { country: String, metric: Metric },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
