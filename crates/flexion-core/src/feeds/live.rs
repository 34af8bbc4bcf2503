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

use std::path::{Path, PathBuf};

use flexion_types::{FeedBatch, RawReading, Series};
use serde::Deserialize;
use tracing::info;

use super::FeedProvider;
use crate::error::FeedError;
use crate::normalize::normalize;

/// Accepted layouts of a live snapshot
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LiveDocument {
    List(Vec<RawReading>),
    Wrapped { readings: Vec<RawReading> },
}

/// Live feed snapshot stored as JSON
///
/// Either a bare array of `{"timestamp": ..., "value": ...}` objects or an
/// object with a `readings` array. Values may be numbers, numeric strings or
/// null.
#[derive(Debug, Clone)]
pub struct JsonLiveFeed {
    name: String,
    path: PathBuf,
}

impl JsonLiveFeed {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("json:{}", path.display()),
            path,
        }
    }
}

impl FeedProvider for JsonLiveFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_recent(&self) -> Result<Series, FeedError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| FeedError::Io {
            path: self.path.clone(),
            source,
        })?;

        let readings = match serde_json::from_str(&content) {
            Ok(LiveDocument::List(readings) | LiveDocument::Wrapped { readings }) => readings,
            Err(source) => {
                return Err(FeedError::Json {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let total = readings.len();
        let series = normalize(&[FeedBatch {
            source: self.name.clone(),
            priority: 0,
            readings,
        }]);
        info!("Live feed {}: {} of {} readings usable", self.name, series.len(), total);

        Ok(series)
    }
}
