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
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use flexion_types::DailyRecord;
use tracing::{debug, info};

use super::DailyProvider;
use crate::error::FeedError;
use crate::normalize::parse_timestamp;

const DATE_COLUMNS: [&str; 4] = ["date", "day", "timestamp", "datetime"];
const AVG_COLUMNS: [&str; 4] = ["avg_value", "avg", "average", "mean"];
const MIN_COLUMNS: [&str; 2] = ["min_value", "min"];
const MAX_COLUMNS: [&str; 2] = ["max_value", "max"];

#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    avg: usize,
    min: usize,
    max: usize,
}

/// Daily aggregates stored as CSV (`date,avg,min,max`)
///
/// Rows with an unreadable date, a missing or non-finite value, or
/// `min > max` are skipped. A later row for the same date replaces an
/// earlier one.
#[derive(Debug, Clone)]
pub struct DailyCsvFeed {
    name: String,
    path: PathBuf,
}

impl DailyCsvFeed {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("daily-csv:{}", path.display()),
            path,
        }
    }

    fn csv_error(&self, source: csv::Error) -> FeedError {
        FeedError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn columns(&self, headers: &StringRecord) -> Result<Columns, FeedError> {
        let headers: Vec<String> = headers.iter().map(str::to_ascii_lowercase).collect();
        let find = |candidates: &[&str], column: &'static str| {
            candidates
                .iter()
                .find_map(|name| headers.iter().position(|h| h == name))
                .ok_or_else(|| FeedError::MissingColumn {
                    path: self.path.clone(),
                    column,
                })
        };

        Ok(Columns {
            date: find(&DATE_COLUMNS[..], "date")?,
            avg: find(&AVG_COLUMNS[..], "avg")?,
            min: find(&MIN_COLUMNS[..], "min")?,
            max: find(&MAX_COLUMNS[..], "max")?,
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

fn parse_record(record: &StringRecord, columns: Columns) -> Option<DailyRecord> {
    let value = |idx: usize| {
        record
            .get(idx)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };

    let daily = DailyRecord {
        date: parse_date(record.get(columns.date)?)?,
        avg_value: value(columns.avg)?,
        min_value: value(columns.min)?,
        max_value: value(columns.max)?,
    };
    (daily.min_value <= daily.max_value).then_some(daily)
}

impl DailyProvider for DailyCsvFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_daily(&self) -> Result<Vec<DailyRecord>, FeedError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;
        let columns = self.columns(reader.headers().map_err(|e| self.csv_error(e))?)?;

        let mut by_date = BTreeMap::new();
        let mut skipped = 0_usize;
        for result in reader.records() {
            match result.ok().and_then(|r| parse_record(&r, columns)) {
                Some(daily) => {
                    by_date.insert(daily.date, daily);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} unreadable rows in {}", skipped, self.path.display());
        }
        info!("Loaded {} daily records from {}", by_date.len(), self.path.display());

        Ok(by_date.into_values().collect())
    }
}
