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

use csv::{ReaderBuilder, Trim};
use flexion_types::{FeedBatch, RawReading, RawValue, Series};
use tracing::{debug, info};

use super::FeedProvider;
use crate::error::FeedError;
use crate::normalize::normalize;

const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "datetime", "time", "date"];
const VALUE_COLUMNS: [&str; 5] = ["value", "price", "carbon_intensity", "intensity", "co2"];

/// Static archive stored as CSV with a header row
///
/// Column names are matched case-insensitively; extra columns are ignored.
/// Rows that cannot be read are skipped, the rest of the file still counts.
#[derive(Debug, Clone)]
pub struct CsvArchiveFeed {
    name: String,
    path: PathBuf,
}

impl CsvArchiveFeed {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("csv:{}", path.display()),
            path,
        }
    }

    fn csv_error(&self, source: csv::Error) -> FeedError {
        FeedError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn read_readings(&self) -> Result<Vec<RawReading>, FeedError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.csv_error(e))?
            .iter()
            .map(str::to_ascii_lowercase)
            .collect();

        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|name| headers.iter().position(|h| h == name))
        };
        let ts_idx = find(&TIMESTAMP_COLUMNS[..]).ok_or_else(|| FeedError::MissingColumn {
            path: self.path.clone(),
            column: "timestamp",
        })?;
        let value_idx = find(&VALUE_COLUMNS[..]).ok_or_else(|| FeedError::MissingColumn {
            path: self.path.clone(),
            column: "value",
        })?;

        let mut readings = Vec::new();
        let mut skipped = 0_usize;
        for result in reader.records() {
            let Ok(record) = result else {
                skipped += 1;
                continue;
            };
            let Some(timestamp) = record.get(ts_idx) else {
                skipped += 1;
                continue;
            };
            let value = record
                .get(value_idx)
                .filter(|v| !v.is_empty())
                .map(|v| RawValue::Text(v.to_owned()));

            readings.push(RawReading {
                timestamp: timestamp.to_owned(),
                value,
            });
        }

        if skipped > 0 {
            debug!("Skipped {} unreadable rows in {}", skipped, self.path.display());
        }

        Ok(readings)
    }
}

impl FeedProvider for CsvArchiveFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_recent(&self) -> Result<Series, FeedError> {
        let readings = self.read_readings()?;
        let total = readings.len();
        let series = normalize(&[FeedBatch {
            source: self.name.clone(),
            priority: 0,
            readings,
        }]);

        info!(
            "Loaded {} of {} rows from {}",
            series.len(),
            total,
            self.path.display()
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_and_normalizes() {
        let file = write_csv(
            "Datetime,Country,Price\n\
             2024-01-01T01:00:00Z,DE,45.5\n\
             2024-01-01T00:00:00Z,DE,40.0\n\
             2024-01-01T02:00:00Z,DE,\n\
             2024-01-01T03:00:00Z,DE,n/a\n\
             2024-01-01T01:00:00Z,DE,46.0\n",
        );

        let series = CsvArchiveFeed::new(file.path()).fetch_recent().unwrap();
        assert_eq!(series.values(), vec![40.0, 46.0]);
    }

    #[test]
    fn test_daily_date_column() {
        let file = write_csv(
            "date,carbon_intensity\n\
             2024-03-01,300\n\
             2024-03-02,280.5\n\
             2024-03-03,\n",
        );

        let series = CsvArchiveFeed::new(file.path()).fetch_recent().unwrap();
        assert_eq!(series.values(), vec![300.0, 280.5]);
        assert_eq!(
            series.last().unwrap().date(),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_missing_value_column() {
        let file = write_csv("timestamp,country\n2024-01-01T00:00:00Z,DE\n");
        let err = CsvArchiveFeed::new(file.path()).fetch_recent().unwrap_err();
        assert!(matches!(err, FeedError::MissingColumn { column: "value", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvArchiveFeed::new("/nonexistent/archive.csv")
            .fetch_recent()
            .unwrap_err();
        assert!(matches!(err, FeedError::Csv { .. }));
    }
}
