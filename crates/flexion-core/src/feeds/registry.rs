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

use flexion_types::{DailyRecord, Metric, Series};
use tracing::{debug, warn};

use super::{
    CsvArchiveFeed, DailyCsvFeed, DailyProvider, FeedKind, FeedProvider, FeedRole, JsonLiveFeed,
};
use crate::config::AppConfig;
use crate::daily::merge_daily;
use crate::error::FeedError;
use crate::normalize::combine;

/// A provider together with its place in the merge
#[derive(Debug)]
pub struct RegisteredFeed {
    pub role: FeedRole,
    pub priority: u8,
    pub provider: Box<dyn FeedProvider>,
}

/// A daily aggregate source; higher priority wins on a shared date
#[derive(Debug)]
pub struct RegisteredDailyFeed {
    pub priority: u8,
    pub provider: Box<dyn DailyProvider>,
}

#[derive(Debug, Default)]
struct EntityFeeds {
    points: Vec<RegisteredFeed>,
    daily: Vec<RegisteredDailyFeed>,
}

/// Archive, live and daily data for one entity and metric
#[derive(Debug, Clone, Default)]
pub struct ResolvedFeeds {
    pub archive: Series,

    /// None when no live feed is registered or none could be read
    pub live: Option<Series>,

    /// Precomputed daily aggregates, ascending by date
    pub daily: Vec<DailyRecord>,
}

impl ResolvedFeeds {
    /// Archive and live merged over their full extent, live preferred
    pub fn combined(&self) -> Series {
        match &self.live {
            Some(live) => combine(&[(0, &self.archive), (1, live)]),
            None => self.archive.clone(),
        }
    }
}

/// Entity -> ordered list of feed providers
#[derive(Debug, Default)]
pub struct FeedRegistry {
    feeds: BTreeMap<(String, Metric), EntityFeeds>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build providers for every feed in the country table
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        for country in &config.countries {
            for feed in &country.feeds {
                let path = config.resolve_path(&feed.path);
                let provider: Box<dyn FeedProvider> = match feed.kind {
                    FeedKind::Csv => Box::new(CsvArchiveFeed::new(path)),
                    FeedKind::Json => Box::new(JsonLiveFeed::new(path)),
                    FeedKind::DailyCsv => {
                        let daily = Box::new(DailyCsvFeed::new(path));
                        registry.register_daily(&country.code, feed.metric, feed.priority, daily);
                        continue;
                    }
                };
                registry.register(&country.code, feed.metric, feed.role, feed.priority, provider);
            }
        }
        registry
    }

    pub fn register(
        &mut self,
        country: &str,
        metric: Metric,
        role: FeedRole,
        priority: u8,
        provider: Box<dyn FeedProvider>,
    ) {
        debug!(
            "Registered {:?} feed {} for {}/{}",
            role,
            provider.name(),
            country,
            metric
        );
        self.entry(country, metric).points.push(RegisteredFeed {
            role,
            priority,
            provider,
        });
    }

    pub fn register_daily(
        &mut self,
        country: &str,
        metric: Metric,
        priority: u8,
        provider: Box<dyn DailyProvider>,
    ) {
        debug!(
            "Registered daily feed {} for {}/{}",
            provider.name(),
            country,
            metric
        );
        self.entry(country, metric)
            .daily
            .push(RegisteredDailyFeed { priority, provider });
    }

    fn entry(&mut self, country: &str, metric: Metric) -> &mut EntityFeeds {
        self.feeds
            .entry((normalize_code(country), metric))
            .or_default()
    }

    /// Registered (country, metric) pairs in stable order
    pub fn entities(&self) -> impl Iterator<Item = (&str, Metric)> {
        self.feeds
            .keys()
            .map(|(country, metric)| (country.as_str(), *metric))
    }

    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = self.entities().map(|(c, _)| c).collect();
        countries.dedup();
        countries
    }

    pub fn contains(&self, country: &str, metric: Metric) -> bool {
        self.feeds.contains_key(&(normalize_code(country), metric))
    }

    /// Fetch all feeds for an entity.
    ///
    /// Archive and daily failures are errors. A live feed that fails is
    /// logged and treated as absent, since the archive alone is still usable.
    pub fn resolve(&self, country: &str, metric: Metric) -> Result<ResolvedFeeds, FeedError> {
        let feeds = self
            .feeds
            .get(&(normalize_code(country), metric))
            .ok_or_else(|| FeedError::UnknownEntity {
                country: country.to_owned(),
                metric,
            })?;

        let mut archives = Vec::new();
        let mut lives = Vec::new();
        for feed in &feeds.points {
            match feed.role {
                FeedRole::Archive => archives.push((feed.priority, feed.provider.fetch_recent()?)),
                FeedRole::Live => match feed.provider.fetch_recent() {
                    Ok(series) => lives.push((feed.priority, series)),
                    Err(e) => warn!("Live feed {} unavailable: {}", feed.provider.name(), e),
                },
            }
        }

        let mut dailies = Vec::with_capacity(feeds.daily.len());
        for feed in &feeds.daily {
            dailies.push((feed.priority, feed.provider.fetch_daily()?));
        }

        let archive = combine_owned(&archives);
        let live = (!lives.is_empty()).then(|| combine_owned(&lives));
        let daily = combine_daily(dailies);

        debug!(
            "Resolved {}/{}: {} archive points, {} live points, {} daily records",
            country,
            metric,
            archive.len(),
            live.as_ref().map_or(0, Series::len),
            daily.len()
        );

        Ok(ResolvedFeeds {
            archive,
            live,
            daily,
        })
    }
}

fn combine_owned(feeds: &[(u8, Series)]) -> Series {
    let borrowed: Vec<(u8, &Series)> = feeds.iter().map(|(p, s)| (*p, s)).collect();
    combine(&borrowed)
}

/// Highest priority wins per date; on equal priority the later feed does
fn combine_daily(mut feeds: Vec<(u8, Vec<DailyRecord>)>) -> Vec<DailyRecord> {
    feeds.sort_by_key(|(priority, _)| *priority);
    feeds
        .into_iter()
        .fold(Vec::new(), |acc, (_, records)| merge_daily(&records, &acc))
}

fn normalize_code(country: &str) -> String {
    country.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use flexion_types::Observation;

    #[derive(Debug)]
    struct StaticFeed {
        name: &'static str,
        values: Vec<f64>,
        offset_hours: i64,
    }

    impl FeedProvider for StaticFeed {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch_recent(&self) -> Result<Series, FeedError> {
            let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap().fixed_offset();
            Ok(Series::from_observations(
                self.values
                    .iter()
                    .zip(self.offset_hours..)
                    .map(|(v, h)| Observation::new(base + Duration::hours(h), *v))
                    .collect(),
            ))
        }
    }

    #[derive(Debug)]
    struct BrokenFeed;

    impl FeedProvider for BrokenFeed {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch_recent(&self) -> Result<Series, FeedError> {
            Err(FeedError::Io {
                path: "/dev/null/feed".into(),
                source: std::io::Error::other("unreachable"),
            })
        }
    }

    fn static_feed(name: &'static str, values: Vec<f64>, offset_hours: i64) -> Box<StaticFeed> {
        Box::new(StaticFeed {
            name,
            values,
            offset_hours,
        })
    }

    #[test]
    fn test_unknown_entity() {
        let registry = FeedRegistry::new();
        let err = registry.resolve("DE", Metric::Price).unwrap_err();
        assert!(matches!(err, FeedError::UnknownEntity { .. }));
    }

    #[test]
    fn test_archive_priority_and_live_split() {
        let mut registry = FeedRegistry::new();
        registry.register(
            "de",
            Metric::Price,
            FeedRole::Archive,
            0,
            static_feed("old", vec![1.0, 1.0], 0),
        );
        registry.register(
            "DE",
            Metric::Price,
            FeedRole::Archive,
            5,
            static_feed("fix", vec![2.0], 1),
        );
        registry.register(
            "DE",
            Metric::Price,
            FeedRole::Live,
            0,
            static_feed("live", vec![9.0], 1),
        );

        let resolved = registry.resolve("De", Metric::Price).unwrap();
        assert_eq!(resolved.archive.values(), vec![1.0, 2.0]);
        assert_eq!(resolved.live.as_ref().unwrap().values(), vec![9.0]);
        assert_eq!(resolved.combined().values(), vec![1.0, 9.0]);
    }

    #[test]
    fn test_broken_live_feed_is_absent() {
        let mut registry = FeedRegistry::new();
        registry.register(
            "FR",
            Metric::Carbon,
            FeedRole::Archive,
            0,
            static_feed("a", vec![50.0], 0),
        );
        registry.register("FR", Metric::Carbon, FeedRole::Live, 0, Box::new(BrokenFeed));

        let resolved = registry.resolve("FR", Metric::Carbon).unwrap();
        assert!(resolved.live.is_none());
        assert_eq!(resolved.archive.len(), 1);
    }

    #[test]
    fn test_broken_archive_is_error() {
        let mut registry = FeedRegistry::new();
        registry.register("FR", Metric::Price, FeedRole::Archive, 0, Box::new(BrokenFeed));
        assert!(registry.resolve("FR", Metric::Price).is_err());
    }

    #[test]
    fn test_entities_and_countries() {
        let mut registry = FeedRegistry::new();
        registry.register("NL", Metric::Price, FeedRole::Archive, 0, static_feed("p", vec![], 0));
        registry.register("NL", Metric::Carbon, FeedRole::Archive, 0, static_feed("c", vec![], 0));
        registry.register("BE", Metric::Price, FeedRole::Archive, 0, static_feed("b", vec![], 0));

        assert_eq!(registry.countries(), vec!["BE", "NL"]);
        assert_eq!(registry.entities().count(), 3);
        assert!(registry.contains("nl", Metric::Carbon));
        assert!(!registry.contains("BE", Metric::Carbon));
    }

    #[derive(Debug)]
    struct StaticDaily {
        spreads: Vec<(u32, f64)>,
    }

    impl DailyProvider for StaticDaily {
        fn name(&self) -> &str {
            "static-daily"
        }

        fn fetch_daily(&self) -> Result<Vec<DailyRecord>, FeedError> {
            Ok(self
                .spreads
                .iter()
                .map(|&(day, spread)| DailyRecord {
                    date: chrono::NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
                    avg_value: 100.0,
                    min_value: 100.0 - spread / 2.0,
                    max_value: 100.0 + spread / 2.0,
                })
                .collect())
        }
    }

    fn static_daily(spreads: Vec<(u32, f64)>) -> Box<StaticDaily> {
        Box::new(StaticDaily { spreads })
    }

    #[test]
    fn test_daily_feeds_merge_by_priority() {
        let mut registry = FeedRegistry::new();
        registry.register_daily("CZ", Metric::Carbon, 5, static_daily(vec![(2, 50.0)]));
        registry.register_daily("CZ", Metric::Carbon, 0, static_daily(vec![(1, 10.0), (2, 20.0)]));

        assert!(registry.contains("cz", Metric::Carbon));
        let resolved = registry.resolve("CZ", Metric::Carbon).unwrap();

        // Daily-only entity: no points, but its records are available
        assert!(resolved.archive.is_empty());
        assert!(resolved.live.is_none());
        let spreads: Vec<f64> = resolved.daily.iter().map(DailyRecord::spread).collect();
        assert_eq!(spreads, vec![10.0, 50.0]);
    }

    #[derive(Debug)]
    struct BrokenDaily;

    impl DailyProvider for BrokenDaily {
        fn name(&self) -> &str {
            "broken-daily"
        }

        fn fetch_daily(&self) -> Result<Vec<DailyRecord>, FeedError> {
            Err(FeedError::MissingColumn {
                path: "daily.csv".into(),
                column: "min",
            })
        }
    }

    #[test]
    fn test_broken_daily_feed_is_error() {
        let mut registry = FeedRegistry::new();
        let archive = static_feed("a", vec![1.0], 0);
        registry.register("CZ", Metric::Price, FeedRole::Archive, 0, archive);
        registry.register_daily("CZ", Metric::Price, 0, Box::new(BrokenDaily));
        assert!(registry.resolve("CZ", Metric::Price).is_err());
    }
}
