use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{MetricName, ParsedRecord, Point, SampleValue, Timestamp};

/// Folds a metric name into the series key, so `Weight` and `weight` share a series.
pub fn series_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The history of one metric, kept as parallel value/timestamp arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: MetricName,
    pub values: Vec<SampleValue>,
    pub timestamps: Vec<Timestamp>,
}

impl Series {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn push(&mut self, value: SampleValue, timestamp: Timestamp) {
        self.values.push(value);
        self.timestamps.push(timestamp);
    }

    fn len(&self) -> usize {
        self.values.len().min(self.timestamps.len())
    }

    fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.values
            .iter()
            .zip(self.timestamps.iter())
            .map(move |(v, ts)| Point::new(self.name.clone(), *v, *ts))
    }

    // Greatest timestamp wins; among equal timestamps the later appended one.
    fn latest(&self) -> Option<SampleValue> {
        (0..self.len())
            .max_by_key(|&i| (self.timestamps[i], i))
            .map(|i| self.values[i])
    }

    fn remove(&mut self, timestamp: Timestamp) -> bool {
        match self.timestamps.iter().position(|ts| *ts == timestamp) {
            Some(i) => {
                self.values.remove(i);
                self.timestamps.remove(i);
                true
            }
            None => false,
        }
    }
}

/// Everything one user has recorded, as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSeries {
    #[serde(default)]
    pub series: BTreeMap<String, Series>,
}

impl UserSeries {
    pub fn append(&mut self, records: &[ParsedRecord], default_timestamp: Timestamp) {
        for record in records {
            self.series
                .entry(series_key(record.key()))
                .or_insert_with(|| Series::new(record.key()))
                .push(
                    record.value(),
                    record.timestamp().unwrap_or(default_timestamp),
                );
        }
    }

    pub fn all_points(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self.series.values().flat_map(Series::points).collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }

    pub fn latest_per_key(&self) -> BTreeMap<MetricName, SampleValue> {
        self.series
            .values()
            .filter_map(|s| s.latest().map(|v| (s.name.clone(), v)))
            .collect()
    }

    pub fn delete_point(&mut self, key: &str, timestamp: Timestamp) -> bool {
        let skey = series_key(key);
        let deleted = match self.series.get_mut(&skey) {
            Some(series) => series.remove(timestamp),
            None => false,
        };

        if deleted && self.series.get(&skey).map_or(false, |s| s.len() == 0) {
            self.series.remove(&skey);
        }
        deleted
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
