use serde::Serialize;

use super::timestamp::{Timestamp, TimestampTrait};

pub type MetricName = String;

pub type SampleValue = f64;

pub type UserId = i64;

/// One key/value pair recovered from a chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    key: MetricName,
    value: SampleValue,
    timestamp: Option<Timestamp>,
}

impl ParsedRecord {
    pub fn new(key: MetricName, value: SampleValue, timestamp: Option<Timestamp>) -> Self {
        Self {
            key,
            value,
            timestamp,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> SampleValue {
        self.value
    }

    /// `None` means the caller stamps the record with the current time.
    #[inline]
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.timestamp
    }
}

/// A stored observation of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub key: MetricName,
    pub value: SampleValue,
    pub timestamp: Timestamp,
}

impl Point {
    pub fn new(key: MetricName, value: SampleValue, timestamp: Timestamp) -> Self {
        Self {
            key,
            value,
            timestamp,
        }
    }
}

#[derive(Serialize)]
pub struct RecordRepr<'a> {
    pub key: &'a str,
    pub value: SampleValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<'a> From<&'a ParsedRecord> for RecordRepr<'a> {
    fn from(record: &'a ParsedRecord) -> Self {
        Self {
            key: &record.key,
            value: record.value,
            timestamp: record.timestamp.map(|ts| ts.to_iso_string()),
        }
    }
}
