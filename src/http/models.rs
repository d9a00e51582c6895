use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{MetricName, Point, SampleValue, TimestampTrait, UserId};

/// A chat message relayed by the bot transport.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub latest: BTreeMap<MetricName, SampleValue>,
    pub keys: Vec<MetricName>,
    pub points: usize,
    pub chart: String,
}

#[derive(Debug, Serialize)]
pub struct PointInfo {
    pub key: MetricName,
    pub value: SampleValue,
    pub timestamp: String,
}

impl From<Point> for PointInfo {
    fn from(point: Point) -> Self {
        Self {
            timestamp: point.timestamp.to_iso_string(),
            key: point.key,
            value: point.value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeletePointParams {
    pub key: String,
    /// RFC 3339 instant, `YYYY-MM-DD` day, or Unix milliseconds.
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePointResponse {
    pub deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    /// Comma-separated metric names; all metrics when absent.
    pub keys: Option<String>,
}
