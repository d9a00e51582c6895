use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{MetricName, ParsedRecord, Point, SampleValue, Timestamp, UserId};

/// Per-user measurement series.
///
/// Writes for one user are applied one at a time and a user always reads
/// back their own latest write. Different users never block each other.
pub trait MeasurementStore: Send + Sync {
    /// Records without a timestamp are stored at `default_timestamp`.
    fn append(
        &self,
        user: UserId,
        records: &[ParsedRecord],
        default_timestamp: Timestamp,
    ) -> Result<()>;

    /// Every point of the user, oldest first.
    fn all_points(&self, user: UserId) -> Result<Vec<Point>>;

    fn latest_per_key(&self, user: UserId) -> Result<BTreeMap<MetricName, SampleValue>>;

    fn delete_point(&self, user: UserId, key: &str, timestamp: Timestamp) -> Result<bool>;

    fn clear(&self, user: UserId) -> Result<()>;
}
