use chrono::prelude::*;

// Unix timestamp in milliseconds.
pub type Timestamp = i64;

pub trait TimestampTrait {
    fn from_date(date: NaiveDate) -> Self;
    fn to_iso_string(&self) -> String;
    fn to_date_string(&self) -> String;
}

impl TimestampTrait for Timestamp {
    /// Midnight UTC of the given calendar day.
    fn from_date(date: NaiveDate) -> Self {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .timestamp_millis()
    }

    fn to_iso_string(&self) -> String {
        match Utc.timestamp_millis_opt(*self).single() {
            Some(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            None => self.to_string(),
        }
    }

    fn to_date_string(&self) -> String {
        match Utc.timestamp_millis_opt(*self).single() {
            Some(ts) => ts.format("%Y-%m-%d").to_string(),
            None => self.to_string(),
        }
    }
}

pub fn now() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Accepts RFC 3339 instants, plain `YYYY-MM-DD` days, and raw milliseconds.
pub fn try_parse_timestamp(s: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Timestamp::from_date(date));
    }

    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().ok();
    }

    None
}
