use chrono::NaiveDate;
use lazy_static::lazy_static;
use nom::Slice;
use regex::{Captures, Regex};

use super::result::Span;
use crate::model::{Timestamp, TimestampTrait};

#[derive(Debug, Clone, Copy)]
enum DateOrder {
    YearFirst,
    DayFirst,
}

/// One accepted spelling of a message-leading date.
struct DateHeader {
    re: Regex,
    order: DateOrder,
}

impl DateHeader {
    fn new(pattern: &str, order: DateOrder) -> Self {
        Self {
            re: Regex::new(pattern).unwrap(),
            order,
        }
    }

    fn date(&self, caps: &Captures) -> Option<NaiveDate> {
        let (year, month, day) = match self.order {
            DateOrder::YearFirst => (&caps[1], &caps[2], &caps[3]),
            DateOrder::DayFirst => (&caps[3], &caps[2], &caps[1]),
        };

        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }
}

// The date must be followed by whitespace or the end of the message, and the
// whitespace is consumed along with it.
lazy_static! {
    static ref DATE_HEADERS: Vec<DateHeader> = vec![
        DateHeader::new(
            r"(?i)^date:\s*([0-9]{4})[-/.]([0-9]{1,2})[-/.]([0-9]{1,2})(?:\s+|$)",
            DateOrder::YearFirst,
        ),
        DateHeader::new(
            r"(?i)^date:\s*([0-9]{1,2})[-/.]([0-9]{1,2})[-/.]([0-9]{4})(?:\s+|$)",
            DateOrder::DayFirst,
        ),
        DateHeader::new(
            r"^([0-9]{4})[-/.]([0-9]{1,2})[-/.]([0-9]{1,2})(?:\s+|$)",
            DateOrder::YearFirst,
        ),
        DateHeader::new(
            r"^([0-9]{1,2})[-/.]([0-9]{1,2})[-/.]([0-9]{4})(?:\s+|$)",
            DateOrder::DayFirst,
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingDate {
    Absent,
    Valid(Timestamp),
    /// Shaped like a date, but not a calendar day.
    Invalid,
}

/// Splits an optional leading date off the message.
///
/// The first header whose shape matches decides. If the matched digits don't
/// form a real calendar date the input comes back untouched.
pub fn date_header(input: Span) -> (Span, LeadingDate) {
    let text = *input.fragment();

    for header in DATE_HEADERS.iter() {
        let caps = match header.re.captures(text) {
            Some(caps) => caps,
            None => continue,
        };

        return match (header.date(&caps), caps.get(0)) {
            (Some(date), Some(m)) => (
                input.slice(m.end()..),
                LeadingDate::Valid(Timestamp::from_date(date)),
            ),
            _ => (input, LeadingDate::Invalid),
        };
    }

    (input, LeadingDate::Absent)
}
