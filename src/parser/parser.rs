use super::date::{date_header, LeadingDate};
use super::error::{ParseError, ParseErrorKind};
use super::fragment::{match_pair, split_fragments};
use super::number::normalize_number;
use super::result::{trim_span, Span};
use crate::model::{ParsedRecord, Timestamp};

/// Parses one chat message into measurement records.
///
/// Either every fragment of the message becomes a record or the first bad
/// fragment is reported and nothing is returned. A leading date header stamps
/// all records of the message with the same timestamp; without one the
/// records carry no timestamp at all. A leading date that isn't a calendar
/// day stays in the body and fails the fragment holding it.
pub fn parse_message(message: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let input = trim_span(Span::new(message));
    let (body, date) = date_header(input);
    let fragments = split_fragments(body);

    let timestamp = match date {
        LeadingDate::Valid(ts) => Some(ts),
        LeadingDate::Absent => None,
        LeadingDate::Invalid => {
            return Err(match fragments.first() {
                Some(first) => ParseError::new(*first, ParseErrorKind::UnrecognizedPair),
                None => ParseError::new(body, ParseErrorKind::UnrecognizedPair),
            });
        }
    };

    fragments
        .into_iter()
        .map(|fragment| parse_fragment(fragment, timestamp))
        .collect()
}

fn parse_fragment(fragment: Span, timestamp: Option<Timestamp>) -> Result<ParsedRecord, ParseError> {
    let (key, value) = match_pair(fragment.fragment())
        .ok_or_else(|| ParseError::new(fragment, ParseErrorKind::UnrecognizedPair))?;

    let value = normalize_number(&value)
        .ok_or_else(|| ParseError::new(fragment, ParseErrorKind::InvalidNumber))?;

    Ok(ParsedRecord::new(key, value, timestamp))
}
