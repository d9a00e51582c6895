use nom::{
    character::complete::{digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    sequence::pair,
};

use super::result::{IResult, Span};
use crate::model::SampleValue;

/// `digits`, or `digits` followed by a `.` or `,` decimal separator and more digits.
pub fn numeral(input: Span) -> IResult<Span> {
    recognize(pair(digit1, opt(pair(one_of(".,"), digit1))))(input)
}

pub fn is_numeral(s: &str) -> bool {
    all_consuming(numeral)(Span::new(s)).is_ok()
}

/// Turns a numeral into a finite number, accepting a comma as the decimal separator.
pub fn normalize_number(s: &str) -> Option<SampleValue> {
    s.replacen(',', ".", 1)
        .parse::<SampleValue>()
        .ok()
        .filter(|n| n.is_finite())
}
