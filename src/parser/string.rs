use nom::{bytes::complete::take_till, character::complete::char, sequence::delimited};

use super::result::{IResult, Span};

// No escapes: a key can't contain a double quote.
pub fn string_literal(input: Span) -> IResult<String> {
    let (rest, m) = delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)?;
    Ok((rest, String::from(*m.fragment())))
}
