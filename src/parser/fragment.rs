use std::iter;

use nom::{
    character::complete::{char as nom_char, multispace0},
    combinator::all_consuming,
    sequence::delimited,
    Slice,
};

use super::number::{is_numeral, numeral};
use super::result::{trim_span, IResult, Span};
use super::string::string_literal;
use crate::model::MetricName;

/// Cuts the message body into trimmed, non-empty fragments.
///
/// A message holding at least one separator comma is comma-separated as a
/// whole, otherwise it is newline-separated. A comma sitting between two
/// digits is a decimal comma and never separates anything.
pub fn split_fragments(body: Span) -> Vec<Span> {
    let text = *body.fragment();

    let mut cuts = separator_commas(text);
    if cuts.is_empty() {
        cuts = text.match_indices('\n').map(|(i, _)| i).collect();
    }

    let mut fragments = Vec::new();
    let mut start = 0;
    for cut in cuts.into_iter().chain(iter::once(text.len())) {
        let fragment = trim_span(body.slice(start..cut));
        if !fragment.fragment().is_empty() {
            fragments.push(fragment);
        }
        start = cut + 1;
    }
    fragments
}

fn separator_commas(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let is_digit_at = |i: usize| bytes.get(i).map_or(false, u8::is_ascii_digit);

    text.match_indices(',')
        .map(|(i, _)| i)
        .filter(|&i| !(i > 0 && is_digit_at(i - 1) && is_digit_at(i + 1)))
        .collect()
}

type PairGrammar = fn(&str) -> Option<(MetricName, String)>;

// Tried in order, the first match wins.
const PAIR_GRAMMARS: [PairGrammar; 3] = [quoted_dash_pair, dash_pair, space_pair];

/// Resolves one fragment into a key and a raw (not yet normalized) numeral.
pub fn match_pair(fragment: &str) -> Option<(MetricName, String)> {
    PAIR_GRAMMARS.iter().find_map(|grammar| grammar(fragment))
}

// "key" - value
fn quoted_dash_pair(fragment: &str) -> Option<(MetricName, String)> {
    let (rest, key) = string_literal(Span::new(fragment)).ok()?;
    let (rest, _) = dash(rest).ok()?;
    let (_, value) = all_consuming(numeral)(rest).ok()?;
    Some((normalize_key(&key)?, String::from(*value.fragment())))
}

fn dash(input: Span) -> IResult<char> {
    delimited(multispace0, nom_char('-'), multispace0)(input)
}

// key - value, split on the last dash
fn dash_pair(fragment: &str) -> Option<(MetricName, String)> {
    let (key, value) = fragment.rsplit_once('-')?;
    let value = value.trim();
    if !is_numeral(value) {
        return None;
    }
    Some((normalize_key(key)?, value.to_owned()))
}

// key value
fn space_pair(fragment: &str) -> Option<(MetricName, String)> {
    let (key, value) = fragment.rsplit_once(char::is_whitespace)?;
    if !is_numeral(value) {
        return None;
    }

    // A trailing dash means a dash pair with a broken key, not a key of its own.
    let key = key.trim_end();
    if key.ends_with('-') {
        return None;
    }
    Some((normalize_key(key)?, value.to_owned()))
}

fn normalize_key(raw: &str) -> Option<MetricName> {
    let key = raw.trim();
    let key = key
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .map_or(key, str::trim);

    if key.is_empty() {
        None
    } else {
        Some(key.to_owned())
    }
}
