use nom::Slice;
use nom_locate::LocatedSpan;

pub type Span<'a> = LocatedSpan<&'a str>;

pub type IResult<'a, O> = nom::IResult<Span<'a>, O>;

/// Narrows the span to its non-whitespace part, keeping line and column info.
pub fn trim_span(span: Span) -> Span {
    let text = *span.fragment();
    let start = text.len() - text.trim_start().len();
    let end = start + text.trim().len();
    span.slice(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_span() {
        #[rustfmt::skip]
        let tests = [
            ("", "", 1, 1),
            ("   ", "", 1, 4),
            ("foo", "foo", 1, 1),
            ("  foo  ", "foo", 1, 3),
            ("\n\n  foo bar\n", "foo bar", 3, 3),
        ];

        for (input, expected, line, column) in &tests {
            let actual = trim_span(Span::new(input));
            assert_eq!(*actual.fragment(), *expected, "while trimming {:?}", input);
            assert_eq!(actual.location_line(), *line, "while trimming {:?}", input);
            assert_eq!(actual.get_utf8_column(), *column, "while trimming {:?}", input);
        }
    }
}
