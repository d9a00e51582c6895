use std::{error, fmt};

use super::result::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnrecognizedPair,
    InvalidNumber,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseErrorKind::UnrecognizedPair => write!(f, "unrecognized key/value pair"),
            ParseErrorKind::InvalidNumber => write!(f, "invalid number"),
        }
    }
}

/// A message fragment that couldn't be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    fragment: String,
    position: (u32, usize),
    kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(fragment: Span, kind: ParseErrorKind) -> Self {
        Self {
            fragment: String::from(*fragment.fragment()),
            position: (fragment.location_line(), fragment.get_utf8_column()),
            kind,
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn line(&self) -> u32 {
        self.position.0
    }

    pub fn column(&self) -> usize {
        self.position.1
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{} {} \"{}\"",
            self.line(),
            self.column(),
            self.kind,
            self.fragment
        )
    }
}

impl error::Error for ParseError {}
