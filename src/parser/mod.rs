mod date;
mod error;
mod fragment;
mod number;
mod parser;
mod result;
mod string;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse_message;
