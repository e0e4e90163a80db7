//! Error types shared by the tabular and search-report parsers

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseErr>;

/// Failure to decode a single record line, independent of where the line came from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LineErr {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected at least {min} fields, found {found}")]
    TooFewFields { min: usize, found: usize },

    #[error("invalid integer in field '{field}': '{value}' ({err})")]
    InvalidInt {
        field: &'static str,
        value: String,
        err: ParseIntError,
    },

    #[error("invalid float in field '{field}': '{value}' ({err})")]
    InvalidFloat {
        field: &'static str,
        value: String,
        err: ParseFloatError,
    },

    #[error("invalid {field} coordinates: {from}..{to}")]
    InvalidCoordinates {
        field: &'static str,
        from: usize,
        to: usize,
    },
}

/// A field that decoded fine but breaks a semantic constraint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueErr {
    #[error("query length must not be negative, got {0}")]
    NegativeLength(i64),

    #[error("query '{0}' not found in length table")]
    UnknownQuery(String),

    #[error("length for query '{query}' is not an integer: {value}")]
    NotAnInteger { query: String, value: String },
}

#[derive(Debug, Error)]
pub enum ParseErr {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{source_name}:{line_number}: {err}: '{line}'")]
    InvalidLine {
        source_name: String,
        line_number: usize,
        line: String,
        #[source]
        err: LineErr,
    },

    #[error("{source_name}:{line_number}: expected {expected}, found {}", describe_found(.line))]
    InvalidFormat {
        source_name: String,
        line_number: usize,
        line: Option<String>,
        expected: String,
    },

    #[error("{source_name}: sequence '{seq_name}' reports {expected} domains but {found} were annotated")]
    DomainCountMismatch {
        source_name: String,
        seq_name: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid value: {0}")]
    InvalidValue(#[from] ValueErr),
}

/// Coarse classification of a [`ParseErr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural mismatch with the expected file layout
    Format,
    /// Semantically invalid value
    Value,
    Io,
}

impl ParseErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseErr::IoError(_) => ErrorKind::Io,
            ParseErr::InvalidValue(_) => ErrorKind::Value,
            ParseErr::InvalidLine { .. }
            | ParseErr::InvalidFormat { .. }
            | ParseErr::DomainCountMismatch { .. } => ErrorKind::Format,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

fn describe_found(line: &Option<String>) -> String {
    match line {
        Some(line) => format!("'{line}'"),
        None => "end of input".to_string(),
    }
}

pub(crate) fn parse_int<T>(value: &str, field: &'static str) -> std::result::Result<T, LineErr>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value.parse::<T>().map_err(|err| LineErr::InvalidInt {
        field,
        value: value.to_string(),
        err,
    })
}

pub(crate) fn parse_float(value: &str, field: &'static str) -> std::result::Result<f64, LineErr> {
    value.parse::<f64>().map_err(|err| LineErr::InvalidFloat {
        field,
        value: value.to_string(),
        err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = ParseErr::InvalidFormat {
            source_name: "report.txt".to_string(),
            line_number: 3,
            line: None,
            expected: "a blank line".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(
            err.to_string(),
            "report.txt:3: expected a blank line, found end of input"
        );

        let err = ParseErr::from(ValueErr::NegativeLength(-1));
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(!err.is_format());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_int::<u32>("42", "length"), Ok(42));
        assert!(matches!(
            parse_int::<u32>("4x", "length"),
            Err(LineErr::InvalidInt { field: "length", .. })
        ));
        assert_eq!(parse_float("1e-10", "evalue"), Ok(1e-10));
        assert!(parse_float("abc", "evalue").is_err());
    }
}
