// Metrea LLC Intellectual Property
// Originally developed by Raw Socket Labs LLC

use std::fmt;

use shared::Sample;
use thiserror::Error;

/// Separator between fields of a scanner line.
pub const FIELD_DELIMITER: &str = ", ";

/// Date, time, low and high frequency, step and bin count.
pub const HEADER_FIELDS: usize = 6;

/// Format of the joined date and time fields.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A line that cannot become a sample at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed line: expected at least {} fields, found {fields}: {line:?}", HEADER_FIELDS)]
    MalformedLine { fields: usize, line: String },
}

/// Position of a field inside a scanner line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    FreqLo,
    FreqHi,
    Step,
    BinCount,
    /// Power value at the given field index (6 or later).
    Power(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Timestamp => write!(f, "timestamp"),
            Field::FreqLo => write!(f, "hz_lo"),
            Field::FreqHi => write!(f, "hz_hi"),
            Field::Step => write!(f, "step"),
            Field::BinCount => write!(f, "samples"),
            Field::Power(idx) => write!(f, "power field {idx}"),
        }
    }
}

/// A single field that failed to parse.
///
/// Header fields are replaced by their zero value, power values are dropped.
/// Either way the rest of the line is still used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse {field} from {raw:?}: {reason}")]
pub struct FieldParseError {
    pub field: Field,
    pub raw: String,
    pub reason: String,
}

impl FieldParseError {
    pub fn new(field: Field, raw: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            field,
            raw: raw.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of parsing one structurally valid line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub sample: Sample,
    pub field_errors: Vec<FieldParseError>,
}

impl ParsedLine {
    pub fn is_clean(&self) -> bool {
        self.field_errors.is_empty()
    }
}
