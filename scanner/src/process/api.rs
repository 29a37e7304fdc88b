// THIRD PARTY CRATES
use chrono::NaiveDateTime;

// LOCAL CRATES
use crate::process::{
    FIELD_DELIMITER, Field, FieldParseError, HEADER_FIELDS, ParseError, ParsedLine,
    TIMESTAMP_FORMAT,
};
use shared::{Sample, zero_timestamp};

/// Parse one line of scanner output.
///
/// The line must hold at least the six header fields:
/// `date, time, hz_lo, hz_hi, step, samples`, followed by any number of power
/// values. Individual fields that fail to parse do not reject the line; they are
/// reported in [`ParsedLine::field_errors`].
pub fn parse_line(line: &str, client_id: &str) -> Result<ParsedLine, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < HEADER_FIELDS {
        return Err(ParseError::MalformedLine {
            fields: fields.len(),
            line: line.to_string(),
        });
    }

    let mut field_errors = Vec::new();

    let raw_timestamp = format!("{} {}", fields[0], fields[1]);
    let timestamp = match NaiveDateTime::parse_from_str(&raw_timestamp, TIMESTAMP_FORMAT) {
        Ok(timestamp) => timestamp.and_utc(),
        Err(e) => {
            field_errors.push(FieldParseError::new(Field::Timestamp, raw_timestamp, e));
            zero_timestamp()
        }
    };

    let freq_lo = parse_header(Field::FreqLo, fields[2], &mut field_errors);
    let freq_hi = parse_header(Field::FreqHi, fields[3], &mut field_errors);
    let step = parse_header(Field::Step, fields[4], &mut field_errors);
    let bin_count = parse_header(Field::BinCount, fields[5], &mut field_errors);

    let mut power = Vec::with_capacity(fields.len() - HEADER_FIELDS);
    for (idx, raw) in fields.iter().enumerate().skip(HEADER_FIELDS) {
        match raw.parse::<f64>() {
            Ok(value) => power.push(value),
            Err(e) => field_errors.push(FieldParseError::new(Field::Power(idx), *raw, e)),
        }
    }

    Ok(ParsedLine {
        sample: Sample {
            id: client_id.to_string(),
            timestamp,
            freq_lo,
            freq_hi,
            step,
            bin_count,
            power,
        },
        field_errors,
    })
}

fn parse_header(field: Field, raw: &str, errors: &mut Vec<FieldParseError>) -> f64 {
    raw.parse::<f64>().unwrap_or_else(|e| {
        errors.push(FieldParseError::new(field, raw, e));
        0.0
    })
}
