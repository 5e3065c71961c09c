//! Inbound line decoding
//!
//! Grammar (ASCII, one message per line):
//! - `#R:0,0,0,0,0,b0,...,b7` enrollment reader
//! - `#T:box,f1,f2,f3,f4,b0,...,b7` station touch
//! - `#STATUS:<source>:<state>:<ignored>:<node>` health report
//!
//! The tag id is the eight `bN` bytes as lowercase two-digit hex.

use crate::errors::ProtocolError;
use station_types::{LinkMessage, TagId};

pub const SENTINEL: char = '#';

/// Number of comma fields in `R` and `T` payloads
const READER_FIELDS: usize = 13;
const TAG_OFFSET: usize = 5;
const STATUS_FIELDS: usize = 4;

/// Literals a `STATUS` payload is checked against
#[derive(Debug, Clone, Copy)]
pub struct StatusLiterals<'a> {
    pub source: &'a str,
    pub ok: &'a str,
}

/// Decode one line. `Ok(None)` means the line is not for the engine.
pub fn parse_line(
    line: &str,
    status: StatusLiterals<'_>,
) -> Result<Option<LinkMessage>, ProtocolError> {
    let line = line.trim();
    let Some(body) = line.strip_prefix(SENTINEL) else {
        return Ok(None);
    };

    let (command, payload) = match body.split_once(':') {
        Some((command, payload)) => (command, Some(payload)),
        None => (body, None),
    };

    match command {
        "R" => parse_enrollment(payload.ok_or(ProtocolError::MissingPayload)?).map(Some),
        "T" => parse_scan(payload.ok_or(ProtocolError::MissingPayload)?).map(Some),
        "STATUS" => parse_status(payload.ok_or(ProtocolError::MissingPayload)?, status).map(Some),
        _ => Ok(None),
    }
}

fn parse_enrollment(payload: &str) -> Result<LinkMessage, ProtocolError> {
    let fields = parse_numbers(payload)?;
    check_reader_shape(&fields)?;

    if fields[..TAG_OFFSET].iter().any(|f| *f != 0) {
        return Err(ProtocolError::InvalidPrefix);
    }

    Ok(LinkMessage::Enrollment {
        tag: tag_from_fields(&fields)?,
    })
}

fn parse_scan(payload: &str) -> Result<LinkMessage, ProtocolError> {
    let fields = parse_numbers(payload)?;
    check_reader_shape(&fields)?;

    let box_id = u32::try_from(fields[0]).map_err(|_| ProtocolError::InvalidNumber {
        index: 0,
        value: fields[0].to_string(),
    })?;

    Ok(LinkMessage::Scan {
        box_id,
        tag: tag_from_fields(&fields)?,
    })
}

fn parse_status(payload: &str, literals: StatusLiterals<'_>) -> Result<LinkMessage, ProtocolError> {
    let fields: Vec<&str> = payload.split(':').map(str::trim).collect();
    if fields.len() < STATUS_FIELDS {
        return Err(ProtocolError::FieldCount {
            expected: STATUS_FIELDS,
            actual: fields.len(),
        });
    }

    if fields[0] != literals.source {
        return Err(ProtocolError::UnknownStatusSource(fields[0].to_string()));
    }

    let box_id = fields[3]
        .parse::<u32>()
        .map_err(|_| ProtocolError::InvalidNumber {
            index: 3,
            value: fields[3].to_string(),
        })?;

    Ok(LinkMessage::Status {
        box_id,
        online: fields[1] == literals.ok,
    })
}

fn parse_numbers(payload: &str) -> Result<Vec<u64>, ProtocolError> {
    payload
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, value)| {
            value
                .parse::<u64>()
                .map_err(|_| ProtocolError::InvalidNumber {
                    index,
                    value: value.to_string(),
                })
        })
        .collect()
}

fn check_reader_shape(fields: &[u64]) -> Result<(), ProtocolError> {
    if fields.len() != READER_FIELDS {
        return Err(ProtocolError::FieldCount {
            expected: READER_FIELDS,
            actual: fields.len(),
        });
    }
    Ok(())
}

fn tag_from_fields(fields: &[u64]) -> Result<TagId, ProtocolError> {
    fields[TAG_OFFSET..]
        .iter()
        .enumerate()
        .map(|(i, value)| {
            u8::try_from(*value)
                .map(|byte| format!("{:02x}", byte))
                .map_err(|_| ProtocolError::ByteOutOfRange {
                    index: TAG_OFFSET + i,
                    value: *value,
                })
        })
        .collect()
}
