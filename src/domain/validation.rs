//! Validation of caller-submitted payloads
//!
//! Payloads are checked as loosely-typed JSON so that each failure can be reported with the right
//! kind: a malformed body, a record with the wrong keys, or a field with the wrong type. A batch
//! is either accepted in full or rejected in full.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use super::{TransactionRecord, TIMESTAMP_FORMAT};

pub const MALFORMED_BODY: &str = "Error Parsing JSON";
pub const TRANSACTIONS_NOT_A_LIST: &str =
    "Request body must be of type list and include at least one transaction record";
pub const TRANSACTION_KEYS: &str =
    "Transaction records must contain payer, points, and timestamp keys";
pub const TRANSACTION_TYPES: &str = "Transaction records must contain valid data types: payer (string), points (integer), timestamp (string as YYYY-MM-DDT00:00:00Z)";
pub const SPEND_NOT_AN_OBJECT: &str = "Request body must be an object with a points key";
pub const SPEND_KEYS: &str = "Spend requests must contain the points key only";
pub const SPEND_TYPES: &str = "Spend requests must contain valid data types: points (integer)";

const TRANSACTION_FIELDS: [&str; 3] = ["payer", "points", "timestamp"];
const SPEND_FIELDS: [&str; 1] = ["points"];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body is absent, is not JSON, or is not the expected kind of JSON value
    #[error("{0}")]
    MalformedPayload(&'static str),

    /// A record is missing a key or has an unexpected one
    #[error("{0}")]
    Shape(&'static str),

    /// A field has the wrong type, or a timestamp is not in the canonical format
    #[error("{0}")]
    Type(&'static str),

    /// Spend requests must ask for at least one point
    #[error("points to spend must be a positive integer, got {0}")]
    InvalidAmount(i64),
}

/// Parse a raw request body
///
/// A missing body, a blank one and a JSON `null` are all treated as absent.
pub fn parse_body(body: Option<&str>) -> Result<Value, ValidationError> {
    let body = body
        .filter(|body| !body.trim().is_empty())
        .ok_or(ValidationError::MalformedPayload(MALFORMED_BODY))?;

    match serde_json::from_str(body) {
        Ok(Value::Null) | Err(_) => Err(ValidationError::MalformedPayload(MALFORMED_BODY)),
        Ok(value) => Ok(value),
    }
}

/// Validate a batch of transaction records
///
/// Key checks run over the whole batch before any type check, so a batch with both kinds of
/// problems is reported as a [`ValidationError::Shape`].
pub fn validate_transactions(payload: &Value) -> Result<Vec<TransactionRecord>, ValidationError> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Null => return Err(ValidationError::MalformedPayload(MALFORMED_BODY)),
        _ => return Err(ValidationError::MalformedPayload(TRANSACTIONS_NOT_A_LIST)),
    };

    if let Some(index) = records
        .iter()
        .position(|record| !has_exact_keys(record, &TRANSACTION_FIELDS))
    {
        debug!(index, "transaction record has invalid keys");
        return Err(ValidationError::Shape(TRANSACTION_KEYS));
    }

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            parse_record(record).ok_or_else(|| {
                debug!(index, "transaction record has invalid data types");
                ValidationError::Type(TRANSACTION_TYPES)
            })
        })
        .collect()
}

/// Validate a spend request, returning the number of points to spend
pub fn validate_spend(payload: &Value) -> Result<i64, ValidationError> {
    match payload {
        Value::Object(_) => (),
        Value::Null => return Err(ValidationError::MalformedPayload(MALFORMED_BODY)),
        _ => return Err(ValidationError::MalformedPayload(SPEND_NOT_AN_OBJECT)),
    }

    if !has_exact_keys(payload, &SPEND_FIELDS) {
        return Err(ValidationError::Shape(SPEND_KEYS));
    }

    let points = payload["points"]
        .as_i64()
        .ok_or(ValidationError::Type(SPEND_TYPES))?;
    if points <= 0 {
        return Err(ValidationError::InvalidAmount(points));
    }

    Ok(points)
}

/// Parse a timestamp in the canonical `YYYY-MM-DDTHH:MM:SSZ` form
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    // chrono accepts signs, spaces and unpadded fields, the canonical form does not
    const LAYOUT: &[u8] = b"0000-00-00T00:00:00Z";
    let is_canonical = value.len() == LAYOUT.len()
        && value
            .bytes()
            .zip(LAYOUT)
            .all(|(byte, &expected)| match expected {
                b'0' => byte.is_ascii_digit(),
                _ => byte == expected,
            });
    if !is_canonical {
        return None;
    }

    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn has_exact_keys(value: &Value, keys: &[&str]) -> bool {
    value.as_object().map_or(false, |object| {
        object.len() == keys.len() && keys.iter().all(|key| object.contains_key(*key))
    })
}

fn parse_record(record: &Value) -> Option<TransactionRecord> {
    let payer = record["payer"].as_str().filter(|payer| !payer.is_empty())?;
    // Floats and numeric strings are rejected
    let points = record["points"].as_i64()?;
    let timestamp = record["timestamp"].as_str().and_then(parse_timestamp)?;

    Some(TransactionRecord {
        payer: payer.to_string(),
        points,
        timestamp,
    })
}
