use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

#[derive(Debug, Error)]
#[error("failed to adapt value: {0}")]
pub struct AdaptError(#[from] serde_json::Error);

/// Walks a typed domain value into the generic value form.
///
/// Structures become name-to-value maps with fields in declaration order,
/// sequences become arrays, and scalars map to their JSON counterparts. The
/// caller guarantees the value is acyclic; anything implementing `Serialize`
/// already is.
pub fn adapt<T: Serialize>(value: &T) -> Result<Value, AdaptError> {
    Ok(serde_json::to_value(value)?)
}

/// Epoch milliseconds, truncating sub-millisecond precision.
pub fn adapt_timestamp(value: OffsetDateTime) -> Value {
    json!((value.unix_timestamp_nanos() / 1_000_000) as i64)
}

pub fn adapt_date(value: Date) -> Value {
    let format = format_description!("[year]-[month]-[day]");
    value.format(format).map(Value::String).unwrap_or(Value::Null)
}

pub fn adapt_time(value: Time) -> Value {
    let format = format_description!("[hour]:[minute]:[second]");
    value.format(format).map(Value::String).unwrap_or(Value::Null)
}

pub fn adapt_datetime(value: PrimitiveDateTime) -> Value {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    value.format(format).map(Value::String).unwrap_or(Value::Null)
}
