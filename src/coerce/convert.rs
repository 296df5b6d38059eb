use super::shape::Shape;
use serde_json::{json, Map, Value};
use thiserror::Error;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

/// Raised only for malformed input; absence and nulls never fail.
#[derive(Debug, Error, PartialEq)]
pub enum CoerceError {
    #[error("cannot parse `{text}` as {expected}")]
    Parse { text: String, expected: &'static str },
    #[error("value {value} is out of range for {expected}")]
    OutOfRange { value: i64, expected: &'static str },
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown {name} constant `{text}`")]
    UnknownConstant { name: String, text: String },
}

/// Converts a raw decoded value into the target shape.
///
/// Absent (or explicit null) raw values take the shape's default: zero for
/// numeric and boolean shapes, empty for collections, null for everything
/// else. Non-null values are parsed, narrowed, or walked recursively per the
/// shape table; only malformed input produces an error.
pub fn coerce(raw: Option<&Value>, shape: &Shape) -> Result<Value, CoerceError> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(default_for(shape)),
        Some(value) => value,
    };

    match shape {
        Shape::String => Ok(Value::String(display(raw))),
        Shape::Byte => coerce_integer(raw, shape, i64::from(i8::MIN), i64::from(i8::MAX)),
        Shape::Short => coerce_integer(raw, shape, i64::from(i16::MIN), i64::from(i16::MAX)),
        Shape::Int => coerce_integer(raw, shape, i64::from(i32::MIN), i64::from(i32::MAX)),
        Shape::Long => coerce_integer(raw, shape, i64::MIN, i64::MAX),
        Shape::Float | Shape::Double => coerce_float(raw, shape),
        Shape::Bool => Ok(Value::Bool(display(raw).eq_ignore_ascii_case("true"))),
        Shape::Optional(inner) => coerce(Some(raw), inner),
        Shape::Timestamp => coerce_timestamp(raw),
        Shape::Date => {
            let format = format_description!("[year]-[month]-[day]");
            let date = Date::parse(&display(raw), format).map_err(|_| CoerceError::Parse {
                text: display(raw),
                expected: shape.expected(),
            })?;
            canonical(date.format(format), shape)
        }
        Shape::Time => {
            let format = format_description!("[hour]:[minute]:[second]");
            let time = Time::parse(&display(raw), format).map_err(|_| CoerceError::Parse {
                text: display(raw),
                expected: shape.expected(),
            })?;
            canonical(time.format(format), shape)
        }
        Shape::DateTime => {
            let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
            let datetime =
                PrimitiveDateTime::parse(&display(raw), format).map_err(|_| CoerceError::Parse {
                    text: display(raw),
                    expected: shape.expected(),
                })?;
            canonical(datetime.format(format), shape)
        }
        Shape::Enum(e) => {
            let text = display(raw);
            if e.constants.iter().any(|c| c == &text) {
                Ok(Value::String(text))
            } else {
                Err(CoerceError::UnknownConstant {
                    name: e.name.clone(),
                    text,
                })
            }
        }
        Shape::List(element) => match raw {
            Value::Array(items) => {
                let coerced = items
                    .iter()
                    .map(|item| coerce(Some(item), element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(coerced))
            }
            other => Err(CoerceError::Mismatch {
                expected: "list",
                found: kind(other),
            }),
        },
        Shape::Map(value_shape) => match raw {
            Value::Object(entries) => {
                let mut coerced = Map::new();
                for (key, entry) in entries {
                    coerced.insert(key.clone(), coerce(Some(entry), value_shape)?);
                }
                Ok(Value::Object(coerced))
            }
            other => Err(CoerceError::Mismatch {
                expected: "map",
                found: kind(other),
            }),
        },
        Shape::Record(record) => match raw {
            // Unknown keys are ignored; declared fields drive the walk and
            // the output keeps declaration order.
            Value::Object(entries) => {
                let mut coerced = Map::new();
                for field in &record.fields {
                    let value = coerce(entries.get(&field.name), &field.shape)?;
                    coerced.insert(field.name.clone(), value);
                }
                Ok(Value::Object(coerced))
            }
            other => Err(CoerceError::Mismatch {
                expected: "record",
                found: kind(other),
            }),
        },
        Shape::Opaque => Ok(raw.clone()),
    }
}

fn default_for(shape: &Shape) -> Value {
    match shape {
        Shape::Byte | Shape::Short | Shape::Int | Shape::Long => json!(0),
        Shape::Float | Shape::Double => json!(0.0),
        Shape::Bool => Value::Bool(false),
        Shape::List(_) => Value::Array(Vec::new()),
        Shape::Map(_) => Value::Object(Map::new()),
        _ => Value::Null,
    }
}

/// Display form used for parsing: strings unwrap, everything else renders as
/// its JSON text.
fn display(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

fn coerce_integer(raw: &Value, shape: &Shape, min: i64, max: i64) -> Result<Value, CoerceError> {
    let parsed = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| CoerceError::Parse {
                text: n.to_string(),
                expected: shape.expected(),
            })?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| CoerceError::Parse {
            text: s.clone(),
            expected: shape.expected(),
        })?,
        other => {
            return Err(CoerceError::Mismatch {
                expected: shape.expected(),
                found: kind(other),
            })
        }
    };

    if parsed < min || parsed > max {
        return Err(CoerceError::OutOfRange {
            value: parsed,
            expected: shape.expected(),
        });
    }

    Ok(json!(parsed))
}

fn coerce_float(raw: &Value, shape: &Shape) -> Result<Value, CoerceError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64().ok_or_else(|| CoerceError::Parse {
            text: n.to_string(),
            expected: shape.expected(),
        })?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| CoerceError::Parse {
            text: s.clone(),
            expected: shape.expected(),
        })?,
        other => {
            return Err(CoerceError::Mismatch {
                expected: shape.expected(),
                found: kind(other),
            })
        }
    };

    serde_json::Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| CoerceError::Parse {
            text: parsed.to_string(),
            expected: shape.expected(),
        })
}

fn coerce_timestamp(raw: &Value) -> Result<Value, CoerceError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(|millis| json!(millis))
            .ok_or_else(|| CoerceError::Parse {
                text: n.to_string(),
                expected: "timestamp",
            }),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|millis| json!(millis))
            .map_err(|_| CoerceError::Parse {
                text: s.clone(),
                expected: "timestamp",
            }),
        other => Err(CoerceError::Mismatch {
            expected: "timestamp",
            found: kind(other),
        }),
    }
}

fn canonical(
    formatted: Result<String, time::error::Format>,
    shape: &Shape,
) -> Result<Value, CoerceError> {
    formatted
        .map(Value::String)
        .map_err(|err| CoerceError::Parse {
            text: err.to_string(),
            expected: shape.expected(),
        })
}
