//! Value coercion between wire values and declared parameter shapes.
//!
//! The generic value type is [`serde_json::Value`] (string | number | bool |
//! sequence | ordered map | null). [`coerce`] converts a raw decoded value
//! into a target [`Shape`]; [`adapt`] walks a typed domain value back into a
//! generic value for serialization. Both directions are pure and synchronous.

mod adapt;
mod convert;
mod shape;

pub use adapt::{adapt, adapt_date, adapt_datetime, adapt_time, adapt_timestamp, AdaptError};
pub use convert::{coerce, CoerceError};
pub use shape::{EnumShape, FieldShape, RecordShape, Shape};
