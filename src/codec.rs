//! Body decoding and result encoding.
//!
//! Both sides are trait objects on the dispatcher so embedders can plug in
//! other media types; the defaults speak JSON.

use crate::coerce::{coerce, Shape};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("malformed body: {0}")]
    Malformed(String),
}

/// Decodes a request body into a generic value matching the declared shape.
pub trait BodyDecoder: Send + Sync {
    fn decode(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
        shape: &Shape,
    ) -> Result<Value, BodyError>;
}

/// Default decoder: accepts `application/json` (or an absent content type)
/// and coerces the parsed document to the declared shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodyDecoder;

impl BodyDecoder for JsonBodyDecoder {
    fn decode(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
        shape: &Shape,
    ) -> Result<Value, BodyError> {
        if let Some(content_type) = content_type {
            if !content_type.trim().starts_with("application/json") {
                return Err(BodyError::UnsupportedMediaType(content_type.to_string()));
            }
        }

        let document: Value =
            serde_json::from_slice(bytes).map_err(|err| BodyError::Malformed(err.to_string()))?;
        coerce(Some(&document), shape).map_err(|err| BodyError::Malformed(err.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("failed to encode result: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Serializes a handler result for the response body, returning the content
/// type alongside the bytes.
pub trait ResultEncoder: Send + Sync {
    fn encode(&self, value: &Value) -> Result<(String, Vec<u8>), EncodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResultEncoder;

impl ResultEncoder for JsonResultEncoder {
    fn encode(&self, value: &Value) -> Result<(String, Vec<u8>), EncodeError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(("application/json;charset=UTF-8".to_string(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::{RecordShape, Shape};
    use serde_json::json;

    #[test]
    fn test_json_decoder_coerces_to_shape() {
        let shape = Shape::Record(
            RecordShape::new("Item")
                .field("name", Shape::String)
                .field("count", Shape::Int),
        );
        let decoded = JsonBodyDecoder
            .decode(
                Some("application/json"),
                br#"{"count": "7", "name": "bolt", "extra": true}"#,
                &shape,
            )
            .unwrap();
        assert_eq!(decoded, json!({"name": "bolt", "count": 7}));
    }

    #[test]
    fn test_json_decoder_rejects_other_media_types() {
        let result = JsonBodyDecoder.decode(Some("text/csv"), b"a,b", &Shape::Opaque);
        assert!(matches!(result, Err(BodyError::UnsupportedMediaType(_))));
    }

    #[test]
    fn test_json_decoder_rejects_malformed_documents() {
        let result = JsonBodyDecoder.decode(Some("application/json"), b"{oops", &Shape::Opaque);
        assert!(matches!(result, Err(BodyError::Malformed(_))));
    }

    #[test]
    fn test_json_encoder() {
        let (content_type, bytes) = JsonResultEncoder.encode(&json!({"ok": true})).unwrap();
        assert_eq!(content_type, "application/json;charset=UTF-8");
        assert_eq!(bytes, br#"{"ok":true}"#);
    }
}
