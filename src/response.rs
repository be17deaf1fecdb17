//! Response decoding: body to text, text to JSON, JSON to typed envelope fields.
//!
//! Every function here consumes the body of the [`RawResponse`] it is given;
//! a second read of the same response fails with
//! [`TransportError::BodyConsumed`](crate::transport::TransportError::BodyConsumed).

use crate::transport::{RawResponse, TransportError};
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Read increment and default capacity when no Content-Length is declared.
pub const BUFFER_SIZE: usize = 8 * 1024;

// Cap for the up-front allocation taken from Content-Length.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

fn capacity_hint(response: &RawResponse) -> Result<usize> {
    let Some(value) = response.headers().get(reqwest::header::CONTENT_LENGTH) else {
        return Ok(BUFFER_SIZE);
    };
    let raw = value.to_str().unwrap_or_default().trim();
    let declared = raw
        .parse::<usize>()
        .map_err(|_| TransportError::InvalidContentLength(raw.to_string()))?;
    Ok(declared.min(MAX_PREALLOC))
}

/// Take the body as a live byte stream.
pub fn stream(response: &mut RawResponse) -> Result<BoxStream<'static, Bytes>> {
    response.take_body()
}

/// Read the whole body into memory.
pub async fn bytes(response: &mut RawResponse) -> Result<Vec<u8>> {
    let capacity = capacity_hint(response)?;
    let mut body = response.take_body()?;
    let mut buf = Vec::with_capacity(capacity);
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}

/// Read the whole body as UTF-8 text.
pub async fn text(response: &mut RawResponse) -> Result<String> {
    let buf = bytes(response).await?;
    String::from_utf8(buf).map_err(|e| {
        Error::decode_with_context(
            "response body is not valid UTF-8",
            ErrorContext::new().with_details(e.to_string()),
        )
    })
}

/// Parse response text as JSON. Empty bodies are a decode error.
pub fn parse_json(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Err(Error::decode_with_context(
            "JSON response is empty",
            ErrorContext::new(),
        ));
    }
    serde_json::from_str(body).map_err(|e| {
        Error::decode_with_context(
            "response body is not valid JSON",
            ErrorContext::new().with_details(e.to_string()),
        )
    })
}

/// Read the body and require a top-level JSON object.
pub async fn json_object(response: &mut RawResponse) -> Result<Map<String, Value>> {
    let body = text(response).await?;
    match parse_json(&body)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::decode_with_context(
            "expected a JSON object",
            ErrorContext::new().with_details(json_type(&other)),
        )),
    }
}

/// Read the body and deserialize it as `T`.
pub async fn json<T: DeserializeOwned>(response: &mut RawResponse) -> Result<T> {
    let body = text(response).await?;
    from_value(parse_json(&body)?, None)
}

/// Deserialize the named top-level field. A missing field is a decode error,
/// never an empty default.
pub fn envelope_field<T: DeserializeOwned>(object: &mut Map<String, Value>, field: &str) -> Result<T> {
    let value = object.remove(field).ok_or_else(|| {
        Error::decode_with_context(
            format!("expected field '{}' is missing", field),
            ErrorContext::new().with_field(field),
        )
    })?;
    from_value(value, Some(field))
}

/// Pull the server-reported error message out of an error body, if any.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "description", "code_description"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(String::from)
}

fn from_value<T: DeserializeOwned>(value: Value, field: Option<&str>) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        let mut ctx = ErrorContext::new().with_details(e.to_string());
        if let Some(field) = field {
            ctx = ctx.with_field(field);
        }
        Error::decode_with_context("payload does not match the expected shape", ctx)
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
    use serde::Deserialize;

    fn respond(body: &str) -> RawResponse {
        RawResponse::from_bytes(200, HeaderMap::new(), body.to_string())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    #[tokio::test]
    async fn text_reads_chunked_body() {
        let chunks: Vec<Result<Bytes>> =
            vec![Ok(Bytes::from_static(b"hel")), Ok(Bytes::from_static(b"lo"))];
        let mut response = RawResponse::new(
            200,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(chunks)),
        );
        assert_eq!(text(&mut response).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn unparsable_content_length_is_transport_error() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("lots"));
        let mut response = RawResponse::from_bytes(200, headers, "{}");
        let err = text(&mut response).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!response.is_consumed());
    }

    #[tokio::test]
    async fn stream_read_failure_is_transport_error() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"{")),
            Err(TransportError::Other("connection reset".into()).into()),
        ];
        let mut response = RawResponse::new(
            200,
            HeaderMap::new(),
            Box::pin(futures::stream::iter(chunks)),
        );
        let err = text(&mut response).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn second_read_fails() {
        let mut response = respond(r#"{"a":1}"#);
        assert!(text(&mut response).await.is_ok());
        assert!(matches!(
            stream(&mut response),
            Err(Error::Transport(TransportError::BodyConsumed))
        ));
        let err = json_object(&mut response).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn empty_body_is_decode_error() {
        let err = json_object(&mut respond("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn malformed_json_is_decode_error() {
        let err = json_object(&mut respond("{\"dialogs\": [")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn bare_array_is_not_an_object() {
        let err = json_object(&mut respond("[]")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn envelope_field_extracts_named_list() {
        let mut obj = json_object(&mut respond(r#"{"dialogs":[{"name":"a"},{"name":"b"}]}"#))
            .await
            .unwrap();
        let items: Vec<Item> = envelope_field(&mut obj, "dialogs").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "b");
    }

    #[tokio::test]
    async fn missing_envelope_field_is_decode_error_not_empty() {
        let mut obj = json_object(&mut respond(r#"{"dialog_list":[]}"#)).await.unwrap();
        let err = envelope_field::<Vec<Item>>(&mut obj, "dialogs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.context().and_then(|c| c.field.as_deref()), Some("dialogs"));
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"code":404,"error":"Session not found"}"#).as_deref(),
            Some("Session not found")
        );
        assert_eq!(
            error_message(r#"{"description":"bad model"}"#).as_deref(),
            Some("bad model")
        );
        assert_eq!(error_message("<html>"), None);
    }
}
