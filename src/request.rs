//! Request builder: typed inputs in, immutable [`RequestDescriptor`] out.
//!
//! Nothing is sent until the descriptor is handed to a [`crate::transport::Transport`].

use crate::transport::TransportError;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use url::Url;

/// Characters that would end or split a path segment once the URL is parsed.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode an identifier so it stays a single path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// One part of a multipart upload.
#[derive(Debug)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        file: tokio::fs::File,
    },
}

impl MultipartPart {
    pub fn name(&self) -> &str {
        match self {
            MultipartPart::Text { name, .. } | MultipartPart::File { name, .. } => name,
        }
    }
}

/// Request payload. At most one kind per request.
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartPart>),
    Bytes {
        content_type: String,
        data: Bytes,
    },
    /// Streamed from an open file with no declared length (chunked transfer).
    Stream {
        content_type: String,
        file: tokio::fs::File,
    },
}

impl RequestBody {
    pub fn content_type(&self) -> Option<&str> {
        match self {
            RequestBody::Bytes { content_type, .. } | RequestBody::Stream { content_type, .. } => {
                Some(content_type)
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// A fully built request: method, server-relative path, ordered query,
/// headers and body.
#[derive(Debug)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl RequestDescriptor {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn into_body(self) -> RequestBody {
        self.body
    }

    /// Join the path onto `base_url` and append the query. Values are
    /// percent-encoded by the URL serializer, never decoded.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let joined = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&joined).map_err(|e| TransportError::InvalidUrl {
            url: joined.clone(),
            reason: e.to_string(),
        })?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

/// Fluent builder for [`RequestDescriptor`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    form: Vec<(String, String)>,
    parts: Vec<MultipartPart>,
    raw: Option<RequestBody>,
    raw_kinds: Vec<&'static str>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            form: Vec::new(),
            parts: Vec::new(),
            raw: None,
            raw_kinds: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a query parameter. A repeated key replaces the earlier value in place.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.query, key.into(), value.to_string());
        self
    }

    /// Set a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn form(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        upsert(&mut self.form, key.into(), value.to_string());
        self
    }

    pub fn form_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.form(key, v),
            None => self,
        }
    }

    pub fn text_part(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file_part(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        file: tokio::fs::File,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            file,
        });
        self
    }

    /// Buffered body with an explicit content type.
    pub fn body(mut self, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.raw_kinds.push("raw");
        self.raw = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn json(self, value: &serde_json::Value) -> Self {
        self.body("application/json", value.to_string())
    }

    /// Stream an open file as the body without computing its length.
    pub fn stream_body(mut self, content_type: impl Into<String>, file: tokio::fs::File) -> Self {
        self.raw_kinds.push("stream");
        self.raw = Some(RequestBody::Stream {
            content_type: content_type.into(),
            file,
        });
        self
    }

    pub fn build(self) -> Result<RequestDescriptor> {
        if !self.path.starts_with('/') {
            return Err(Error::invalid_input_with_context(
                "request path must be server-relative",
                ErrorContext::new()
                    .with_operation("request.build")
                    .with_details(self.path),
            ));
        }

        let present: Vec<&str> = [
            (!self.form.is_empty()).then_some("form"),
            (!self.parts.is_empty()).then_some("multipart"),
        ]
        .into_iter()
        .flatten()
        .chain(self.raw_kinds.iter().copied())
        .collect();
        if present.len() > 1 {
            return Err(Error::invalid_input_with_context(
                format!("conflicting request bodies: {}", present.join(" + ")),
                ErrorContext::new()
                    .with_operation("request.build")
                    .with_field(self.path),
            ));
        }

        let body = if !self.form.is_empty() {
            RequestBody::Form(self.form)
        } else if !self.parts.is_empty() {
            RequestBody::Multipart(self.parts)
        } else {
            self.raw.unwrap_or(RequestBody::Empty)
        };

        Ok(RequestDescriptor {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body,
        })
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}
