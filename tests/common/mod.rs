//! Shared test fixtures: a recording transport stub and tracing setup.

#![allow(dead_code)]

use async_trait::async_trait;
use cognitive_sdk::request::{MultipartPart, RequestBody, RequestDescriptor};
use cognitive_sdk::transport::{RawResponse, Transport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// What the spy saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body_kind: &'static str,
    pub content_type: Option<String>,
    pub form: Vec<(String, String)>,
    pub part_names: Vec<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Stub {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

/// Transport that records each request and replays queued responses.
#[derive(Default)]
pub struct SpyTransport {
    stubs: Mutex<VecDeque<Stub>>,
    calls: Mutex<Vec<RecordedRequest>>,
}

impl SpyTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.respond_with_headers(status, &[], body)
    }

    pub fn respond_with_headers(&self, status: u16, headers: &[(&str, &str)], body: &str) -> &Self {
        self.stubs.lock().unwrap().push_back(Stub {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for SpyTransport {
    async fn execute(&self, request: RequestDescriptor) -> cognitive_sdk::Result<RawResponse> {
        let method = request.method().to_string();
        let path = request.path().to_string();
        let query = request.query().to_vec();
        let headers = request.headers().to_vec();
        let content_type = request.body().content_type().map(String::from);

        let mut form = Vec::new();
        let mut part_names = Vec::new();
        let mut body = Vec::new();
        let body_kind = match request.into_body() {
            RequestBody::Empty => "empty",
            RequestBody::Form(fields) => {
                form = fields;
                "form"
            }
            RequestBody::Multipart(parts) => {
                part_names = parts.iter().map(|p| p.name().to_string()).collect();
                for part in parts {
                    if let MultipartPart::Text { name, value } = part {
                        form.push((name, value));
                    }
                }
                "multipart"
            }
            RequestBody::Bytes { data, .. } => {
                body = data.to_vec();
                "bytes"
            }
            RequestBody::Stream { mut file, .. } => {
                file.read_to_end(&mut body).await.map_err(TransportError::Io)?;
                "stream"
            }
        };

        self.calls.lock().unwrap().push(RecordedRequest {
            method,
            path,
            query,
            headers,
            body_kind,
            content_type,
            form,
            part_names,
            body,
        });

        let stub = self
            .stubs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no stubbed response left".into()))?;
        let mut map = HeaderMap::new();
        for (k, v) in &stub.headers {
            map.append(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        Ok(RawResponse::from_bytes(stub.status, map, stub.body))
    }
}

/// Write `contents` to a temp file with the given suffix.
pub fn temp_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}
