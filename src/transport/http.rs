use super::{RawResponse, Transport, TransportError};
use crate::config::{Credential, ServiceConfig};
use crate::request::{MultipartPart, RequestBody, RequestDescriptor};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Proxy};
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

/// reqwest-backed [`Transport`] bound to one base URL and credential.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration(format!("invalid proxy URL {}: {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credential: config.credential.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn file_body(file: tokio::fs::File) -> Body {
        Body::wrap_stream(ReaderStream::new(file))
    }

    fn multipart(parts: Vec<MultipartPart>) -> Form {
        parts.into_iter().fold(Form::new(), |form, part| match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File {
                name,
                file_name,
                file,
            } => form.part(name, Part::stream(Self::file_body(file)).file_name(file_name)),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse> {
        let url = request.url(&self.base_url)?;
        let request_id = Uuid::new_v4().to_string();
        debug!(
            method = %request.method(),
            path = request.path(),
            request_id = %request_id,
            "sending request"
        );

        let mut req = self
            .client
            .request(request.method().clone(), url)
            .header("accept", "application/json")
            .header("x-request-id", &request_id);

        req = match &self.credential {
            Credential::None => req,
            Credential::Basic { username, password } => req.basic_auth(username, Some(password)),
            Credential::Bearer(token) => req.bearer_auth(token),
        };

        for (name, value) in request.headers() {
            req = req.header(name.as_str(), value.as_str());
        }

        req = match request.into_body() {
            RequestBody::Empty => req,
            RequestBody::Form(fields) => req.form(&fields),
            RequestBody::Multipart(parts) => req.multipart(Self::multipart(parts)),
            RequestBody::Bytes { content_type, data } => {
                req.header("content-type", content_type).body(data)
            }
            RequestBody::Stream { content_type, file } => req
                .header("content-type", content_type)
                .body(Self::file_body(file)),
        };

        let response = req.send().await.map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        debug!(status, request_id = %request_id, "response headers received");

        let body = response
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::Http(e)));
        Ok(RawResponse::new(status, headers, Box::pin(body)))
    }
}
