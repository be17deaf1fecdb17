//! Generic call pipeline shared by every service binding:
//! request builder, then transport, then response decoder.

use crate::config::ServiceConfig;
use crate::request::RequestDescriptor;
use crate::response;
use crate::transport::{HttpTransport, RawResponse, Transport};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// A transport plus the decode discipline, injected into each binding.
#[derive(Clone)]
pub struct ServiceClient {
    transport: Arc<dyn Transport>,
}

impl ServiceClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a client over [`HttpTransport`] from a resolved configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Submit a request without inspecting the status code.
    pub async fn send(&self, operation: &str, request: RequestDescriptor) -> Result<RawResponse> {
        tracing::debug!(operation, method = %request.method(), path = request.path(), "executing");
        self.transport.execute(request).await
    }

    /// Submit a request and require a 2xx status.
    pub async fn send_ok(&self, operation: &str, request: RequestDescriptor) -> Result<RawResponse> {
        let mut response = self.send(operation, request).await?;
        if response.is_success() {
            return Ok(response);
        }
        Err(unexpected_status(operation, &mut response).await)
    }

    /// Decode the whole body as `T`.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestDescriptor,
    ) -> Result<T> {
        let mut response = self.send_ok(operation, request).await?;
        response::json(&mut response).await
    }

    /// Decode the list nested under `envelope` in the response object.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestDescriptor,
        envelope: &str,
    ) -> Result<Vec<T>> {
        let mut response = self.send_ok(operation, request).await?;
        let mut object = response::json_object(&mut response).await?;
        response::envelope_field(&mut object, envelope)
    }

    /// Require success and discard the body.
    pub async fn execute_empty(&self, operation: &str, request: RequestDescriptor) -> Result<()> {
        self.send_ok(operation, request).await.map(drop)
    }
}

/// Turn a response with a status the operation does not accept into a
/// protocol-state error, carrying the server's message when it sent one.
pub(crate) async fn unexpected_status(operation: &str, response: &mut RawResponse) -> Error {
    let status = response.status();
    let message = match response::text(response).await {
        Ok(body) => response::error_message(&body),
        Err(e) => {
            warn!(operation, status, error = %e, "could not read error body");
            None
        }
    }
    .unwrap_or_else(|| format!("unexpected HTTP status {}", status));
    warn!(operation, status, %message, "unexpected response status");
    Error::ProtocolState {
        operation: operation.to_string(),
        status,
        message,
    }
}
