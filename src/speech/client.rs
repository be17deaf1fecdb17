//! Speech-to-Text client: models, sessions and recognition.

use super::types::{
    recognize_path, RecognizeOptions, SessionStatus, SpeechModel, SpeechResults, SpeechSession,
};
use crate::client::{unexpected_status, ServiceClient};
use crate::config::{ServiceConfig, ServiceConfigBuilder};
use crate::request::{encode_segment, RequestBuilder};
use crate::response;
use crate::transport::{RawResponse, Transport};
use crate::{Error, ErrorContext, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVICE_ID: &str = "speech_to_text";
pub const DEFAULT_URL: &str = "https://stream.watsonplatform.net/speech-to-text/api";

const AFFINITY_RESPONSE_HEADER: &str = "set-cookie";
const AFFINITY_REQUEST_HEADER: &str = "cookie";

/// Client for the speech recognition service.
#[derive(Clone)]
pub struct SpeechToText {
    client: ServiceClient,
}

impl SpeechToText {
    /// Configuration builder preset with this service's id and default URL.
    pub fn config() -> ServiceConfigBuilder {
        ServiceConfig::builder(SERVICE_ID).default_url(DEFAULT_URL)
    }

    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            client: ServiceClient::from_config(config)?,
        })
    }

    /// Resolve configuration from the environment and keyring.
    pub fn from_env() -> Result<Self> {
        Self::new(&Self::config().build()?)
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            client: ServiceClient::new(transport),
        }
    }

    pub async fn get_models(&self) -> Result<Vec<SpeechModel>> {
        let request = RequestBuilder::get("/v1/models").build()?;
        self.client
            .fetch_list("speech.get_models", request, "models")
            .await
    }

    pub async fn get_model(&self, name: &str) -> Result<SpeechModel> {
        Error::require_id("speech.get_model", "name", name)?;
        let request =
            RequestBuilder::get(format!("/v1/models/{}", encode_segment(name))).build()?;
        self.client.execute_json("speech.get_model", request).await
    }

    /// Open a session pinned to one engine. `model` is sent only when non-empty.
    ///
    /// The session id and the affinity token are extracted independently:
    /// a response without a `Set-Cookie` header still yields a session, with
    /// `affinity_token` left empty.
    pub async fn create_session(&self, model: Option<&str>) -> Result<SpeechSession> {
        const OP: &str = "speech.create_session";
        let model = model.filter(|m| !m.is_empty());
        let request = RequestBuilder::post("/v1/sessions")
            .query_opt("model", model)
            .build()?;

        let mut response = self.client.send(OP, request).await?;
        let status = response.status();
        if status != 200 && status != 201 {
            return Err(unexpected_status(OP, &mut response).await);
        }

        let affinity_token = affinity_token(&response);
        let body = response::text(&mut response).await?;
        let object = match response::parse_json(&body)? {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(Error::decode_with_context(
                    "expected a JSON object",
                    ErrorContext::new().with_operation(OP),
                ))
            }
        };
        if !object.contains_key("session_id") {
            return Err(Error::ProtocolState {
                operation: OP.to_string(),
                status,
                message: response::error_message(&body)
                    .unwrap_or_else(|| "response carries no session_id".to_string()),
            });
        }
        let mut session: SpeechSession = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| {
                Error::decode_with_context(
                    "session payload does not match the expected shape",
                    ErrorContext::new()
                        .with_operation(OP)
                        .with_details(e.to_string()),
                )
            })?;
        session.affinity_token = affinity_token;

        if session.affinity_token.is_none() {
            warn!(session_id = %session.session_id, "session created without affinity cookie");
        }
        info!(session_id = %session.session_id, "speech session created");
        Ok(session)
    }

    /// Current state of a session. Check for `initialized` before reusing a
    /// session for another recognition.
    pub async fn get_status(&self, session: &SpeechSession) -> Result<SessionStatus> {
        const OP: &str = "speech.get_status";
        Error::require_id(OP, "sessionId", &session.session_id)?;
        let request = RequestBuilder::get(format!(
            "/v1/sessions/{}/recognize",
            encode_segment(&session.session_id)
        ));
        let request = with_affinity(request, session.affinity_token.as_deref()).build()?;

        let mut response = self.client.send_ok(OP, request).await?;
        let mut object = response::json_object(&mut response).await?;
        response::envelope_field(&mut object, "session")
    }

    /// Transcribe an audio file, streaming it as the request body.
    ///
    /// Input is validated before any network activity: the file must be a
    /// readable regular file and `content_type` must be non-empty. When the
    /// options bind a session, its status is polled first and the call is
    /// rejected unless the session is `initialized`. No retries.
    pub async fn recognize(
        &self,
        audio: impl AsRef<Path>,
        content_type: &str,
        options: &RecognizeOptions,
    ) -> Result<SpeechResults> {
        const OP: &str = "speech.recognize";
        let audio = audio.as_ref();

        let is_file = tokio::fs::metadata(audio)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(invalid_audio(audio, "audio is not a valid audio file"));
        }
        if content_type.trim().is_empty() {
            return Err(Error::invalid_input_with_context(
                "contentType was not specified",
                ErrorContext::new().with_operation(OP).with_field("content_type"),
            ));
        }
        if let Some(id) = &options.session_id {
            Error::require_id(OP, "sessionId", id)?;
        }
        let file = tokio::fs::File::open(audio)
            .await
            .map_err(|e| invalid_audio(audio, &format!("audio file is not readable: {}", e)))?;

        if let Some(id) = &options.session_id {
            let session = SpeechSession {
                affinity_token: options.affinity_token.clone(),
                ..SpeechSession::from_id(id.clone())
            };
            let status = self.get_status(&session).await?;
            if !status.state.accepts_recognition() {
                return Err(Error::SessionBusy {
                    session_id: id.clone(),
                    state: status.state.to_string(),
                });
            }
        }

        let mut request = RequestBuilder::post(recognize_path(options.session_id.as_deref()));
        for (key, value) in options.query_pairs() {
            request = request.query(key, value);
        }
        let request = with_affinity(request, options.affinity_token.as_deref())
            .stream_body(content_type, file)
            .build()?;

        self.client.execute_json(OP, request).await
    }

    /// Close a session. Succeeds only on HTTP 204; any other status, 404
    /// included, is reported as a protocol-state error.
    pub async fn delete_session(&self, session: &SpeechSession) -> Result<()> {
        const OP: &str = "speech.delete_session";
        Error::require_id(OP, "sessionId", &session.session_id)?;
        let request =
            RequestBuilder::delete(format!("/v1/sessions/{}", encode_segment(&session.session_id)));
        let request = with_affinity(request, session.affinity_token.as_deref()).build()?;

        let mut response = self.client.send(OP, request).await?;
        if response.status() != 204 {
            return Err(unexpected_status(OP, &mut response).await);
        }
        info!(session_id = %session.session_id, "speech session deleted");
        Ok(())
    }
}

fn with_affinity(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AFFINITY_REQUEST_HEADER, token),
        None => request,
    }
}

/// `name=value` part of the first `Set-Cookie` header.
fn affinity_token(response: &RawResponse) -> Option<String> {
    let raw = response.header(AFFINITY_RESPONSE_HEADER)?;
    let pair = raw.split(';').next()?.trim();
    (!pair.is_empty()).then(|| pair.to_string())
}

fn invalid_audio(audio: &Path, message: &str) -> Error {
    Error::invalid_input_with_context(
        message,
        ErrorContext::new()
            .with_operation("speech.recognize")
            .with_field("audio")
            .with_details(audio.display().to_string()),
    )
}
