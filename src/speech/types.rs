//! Speech-to-Text types.

use crate::request::encode_segment;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognition session pinned to one backend engine.
///
/// The affinity token must ride along on every call scoped to this session,
/// otherwise the request may land on a different engine instance. Sessions
/// expire server-side after 15 minutes of inactivity.
///
/// The client does no locking: sharing a session across tasks is allowed only
/// if the caller guarantees at most one in-flight recognition per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSession {
    pub session_id: String,
    /// `name=value` cookie captured from the creation response, if any.
    #[serde(skip)]
    pub affinity_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_session_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognize: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observe_result: Option<String>,
}

impl SpeechSession {
    /// Refer to an existing session by id, without an affinity token.
    pub fn from_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            affinity_token: None,
            new_session_uri: None,
            recognize: None,
            observe_result: None,
        }
    }

    pub fn with_affinity_token(mut self, token: impl Into<String>) -> Self {
        self.affinity_token = Some(token.into());
        self
    }
}

/// Session state as reported by the service. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionState {
    Initialized,
    Recognizing,
    Other(String),
}

impl SessionState {
    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Initialized => "initialized",
            SessionState::Recognizing => "recognizing",
            SessionState::Other(s) => s,
        }
    }

    pub fn accepts_recognition(&self) -> bool {
        matches!(self, SessionState::Initialized)
    }
}

impl From<String> for SessionState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "initialized" => SessionState::Initialized,
            "recognizing" => SessionState::Recognizing,
            _ => SessionState::Other(s),
        }
    }
}

impl From<SessionState> for String {
    fn from(state: SessionState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognize: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observe_result: Option<String>,
}

/// The closed set of options accepted by a recognition call.
///
/// Deserializing from a loose parameter object ignores unknown keys, so newer
/// callers can pass options this version does not know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_confidence: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_alternatives: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    /// Seconds of silence before the service closes the stream; `-1` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactivity_timeout: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Bind the call to an existing session instead of a one-shot recognition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip)]
    pub affinity_token: Option<String>,
}

impl RecognizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a loose parameter object. Unknown keys are dropped;
    /// a known key with the wrong type is a caller-input error.
    pub fn from_params(params: serde_json::Value) -> Result<Self> {
        serde_json::from_value(params).map_err(|e| {
            Error::invalid_input_with_context(
                "invalid recognition options",
                ErrorContext::new()
                    .with_operation("speech.recognize")
                    .with_details(e.to_string()),
            )
        })
    }

    /// Scope the call to `session`, carrying its affinity token.
    pub fn session(mut self, session: &SpeechSession) -> Self {
        self.session_id = Some(session.session_id.clone());
        self.affinity_token = session.affinity_token.clone();
        self
    }

    pub fn word_confidence(mut self, enabled: bool) -> Self {
        self.word_confidence = Some(enabled);
        self
    }

    pub fn continuous(mut self, enabled: bool) -> Self {
        self.continuous = Some(enabled);
        self
    }

    pub fn max_alternatives(mut self, n: u32) -> Self {
        self.max_alternatives = Some(n);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    pub fn inactivity_timeout(mut self, secs: i32) -> Self {
        self.inactivity_timeout = Some(secs);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Query parameters for every option that is set, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.word_confidence {
            pairs.push(("word_confidence", v.to_string()));
        }
        if let Some(v) = self.continuous {
            pairs.push(("continuous", v.to_string()));
        }
        if let Some(v) = self.max_alternatives {
            pairs.push(("max_alternatives", v.to_string()));
        }
        if let Some(v) = self.timestamps {
            pairs.push(("timestamps", v.to_string()));
        }
        if let Some(v) = self.inactivity_timeout {
            pairs.push(("inactivity_timeout", v.to_string()));
        }
        if let Some(v) = &self.model {
            pairs.push(("model", v.clone()));
        }
        pairs
    }
}

/// Target path of a recognition call: session-scoped when an id is given.
pub fn recognize_path(session_id: Option<&str>) -> String {
    match session_id {
        Some(id) => format!("/v1/sessions/{}/recognize", encode_segment(id)),
        None => "/v1/recognize".to_string(),
    }
}

/// Transcription output of one recognition call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechResults {
    #[serde(default)]
    pub results: Vec<Transcript>,
    /// Position of the first entry of `results` in the overall stream.
    #[serde(default)]
    pub result_index: i32,
}

impl SpeechResults {
    /// Best alternative of each final transcript, joined in order.
    pub fn final_transcript(&self) -> String {
        self.results
            .iter()
            .filter(|t| t.is_final)
            .filter_map(|t| t.alternatives.first())
            .map(|a| a.transcript.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(default)]
    pub alternatives: Vec<SpeechAlternative>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechAlternative {
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<SpeechTimestamp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_confidence: Option<Vec<SpeechWordConfidence>>,
}

/// `[word, start_seconds, end_seconds]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechTimestamp(pub String, pub f64, pub f64);

/// `[word, confidence]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechWordConfidence(pub String, pub f64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_state_is_preserved() {
        let status: SessionStatus =
            serde_json::from_value(json!({"state": "closing", "model": "en-US_BroadbandModel"}))
                .unwrap();
        assert_eq!(status.state, SessionState::Other("closing".into()));
        assert!(!status.state.accepts_recognition());
        assert_eq!(serde_json::to_value(&status.state).unwrap(), json!("closing"));
    }

    #[test]
    fn known_states_parse() {
        assert_eq!(SessionState::from("initialized".to_string()), SessionState::Initialized);
        assert_eq!(SessionState::from("recognizing".to_string()), SessionState::Recognizing);
        assert!(SessionState::Initialized.accepts_recognition());
    }

    #[test]
    fn path_depends_only_on_session_presence() {
        assert_eq!(recognize_path(None), "/v1/recognize");
        assert_eq!(recognize_path(Some("abc")), "/v1/sessions/abc/recognize");
    }

    #[test]
    fn loose_params_ignore_unknown_keys() {
        let opts = RecognizeOptions::from_params(json!({
            "continuous": true,
            "max_alternatives": 3,
            "session_id": "s1",
            "smart_formatting": true
        }))
        .unwrap();
        assert_eq!(opts.continuous, Some(true));
        assert_eq!(opts.max_alternatives, Some(3));
        assert_eq!(opts.session_id.as_deref(), Some("s1"));
        assert_eq!(
            opts.query_pairs(),
            vec![("continuous", "true".to_string()), ("max_alternatives", "3".to_string())]
        );
    }

    #[test]
    fn mistyped_known_key_is_invalid_input() {
        let err = RecognizeOptions::from_params(json!({"max_alternatives": "many"})).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn session_binding_copies_affinity() {
        let session = SpeechSession::from_id("s9").with_affinity_token("SESSIONID=xyz");
        let opts = RecognizeOptions::new().session(&session).timestamps(true);
        assert_eq!(opts.session_id.as_deref(), Some("s9"));
        assert_eq!(opts.affinity_token.as_deref(), Some("SESSIONID=xyz"));
        assert_eq!(opts.query_pairs(), vec![("timestamps", "true".to_string())]);
    }

    #[test]
    fn results_decode_with_word_details() {
        let results: SpeechResults = serde_json::from_value(json!({
            "result_index": 2,
            "results": [{
                "final": true,
                "alternatives": [{
                    "transcript": "hello world ",
                    "confidence": 0.92,
                    "timestamps": [["hello", 0.1, 0.5], ["world", 0.6, 1.0]],
                    "word_confidence": [["hello", 0.95], ["world", 0.89]]
                }, {
                    "transcript": "yellow world "
                }]
            }, {
                "final": false,
                "alternatives": [{"transcript": "and"}]
            }]
        }))
        .unwrap();
        assert_eq!(results.result_index, 2);
        assert_eq!(results.results[0].alternatives.len(), 2);
        let top = &results.results[0].alternatives[0];
        assert_eq!(top.confidence, Some(0.92));
        assert_eq!(top.timestamps.as_ref().unwrap()[1].0, "world");
        assert_eq!(results.final_transcript(), "hello world");
    }
}
