//! Speech-to-Text binding: session lifecycle, status polling and streamed
//! recognition uploads.
//!
//! ```text
//! create_session ──> initialized ──recognize──> recognizing ──> initialized
//!                         │                                         │
//!                         └──────────────── delete_session <────────┘
//! ```

mod client;
mod types;

pub use client::{SpeechToText, DEFAULT_URL, SERVICE_ID};
pub use types::{
    recognize_path, RecognizeOptions, SessionState, SessionStatus, SpeechAlternative, SpeechModel,
    SpeechResults, SpeechSession, SpeechTimestamp, SpeechWordConfidence, Transcript,
};
