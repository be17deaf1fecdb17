//! # cognitive-sdk
//!
//! Typed async client bindings for a family of cloud cognitive APIs
//! (speech transcription, dialog).
//!
//! ## Overview
//!
//! Every binding call runs the same pipeline:
//!
//! 1. [`request::RequestBuilder`] turns typed inputs into an immutable
//!    [`request::RequestDescriptor`] (nothing is sent before `build`).
//! 2. A [`transport::Transport`] executes it against the configured base URL
//!    and credential and returns a [`transport::RawResponse`].
//! 3. [`response`] reads the single-use body as text or JSON and extracts the
//!    named envelope fields into typed results.
//!
//! The speech binding adds the one stateful protocol: recognition sessions
//! with an affinity cookie that must accompany every session-scoped call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cognitive_sdk::speech::{RecognizeOptions, SpeechToText};
//!
//! #[tokio::main]
//! async fn main() -> cognitive_sdk::Result<()> {
//!     let config = SpeechToText::config()
//!         .basic_auth("username", "password")
//!         .build()?;
//!     let stt = SpeechToText::new(&config)?;
//!
//!     let session = stt.create_session(None).await?;
//!     let options = RecognizeOptions::new().session(&session).timestamps(true);
//!     let results = stt.recognize("sample.wav", "audio/wav", &options).await?;
//!     println!("{}", results.final_transcript());
//!     stt.delete_session(&session).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! [`Error::kind`] separates caller-input, transport, decode and
//! protocol-state failures. Nothing is retried internally.
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Base URL, credential and HTTP settings |
//! | [`request`] | Request builder and descriptor |
//! | [`transport`] | Transport contract and the reqwest implementation |
//! | [`response`] | Body reading and JSON envelope decoding |
//! | [`client`] | Generic call pipeline shared by bindings |
//! | `speech` | Speech-to-Text sessions and recognition |
//! | `dialog` | Dialog conversations and profiles |

pub mod client;
pub mod config;
pub mod request;
pub mod response;
pub mod transport;
pub mod utils;

#[cfg(feature = "speech")]
pub mod speech;

#[cfg(feature = "dialog")]
pub mod dialog;

pub use client::ServiceClient;
pub use config::{Credential, ServiceConfig};

#[cfg(feature = "speech")]
pub use speech::SpeechToText;

#[cfg(feature = "dialog")]
pub use dialog::DialogService;

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream of fallible items.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
