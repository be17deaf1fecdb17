use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for diagnosing a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Operation that failed (e.g., "speech.create_session", "dialog.get_profile")
    pub operation: Option<String>,
    /// Identifier or input field involved (e.g., a session id, "content_type")
    pub field: Option<String>,
    /// Additional detail about the failure (e.g., the underlying cause)
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            operation: None,
            field: None,
            details: None,
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The failure category of an [`Error`], for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected before any network call; retrying with the same input will fail again.
    InvalidInput,
    /// Connection, stream or header failure between client and service.
    Transport,
    /// The call succeeded on the wire but the payload did not match the expected shape.
    Decode,
    /// The service answered with a status or state the operation does not accept.
    ProtocolState,
    /// The client could not be constructed from the supplied configuration.
    Configuration,
}

/// Unified error type for every service binding.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {message}{}", format_context(.context))]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {message}{}", format_context(.context))]
    Decode {
        message: String,
        context: ErrorContext,
    },

    #[error("Protocol violation in {operation} (HTTP {status}): {message}")]
    ProtocolState {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Session {session_id} cannot accept a recognition request (state: {state})")]
    SessionBusy { session_id: String, state: String },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref operation) = ctx.operation {
        parts.push(format!("operation: {}", operation));
    }
    if let Some(ref field) = ctx.field {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_input_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    /// Reject an empty or whitespace-only identifier before it reaches a path.
    pub(crate) fn require_id(operation: &str, field: &str, value: &str) -> crate::Result<()> {
        if value.trim().is_empty() {
            return Err(Error::invalid_input_with_context(
                format!("{} can not be null or empty", field),
                ErrorContext::new()
                    .with_operation(operation)
                    .with_field(field),
            ));
        }
        Ok(())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::ProtocolState { .. } | Error::SessionBusy { .. } => ErrorKind::ProtocolState,
        }
    }

    /// HTTP status for protocol-state errors raised from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ProtocolState { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the service reported the target as missing (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidInput { context, .. }
            | Error::Configuration { context, .. }
            | Error::Decode { context, .. } => Some(context),
            _ => None,
        }
    }
}
