//! Error types for the annotation engine
//!
//! Three kinds of failure exist at the session boundary:
//!
//! - [`Rejection`]: the user's selection or request was refused locally, nothing was sent
//! - [`RemoteError`]: the annotation store failed or refused the request
//! - a dangling label reference, which is not an error at all and renders as "Unknown"

use thiserror::Error;

use crate::annotations::{AnnotationId, LabelId};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Error returned by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SessionError {
    /// Whether this error came back from the annotation store
    pub fn is_remote(&self) -> bool {
        matches!(self, SessionError::Remote(_))
    }
}

/// Local validation refusals. No request is sent for any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Selection is empty")]
    Collapsed,

    #[error("Selection lies outside the document")]
    OutsideContainer,

    #[error("Selection refers to text that is no longer rendered")]
    StaleReference,

    #[error("Cannot select already-annotated text")]
    TouchesAnnotation,

    #[error("Select at least {min} characters to create an annotation")]
    TooShort { min: usize, len: usize },

    #[error("Selection is too long (maximum {max} characters)")]
    TooLong { max: usize, len: usize },

    #[error("This request is already in progress")]
    AlreadyPending,

    #[error("Span {start}..{end} is not inside the document")]
    InvalidSpan { start: usize, end: usize },

    #[error("Selected text does not match the document")]
    TextMismatch,

    #[error("Invalid label: {0}")]
    UnknownLabel(LabelId),
}

impl Rejection {
    /// Silent rejections are dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Rejection::Collapsed
                | Rejection::OutsideContainer
                | Rejection::StaleReference
                | Rejection::AlreadyPending
        )
    }
}

/// Failures talking to the annotation store
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("Invalid response from store: {0}")]
    Decode(String),

    #[error("Annotation not found: {0}")]
    UnknownAnnotation(AnnotationId),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

/// Invalid configuration values
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_rejections() {
        assert!(Rejection::Collapsed.is_silent());
        assert!(Rejection::OutsideContainer.is_silent());
        assert!(Rejection::StaleReference.is_silent());
        assert!(!Rejection::TouchesAnnotation.is_silent());
        assert!(Rejection::AlreadyPending.is_silent());
        assert!(!Rejection::TooShort { min: 3, len: 2 }.is_silent());
        assert!(!Rejection::TextMismatch.is_silent());
    }

    #[test]
    fn test_length_messages_are_distinct() {
        let short = Rejection::TooShort { min: 3, len: 1 }.to_string();
        let long = Rejection::TooLong { max: 1000, len: 1001 }.to_string();

        assert!(short.contains("at least 3"));
        assert!(long.contains("maximum 1000"));
        assert_ne!(short, long);
    }

    #[test]
    fn test_remote_message_passthrough() {
        let err = SessionError::from(RemoteError::Rejected {
            message: "Invalid label".to_string(),
        });
        assert!(err.is_remote());
        assert_eq!(err.to_string(), "Invalid label");
    }
}
