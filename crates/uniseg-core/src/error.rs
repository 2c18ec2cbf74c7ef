//! Error types for the universal segment layer.
//!
//! - [`ApiError`]: failures of platform API calls made through a bot handle.
//! - [`ExportError`]: hard failures of outbound serialization, target
//!   resolution and dispatch.
//! - [`RuleError`]: invalid inbound mapping tables.
//!
//! Inbound mapping never produces errors per element; unknown or malformed
//! elements degrade to defaults or are dropped.

use thiserror::Error;

use crate::segment::Segment;

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by platform API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot is not connected.
    #[error("bot is not connected")]
    NotConnected,

    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,

    /// The platform returned an error.
    #[error("API error ({retcode}): {message}")]
    Api {
        /// Platform return code.
        retcode: i64,
        /// Platform error message.
        message: String,
    },

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level failure reported by the host.
    #[error("transport error: {0}")]
    Transport(String),

    /// The event does not carry enough session information to reply.
    #[error("missing session info: {0}")]
    MissingSession(String),

    /// The transport behind this bot cannot issue API calls.
    #[error("API calls are not supported by this connection")]
    NotSupported,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors raised while serializing or dispatching an outbound message.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// The segment cannot be represented on the target platform.
    #[error("failed to serialize {kind} segment: {segment:?}")]
    SerializeFailed {
        /// Kind of the offending segment.
        kind: &'static str,
        /// The offending segment.
        segment: Box<Segment>,
    },

    /// Neither a group nor a user identity could be read from the event.
    #[error("unable to determine the message target")]
    UnresolvableTarget,

    /// The event carries no message identity.
    #[error("unable to determine the message id")]
    UnresolvableMessageId,

    /// A platform identity is not in the form the platform API expects.
    #[error("invalid {field} `{value}`")]
    InvalidIdentity {
        /// Which identity was invalid.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The platform call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ExportError {
    /// Creates a serialize failure for a segment.
    pub fn serialize_failed(segment: &Segment) -> Self {
        Self::SerializeFailed {
            kind: segment.kind(),
            segment: Box::new(segment.clone()),
        }
    }

    /// Creates an invalid identity error.
    pub fn invalid_identity(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            field,
            value: value.into(),
        }
    }
}

// =============================================================================
// Rule Errors
// =============================================================================

/// Errors detected while validating an inbound rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A rule has an empty element tag.
    #[error("build rule with empty tag")]
    EmptyTag,

    /// Two rules claim the same element tag.
    #[error("duplicate build rule for tag `{0}`")]
    DuplicateTag(&'static str),

    /// A field lists no keys to read from.
    #[error("field `{field}` of rule `{tag}` has no keys")]
    EmptyKeys {
        /// Element tag.
        tag: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// A field lists the same key twice.
    #[error("field `{field}` of rule `{tag}` repeats key `{key}`")]
    DuplicateKey {
        /// Element tag.
        tag: &'static str,
        /// Field name.
        field: &'static str,
        /// Repeated key.
        key: &'static str,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_failed_carries_segment() {
        let seg = Segment::Image(Default::default());
        let err = ExportError::serialize_failed(&seg);
        match &err {
            ExportError::SerializeFailed { kind, segment } => {
                assert_eq!(*kind, "image");
                assert_eq!(**segment, seg);
            }
            _ => panic!("Expected SerializeFailed"),
        }
        assert!(err.to_string().starts_with("failed to serialize image segment"));
    }

    #[test]
    fn test_api_error_converts() {
        let err: ExportError = ApiError::Timeout.into();
        assert_eq!(err.to_string(), "API call timed out");
    }
}
