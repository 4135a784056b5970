//! Validating-parse errors for inbound payloads.
//!
//! Both dispatchers parse each inbound item through a typed deserialization
//! step. A malformed item produces one of these errors, which the dispatcher
//! reports for that item and moves on; a bad payload never aborts the rest of
//! its batch.

use thiserror::Error;

/// Error produced when an inbound payload fails validating deserialization.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The queue record carried no body at all.
    #[error("message body is missing")]
    MissingBody,

    /// The body was not valid JSON, or did not match the expected shape.
    #[error("invalid JSON payload: {message}")]
    InvalidJson {
        /// Deserializer error message
        message: String,
    },

    /// A notification arrived without the detail section its event type
    /// requires (e.g. `eventType: Bounce` with no `bounce` object).
    #[error("notification is missing its `{section}` section")]
    MissingSection {
        /// Name of the absent section
        section: &'static str,
    },
}

impl ParseError {
    /// Creates an invalid-JSON error from a deserializer failure.
    pub fn invalid_json(source: &serde_json::Error) -> Self {
        Self::InvalidJson { message: source.to_string() }
    }

    /// Creates a missing-section error for the named detail section.
    pub fn missing_section(section: &'static str) -> Self {
        Self::MissingSection { section }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_section() {
        let error = ParseError::missing_section("bounce");
        assert_eq!(error.to_string(), "notification is missing its `bounce` section");
    }

    #[test]
    fn invalid_json_carries_deserializer_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = ParseError::invalid_json(&source);
        assert!(error.to_string().starts_with("invalid JSON payload:"));
    }
}
