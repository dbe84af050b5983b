//! Diagnostic rendering for request and response payloads.
//!
//! The dispatch layer never serializes messages; the only thing it asks of a
//! payload type is a textual form for request/response logging. Any type
//! implementing [`std::fmt::Debug`] gets [`Message`] for free via the blanket
//! impl, which covers plain structs as well as generated protocol types.

use std::fmt;

/// A request or response payload that can be rendered for diagnostics.
///
/// Implemented automatically for every `Debug + Send + Sync + 'static` type.
pub trait Message: Send + Sync + 'static {
    /// Render the message for log output.
    fn debug_string(&self) -> String;
}

impl<T> Message for T
where
    T: fmt::Debug + Send + Sync + 'static,
{
    fn debug_string(&self) -> String {
        format!("{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Session {
        name: String,
    }

    #[test]
    fn test_debug_string_matches_debug_format() {
        let session = Session {
            name: "sessions/1".to_string(),
        };
        assert_eq!(session.debug_string(), format!("{session:?}"));
        assert!(session.debug_string().contains("sessions/1"));
    }

    #[test]
    fn test_primitives_are_messages() {
        assert_eq!(42i32.debug_string(), "42");
        assert_eq!("hello".to_string().debug_string(), "\"hello\"");
    }
}
