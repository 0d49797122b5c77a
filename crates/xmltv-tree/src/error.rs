//! Error types for parsing and processing XMLTV listings.

use thiserror::Error;

/// Result type alias for xmltv-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading an XMLTV document.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {}", p)).unwrap_or_default())]
    XmlSyntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
        /// The source line containing the error.
        fragment: String,
    },

    /// Input that is not valid UTF-8.
    #[error("Invalid UTF-8 at byte {position}: {message}")]
    Encoding {
        message: String,
        position: u64,
        fragment: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, fragment: String },

    /// Empty document (no root element).
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// Multiple root elements.
    #[error("Invalid XML: multiple root elements")]
    MultipleRoots { fragment: String },
}

impl ParseError {
    /// The piece of source text the error refers to, if any.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            ParseError::XmlSyntax { fragment, .. }
            | ParseError::Encoding { fragment, .. }
            | ParseError::UnexpectedEof { fragment, .. }
            | ParseError::MultipleRoots { fragment } => Some(fragment),
            ParseError::EmptyDocument => None,
        }
    }
}

/// A requested channel that cannot be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("The requested xmltvID \"{0}\" is not found in the input")]
    UnknownChannel(String),

    #[error("Cannot add the xmltvID \"{0}\": it already exists in the input")]
    ConflictingIdentifier(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{} invalid channel request(s): {}", .0.len(), join_requests(.0))]
    InvalidRequests(Vec<RequestError>),

    #[error("Failed to parse ordering config: {0}")]
    ConfigParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_requests(errors: &[RequestError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_includes_position() {
        let err = ParseError::XmlSyntax {
            message: "bad".to_string(),
            position: Some(12),
            fragment: "<tv".to_string(),
        };
        assert_eq!(err.to_string(), "XML syntax error: bad at byte 12");
        assert_eq!(err.fragment(), Some("<tv"));
    }

    #[test]
    fn test_invalid_requests_lists_every_problem() {
        let err = Error::InvalidRequests(vec![
            RequestError::UnknownChannel("a".to_string()),
            RequestError::ConflictingIdentifier("b-sd".to_string()),
        ]);
        let message = err.to_string();
        assert!(message.starts_with("2 invalid channel request(s)"));
        assert!(message.contains("\"a\" is not found"));
        assert!(message.contains("\"b-sd\": it already exists"));
    }
}
