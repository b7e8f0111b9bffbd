//! Error types for the documentation index

use thiserror::Error;

use crate::model::Kind;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    // Load-time faults: the artifact violates the generator contract
    #[error("Malformed index: {0}")]
    MalformedIndex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Query-time outcomes
    #[error("Package '{0}' not found")]
    UnknownPackage(String),

    #[error("No documentation page for '{0}'")]
    NotFound(String),

    #[error("'{name}' is declared as {} - specify a kind", format_kinds(.kinds))]
    AmbiguousKind { name: String, kinds: Vec<Kind> },

    #[error("Invalid qualified name: '{0}'")]
    InvalidName(String),
}

impl IndexError {
    /// Stable error code for callers that surface errors to a browser client
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::MalformedIndex(_) => "MALFORMED_INDEX",
            IndexError::Io(_) => "IO_ERROR",
            IndexError::Json(_) => "MALFORMED_INDEX",
            IndexError::UnknownPackage(_) => "UNKNOWN_PACKAGE",
            IndexError::NotFound(_) => "NOT_FOUND",
            IndexError::AmbiguousKind { .. } => "AMBIGUOUS_KIND",
            IndexError::InvalidName(_) => "INVALID_NAME",
        }
    }

    /// True for the ordinary "nothing there" outcomes of browsing.
    pub fn is_absent(&self) -> bool {
        matches!(self, IndexError::UnknownPackage(_) | IndexError::NotFound(_))
    }
}

fn format_kinds(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(IndexError::MalformedIndex("x".into()).code(), "MALFORMED_INDEX");
        assert_eq!(IndexError::UnknownPackage("a.b".into()).code(), "UNKNOWN_PACKAGE");
        assert_eq!(IndexError::NotFound("a.B".into()).code(), "NOT_FOUND");
        assert_eq!(IndexError::InvalidName("a..B".into()).code(), "INVALID_NAME");
        let ambiguous = IndexError::AmbiguousKind {
            name: "a.B".into(),
            kinds: vec![Kind::Object, Kind::Class],
        };
        assert_eq!(ambiguous.code(), "AMBIGUOUS_KIND");
    }

    #[test]
    fn test_absent_outcomes() {
        assert!(IndexError::UnknownPackage("a".into()).is_absent());
        assert!(IndexError::NotFound("a.B".into()).is_absent());
        assert!(!IndexError::MalformedIndex("bad".into()).is_absent());
        assert!(!IndexError::InvalidName("".into()).is_absent());
    }

    #[test]
    fn test_ambiguous_message_lists_kinds() {
        let err = IndexError::AmbiguousKind {
            name: "org.saddle.Vec".into(),
            kinds: vec![Kind::Object, Kind::Trait],
        };
        assert_eq!(
            err.to_string(),
            "'org.saddle.Vec' is declared as object, trait - specify a kind"
        );
    }
}
