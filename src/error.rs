//! @acp:module "Errors"
//! @acp:summary "Library error type and failure classification"
//! @acp:domain codegen
//! @acp:layer types
//!
//! Error types
//!
//! Every failure the pipeline can produce funnels into [`NodegenError`].
//! Callers that process many headers use [`NodegenError::kind`] to decide
//! whether a failure abandons the file or only the current function.

use serde::Serialize;
use thiserror::Error;

use crate::declaration::DeclarationError;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, NodegenError>;

#[derive(Debug, Error)]
pub enum NodegenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Brace/literal/parenthesis imbalance; the file cannot be processed.
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Unsupported keyword '{keyword}' in declaration '{declaration}'")]
    UnsupportedDeclaration { keyword: String, declaration: String },

    #[error("Could not parse declaration '{declaration}': {source}")]
    Declaration {
        declaration: String,
        #[source]
        source: DeclarationError,
    },

    #[error("Unknown attribute '{key}' in '{annotation}'. Supported attributes are: {supported}")]
    UnknownAttribute {
        key: String,
        annotation: String,
        supported: String,
    },

    #[error("Unable to resolve attribute '{item}' in '{annotation}'")]
    MalformedAttribute { item: String, annotation: String },

    #[error("Unable to resolve '{value}' as boolean with '{key}'='{value}' in '{annotation}'")]
    InvalidBoolean {
        key: String,
        value: String,
        annotation: String,
    },

    #[error("Code generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used for failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Structural,
    Attribute,
    Generation,
    Io,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Structural => "structural",
            ErrorKind::Attribute => "attribute",
            ErrorKind::Generation => "generation",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        };
        f.write_str(s)
    }
}

impl NodegenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodegenError::Io(_) => ErrorKind::Io,
            NodegenError::Json(_) | NodegenError::Pattern(_) | NodegenError::Config(_) => {
                ErrorKind::Config
            }
            NodegenError::Structural(_)
            | NodegenError::UnsupportedDeclaration { .. }
            | NodegenError::Declaration { .. } => ErrorKind::Structural,
            NodegenError::UnknownAttribute { .. }
            | NodegenError::MalformedAttribute { .. }
            | NodegenError::InvalidBoolean { .. } => ErrorKind::Attribute,
            NodegenError::Generation(_) => ErrorKind::Generation,
        }
    }

    /// Whether the error only affects a single declaration's code generation
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            NodegenError::Structural("x".into()).kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            NodegenError::InvalidBoolean {
                key: "k".into(),
                value: "maybe".into(),
                annotation: "NF_FUNCTION(k=maybe)".into(),
            }
            .kind(),
            ErrorKind::Attribute
        );
        assert!(NodegenError::Generation("empty".into()).is_recoverable());
        assert!(!NodegenError::Structural("x".into()).is_recoverable());
    }
}
