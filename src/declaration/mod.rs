//! @acp:module "Declaration Model"
//! @acp:summary "Signatures, aggregates and the declaration parser seam"
//! @acp:domain codegen
//! @acp:layer types
//!
//! Structural declaration parsing
//!
//! The header pipeline hands each annotated declaration, as a standalone
//! string, to a [`DeclarationParser`] and gets back the structured pieces it
//! needs: a function's name, return type and parameters, or the name and
//! public data members of a single class/struct.

mod cpp;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cpp::TreeSitterParser;

/// A typed, named slot: a function parameter or an aggregate data member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Full declared type, e.g. `const std::string&`
    #[serde(rename = "type")]
    pub ty: String,
    /// Bare type specifier, e.g. `std::string`
    pub raw_type: String,
    /// Empty for unnamed parameters
    pub name: String,
}

impl Variable {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        let ty = ty.into();
        Self {
            raw_type: ty.clone(),
            ty,
            name: name.into(),
        }
    }
}

/// Parsed function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Variable>,
}

/// Parsed class or struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub name: String,
    /// Public data members in declaration order
    pub fields: Vec<Variable>,
}

#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("no {0} found")]
    NotFound(&'static str),

    #[error("expected exactly one {what}, found {count}")]
    Ambiguous { what: &'static str, count: usize },

    #[error("{0}")]
    Grammar(String),
}

/// Turns a single C++ declaration string into structured data
pub trait DeclarationParser: Send + Sync {
    /// Parse exactly one top-level function declaration
    fn parse_function(&self, declaration: &str) -> Result<Signature, DeclarationError>;

    /// Parse exactly one top-level class/struct with a body
    fn parse_aggregate(&self, declaration: &str) -> Result<Aggregate, DeclarationError>;
}
