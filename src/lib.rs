#![forbid(unsafe_code)]

//! @acp:module "nodegen Library"
//! @acp:summary "Annotated C++ header scanning and node class generation"
//! @acp:domain codegen
//! @acp:layer api
//! @acp:stability stable
//!
//! # nodegen
//!
//! Scans C++ headers for `NF_FUNCTION`, `NF_CLASS` and `NF_EVENT`
//! annotations and generates a NodeFlow node class for every annotated
//! function.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nodegen::{FunctionNodeGenerator, HeaderParser, TreeSitterParser};
//!
//! fn main() -> anyhow::Result<()> {
//!     let parser = TreeSitterParser::new();
//!     let header = HeaderParser::new(&parser).parse_file("include/Math.h")?;
//!
//!     let generator = FunctionNodeGenerator::default();
//!     for function in &header.functions {
//!         print!("{}", generator.generate(function)?.source());
//!     }
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod batch;
pub mod cache;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod declaration;
pub mod entity;
pub mod error;
pub mod header;
pub mod span;

// Re-exports
pub use annotation::{Annotation, AnnotationKind, AttributeType, AttributeValue};
pub use batch::{BatchReport, FileFailure, GeneratedModule};
pub use cache::GenerationCache;
pub use codegen::{FunctionNodeGenerator, GeneratedNode, NodeBuilder};
pub use config::Config;
pub use declaration::{DeclarationParser, TreeSitterParser, Variable};
pub use entity::{ClassType, EventType, Function};
pub use error::{ErrorKind, NodegenError, Result};
pub use header::{HeaderParser, NamespaceMap, ParsedHeader};
pub use span::Span;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
