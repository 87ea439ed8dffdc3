//! @acp:module "Header Parser"
//! @acp:summary "Per-file header parsing pipeline"
//! @acp:domain codegen
//! @acp:layer service
//!
//! Header parsing session
//!
//! Runs the per-file pipeline: strip comments, resolve namespaces, extract
//! annotated functions, classes and events, and build entities. Namespace
//! resolution finishes before any declaration is associated with a
//! namespace, and functions are extracted before classes so methods can be
//! back-filled.

pub mod comments;
pub mod extract;
pub mod namespace;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::annotation::AnnotationKind;
use crate::declaration::DeclarationParser;
use crate::entity::{ClassType, EventType, Function};
use crate::error::Result;

pub use comments::strip_comments;
pub use extract::RawDeclaration;
pub use namespace::{Namespace, NamespaceMap};

/// Everything extracted from one header
#[derive(Debug, Clone, Serialize)]
pub struct ParsedHeader {
    /// Source path, if read from disk
    pub path: Option<PathBuf>,
    /// Last modification time of the source file
    pub modified: Option<DateTime<Utc>>,
    /// Header text as read
    #[serde(skip)]
    pub source: String,
    /// Comment-stripped buffer all spans refer to
    #[serde(skip)]
    pub content: String,
    pub namespaces: NamespaceMap,
    pub functions: Vec<Function>,
    pub classes: Vec<ClassType>,
    pub events: Vec<EventType>,
}

impl ParsedHeader {
    /// Sorted, de-duplicated bare parameter types across all functions
    pub fn unique_types(&self) -> Vec<String> {
        self.functions
            .iter()
            .flat_map(|f| f.parameters())
            .filter(|p| !p.raw_type.is_empty())
            .map(|p| p.raw_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Cache key for this header: the file stem, or `module` for in-memory sources
    pub fn module_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "module".to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.events.is_empty()
    }
}

/// @acp:summary "Parses headers with a given structural declaration parser"
pub struct HeaderParser<'p> {
    parser: &'p dyn DeclarationParser,
}

impl<'p> HeaderParser<'p> {
    pub fn new(parser: &'p dyn DeclarationParser) -> Self {
        Self { parser }
    }

    /// Read and parse a header file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParsedHeader> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        let mut header = self.parse_source(&source)?;
        header.path = Some(path.to_path_buf());
        header.modified = modified;

        tracing::info!(
            "Parsed {}: {} functions, {} classes, {} events",
            path.display(),
            header.functions.len(),
            header.classes.len(),
            header.events.len()
        );
        Ok(header)
    }

    /// Parse header text that is already in memory
    pub fn parse_source(&self, source: &str) -> Result<ParsedHeader> {
        let content = strip_comments(source)?;
        let namespaces = NamespaceMap::from_text(&content)?;

        let functions = extract::extract(&content, AnnotationKind::Function)?
            .iter()
            .map(|raw| Function::from_raw(raw, namespaces.enclosing_name(&raw.span), self.parser))
            .collect::<Result<Vec<_>>>()?;

        let mut classes = Vec::new();
        for raw in extract::extract(&content, AnnotationKind::Class)? {
            let mut class =
                ClassType::from_raw(&raw, namespaces.enclosing_name(&raw.span), self.parser)?;
            class.collect_methods(&functions);
            tracing::debug!(
                "Class {} with {} methods",
                class.qualified_name(),
                class.methods.len()
            );
            classes.push(class);
        }

        let events = extract::extract(&content, AnnotationKind::Event)?
            .iter()
            .map(|raw| EventType::from_raw(raw, namespaces.enclosing_name(&raw.span), self.parser))
            .collect::<Result<Vec<_>>>()?;

        Ok(ParsedHeader {
            path: None,
            modified: None,
            source: source.to_string(),
            content,
            namespaces,
            functions,
            classes,
            events,
        })
    }
}
