//! @acp:module "Entities"
//! @acp:summary "Annotated functions, classes and events"
//! @acp:domain codegen
//! @acp:layer model
//!
//! Annotated entities
//!
//! Each entity combines a parsed annotation, the raw declaration text, its
//! span in the stripped buffer, and the qualified name of the enclosing
//! namespace. Entities are immutable once built, apart from class method
//! back-filling which happens once per header.

use serde::Serialize;

use crate::annotation::{Annotation, AnnotationKind};
use crate::declaration::{DeclarationParser, Signature, Variable};
use crate::error::{NodegenError, Result};
use crate::header::extract::{mask_annotations, RawDeclaration};
use crate::span::Span;

/// Keywords that mark declarations the node generator cannot express
const FUNCTION_FORBIDDEN: &[&str] = &["template", "typename"];

/// A function annotated with `NF_FUNCTION`
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub annotation: Annotation,
    pub declaration: String,
    pub span: Span,
    /// Qualified enclosing namespace, empty at global scope
    pub namespace: String,
    pub signature: Signature,
}

impl Function {
    pub fn new(
        annotation: &str,
        declaration: &str,
        span: Span,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        if let Some(keyword) = FUNCTION_FORBIDDEN
            .iter()
            .find(|keyword| declaration.contains(*keyword))
        {
            return Err(NodegenError::UnsupportedDeclaration {
                keyword: keyword.to_string(),
                declaration: declaration.to_string(),
            });
        }

        let annotation = Annotation::parse(AnnotationKind::Function, annotation)?;
        let signature =
            parser
                .parse_function(declaration)
                .map_err(|source| NodegenError::Declaration {
                    declaration: declaration.to_string(),
                    source,
                })?;

        Ok(Self {
            annotation,
            declaration: declaration.to_string(),
            span,
            namespace: namespace.into(),
            signature,
        })
    }

    pub fn from_raw(
        raw: &RawDeclaration,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        Self::new(&raw.annotation, &raw.declaration, raw.span, namespace, parser)
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.signature.parameters
    }

    pub fn return_type(&self) -> &str {
        &self.signature.return_type
    }

    /// `namespace::name`, or just the name at global scope
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, self.name())
    }
}

/// A class annotated with `NF_CLASS`
#[derive(Debug, Clone, Serialize)]
pub struct ClassType {
    pub annotation: Annotation,
    pub declaration: String,
    pub span: Span,
    pub namespace: String,
    pub name: String,
    /// Annotated functions declared inside the class body
    pub methods: Vec<Function>,
}

impl ClassType {
    pub fn new(
        annotation: &str,
        declaration: &str,
        span: Span,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        let annotation = Annotation::parse(AnnotationKind::Class, annotation)?;
        let aggregate = parser
            .parse_aggregate(&mask_annotations(declaration))
            .map_err(|source| NodegenError::Declaration {
                declaration: declaration.to_string(),
                source,
            })?;

        Ok(Self {
            annotation,
            declaration: declaration.to_string(),
            span,
            namespace: namespace.into(),
            name: aggregate.name,
            methods: Vec::new(),
        })
    }

    pub fn from_raw(
        raw: &RawDeclaration,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        Self::new(&raw.annotation, &raw.declaration, raw.span, namespace, parser)
    }

    /// Append every function whose span lies within this class
    pub fn collect_methods(&mut self, functions: &[Function]) {
        self.methods.extend(
            functions
                .iter()
                .filter(|f| f.span.is_subset_of(&self.span))
                .cloned(),
        );
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// A struct or class annotated with `NF_EVENT`
#[derive(Debug, Clone, Serialize)]
pub struct EventType {
    pub annotation: Annotation,
    pub declaration: String,
    pub span: Span,
    pub namespace: String,
    pub name: String,
    /// Public data members in declaration order
    pub fields: Vec<Variable>,
}

impl EventType {
    pub fn new(
        annotation: &str,
        declaration: &str,
        span: Span,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        let annotation = Annotation::parse(AnnotationKind::Event, annotation)?;
        let aggregate = parser
            .parse_aggregate(&mask_annotations(declaration))
            .map_err(|source| NodegenError::Declaration {
                declaration: declaration.to_string(),
                source,
            })?;

        Ok(Self {
            annotation,
            declaration: declaration.to_string(),
            span,
            namespace: namespace.into(),
            name: aggregate.name,
            fields: aggregate.fields,
        })
    }

    pub fn from_raw(
        raw: &RawDeclaration,
        namespace: impl Into<String>,
        parser: &dyn DeclarationParser,
    ) -> Result<Self> {
        Self::new(&raw.annotation, &raw.declaration, raw.span, namespace, parser)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace, name)
    }
}
