//! @acp:module "Namespace Resolver"
//! @acp:summary "Brace-span namespace resolution and qualification"
//! @acp:domain codegen
//! @acp:layer logic
//!
//! Namespace resolution
//!
//! Namespaces are found without a C++ grammar: braces and `namespace NAME`
//! openers are tokenized, each namespace's extent is found by brace-depth
//! matching, and nesting is inferred from span containment alone.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{NodegenError, Result};
use crate::span::Span;

static NAMESPACE_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{|\}|\bnamespace\s+\w+(?:::\w+)*").unwrap());

/// A namespace scope within one header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    /// Fully qualified name, e.g. `outer::inner`
    pub name: String,
    /// From the opening `{` up to (excluding) the matching `}`
    pub span: Span,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Namespace[name={}, range={}]", self.name, self.span)
    }
}

/// Token used for namespace resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceToken {
    Open,
    Close,
    Namespace(String),
}

impl NamespaceToken {
    pub fn as_str(&self) -> &str {
        match self {
            NamespaceToken::Open => "{",
            NamespaceToken::Close => "}",
            NamespaceToken::Namespace(name) => name,
        }
    }
}

/// Tokenize `text` into braces and namespace openers with their offsets.
///
/// `namespace X` only counts when a `{` follows, which leaves out using
/// directives and namespace aliases.
pub fn tokenize(text: &str) -> Vec<(NamespaceToken, usize)> {
    NAMESPACE_TOKEN_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            let token = match m.as_str() {
                "{" => NamespaceToken::Open,
                "}" => NamespaceToken::Close,
                opener => {
                    if !text[m.end()..].trim_start().starts_with('{') {
                        tracing::debug!("Skipping non-scope '{}' at {}", opener, m.start());
                        return None;
                    }
                    let name = opener.split_whitespace().nth(1).unwrap_or_default();
                    NamespaceToken::Namespace(name.to_string())
                }
            };
            Some((token, m.start()))
        })
        .collect()
}

/// Resolved namespace hierarchy for one header
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceMap {
    namespaces: Vec<Namespace>,
}

impl NamespaceMap {
    /// Compute spans and fully qualified names from a token stream
    pub fn resolve(tokens: &[(NamespaceToken, usize)]) -> Result<Self> {
        let mut namespaces = Vec::new();

        for (idx, (token, _)) in tokens.iter().enumerate() {
            if let NamespaceToken::Namespace(name) = token {
                let span = namespace_span(&tokens[idx + 1..])?;
                namespaces.push(Namespace {
                    name: name.clone(),
                    span,
                });
            }
        }

        namespaces.sort_by_key(|ns| ns.span.stop);

        // Prefix each namespace with every namespace enclosing it, outermost first.
        let qualified: Vec<String> = namespaces
            .iter()
            .map(|inner| {
                let mut enclosing: Vec<&Namespace> = namespaces
                    .iter()
                    .filter(|outer| outer.span != inner.span && inner.span.is_subset_of(&outer.span))
                    .collect();
                enclosing.sort_by_key(|outer| std::cmp::Reverse(outer.span.len()));
                enclosing
                    .iter()
                    .map(|outer| outer.name.as_str())
                    .chain(std::iter::once(inner.name.as_str()))
                    .collect::<Vec<_>>()
                    .join("::")
            })
            .collect();

        for (ns, name) in namespaces.iter_mut().zip(qualified) {
            ns.name = name;
            tracing::debug!("Resolved {}", ns);
        }

        Ok(Self { namespaces })
    }

    /// Tokenize and resolve in one step
    pub fn from_text(text: &str) -> Result<Self> {
        Self::resolve(&tokenize(text))
    }

    /// Innermost namespace containing `span`, by smallest containing range
    pub fn enclosing(&self, span: &Span) -> Option<&Namespace> {
        self.namespaces
            .iter()
            .filter(|ns| span.is_subset_of(&ns.span))
            .min_by_key(|ns| ns.span.len())
    }

    /// Qualified name of the enclosing namespace, empty at global scope
    pub fn enclosing_name(&self, span: &Span) -> String {
        self.enclosing(span)
            .map(|ns| ns.name.clone())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

/// Span from the opening brace right after a namespace token to its match.
///
/// `tokens` starts at the token following the namespace opener.
fn namespace_span(tokens: &[(NamespaceToken, usize)]) -> Result<Span> {
    let start = tokens.first().map(|(_, offset)| *offset);
    let mut depth: i64 = 0;

    for (token, offset) in tokens {
        match token {
            NamespaceToken::Open => depth += 1,
            NamespaceToken::Close => depth -= 1,
            NamespaceToken::Namespace(_) => continue,
        }
        if depth == 0 {
            if let Some(start) = start {
                return Ok(Span::new(start, *offset));
            }
        }
    }

    let opens = tokens
        .iter()
        .filter(|(t, _)| *t == NamespaceToken::Open)
        .count();
    let closes = tokens
        .iter()
        .filter(|(t, _)| *t == NamespaceToken::Close)
        .count();
    Err(NodegenError::Structural(format!(
        "Unable to resolve namespaces. Header contains an uneven ratio of enclosing '{{' and '}}' \
         ({} / {} after the namespace opener). Check for presence of '{{' and '}}' in macros, \
         comments or strings and remove them if possible.",
        opens, closes
    )))
}
