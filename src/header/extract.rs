//! @acp:module "Declaration Extractor"
//! @acp:summary "Locate annotation markers and delimit their declarations"
//! @acp:domain codegen
//! @acp:layer detection
//!
//! Declaration extraction
//!
//! Finds annotation markers in the stripped buffer and delimits the
//! declaration that follows each one. Functions end at the first `{` or `;`.
//! Classes and events end at the brace matching their first `{`, found by
//! depth counting, so bodies containing `enum class E {...};` or
//! `double d {1};` are delimited correctly.

use std::sync::LazyLock;

use regex::Regex;

use crate::annotation::AnnotationKind;
use crate::error::{NodegenError, Result};
use crate::span::Span;

static FUNCTION_HEAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\b(NF_FUNCTION(?:\(.*?\))?;?)[ \t]*\r?\n").unwrap());

static CLASS_HEAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\b(NF_CLASS(?:\(.*?\))?;?)[ \t]*\r?\n").unwrap());

static EVENT_HEAD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\b(NF_EVENT(?:\(.*?\))?;?)[ \t]*\r?\n").unwrap());

/// Any annotation marker with its attribute list, for masking
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bNF_(?:FUNCTION|CLASS|EVENT)\b(?:\((?:"[^"]*"|[^")])*\))?;?"#).unwrap()
});

/// A `class`/`struct` keyword that opens a body: optional name, `final`
/// and base clause, then `{`. Group 1 is set for `enum class` / `enum struct`.
static AGGREGATE_DEFINITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(enum\s+)?(?:class|struct)\b\s*(?:\w+\s*)?(?:final\s*)?(?::[^;{}()]*)?\{").unwrap()
});

/// An annotation marker and the declaration it annotates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    pub kind: AnnotationKind,
    pub annotation: String,
    pub declaration: String,
    /// Marker through end of declaration
    pub span: Span,
}

/// Extract every declaration of `kind` from a stripped buffer
pub fn extract(text: &str, kind: AnnotationKind) -> Result<Vec<RawDeclaration>> {
    match kind {
        AnnotationKind::Function => Ok(extract_functions(text)),
        AnnotationKind::Class => extract_aggregates(text, kind, &CLASS_HEAD_PATTERN),
        AnnotationKind::Event => extract_aggregates(text, kind, &EVENT_HEAD_PATTERN),
    }
}

fn extract_functions(text: &str) -> Vec<RawDeclaration> {
    let mut found = Vec::new();

    for caps in FUNCTION_HEAD_PATTERN.captures_iter(text) {
        let Some(head) = caps.get(0) else { continue };
        if on_preprocessor_line(text, head.start()) {
            continue;
        }
        let Some(end) = text[head.end()..].find(['{', ';']).map(|i| head.end() + i + 1) else {
            continue;
        };

        let raw = RawDeclaration {
            kind: AnnotationKind::Function,
            annotation: caps[1].trim().to_string(),
            declaration: text[head.end()..end].trim().to_string(),
            span: Span::new(head.start(), end),
        };
        tracing::debug!("Found {} at {}: {}", raw.annotation, raw.span, raw.declaration);
        found.push(raw);
    }

    found
}

fn extract_aggregates(
    text: &str,
    kind: AnnotationKind,
    head_pattern: &Regex,
) -> Result<Vec<RawDeclaration>> {
    let mut found = Vec::new();

    for caps in head_pattern.captures_iter(text) {
        let Some(head) = caps.get(0) else { continue };
        if on_preprocessor_line(text, head.start()) {
            continue;
        }

        let end = aggregate_end(text, head.end(), kind)?;
        let declaration = text[head.end()..end].trim().to_string();

        let nested = AGGREGATE_DEFINITION_PATTERN
            .captures_iter(&declaration)
            .filter(|c| c.get(1).is_none())
            .count();
        if nested > 1 {
            return Err(NodegenError::Structural(format!(
                "Nested classes or structs are not allowed in {} declaration '{}'",
                kind, declaration
            )));
        }

        let raw = RawDeclaration {
            kind,
            annotation: caps[1].trim().to_string(),
            declaration,
            span: Span::new(head.start(), end),
        };
        tracing::debug!("Found {} at {}", raw.annotation, raw.span);
        found.push(raw);
    }

    Ok(found)
}

/// End offset (exclusive) of the aggregate body starting after `from`,
/// including a trailing `;` if present
fn aggregate_end(text: &str, from: usize, kind: AnnotationKind) -> Result<usize> {
    let rest = &text[from..];
    let line = line_of(text, from);

    let open = match (rest.find('{'), rest.find(';')) {
        (Some(open), Some(semi)) if semi < open => {
            return Err(NodegenError::Structural(format!(
                "{} on line {} annotates a declaration without a body",
                kind, line
            )))
        }
        (Some(open), _) => from + open,
        (None, _) => {
            return Err(NodegenError::Structural(format!(
                "{} on line {} is not followed by a '{{'",
                kind, line
            )))
        }
    };

    let mut depth = 0usize;
    for (idx, byte) in text.as_bytes()[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + idx + 1;
                    let after = &text[close..];
                    let trimmed = after.trim_start();
                    if trimmed.starts_with(';') {
                        return Ok(close + (after.len() - trimmed.len()) + 1);
                    }
                    return Ok(close);
                }
            }
            _ => {}
        }
    }

    Err(NodegenError::Structural(format!(
        "Unbalanced braces in {} declaration on line {}. Check for presence of '{{' and '}}' in \
         macros, comments or strings and remove them if possible.",
        kind, line
    )))
}

/// Blank out nested annotation markers so the declaration parses as plain C++
pub fn mask_annotations(declaration: &str) -> String {
    MARKER_PATTERN
        .replace_all(declaration, |caps: &regex::Captures| " ".repeat(caps[0].len()))
        .into_owned()
}

fn on_preprocessor_line(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text[line_start..offset].trim_start().starts_with('#')
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
