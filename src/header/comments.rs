//! @acp:module "Comment Stripper"
//! @acp:summary "Remove C++ comments while preserving literals"
//! @acp:domain codegen
//! @acp:layer logic
//!
//! Comment stripping
//!
//! Produces the working buffer every later stage computes offsets against.
//! String and char literals are matched so that comment markers inside them
//! survive, but they are returned unchanged.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{NodegenError, Result};

/// Comments, literals, and (as the last alternatives) the opening token of an
/// unterminated block comment or literal. Numbers are matched before char
/// literals so digit separators (`1'000`) are not read as quotes.
static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)//[^\n]*|/\*.*?\*/|\b\d(?:'?[\w.])*|'(?:\\.|[^\\'])*'|"(?:\\.|[^\\"])*"|(?P<open>/\*|"|')"#,
    )
    .unwrap()
});

/// Replace every comment with a single space.
///
/// Fails when a block comment, string literal or char literal never closes,
/// since no offset computed afterwards could be trusted.
pub fn strip_comments(text: &str) -> Result<String> {
    if let Some(open) = COMMENT_PATTERN
        .captures_iter(text)
        .find_map(|caps| caps.name("open"))
    {
        let line = text[..open.start()].matches('\n').count() + 1;
        return Err(NodegenError::Structural(format!(
            "Unterminated '{}' starting on line {}",
            open.as_str(),
            line
        )));
    }

    let stripped = COMMENT_PATTERN.replace_all(text, |caps: &Captures| {
        let s = &caps[0];
        if s.starts_with('/') {
            " ".to_string()
        } else {
            s.to_string()
        }
    });

    Ok(stripped.into_owned())
}
