//! @acp:module "Annotation Grammar"
//! @acp:summary "Annotation kinds, attribute schemas and attribute-list parsing"
//! @acp:domain codegen
//! @acp:layer model
//!
//! Annotation attribute grammar
//!
//! Parses the attribute list of an annotation marker such as
//! `NF_FUNCTION(DisplayName="Add", Category="Math", Nativizable)` into a typed
//! map, validated against the fixed schema of the marker's kind.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{NodegenError, Result};

/// Expected type of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Text,
    Bool,
    /// Untyped flag; any value (or none) is kept as written
    Marker,
}

const FUNCTION_SCHEMA: &[(&str, AttributeType)] = &[
    ("DisplayName", AttributeType::Text),
    ("Category", AttributeType::Text),
    ("ToolTip", AttributeType::Text),
    ("Nativizable", AttributeType::Marker),
    ("ReturnDisplayName", AttributeType::Text),
    ("NonConstRefArgsAsOut", AttributeType::Bool),
];

const CLASS_SCHEMA: &[(&str, AttributeType)] = &[
    ("DisplayName", AttributeType::Text),
    ("Category", AttributeType::Text),
];

const EVENT_SCHEMA: &[(&str, AttributeType)] = &[
    ("OverrideName", AttributeType::Text),
    ("Category", AttributeType::Text),
];

/// The three annotation markers recognised in headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnnotationKind {
    Function,
    Class,
    Event,
}

impl AnnotationKind {
    /// Macro name as written in headers
    pub fn marker(&self) -> &'static str {
        match self {
            AnnotationKind::Function => "NF_FUNCTION",
            AnnotationKind::Class => "NF_CLASS",
            AnnotationKind::Event => "NF_EVENT",
        }
    }

    pub fn schema(&self) -> &'static [(&'static str, AttributeType)] {
        match self {
            AnnotationKind::Function => FUNCTION_SCHEMA,
            AnnotationKind::Class => CLASS_SCHEMA,
            AnnotationKind::Event => EVENT_SCHEMA,
        }
    }

    pub fn attribute_type(&self, key: &str) -> Option<AttributeType> {
        self.schema()
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, ty)| *ty)
    }

    fn supported_keys(&self) -> String {
        self.schema()
            .iter()
            .map(|(name, _)| format!("'{}'", name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::str::FromStr for AnnotationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NF_FUNCTION" => Ok(AnnotationKind::Function),
            "NF_CLASS" => Ok(AnnotationKind::Class),
            "NF_EVENT" => Ok(AnnotationKind::Event),
            _ => Err(format!("Unknown annotation marker: {}", s)),
        }
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Parsed attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Bare flag, e.g. `Nativizable`
    Absent,
    Text(String),
    Bool(bool),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// A parsed annotation marker with its validated attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Marker text as found in the header
    pub text: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Annotation {
    /// Parse `text` (e.g. `NF_EVENT(OverrideName="Tick")`) against the schema of `kind`
    pub fn parse(kind: AnnotationKind, text: &str) -> Result<Self> {
        let text = text.trim();
        let mut attributes = BTreeMap::new();

        for item in find_attribute_items(text)? {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => {
                    if value.contains('=') {
                        return Err(NodegenError::MalformedAttribute {
                            item: item.to_string(),
                            annotation: text.to_string(),
                        });
                    }
                    (clean(key), Some(clean(value)))
                }
                None => (clean(item), None),
            };

            let expected = kind.attribute_type(&key).ok_or_else(|| {
                NodegenError::UnknownAttribute {
                    key: key.clone(),
                    annotation: text.to_string(),
                    supported: kind.supported_keys(),
                }
            })?;

            let value = match (expected, value) {
                (AttributeType::Bool, raw) => {
                    let raw = raw.unwrap_or_default();
                    let parsed = parse_bool(&raw).ok_or_else(|| NodegenError::InvalidBoolean {
                        key: key.clone(),
                        value: raw.clone(),
                        annotation: text.to_string(),
                    })?;
                    AttributeValue::Bool(parsed)
                }
                (_, Some(raw)) => AttributeValue::Text(raw),
                (_, None) => AttributeValue::Absent,
            };

            attributes.insert(key, value);
        }

        Ok(Self {
            kind,
            text: text.to_string(),
            attributes,
        })
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Whether the attribute was given at all, with or without a value
    pub fn has(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn text_value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_text)
    }

    pub fn bool_value(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttributeValue::as_bool)
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lenient boolean vocabulary used by bool-typed attributes
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn clean(s: &str) -> String {
    s.trim().trim_matches('\'').trim_matches('"').to_string()
}

/// Split the parenthesized attribute list into raw items.
///
/// A bare marker without parentheses has no attributes; a single dangling
/// parenthesis is malformed.
fn find_attribute_items(text: &str) -> Result<Vec<&str>> {
    let (open, close) = match (text.find('('), text.rfind(')')) {
        (None, None) => return Ok(Vec::new()),
        (Some(open), Some(close)) if open < close => (open, close),
        _ => {
            return Err(NodegenError::Structural(format!(
                "Missing parenthesis in '{}'",
                text
            )))
        }
    };

    let inner = text[open + 1..close].trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    Ok(split_outside_quotes(inner)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect())
}

/// Split on commas that are not inside double quotes
fn split_outside_quotes(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut in_quotes = false;
    let mut last = 0;

    for (idx, ch) in s.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(&s[last..idx]);
                last = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&s[last..]);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_attributes() {
        let ann = Annotation::parse(
            AnnotationKind::Function,
            r#"NF_FUNCTION(DisplayName="Add", Category="Math")"#,
        )
        .unwrap();
        assert_eq!(ann.attributes.len(), 2);
        assert_eq!(ann.text_value("DisplayName"), Some("Add"));
        assert_eq!(ann.text_value("Category"), Some("Math"));
    }

    #[test]
    fn test_bare_flag() {
        let ann = Annotation::parse(AnnotationKind::Function, "NF_FUNCTION(Nativizable)").unwrap();
        assert_eq!(ann.get("Nativizable"), Some(&AttributeValue::Absent));
        assert!(ann.has("Nativizable"));
    }

    #[test]
    fn test_invalid_boolean() {
        let err = Annotation::parse(
            AnnotationKind::Function,
            "NF_FUNCTION(NonConstRefArgsAsOut=maybe)",
        )
        .unwrap_err();
        assert!(matches!(err, NodegenError::InvalidBoolean { ref key, .. } if key == "NonConstRefArgsAsOut"));
    }

    #[test]
    fn test_boolean_vocabulary() {
        let ann = Annotation::parse(
            AnnotationKind::Function,
            "NF_FUNCTION(NonConstRefArgsAsOut=Yes)",
        )
        .unwrap();
        assert_eq!(ann.bool_value("NonConstRefArgsAsOut"), Some(true));

        for raw in ["n", "no", "F", "false", "off", "0"] {
            assert_eq!(parse_bool(raw), Some(false), "{}", raw);
        }
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_quoted_comma_is_kept() {
        let ann = Annotation::parse(
            AnnotationKind::Function,
            r#"NF_FUNCTION(ToolTip="adds a, b", Category=Math)"#,
        )
        .unwrap();
        assert_eq!(ann.text_value("ToolTip"), Some("adds a, b"));
        assert_eq!(ann.text_value("Category"), Some("Math"));
    }

    #[test]
    fn test_unknown_key_lists_supported() {
        let err = Annotation::parse(AnnotationKind::Event, "NF_EVENT(DisplayName=\"x\")").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DisplayName"));
        assert!(msg.contains("'OverrideName'"));
    }

    #[test]
    fn test_double_equals_is_malformed() {
        let err = Annotation::parse(AnnotationKind::Class, "NF_CLASS(Category=a=b)").unwrap_err();
        assert!(matches!(err, NodegenError::MalformedAttribute { .. }));
    }

    #[test]
    fn test_parentheses() {
        let ann = Annotation::parse(AnnotationKind::Class, "NF_CLASS();").unwrap();
        assert!(ann.attributes.is_empty());

        let ann = Annotation::parse(AnnotationKind::Class, "NF_CLASS").unwrap();
        assert!(ann.attributes.is_empty());

        let err = Annotation::parse(AnnotationKind::Class, "NF_CLASS(Category=x").unwrap_err();
        assert!(matches!(err, NodegenError::Structural(_)));
    }

    #[test]
    fn test_kind_from_marker() {
        assert_eq!("NF_EVENT".parse::<AnnotationKind>(), Ok(AnnotationKind::Event));
        assert!("NF_THING".parse::<AnnotationKind>().is_err());
        assert_eq!(AnnotationKind::Class.to_string(), "NF_CLASS");
    }
}
