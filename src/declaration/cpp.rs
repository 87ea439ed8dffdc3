//! @acp:module "C++ Declaration Parser"
//! @acp:summary "tree-sitter parsing of single C++ declarations"
//! @acp:domain codegen
//! @acp:layer analysis
//!
//! tree-sitter backed [`DeclarationParser`]

use tree_sitter::{Node, Parser, Tree};

use super::{Aggregate, DeclarationError, DeclarationParser, Signature, Variable};

/// Parses declarations with the tree-sitter C++ grammar.
///
/// A fresh `tree_sitter::Parser` is created per call, so one instance can be
/// shared across worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, DeclarationError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| DeclarationError::Grammar(format!("failed to load C++ grammar: {}", e)))?;
        parser
            .parse(source, None)
            .ok_or_else(|| DeclarationError::Grammar("parser produced no syntax tree".to_string()))
    }
}

impl DeclarationParser for TreeSitterParser {
    fn parse_function(&self, declaration: &str) -> Result<Signature, DeclarationError> {
        let source = terminate_declaration(declaration);
        let tree = self.parse_tree(&source)?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("Syntax errors while parsing '{}'", source);
        }

        let mut cursor = root.walk();
        let found: Vec<Node> = root
            .named_children(&mut cursor)
            .filter_map(find_function_declarator)
            .collect();

        let func = match found.as_slice() {
            [] => return Err(DeclarationError::NotFound("function declaration")),
            [func] => *func,
            _ => {
                return Err(DeclarationError::Ambiguous {
                    what: "function declaration",
                    count: found.len(),
                })
            }
        };

        let name = func
            .child_by_field_name("declarator")
            .map(|d| declarator_name(d, &source))
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(DeclarationError::Grammar("function has no name".to_string()));
        }

        let return_type = match trailing_return_type(func, &source) {
            Some(ty) => ty,
            None => {
                let decl = declaration_owner(func).ok_or_else(|| {
                    DeclarationError::Grammar(format!("function '{}' has no return type", name))
                })?;
                let (base, _) = base_type(decl, &source)?;
                format!("{}{}", base, type_suffix(decl.child_by_field_name("declarator"), &source))
            }
        };

        let mut parameters = Vec::new();
        if let Some(list) = func.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for param in list.named_children(&mut cursor) {
                if matches!(
                    param.kind(),
                    "parameter_declaration" | "optional_parameter_declaration"
                ) {
                    parameters.push(variable(param, param.child_by_field_name("declarator"), &source)?);
                }
            }
        }

        // `f(void)` takes no arguments
        if let [only] = parameters.as_slice() {
            if only.name.is_empty() && only.ty == "void" {
                parameters.clear();
            }
        }

        Ok(Signature {
            name,
            return_type,
            parameters,
        })
    }

    fn parse_aggregate(&self, declaration: &str) -> Result<Aggregate, DeclarationError> {
        let tree = self.parse_tree(declaration)?;
        let root = tree.root_node();

        let mut cursor = root.walk();
        let found: Vec<Node> = root
            .named_children(&mut cursor)
            .filter_map(find_aggregate)
            .collect();

        let aggregate = match found.as_slice() {
            [] => return Err(DeclarationError::NotFound("class or struct")),
            [aggregate] => *aggregate,
            _ => {
                return Err(DeclarationError::Ambiguous {
                    what: "class or struct",
                    count: found.len(),
                })
            }
        };

        let name = aggregate
            .child_by_field_name("name")
            .map(|n| text(n, declaration).to_string())
            .unwrap_or_default();

        let mut access = if aggregate.kind() == "class_specifier" {
            "private"
        } else {
            "public"
        };

        let mut fields = Vec::new();
        if let Some(body) = aggregate.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "access_specifier" => {
                        access = text(member, declaration).trim_end_matches(':').trim();
                    }
                    "field_declaration" if access == "public" && !is_static(member, declaration) => {
                        let mut decl_cursor = member.walk();
                        let declarators: Vec<Node> = member
                            .children_by_field_name("declarator", &mut decl_cursor)
                            .collect();
                        for declarator in declarators {
                            if declares_function(declarator) {
                                continue;
                            }
                            fields.push(variable(member, Some(declarator), declaration)?);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Aggregate { name, fields })
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Make an extracted head like `int f(int a) {` parse as a declaration
fn terminate_declaration(declaration: &str) -> String {
    let trimmed = declaration.trim();
    match trimmed.strip_suffix('{') {
        Some(head) => format!("{};", head.trim_end()),
        None if trimmed.ends_with(';') => trimmed.to_string(),
        None => format!("{};", trimmed),
    }
}

fn find_function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => return Some(node),
        "parameter_list" | "compound_statement" | "field_declaration_list" => return None,
        _ => {}
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(find_function_declarator)
}

fn find_aggregate(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "class_specifier" | "struct_specifier" if node.child_by_field_name("body").is_some() => {
            return Some(node)
        }
        "field_declaration_list" | "compound_statement" => return None,
        _ => {}
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(find_aggregate)
}

/// Nearest ancestor carrying the declared type
fn declaration_owner(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.child_by_field_name("type").is_some() {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

fn inner_declarator(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("declarator").or_else(|| {
        let mut cursor = node.walk();
        let last = node.named_children(&mut cursor).last();
        last
    })
}

fn declarator_name<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" | "field_identifier" | "type_identifier" | "operator_name"
            | "destructor_name" => return text(current, source),
            "qualified_identifier" | "template_function" => match current.child_by_field_name("name") {
                Some(name) => current = name,
                None => return text(current, source),
            },
            _ => match inner_declarator(current) {
                Some(inner) => current = inner,
                None => return "",
            },
        }
    }
}

fn declares_function(declarator: Node<'_>) -> bool {
    let mut current = Some(declarator);
    while let Some(node) = current {
        match node.kind() {
            "function_declarator" => return true,
            "identifier" | "field_identifier" => return false,
            _ => current = inner_declarator(node),
        }
    }
    false
}

fn is_static(member: Node<'_>, source: &str) -> bool {
    let mut cursor = member.walk();
    let found = member
        .children(&mut cursor)
        .any(|c| c.kind() == "storage_class_specifier" && text(c, source) == "static");
    found
}

fn trailing_return_type(func: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = func.walk();
    let trailing = func
        .named_children(&mut cursor)
        .find(|c| c.kind() == "trailing_return_type")?;
    Some(normalize_whitespace(text(trailing, source).trim_start_matches("->")))
}

/// Type specifier with its cv-qualifiers, plus the bare specifier
fn base_type(decl: Node<'_>, source: &str) -> Result<(String, String), DeclarationError> {
    let ty = decl.child_by_field_name("type").ok_or_else(|| {
        DeclarationError::Grammar(format!("no type in '{}'", text(decl, source)))
    })?;

    let mut cursor = decl.walk();
    let parts: Vec<&str> = decl
        .children(&mut cursor)
        .filter(|c| c.kind() == "type_qualifier" || c.id() == ty.id())
        .map(|c| text(c, source))
        .collect();

    Ok((
        normalize_whitespace(&parts.join(" ")),
        normalize_whitespace(text(ty, source)),
    ))
}

/// Pointer, reference and array markers between a declarator and its name
fn type_suffix(declarator: Option<Node<'_>>, source: &str) -> String {
    let mut suffix = String::new();
    let mut current = declarator;

    while let Some(node) = current {
        match node.kind() {
            "pointer_declarator" | "abstract_pointer_declarator" => suffix.push('*'),
            "reference_declarator" | "abstract_reference_declarator" => {
                if text(node, source).trim_start().starts_with("&&") {
                    suffix.push_str("&&");
                } else {
                    suffix.push('&');
                }
            }
            "array_declarator" | "abstract_array_declarator" => {
                let size = node
                    .child_by_field_name("size")
                    .map(|n| text(n, source))
                    .unwrap_or_default();
                suffix.push_str(&format!("[{}]", size));
            }
            "init_declarator" | "parenthesized_declarator" | "abstract_parenthesized_declarator" => {}
            _ => break,
        }
        current = inner_declarator(node);
    }

    suffix
}

fn variable(
    decl: Node<'_>,
    declarator: Option<Node<'_>>,
    source: &str,
) -> Result<Variable, DeclarationError> {
    let (base, raw_type) = base_type(decl, source)?;
    let name = declarator
        .map(|d| declarator_name(d, source))
        .unwrap_or_default()
        .to_string();

    Ok(Variable {
        ty: format!("{}{}", base, type_suffix(declarator, source)),
        raw_type,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TreeSitterParser {
        TreeSitterParser::new()
    }

    #[test]
    fn test_simple_function() {
        let sig = parser().parse_function("int Add(int a, int b);").unwrap();
        assert_eq!(sig.name, "Add");
        assert_eq!(sig.return_type, "int");
        assert_eq!(
            sig.parameters,
            vec![Variable::new("int", "a"), Variable::new("int", "b")]
        );
    }

    #[test]
    fn test_definition_head() {
        let sig = parser().parse_function("float Scale(float v, float f) {").unwrap();
        assert_eq!(sig.name, "Scale");
        assert_eq!(sig.parameters.len(), 2);
    }

    #[test]
    fn test_qualifiers_and_references() {
        let sig = parser()
            .parse_function("static const std::string& Greet(const std::string& who, int* count);")
            .unwrap();
        assert_eq!(sig.return_type, "const std::string&");
        assert_eq!(sig.parameters[0].ty, "const std::string&");
        assert_eq!(sig.parameters[0].raw_type, "std::string");
        assert_eq!(sig.parameters[0].name, "who");
        assert_eq!(sig.parameters[1].ty, "int*");
        assert_eq!(sig.parameters[1].name, "count");
    }

    #[test]
    fn test_void_parameter_list() {
        let sig = parser().parse_function("void Tick(void);").unwrap();
        assert_eq!(sig.return_type, "void");
        assert!(sig.parameters.is_empty());
    }

    #[test]
    fn test_default_argument() {
        let sig = parser().parse_function("int Clamp(int v, int hi = 10);").unwrap();
        assert_eq!(sig.parameters[1], Variable::new("int", "hi"));
    }

    #[test]
    fn test_unnamed_parameter() {
        let sig = parser().parse_function("int Ignore(int);").unwrap();
        assert_eq!(sig.parameters.len(), 1);
        assert_eq!(sig.parameters[0].name, "");
    }

    #[test]
    fn test_function_count() {
        assert!(matches!(
            parser().parse_function("int x;"),
            Err(DeclarationError::NotFound(_))
        ));
        assert!(matches!(
            parser().parse_function("int f(); int g();"),
            Err(DeclarationError::Ambiguous { count: 2, .. })
        ));
    }

    #[test]
    fn test_struct_fields() {
        let agg = parser()
            .parse_aggregate("struct Collision { int id; float x, y; void Reset(); };")
            .unwrap();
        assert_eq!(agg.name, "Collision");
        let names: Vec<&str> = agg.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "x", "y"]);
        assert_eq!(agg.fields[1].ty, "float");
    }

    #[test]
    fn test_class_access() {
        let agg = parser()
            .parse_aggregate(
                "class Player : public Actor { int hidden; public: int score; private: int secret; };",
            )
            .unwrap();
        assert_eq!(agg.name, "Player");
        assert_eq!(agg.fields, vec![Variable::new("int", "score")]);
    }

    #[test]
    fn test_nested_braces_in_body() {
        let agg = parser()
            .parse_aggregate("struct Settings { enum class Mode { A, B }; double gain {1}; Mode mode; };")
            .unwrap();
        let names: Vec<&str> = agg.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["gain", "mode"]);
    }

    #[test]
    fn test_aggregate_count() {
        assert!(matches!(
            parser().parse_aggregate("int f();"),
            Err(DeclarationError::NotFound(_))
        ));
        assert!(matches!(
            parser().parse_aggregate("struct A { int a; }; struct B { int b; };"),
            Err(DeclarationError::Ambiguous { count: 2, .. })
        ));
    }
}
