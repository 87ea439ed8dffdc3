//! Header scanning integration tests
//!
//! Runs complete headers through comment stripping, namespace resolution,
//! extraction, tree-sitter declaration parsing and node generation.

use nodegen::header::strip_comments;
use nodegen::{
    AnnotationKind, AttributeValue, ErrorKind, FunctionNodeGenerator, HeaderParser, ParsedHeader,
    TreeSitterParser,
};

fn parse(source: &str) -> nodegen::Result<ParsedHeader> {
    let parser = TreeSitterParser::new();
    HeaderParser::new(&parser).parse_source(source)
}

// =============================================================================
// Functions
// =============================================================================

mod function_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_math_add() {
        let header = parse(
            r#"
#pragma once
#include "nodeflow/Node.h"

namespace Math
{
    // Adds two integers
    NF_FUNCTION(DisplayName="Add Integers")
    int Add(int a, int b);
}
"#,
        )
        .unwrap();

        assert_eq!(header.functions.len(), 1);
        let add = &header.functions[0];
        assert_eq!(add.name(), "Add");
        assert_eq!(add.namespace, "Math");
        assert_eq!(add.qualified_name(), "Math::Add");
        assert_eq!(add.return_type(), "int");
        let params: Vec<(&str, &str)> = add
            .parameters()
            .iter()
            .map(|p| (p.ty.as_str(), p.name.as_str()))
            .collect();
        assert_eq!(params, vec![("int", "a"), ("int", "b")]);
        assert_eq!(add.annotation.kind, AnnotationKind::Function);
        assert_eq!(
            add.annotation.get("DisplayName"),
            Some(&AttributeValue::Text("Add Integers".to_string()))
        );
    }

    #[test]
    fn test_nested_namespaces() {
        let header = parse(
            r#"
namespace Engine {
    namespace Physics {
        NF_FUNCTION()
        float Gravity();
    }
    NF_FUNCTION()
    float Time();
}
NF_FUNCTION()
int Global(int x);
"#,
        )
        .unwrap();

        let names: Vec<String> = header.functions.iter().map(|f| f.qualified_name()).collect();
        assert_eq!(names, vec!["Engine::Physics::Gravity", "Engine::Time", "Global"]);
        assert_eq!(header.namespaces.len(), 2);
    }

    #[test]
    fn test_commented_out_annotation_ignored() {
        let header = parse(
            r#"
// NF_FUNCTION()
// int Hidden(int a);
/* NF_FUNCTION()
int AlsoHidden(int a); */
NF_FUNCTION()
int Visible(int a);
"#,
        )
        .unwrap();
        assert_eq!(header.functions.len(), 1);
        assert_eq!(header.functions[0].name(), "Visible");
    }

    #[test]
    fn test_define_line_before_annotation() {
        let header = parse("#define NF_FUNCTION(...)\nNF_FUNCTION()\nint Add(int a, int b);\n").unwrap();
        assert_eq!(header.functions.len(), 1);
        assert_eq!(header.functions[0].name(), "Add");
    }

    #[test]
    fn test_digit_separators_in_header() {
        let header = parse(
            "namespace M {\nconstexpr int kMax = 1'000;\nNF_FUNCTION()\nint Add(int a, int b);\n}\n",
        )
        .unwrap();
        assert_eq!(header.functions[0].qualified_name(), "M::Add");
    }

    #[test]
    fn test_unknown_attribute_fails_header() {
        let err = parse("NF_FUNCTION(Colour=\"red\")\nint F(int a);\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Attribute);
    }

    #[test]
    fn test_unique_types() {
        let header = parse(
            r#"
NF_FUNCTION()
float Length(const Vec3& v);
NF_FUNCTION()
Vec3 Scale(const Vec3& v, float f);
NF_FUNCTION()
void Tick(void);
"#,
        )
        .unwrap();
        assert_eq!(header.unique_types(), vec!["Vec3", "float"]);
    }
}

// =============================================================================
// Classes and events
// =============================================================================

mod aggregate_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_collects_methods() {
        let header = parse(
            r#"
namespace Game {
NF_CLASS()
class Player : public Actor
{
public:
    NF_FUNCTION()
    void Jump(float height);

    NF_FUNCTION()
    int Score() const;

private:
    int m_score = 0;
};

NF_FUNCTION()
int Outside(int a);
}
"#,
        )
        .unwrap();

        assert_eq!(header.classes.len(), 1);
        let player = &header.classes[0];
        assert_eq!(player.qualified_name(), "Game::Player");
        let methods: Vec<&str> = player.methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, vec!["Jump", "Score"]);
        assert_eq!(header.functions.len(), 3);
    }

    #[test]
    fn test_event_fields() {
        let header = parse(
            r#"
NF_EVENT()
struct DamageEvent
{
    enum class Source { Fall, Enemy };

    int target;
    float amount{0.0f};
    Source source = Source::Fall;
    static int count;
};
"#,
        )
        .unwrap();

        assert_eq!(header.events.len(), 1);
        let event = &header.events[0];
        assert_eq!(event.name, "DamageEvent");
        assert_eq!(event.field_names(), vec!["target", "amount", "source"]);
    }

    #[test]
    fn test_friend_and_template_keywords_in_class() {
        let header = parse(
            r#"
NF_CLASS()
class Calc
{
    friend class Tester;
public:
    NF_FUNCTION()
    int Add(int a, int b);

    template <class T>
    T Identity(T value);
};
"#,
        )
        .unwrap();

        assert_eq!(header.classes.len(), 1);
        assert_eq!(header.classes[0].name, "Calc");
        let methods: Vec<&str> = header.classes[0].methods.iter().map(|m| m.name()).collect();
        assert_eq!(methods, vec!["Add"]);
    }

    #[test]
    fn test_nested_struct_is_structural_error() {
        let err = parse(
            r#"
NF_EVENT()
struct Outer
{
    struct Inner { int a; };
    Inner inner;
};
"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}

// =============================================================================
// Generation
// =============================================================================

mod generation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generated_node_for_add() {
        let header = parse("namespace Math {\nNF_FUNCTION()\nint Add(int a, int b);\n}\n").unwrap();
        let node = FunctionNodeGenerator::default()
            .generate(&header.functions[0])
            .unwrap();

        assert_eq!(
            node.source(),
            "class NODE_Add : public nf::FlowNode\n\
             {\n\
             \tNF_NODE_NAME(\"Replace Me\")\n\
             private:\n\
             \tnf::InputPort<int> ip_a;\n\
             \tnf::InputPort<int> ip_b;\n\
             private:\n\
             \tnf::OutputPort<int> op_returnValue;\n\
             };\n"
        );
    }

    #[test]
    fn test_zero_parameters_and_determinism() {
        let header = parse("NF_FUNCTION()\ndouble Now();\n").unwrap();
        let generator = FunctionNodeGenerator::default();
        let first = generator.generate(&header.functions[0]).unwrap();
        let second = generator.generate(&header.functions[0]).unwrap();

        assert_eq!(first, second);
        assert!(!first.source().contains("InputPort"));
        assert!(first.source().contains("\tnf::OutputPort<double> op_returnValue;"));
    }
}

// =============================================================================
// Comment stripping
// =============================================================================

mod stripping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_is_idempotent() {
        let source = r#"
int a; // trailing
/* block
   spanning */ int b;
const char* s = "// not a comment";
"#;
        let once = strip_comments(source).unwrap();
        let twice = strip_comments(&once).unwrap();
        assert_eq!(once, twice);
        assert!(once.contains("\"// not a comment\""));
        assert!(!once.contains("trailing"));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = strip_comments("int a;\n/* open").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}
