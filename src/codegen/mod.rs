//! @acp:module "Node Generator"
//! @acp:summary "Node class source generation for annotated functions"
//! @acp:domain codegen
//! @acp:layer output
//!
//! Node source generation
//!
//! [`NodeBuilder`] records structured [`NodeLine`]s and renders them in a
//! single pass; [`FunctionNodeGenerator`] drives it for one annotated
//! function, mapping parameters to input ports and the return value to an
//! output port.

use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::entity::Function;
use crate::error::{NodegenError, Result};

/// Display label emitted for every node until annotation names are wired through
pub const NODE_NAME_PLACEHOLDER: &str = "Replace Me";

/// Port name used for a function's return value
pub const RETURN_PORT_NAME: &str = "returnValue";

/// Prefix of generated node class names
pub const NODE_CLASS_PREFIX: &str = "NODE_";

/// One structural element of a generated node class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeLine {
    ClassHeader { name: String, base: String },
    NodeName(String),
    /// `private:` label before a run of ports
    PrivateScope,
    InputPort { ty: String, name: String },
    OutputPort {
        ty: String,
        name: String,
        default: Option<String>,
    },
    ClassEnd,
}

/// Accumulates node lines and renders them as C++ source
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    port_namespace: String,
    lines: Vec<NodeLine>,
}

impl NodeBuilder {
    pub fn new(port_namespace: impl Into<String>) -> Self {
        Self {
            port_namespace: port_namespace.into(),
            lines: Vec::new(),
        }
    }

    pub fn begin_node(&mut self, class_name: &str, parent: &str) -> &mut Self {
        self.lines.push(NodeLine::ClassHeader {
            name: class_name.to_string(),
            base: parent.to_string(),
        });
        self
    }

    pub fn set_node_name(&mut self, node_name: &str) -> &mut Self {
        self.lines.push(NodeLine::NodeName(node_name.to_string()));
        self
    }

    pub fn add_private_scope(&mut self) -> &mut Self {
        self.lines.push(NodeLine::PrivateScope);
        self
    }

    pub fn add_input_port(&mut self, ty: &str, name: &str) -> Result<&mut Self> {
        if name.is_empty() {
            return Err(NodegenError::Generation(format!(
                "Empty parameter name not allowed (input port of type '{}')",
                ty
            )));
        }
        self.lines.push(NodeLine::InputPort {
            ty: ty.to_string(),
            name: name.to_string(),
        });
        Ok(self)
    }

    pub fn add_output_port(
        &mut self,
        ty: &str,
        name: &str,
        default: Option<&str>,
    ) -> Result<&mut Self> {
        if name.is_empty() {
            return Err(NodegenError::Generation(format!(
                "Empty variable name not allowed (output port of type '{}')",
                ty
            )));
        }
        self.lines.push(NodeLine::OutputPort {
            ty: ty.to_string(),
            name: name.to_string(),
            default: default.map(str::to_string),
        });
        Ok(self)
    }

    pub fn end_node(&mut self) -> &mut Self {
        self.lines.push(NodeLine::ClassEnd);
        self
    }

    pub fn lines(&self) -> &[NodeLine] {
        &self.lines
    }

    /// Render all recorded lines as source text, one entry per output line
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.lines.len() + 1);
        for line in &self.lines {
            match line {
                NodeLine::ClassHeader { name, base } => {
                    out.push(format!("class {} : public {}", name, base));
                    out.push("{".to_string());
                }
                NodeLine::NodeName(label) => out.push(format!("\tNF_NODE_NAME(\"{}\")", label)),
                NodeLine::PrivateScope => out.push("private:".to_string()),
                NodeLine::InputPort { ty, name } => {
                    out.push(format!("\t{}<{}> ip_{};", self.port_type("InputPort"), ty, name))
                }
                NodeLine::OutputPort { ty, name, default } => {
                    let port = self.port_type("OutputPort");
                    match default {
                        Some(value) => out.push(format!("\t{}<{}> op_{}{{{}}};", port, ty, name, value)),
                        None => out.push(format!("\t{}<{}> op_{};", port, ty, name)),
                    }
                }
                NodeLine::ClassEnd => out.push("};".to_string()),
            }
        }
        out
    }

    fn port_type(&self, port: &str) -> String {
        if self.port_namespace.is_empty() {
            port.to_string()
        } else {
            format!("{}::{}", self.port_namespace, port)
        }
    }
}

/// Generated source for one function node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedNode {
    /// Generated class name, e.g. `NODE_Add`
    pub class_name: String,
    /// Qualified name of the source function
    pub function: String,
    pub lines: Vec<String>,
}

impl GeneratedNode {
    pub fn source(&self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }
}

/// @acp:summary "Generates node classes for annotated functions"
#[derive(Debug, Clone)]
pub struct FunctionNodeGenerator {
    base_class: String,
    port_namespace: String,
}

impl Default for FunctionNodeGenerator {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl FunctionNodeGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            base_class: config.base_class.clone(),
            port_namespace: config.port_namespace.clone(),
        }
    }

    pub fn generate(&self, function: &Function) -> Result<GeneratedNode> {
        let class_name = format!("{}{}", NODE_CLASS_PREFIX, function.name());
        let mut builder = NodeBuilder::new(self.port_namespace.as_str());

        builder
            .begin_node(&class_name, &self.base_class)
            .set_node_name(NODE_NAME_PLACEHOLDER);

        for (idx, param) in function.parameters().iter().enumerate() {
            if idx == 0 {
                builder.add_private_scope();
            }
            builder
                .add_input_port(&param.ty, &param.name)
                .map_err(|e| in_function(e, function))?;
        }

        builder
            .add_private_scope()
            .add_output_port(function.return_type(), RETURN_PORT_NAME, None)
            .map_err(|e| in_function(e, function))?
            .end_node();

        Ok(GeneratedNode {
            class_name,
            function: function.qualified_name(),
            lines: builder.render(),
        })
    }
}

fn in_function(err: NodegenError, function: &Function) -> NodegenError {
    match err {
        NodegenError::Generation(msg) => NodegenError::Generation(format!(
            "{} while generating node for '{}'",
            msg,
            function.qualified_name()
        )),
        other => other,
    }
}
