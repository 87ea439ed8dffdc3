//! @acp:module "Inspect Command"
//! @acp:summary "Print the entities declared by a header"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `nodegen inspect`, which prints what a header declares.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use crate::declaration::{TreeSitterParser, Variable};
use crate::header::{HeaderParser, ParsedHeader};

/// Options for the inspect command
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Header to inspect
    pub file: PathBuf,
    /// Emit JSON instead of a readable listing
    pub json: bool,
}

/// Execute the inspect command
pub fn execute_inspect(options: InspectOptions) -> Result<()> {
    let parser = TreeSitterParser::new();
    let header = HeaderParser::new(&parser)
        .parse_file(&options.file)
        .with_context(|| format!("Failed to inspect {}", options.file.display()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&header)?);
    } else {
        print!("{}", render_listing(&header));
    }
    Ok(())
}

fn render_listing(header: &ParsedHeader) -> String {
    let mut out = String::new();
    let title = header
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| header.module_name());
    out.push_str(&format!("{}\n", style(title).bold()));

    if !header.namespaces.is_empty() {
        out.push_str(&format!("\n{}\n", style("Namespaces").bold()));
        for ns in header.namespaces.iter() {
            out.push_str(&format!("  {} [{}]\n", ns.name, ns.span));
        }
    }

    out.push_str(&format!("\n{} ({})\n", style("Functions").bold(), header.functions.len()));
    for f in &header.functions {
        out.push_str(&format!(
            "  {} {}({})\n",
            f.return_type(),
            f.qualified_name(),
            join_params(f.parameters())
        ));
    }

    out.push_str(&format!("\n{} ({})\n", style("Classes").bold(), header.classes.len()));
    for class in &header.classes {
        out.push_str(&format!("  {}\n", class.qualified_name()));
        for method in &class.methods {
            out.push_str(&format!("    - {}\n", method.name()));
        }
    }

    out.push_str(&format!("\n{} ({})\n", style("Events").bold(), header.events.len()));
    for event in &header.events {
        out.push_str(&format!("  {}\n", event.name));
        for field in &event.fields {
            out.push_str(&format!("    {} {}\n", field.ty, field.name));
        }
    }

    let types = header.unique_types();
    if !types.is_empty() {
        out.push_str(&format!("\n{}\n  {}\n", style("Parameter types").bold(), types.join(", ")));
    }
    out
}

fn join_params(params: &[Variable]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing() {
        console::set_colors_enabled(false);
        let source = "namespace Math {\nNF_FUNCTION()\nint Add(int a, int b);\n}\n\
                      NF_EVENT()\nstruct Hit { float damage; };\n";
        let parser = TreeSitterParser::new();
        let header = HeaderParser::new(&parser).parse_source(source).unwrap();

        let listing = render_listing(&header);
        assert!(listing.contains("  Math [15:"));
        assert!(listing.contains("  int Math::Add(int a, int b)"));
        assert!(listing.contains("Events (1)"));
        assert!(listing.contains("    float damage"));
        assert!(listing.contains("Parameter types\n  int"));
    }

    #[test]
    fn test_missing_file() {
        let options = InspectOptions {
            file: PathBuf::from("does/not/exist.h"),
            json: false,
        };
        let err = execute_inspect(options).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.h"));
    }
}
