//! @acp:module "Batch Processing"
//! @acp:summary "Parallel multi-header parsing with per-file failure reports"
//! @acp:domain codegen
//! @acp:layer service
//!
//! Multi-header processing
//!
//! Headers share no state, so they are parsed in parallel with rayon. A
//! failing header is recorded in the report and the rest continue; within a
//! header, a function whose node cannot be generated is skipped without
//! affecting its siblings.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::codegen::{FunctionNodeGenerator, GeneratedNode};
use crate::config::Config;
use crate::declaration::DeclarationParser;
use crate::error::{ErrorKind, NodegenError, Result};
use crate::header::{HeaderParser, ParsedHeader};

/// A header that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of parsing a set of headers
#[derive(Debug, Default)]
pub struct BatchReport {
    pub headers: Vec<ParsedHeader>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A function left out of a generated module
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFunction {
    pub function: String,
    pub message: String,
}

/// Generated nodes for one header
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedModule {
    /// Cache key (header file stem)
    pub key: String,
    pub source: Option<PathBuf>,
    pub nodes: Vec<GeneratedNode>,
    pub skipped: Vec<SkippedFunction>,
}

impl GeneratedModule {
    /// Full text of the module as stored in the cache
    pub fn render(&self) -> String {
        let origin = self
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.key.clone());

        let mut out = format!("// Generated by nodegen from {}. Do not edit.\n", origin);
        for node in &self.nodes {
            out.push('\n');
            out.push_str(&node.source());
        }
        out
    }
}

/// Expand files and directories into the list of headers to process.
///
/// Files named explicitly are always kept; directories are walked and
/// filtered by the include/exclude patterns relative to the directory.
pub fn discover_headers(roots: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for root in roots {
        if root.is_file() {
            found.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            return Err(NodegenError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", root.display()),
            )));
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if config.matches(relative) {
                found.push(entry.path().to_path_buf());
            }
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

/// @acp:summary "Parse every header in parallel, collecting per-file failures"
///
///
/// `on_done` is called once per header as it finishes, from worker threads.
pub fn parse_headers<F>(
    paths: &[PathBuf],
    parser: &dyn DeclarationParser,
    workers: Option<usize>,
    on_done: F,
) -> Result<BatchReport>
where
    F: Fn(&Path) + Sync,
{
    let run = || -> Vec<(PathBuf, Result<ParsedHeader>)> {
        paths
            .par_iter()
            .map(|path| {
                let result = HeaderParser::new(parser).parse_file(path);
                on_done(path);
                (path.clone(), result)
            })
            .collect()
    };

    let results = match workers {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| NodegenError::Config(format!("failed to start worker pool: {}", e)))?
            .install(run),
        None => run(),
    };

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(header) => report.headers.push(header),
            Err(err) => {
                tracing::warn!("Failed to process {}: {}", path.display(), err);
                report.failures.push(FileFailure {
                    path,
                    kind: err.kind(),
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Generate nodes for every function of a header, skipping ones that fail
pub fn generate_module(header: &ParsedHeader, generator: &FunctionNodeGenerator) -> GeneratedModule {
    let mut nodes = Vec::new();
    let mut skipped = Vec::new();

    for function in &header.functions {
        match generator.generate(function) {
            Ok(node) => nodes.push(node),
            Err(err) => {
                tracing::warn!("Skipping {}: {}", function.qualified_name(), err);
                skipped.push(SkippedFunction {
                    function: function.qualified_name(),
                    message: err.to_string(),
                });
            }
        }
    }

    GeneratedModule {
        key: header.module_name(),
        source: header.path.clone(),
        nodes,
        skipped,
    }
}
