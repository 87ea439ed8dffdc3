//! @acp:module "Generate Command"
//! @acp:summary "Generate node classes for annotated headers"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `nodegen generate`: parse headers, build node classes for every
//! annotated function and write them to the generation cache.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{discover_headers, generate_module, parse_headers};
use crate::cache::{generation_fingerprint, GenerationCache};
use crate::codegen::FunctionNodeGenerator;
use crate::config::Config;
use crate::declaration::TreeSitterParser;

/// Options for the generate command
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Header files or directories to scan
    pub paths: Vec<PathBuf>,
    /// Print generated source instead of writing the cache
    pub stdout: bool,
    /// Skip headers whose cache entry is up to date
    pub incremental: bool,
    /// Hide the progress bar
    pub quiet: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            stdout: false,
            incremental: false,
            quiet: false,
        }
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub headers: usize,
    pub written: usize,
    pub unchanged: usize,
    pub nodes: usize,
    pub skipped_functions: usize,
    pub failed: usize,
}

/// Execute the generate command
pub fn execute_generate(options: GenerateOptions, config: &Config) -> Result<GenerateSummary> {
    let paths = discover_headers(&options.paths, config)?;
    if paths.is_empty() {
        eprintln!("{} No headers found matching include patterns", style("✗").red());
        for pattern in &config.include {
            eprintln!("    include: {}", pattern);
        }
        bail!("nothing to generate");
    }

    let progress = if options.quiet || options.stdout {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(paths.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let parser = TreeSitterParser::new();
    let report = parse_headers(&paths, &parser, config.workers, |path| {
        progress.set_message(path.display().to_string());
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    let cache = GenerationCache::from_config(&config.cache)?;
    let generator = FunctionNodeGenerator::new(&config.generator);
    let mut summary = GenerateSummary {
        headers: paths.len(),
        failed: report.failures.len(),
        ..Default::default()
    };
    let mut keys: HashMap<String, PathBuf> = HashMap::new();

    // Cache writes stay on this thread so manifest updates never race.
    for header in &report.headers {
        let key = header.module_name();
        let Some(path) = header.path.clone() else {
            continue;
        };
        if let Some(previous) = keys.insert(key.clone(), path.clone()) {
            eprintln!(
                "{} {} and {} share cache key '{}'; the later one wins",
                style("⚠").yellow(),
                previous.display(),
                path.display(),
                key
            );
        }

        let fingerprint = generation_fingerprint(&header.source, &config.generator);
        if options.incremental && !options.stdout && cache.is_fresh(&key, &fingerprint)? {
            tracing::debug!("{} is up to date", path.display());
            summary.unchanged += 1;
            continue;
        }

        let module = generate_module(header, &generator);
        summary.nodes += module.nodes.len();
        summary.skipped_functions += module.skipped.len();
        for skipped in &module.skipped {
            eprintln!(
                "{} {}: skipped {}: {}",
                style("⚠").yellow(),
                path.display(),
                skipped.function,
                skipped.message
            );
        }

        if options.stdout {
            print!("{}", module.render());
        } else {
            cache.store_generated(&key, &module.render(), &path, &fingerprint, module.nodes.len())?;
            summary.written += 1;
        }
    }

    for failure in &report.failures {
        eprintln!(
            "{} {} [{}]: {}",
            style("✗").red(),
            failure.path.display(),
            failure.kind,
            failure.message
        );
    }

    if !options.stdout {
        println!(
            "{} {} nodes from {} headers ({} written, {} unchanged) in {}",
            style("✓").green(),
            summary.nodes,
            summary.headers - summary.failed,
            summary.written,
            summary.unchanged,
            cache.dir().display()
        );
    }

    if report.has_failures() {
        bail!("{} of {} headers failed", summary.failed, summary.headers);
    }
    Ok(summary)
}
