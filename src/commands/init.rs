//! @acp:module "Init Command"
//! @acp:summary "Write a default nodegen configuration"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `nodegen init`, which writes a default project configuration.

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;

use crate::config::{Config, CONFIG_FILE};

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Where to write the config
    pub path: PathBuf,
    /// Overwrite an existing config
    pub force: bool,
    /// Include patterns replacing the defaults
    pub include: Vec<String>,
    /// Cache directory override
    pub cache_dir: Option<PathBuf>,
    /// Number of parallel workers
    pub workers: Option<usize>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(CONFIG_FILE),
            force: false,
            include: Vec::new(),
            cache_dir: None,
            workers: None,
        }
    }
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    if options.path.exists() && !options.force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            options.path.display()
        );
    }

    let mut config = Config::default();
    if !options.include.is_empty() {
        config.include = options.include;
    }
    if let Some(dir) = options.cache_dir {
        config.cache.dir = dir;
    }
    config.workers = options.workers;
    config.validate()?;

    config.save(&options.path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.path.display()
    );
    Ok(())
}
