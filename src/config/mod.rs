//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Project configuration
//!
//! Loaded from `.nodegen.config.json`. Every field has a default, so a
//! partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{NodegenError, Result};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = ".nodegen.config.json";

/// @acp:summary "Main nodegen configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Header patterns to include (glob syntax)
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Patterns to exclude (glob syntax)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Generation cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Node generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Number of parallel workers (defaults to one per core)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            cache: CacheConfig::default(),
            generator: GeneratorConfig::default(),
            workers: None,
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(NodegenError::Config("workers must be at least 1".to_string()));
        }
        if self.cache.extension.trim_matches('.').is_empty() {
            return Err(NodegenError::Config("cache extension must not be empty".to_string()));
        }
        for pattern in self.include.iter().chain(&self.exclude) {
            Pattern::new(pattern)?;
        }
        Ok(())
    }

    /// Whether `path` matches an include pattern and no exclude pattern
    pub fn matches(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        let path = path.trim_start_matches("./");
        let any = |patterns: &[String]| {
            patterns
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .any(|p| p.matches(path))
        };
        any(&self.include) && !any(&self.exclude)
    }
}

fn default_include() -> Vec<String> {
    vec![
        "**/*.h".to_string(),
        "**/*.hh".to_string(),
        "**/*.hpp".to_string(),
        "**/*.hxx".to_string(),
    ]
}

fn default_exclude() -> Vec<String> {
    vec![
        // Build outputs
        "**/build/**".to_string(),
        "**/cmake-build-*/**".to_string(),
        "**/out/**".to_string(),
        // Vendored code
        "**/3rdparty/**".to_string(),
        "**/third_party/**".to_string(),
        // Generated output
        "**/.codegencache/**".to_string(),
        // VCS
        "**/.git/**".to_string(),
    ]
}

/// Generation cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cached generated sources
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Extension appended to each cache key
    #[serde(default = "default_cache_extension")]
    pub extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            extension: default_cache_extension(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".codegencache")
}

fn default_cache_extension() -> String {
    "codegen.cache".to_string()
}

/// Node generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base class every generated node derives from
    #[serde(default = "default_base_class")]
    pub base_class: String,

    /// Namespace of the `InputPort`/`OutputPort` templates
    #[serde(default = "default_port_namespace")]
    pub port_namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_class: default_base_class(),
            port_namespace: default_port_namespace(),
        }
    }
}

fn default_base_class() -> String {
    "nf::FlowNode".to_string()
}

fn default_port_namespace() -> String {
    "nf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"generator": {"base_class": "my::Node"}}"#).unwrap();
        assert_eq!(config.generator.base_class, "my::Node");
        assert_eq!(config.generator.port_namespace, "nf");
        assert_eq!(config.cache.extension, "codegen.cache");
        assert_eq!(config.include, default_include());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.workers = Some(2);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.workers, Some(2));
        assert_eq!(loaded.cache.dir, PathBuf::from(".codegencache"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.json")).unwrap();
        assert!(config.workers.is_none());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.exclude.push("[".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_matches() {
        let config = Config::default();
        assert!(config.matches(Path::new("src/math/Add.h")));
        assert!(config.matches(Path::new("./Add.hpp")));
        assert!(!config.matches(Path::new("src/math/Add.cpp")));
        assert!(!config.matches(Path::new("src/3rdparty/json.hpp")));
    }
}
