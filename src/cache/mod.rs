//! @acp:module "Generation Cache"
//! @acp:summary "Keyed store of generated node source with a fingerprint manifest"
//! @acp:domain codegen
//! @acp:layer io
//!
//! Generation cache
//!
//! Stores generated source per key as `<dir>/<key>.<extension>`, next to a
//! `manifest.json` that records a SHA-256 fingerprint of the header and
//! generator settings each entry was generated from. Entries are written to a temporary file and
//! renamed into place, so a reader sees either the previous or the complete
//! new content.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{CacheConfig, GeneratorConfig};
use crate::error::Result;

const MANIFEST_FILE: &str = "manifest.json";

/// Manifest record for one cache key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Header the entry was generated from
    pub source: PathBuf,
    /// See [`generation_fingerprint`]
    pub fingerprint: String,
    pub nodes: usize,
    pub generated_at: DateTime<Utc>,
}

/// @acp:summary "Keyed store of generated source text"
/// @acp:lock normal
#[derive(Debug, Clone)]
pub struct GenerationCache {
    dir: PathBuf,
    extension: String,
}

impl GenerationCache {
    /// Open the cache, creating its directory if needed
    pub fn new<P: Into<PathBuf>>(dir: P, extension: &str) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.dir.clone(), &config.extension)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, self.extension))
    }

    pub fn store(&self, key: &str, content: &str) -> Result<()> {
        write_atomic(&self.entry_path(key), content)
    }

    pub fn retrieve(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Store generated content and record where it came from
    pub fn store_generated(
        &self,
        key: &str,
        content: &str,
        source: &Path,
        fingerprint: &str,
        nodes: usize,
    ) -> Result<()> {
        self.store(key, content)?;

        let mut manifest = self.manifest()?;
        manifest.insert(
            key.to_string(),
            CacheEntry {
                source: source.to_path_buf(),
                fingerprint: fingerprint.to_string(),
                nodes,
                generated_at: Utc::now(),
            },
        );
        write_atomic(
            &self.dir.join(MANIFEST_FILE),
            &serde_json::to_string_pretty(&manifest)?,
        )
    }

    /// Whether the entry for `key` was recorded with `fingerprint`
    pub fn is_fresh(&self, key: &str, fingerprint: &str) -> Result<bool> {
        if !self.entry_path(key).is_file() {
            return Ok(false);
        }
        let manifest = self.manifest()?;
        Ok(manifest
            .get(key)
            .is_some_and(|entry| entry.fingerprint == fingerprint))
    }

    /// All manifest records, keyed by cache key
    pub fn manifest(&self) -> Result<BTreeMap<String, CacheEntry>> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Fingerprint of a header's text together with the generator settings that
/// shape its output, so a settings change invalidates every entry
pub fn generation_fingerprint(source_text: &str, generator: &GeneratorConfig) -> String {
    let mut hasher = Sha256::new();
    for part in [
        generator.base_class.as_str(),
        generator.port_namespace.as_str(),
        source_text,
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GenerationCache::new(dir.path().join("gen"), "codegen.cache").unwrap();
        assert!(cache.dir().is_dir());

        assert_eq!(cache.retrieve("Math").unwrap(), None);
        cache.store("Math", "class NODE_Add {};\n").unwrap();
        assert_eq!(
            cache.retrieve("Math").unwrap().as_deref(),
            Some("class NODE_Add {};\n")
        );
        assert!(dir.path().join("gen/Math.codegen.cache").is_file());
        assert!(!dir.path().join("gen/Math.codegen.cache.tmp").exists());
    }

    #[test]
    fn test_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GenerationCache::new(dir.path(), ".cache").unwrap();
        cache.store("k", "old").unwrap();
        cache.store("k", "new").unwrap();
        assert_eq!(cache.retrieve("k").unwrap().as_deref(), Some("new"));
        assert!(cache.entry_path("k").ends_with("k.cache"));
    }

    #[test]
    fn test_freshness() {
        let dir = tempfile::tempdir().unwrap();
        let cache = GenerationCache::new(dir.path(), "codegen.cache").unwrap();
        let header = Path::new("include/Math.h");

        let generator = GeneratorConfig::default();
        let current = generation_fingerprint("int a;", &generator);

        assert!(!cache.is_fresh("Math", &current).unwrap());
        cache
            .store_generated("Math", "generated", header, &current, 1)
            .unwrap();
        assert!(cache.is_fresh("Math", &current).unwrap());
        assert!(!cache
            .is_fresh("Math", &generation_fingerprint("int b;", &generator))
            .unwrap());

        let manifest = cache.manifest().unwrap();
        assert_eq!(manifest["Math"].nodes, 1);
        assert_eq!(manifest["Math"].source, header);
    }

    #[test]
    fn test_generator_settings_change_fingerprint() {
        let default = GeneratorConfig::default();
        let custom = GeneratorConfig {
            base_class: "my::Node".to_string(),
            ..GeneratorConfig::default()
        };
        assert_ne!(
            generation_fingerprint("int a;", &default),
            generation_fingerprint("int a;", &custom)
        );
        assert_eq!(
            generation_fingerprint("int a;", &default),
            generation_fingerprint("int a;", &default)
        );
    }
}
