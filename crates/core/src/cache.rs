//! Persisted JSON caches.
//!
//! Two files live in the cache directory: the listing metadata and the
//! extracted text collections. Both are keyed by article URL when read back.
//! A file that exists but fails to parse is reported as
//! [`BeanpressError::CacheCorruption`] and never silently replaced.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::article::ArticleTextCollection;
use crate::metadata::ArticleMetadata;
use crate::{BeanpressError, Result};

pub const METADATA_FILE: &str = "article_metadata.json";
pub const COLLECTIONS_FILE: &str = "final_text.json";

/// Platform cache directory for beanpress, or the working directory when the
/// platform has none.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("beanpress"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Reads and writes the caches under one directory.
#[derive(Debug, Clone)]
pub struct ArticleCache {
    dir: PathBuf,
}

impl ArticleCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    pub fn collections_path(&self) -> PathBuf {
        self.dir.join(COLLECTIONS_FILE)
    }

    /// Cached listing metadata, `None` if never saved.
    pub fn load_metadata(&self) -> Result<Option<Vec<ArticleMetadata>>> {
        load_json(&self.metadata_path())
    }

    pub fn save_metadata(&self, metadata: &[ArticleMetadata]) -> Result<()> {
        save_json(&self.metadata_path(), metadata)
    }

    /// Cached text collections, `None` if never saved.
    pub fn load_collections(&self) -> Result<Option<Vec<ArticleTextCollection>>> {
        load_json(&self.collections_path())
    }

    pub fn save_collections(&self, collections: &[ArticleTextCollection]) -> Result<()> {
        save_json(&self.collections_path(), collections)
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "cache miss");
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents)
        .map_err(|source| BeanpressError::CacheCorruption { path: path.to_path_buf(), source })?;

    debug!(path = %path.display(), "cache hit");
    Ok(Some(value))
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;

    debug!(path = %path.display(), "cache written");
    Ok(())
}
