//! Image resolution.
//!
//! Image nodes name a file the way `\includegraphics` does: relative to the
//! document, to one of the `\graphicspath` entries, and usually without an
//! extension. [`FsImageResolver`] searches those locations and caches hits in
//! a shared map so slides composited in parallel reuse lookups.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{CompositeError, CompositeResult};

/// Extensions tried after the bare name, in order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "pdf", "eps"];

/// Maps an image name to a file.
pub trait ImageResolver: Send + Sync {
    /// Resolve `name`, or fail with [`CompositeError::ImageNotFound`].
    fn resolve(&self, name: &str) -> CompositeResult<PathBuf>;
}

// =============================================================================
// FsImageResolver
// =============================================================================

/// Shared name → path cache.
#[derive(Clone, Default)]
pub struct ImageCache {
    inner: Arc<RwLock<FxHashMap<CompactString, PathBuf>>>,
}

impl ImageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached path for a name.
    pub fn get(&self, name: &str) -> Option<PathBuf> {
        self.inner.read().get(name).cloned()
    }

    /// Remember a resolved path.
    pub fn insert(&self, name: &str, path: PathBuf) {
        self.inner.write().insert(CompactString::new(name), path);
    }

    /// Number of cached names.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Resolver searching the file system.
#[derive(Clone)]
pub struct FsImageResolver {
    base_dir: PathBuf,
    search_paths: Vec<PathBuf>,
    cache: ImageCache,
}

impl FsImageResolver {
    /// Search `base_dir` only.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            search_paths: Vec::new(),
            cache: ImageCache::new(),
        }
    }

    /// Add `\graphicspath` entries (relative ones are joined to the base directory).
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        for path in paths {
            let path = if path.is_absolute() {
                path
            } else {
                self.base_dir.join(path)
            };
            if !self.search_paths.contains(&path) {
                self.search_paths.push(path);
            }
        }
        self
    }

    /// Share a cache with other resolvers.
    pub fn with_cache(mut self, cache: ImageCache) -> Self {
        self.cache = cache;
        self
    }

    /// Directories searched, in order.
    pub fn directories(&self) -> Vec<PathBuf> {
        std::iter::once(self.base_dir.clone())
            .chain(self.search_paths.iter().cloned())
            .collect()
    }

    fn probe(dir: &Path, name: &str) -> Option<PathBuf> {
        let bare = dir.join(name);
        if bare.is_file() {
            return Some(bare);
        }
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|candidate| candidate.is_file())
    }
}

impl ImageResolver for FsImageResolver {
    fn resolve(&self, name: &str) -> CompositeResult<PathBuf> {
        if let Some(path) = self.cache.get(name) {
            return Ok(path);
        }

        let directories = self.directories();
        let found = if Path::new(name).is_absolute() {
            Self::probe(Path::new(""), name)
        } else {
            directories.iter().find_map(|dir| Self::probe(dir, name))
        };

        match found {
            Some(path) => {
                log::trace!("image {name:?} -> {}", path.display());
                self.cache.insert(name, path.clone());
                Ok(path)
            }
            None => Err(CompositeError::ImageNotFound {
                name: name.to_string(),
                searched: directories,
            }),
        }
    }
}

// =============================================================================
// MemoryImageResolver
// =============================================================================

/// Resolver over a fixed name → path table.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageResolver {
    images: FxHashMap<CompactString, PathBuf>,
}

impl MemoryImageResolver {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image.
    pub fn with_image(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.images.insert(CompactString::new(name), path.into());
        self
    }
}

impl ImageResolver for MemoryImageResolver {
    fn resolve(&self, name: &str) -> CompositeResult<PathBuf> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| CompositeError::ImageNotFound {
                name: name.to_string(),
                searched: Vec::new(),
            })
    }
}
