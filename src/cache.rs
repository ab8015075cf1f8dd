//! On-disk corner cache.
//!
//! Each source image maps to one JSON file under the work directory, at a
//! path that mirrors the source's position below the training root. An entry
//! is trusted only while it is strictly newer than its source image.

use crate::geometry::CornerSet;
use crate::trace::trace_event;
use crate::util::{SilMatchError, SilMatchResult};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Artifact kind and extension used for cache entries.
pub const CACHE_KIND: &str = "corners";
pub const CACHE_EXT: &str = "corners";

/// Staleness-checked store of extracted corner sets.
#[derive(Clone, Debug)]
pub struct FeatureCache {
    work_dir: PathBuf,
    source_root: Option<PathBuf>,
    force_refresh: bool,
}

impl FeatureCache {
    /// Creates a cache rooted at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>, force_refresh: bool) -> Self {
        Self {
            work_dir: work_dir.into(),
            source_root: None,
            force_refresh,
        }
    }

    /// Mirrors paths relative to `root` (the training directory).
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the work artifact `kind` for `source`.
    ///
    /// The layout is `work_dir/<relative parent>/<file name>-<kind>.<ext>`,
    /// where the relative parent is empty for sources outside the root.
    pub fn work_file(&self, source: &Path, kind: &str, ext: &str) -> PathBuf {
        let mut out = self.work_dir.clone();
        if let (Some(root), Some(parent)) = (&self.source_root, source.parent()) {
            if let Ok(rel) = parent.strip_prefix(root) {
                out.push(rel);
            }
        }
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        out.push(format!("{name}-{kind}.{ext}"));
        out
    }

    /// Cache file path for `source`.
    pub fn cache_path(&self, source: &Path) -> PathBuf {
        self.work_file(source, CACHE_KIND, CACHE_EXT)
    }

    /// Returns true when `cache` may stand in for `source`.
    ///
    /// Requires refresh not forced, the cache file present, and its
    /// modification time strictly after the source's.
    pub fn is_fresh(&self, source: &Path, cache: &Path) -> SilMatchResult<bool> {
        if self.force_refresh {
            return Ok(false);
        }
        let cache_time = match modified(cache) {
            Some(t) => t,
            None => return Ok(false),
        };
        let source_time = fs::metadata(source)
            .and_then(|m| m.modified())
            .map_err(|err| SilMatchError::ImageDecode {
                path: source.to_path_buf(),
                reason: err.to_string(),
            })?;
        Ok(cache_time > source_time)
    }

    /// Returns the cached corners of `source`, or `CacheMiss` when the entry
    /// is missing, stale or refresh is forced.
    pub fn fetch(&self, source: &Path) -> SilMatchResult<CornerSet> {
        let path = self.cache_path(source);
        if !self.is_fresh(source, &path)? {
            trace_event!("cache_miss", fresh = false);
            return Err(SilMatchError::CacheMiss { path });
        }
        let set = self.load(&path)?;
        trace_event!("cache_hit", points = set.len());
        Ok(set)
    }

    /// Reads a cache file. A missing file is a `CacheMiss`.
    pub fn load(&self, path: &Path) -> SilMatchResult<CornerSet> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SilMatchError::CacheMiss {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => return Err(SilMatchError::cache_io(path, err)),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|err| SilMatchError::cache_io(path, err))
    }

    /// Writes `set` to `path`, replacing any existing entry.
    pub fn save(&self, path: &Path, set: &CornerSet) -> SilMatchResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| SilMatchError::cache_io(parent, err))?;
        }
        let file = fs::File::create(path).map_err(|err| SilMatchError::cache_io(path, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, set)
            .map_err(|err| SilMatchError::cache_io(path, err))?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|err| SilMatchError::cache_io(path, err))
    }

    /// Writes the corners of `source` to its cache path.
    pub fn store(&self, source: &Path, set: &CornerSet) -> SilMatchResult<()> {
        self.save(&self.cache_path(source), set)
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::FeatureCache;
    use std::path::{Path, PathBuf};

    #[test]
    fn work_file_mirrors_training_subtree() {
        let cache = FeatureCache::new("/tmp/work", false).with_source_root("/data/train");
        let path = cache.work_file(Path::new("/data/train/square/a.png"), "corners", "corners");
        assert_eq!(path, PathBuf::from("/tmp/work/square/a.png-corners.corners"));
    }

    #[test]
    fn work_file_flattens_outside_sources() {
        let cache = FeatureCache::new("/tmp/work", false).with_source_root("/data/train");
        let path = cache.work_file(Path::new("/elsewhere/query.jpg"), "composite", "png");
        assert_eq!(path, PathBuf::from("/tmp/work/query.jpg-composite.png"));
    }

    #[test]
    fn forced_refresh_is_never_fresh() {
        let cache = FeatureCache::new("/tmp/work", true);
        let fresh = cache
            .is_fresh(Path::new("/nonexistent/a.png"), Path::new("/nonexistent/b"))
            .unwrap();
        assert!(!fresh);
    }
}
