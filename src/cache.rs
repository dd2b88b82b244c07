use crate::error::{PamError, Result};
use crate::loader::load_and_clean;
use crate::types::NormalizedTable;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PamError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let meta = std::fs::metadata(path).map_err(|e| PamError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Memoizes normalized tables per source file.
///
/// An entry is reused while the file's modification time and length are
/// unchanged; otherwise the file is normalized again. The cache belongs to
/// whoever creates it, nothing is process-global.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, (FileStamp, Arc<NormalizedTable>)>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<NormalizedTable>> {
        let stamp = FileStamp::of(path)?;
        let key = Self::key(path);
        if let Some((cached, table)) = self.entries.get(&key) {
            if *cached == stamp {
                debug!(path = %key.display(), "table cache hit");
                return Ok(Arc::clone(table));
            }
            debug!(path = %key.display(), "source changed, reloading");
        } else {
            debug!(path = %key.display(), "table cache miss");
        }
        let table = Arc::new(load_and_clean(path)?);
        self.entries.insert(key, (stamp, Arc::clone(&table)));
        Ok(table)
    }

    /// Drop the entry for `path`; returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&Self::key(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
