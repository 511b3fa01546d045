use super::backend::{LoadOutcome, StorageBackend};
use crate::error::{Result, StoreError};
use crate::model::{check_record, validate_list_id, List};
use crate::ordering::reorder_in_place;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_FILE_EXT: &str = ".json";

const TMP_SUFFIX: &str = ".tmp";

/// Directory-backed storage: one `<list id><ext>` file per list.
pub struct FsBackend {
    root: PathBuf,
    file_ext: String,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_ext: DEFAULT_FILE_EXT.to_string(),
        }
    }

    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    /// Path of the record file for `id`.
    pub fn list_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, self.file_ext))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(StoreError::Io)?;
        }
        Ok(())
    }

    fn is_tmp_file(name: &str) -> bool {
        name.starts_with('.') && name.ends_with(TMP_SUFFIX)
    }

    /// Returns the id encoded in `name` if it is a record file.
    fn record_stem<'a>(&self, name: &'a str) -> Option<&'a str> {
        if name.starts_with('.') {
            return None;
        }
        name.strip_suffix(self.file_ext.as_str())
            .filter(|stem| !stem.is_empty())
    }

    /// Deletes leftover temp files. A file that cannot be removed is logged
    /// and left for the next sweep; it never hides the records beside it.
    fn sweep_stale(&self, stale: &[PathBuf]) -> usize {
        let mut removed = 0;
        for path in stale {
            match fs::remove_file(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "removed stale temp file");
                    removed += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not remove stale temp file");
                }
            }
        }
        removed
    }

    fn read_record(&self, path: &Path, stem: &str) -> Result<List> {
        let content = fs::read_to_string(path).map_err(StoreError::Io)?;
        let parse_err = |message: String| StoreError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut list: List =
            serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
        if list.id != stem {
            return Err(parse_err(format!(
                "record id `{}` does not match file name",
                list.id
            )));
        }
        check_record(&list).map_err(parse_err)?;
        reorder_in_place(&mut list.items);
        Ok(list)
    }
}

impl StorageBackend for FsBackend {
    fn ensure_ready(&self) -> Result<()> {
        self.ensure_dir()?;

        // Sweep leftovers of writes that died between write and rename.
        let mut stale = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(StoreError::Io)? {
            let entry = entry.map_err(StoreError::Io)?;
            let path = entry.path();
            let is_stale = path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(Self::is_tmp_file);
            if is_stale && path.is_file() {
                stale.push(path);
            }
        }
        self.sweep_stale(&stale);
        Ok(())
    }

    fn load_all(&self) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();
        if !self.root.exists() {
            return Ok(outcome);
        }

        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(StoreError::Io)? {
            let entry = entry.map_err(StoreError::Io)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(stem) = self.record_stem(name) {
                candidates.push((stem.to_string(), path.clone()));
            }
        }
        candidates.sort();

        for (stem, path) in candidates {
            match self.read_record(&path, &stem) {
                Ok(list) => outcome.lists.push(list),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable list file");
                    outcome.failures.push(err);
                }
            }
        }
        Ok(outcome)
    }

    fn save(&self, list: &List) -> Result<()> {
        validate_list_id(&list.id)?;
        self.ensure_dir()?;

        let target_path = self.list_path(&list.id);
        let content = serde_json::to_string_pretty(list).map_err(StoreError::Serialization)?;

        // Atomic Write
        let tmp_path = self
            .root
            .join(format!(".{}-{}{}", list.id, Uuid::new_v4(), TMP_SUFFIX));
        if let Err(err) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io(err));
        }
        if let Err(err) = fs::rename(&tmp_path, &target_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io(err));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<()> {
        validate_list_id(id)?;
        match fs::remove_file(self.list_path(id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::list_not_found(id))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}
