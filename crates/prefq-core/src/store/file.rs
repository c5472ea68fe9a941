use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::{KeyValueStore, StoreError};

/// Store backed by a single JSON object on disk.
///
/// The whole file is loaded on [`open`](Self::open) and rewritten on every
/// mutation through a temporary sibling file, so an interrupted write leaves
/// the previous contents intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Loads the store at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupted file
    /// is logged and also yields an empty store; it is overwritten by the
    /// next mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(error) => {
                    warn!(path = %path.display(), %error, "store file is corrupted; starting empty");
                    BTreeMap::new()
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file does not exist yet");
                BTreeMap::new()
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read store file; starting empty");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents = serde_json::to_string_pretty(&self.values).map_err(StoreError::Encode)?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);
        fs::write(&tmp_path, contents).map_err(io_error)?;
        fs::rename(&tmp_path, &self.path).map_err(io_error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.values.insert(key.to_owned(), value);
        self.flush().inspect_err(|_| match previous {
            Some(previous) => {
                self.values.insert(key.to_owned(), previous);
            }
            None => {
                self.values.remove(key);
            }
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(previous) = self.values.remove(key) {
            self.flush().inspect_err(|_| {
                self.values.insert(key.to_owned(), previous);
            })?;
        }
        Ok(())
    }
}
