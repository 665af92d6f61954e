//! JSON file store with atomic replace-on-save

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{HomeStore, StoreError};
use crate::homes::{codec, RegistryState};

/// Stores the registry as a single JSON document on disk.
///
/// Saves go to a uniquely named temp file next to the target, are fsynced,
/// then renamed over the target so a crash mid-save never leaves a torn
/// document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "homes.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()))
    }

    /// Move an unreadable document aside so later saves cannot overwrite it.
    /// Returns the new location.
    pub fn move_aside(&self) -> Result<PathBuf, StoreError> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut target = self.path.clone().into_os_string();
        target.push(format!(".corrupt-{}", stamp));
        let target = PathBuf::from(target);

        fs::rename(&self.path, &target).map_err(|e| Self::io_error(&self.path, e))?;
        warn!(
            "Moved corrupt home data {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }
}

impl HomeStore for JsonFileStore {
    fn load(&self) -> Result<RegistryState, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "No home data at {}, starting empty",
                    self.path.display()
                );
                return Ok(RegistryState::default());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        let state = codec::decode(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Loaded {} private homes for {} owners and {} public homes from {}",
            state.private_home_count(),
            state.players.len(),
            state.public.count(),
            self.path.display()
        );
        Ok(state)
    }

    fn save(&self, state: &RegistryState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Self::io_error(parent, e))?;
            }
        }

        let bytes = codec::encode(state)?;
        let temp_path = self.temp_path();

        let written = (|| -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(
                    "Could not remove temp file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(Self::io_error(&self.path, e));
        }

        debug!("Saved {} bytes of home data to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn quarantine(&self) -> Result<Option<PathBuf>, StoreError> {
        self.move_aside().map(Some)
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}
