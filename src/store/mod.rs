//! Durable storage for the home registry
//!
//! The registry itself never does I/O. A [`HomeStore`] loads state once at
//! startup and the [`FlushScheduler`] saves dirty snapshots in the background.

mod file;
pub mod flush;

use std::path::PathBuf;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{error, warn};

use crate::homes::{codec, CodecError, RegistryState};

pub use file::JsonFileStore;
pub use flush::FlushScheduler;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt home data in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("background save task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

/// Backend that can load and save the full registry state
pub trait HomeStore: Send + Sync {
    /// Load persisted state. A store with nothing saved yet returns the
    /// empty state.
    fn load(&self) -> Result<RegistryState, StoreError>;

    /// Persist a full snapshot, replacing whatever was stored before
    fn save(&self, state: &RegistryState) -> Result<(), StoreError>;

    /// Move unreadable stored data out of the way so the next save does
    /// not overwrite it. Returns where it went, if anywhere.
    fn quarantine(&self) -> Result<Option<PathBuf>, StoreError> {
        Ok(None)
    }

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Result of loading the registry at startup
#[derive(Debug, Default)]
pub struct LoadReport {
    pub state: RegistryState,
    /// Set when the stored document was corrupt and the registry started empty
    pub recovered_from: Option<StoreError>,
    /// Where the corrupt document was moved to
    pub quarantined: Option<PathBuf>,
}

/// Load the registry, failing closed on a corrupt document.
///
/// A corrupt document is logged with the raw parser error, quarantined,
/// and replaced by an empty registry; the error is reported back in the
/// [`LoadReport`]. Any other failure (e.g. permission denied) is returned
/// as an error, since saving over unreadable data would lose it.
pub fn load_fail_closed(store: &dyn HomeStore) -> Result<LoadReport, StoreError> {
    match store.load() {
        Ok(state) => Ok(LoadReport {
            state,
            ..Default::default()
        }),
        Err(e) if e.is_corrupt() => {
            error!("Home data in {} is unreadable: {:?}", store.describe(), e);
            let quarantined = store.quarantine()?;
            warn!("Starting with an empty home registry");
            Ok(LoadReport {
                state: RegistryState::default(),
                recovered_from: Some(e),
                quarantined,
            })
        }
        Err(e) => Err(e),
    }
}

/// In-process store holding the last encoded document.
///
/// Used when no data path is configured, and by tests. Saving still goes
/// through the codec so behaviour matches the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Vec<u8>>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw document
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Mutex::new(Some(bytes.into())),
            saves: Mutex::new(0),
        }
    }

    /// Raw bytes of the last saved document
    pub fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl HomeStore for MemoryStore {
    fn load(&self) -> Result<RegistryState, StoreError> {
        match self.document.lock().as_deref() {
            Some(bytes) => codec::decode(bytes).map_err(|source| StoreError::Corrupt {
                path: PathBuf::from("<memory>"),
                source,
            }),
            None => Ok(RegistryState::default()),
        }
    }

    fn save(&self, state: &RegistryState) -> Result<(), StoreError> {
        let bytes = codec::encode(state)?;
        *self.document.lock() = Some(bytes);
        *self.saves.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}
