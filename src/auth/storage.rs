//! Storage port for the persisted session. The session is written as one record
//! keyed `auth-storage`, laid out as `{"state": {...}, "version": 0}`. Writes are
//! always whole-record replacements.

use crate::auth::{state::Session, types::User};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use thiserror::Error;

pub const STORAGE_KEY: &str = "auth-storage";
const STORAGE_VERSION: u32 = 0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is not valid: {0}")]
    Format(#[from] serde_json::Error),
    #[error("unsupported stored session version {0}")]
    Version(u32),
}

/// Durable home of the session. Only the session store calls these.
pub trait SessionStorage: Send + Sync {
    /// Returns the stored session, or `None` when nothing was stored yet.
    ///
    /// # Errors
    /// Returns an error when the record exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// Replaces the stored session.
    ///
    /// # Errors
    /// Returns an error when the record cannot be encoded or written.
    fn save(&self, session: &Session) -> Result<(), StorageError>;
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    is_loading: bool,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// Serializes a session into its persisted record.
///
/// # Errors
/// Returns `StorageError::Format` if serialization fails.
pub fn encode(session: &Session) -> Result<String, StorageError> {
    let envelope = Envelope {
        state: PersistedState {
            user: session.user().cloned(),
            token: session.token().map(str::to_string),
            is_authenticated: session.is_authenticated(),
            is_loading: session.is_loading(),
        },
        version: STORAGE_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Restores a session from its persisted record. The loading flag is transient
/// and always comes back false.
///
/// # Errors
/// Returns an error for malformed records or unknown versions.
pub fn decode(raw: &str) -> Result<Session, StorageError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != STORAGE_VERSION {
        return Err(StorageError::Version(envelope.version));
    }
    let state = envelope.state;
    Ok(Session::restore(state.user, state.token, state.is_authenticated))
}

/// In-process storage, holding the encoded record so reloads go through the
/// same decode path as durable storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw record.
    #[must_use]
    pub fn with_record(raw: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(raw.into())),
        }
    }

    /// The raw record as last written.
    #[must_use]
    pub fn record(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        self.record().as_deref().map(decode).transpose()
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let raw = encode(session)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        Ok(())
    }
}

/// JSON file storage. Writes go to a sibling temp file that is renamed over the
/// record, so a crash never leaves a half-written session behind.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| STORAGE_KEY.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let raw = encode(session)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, raw)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
