use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::session::session_models::Session;

/// Sole owner of the current [`Session`], backed by a JSON file so a restart
/// survives. Other components only read; the gateway clears it on an
/// authorization failure.
pub struct SessionStore {
    path: PathBuf,
    slot: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Opens the store, reading any persisted session from `path`.
    ///
    /// A missing file means no session; an unreadable one is discarded with a
    /// warning rather than locking the user out of the tool.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let slot = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!("Discarding unreadable session file: {}", err);
                    None
                }
            },
            Err(_) => None,
        };
        Ok(Self {
            path,
            slot: RwLock::new(slot),
        })
    }

    pub fn get(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }

    /// Stores the session and persists it. Persistence failures are logged,
    /// not propagated; the in-memory slot is always updated.
    pub fn set(&self, session: Session) {
        if let Err(err) = self.persist(&session) {
            tracing::warn!("Failed to persist session: {}", err);
        }
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Forgets the session and removes the persisted entry.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        if self.path.exists() {
            if let Err(err) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove session file: {}", err);
            }
        }
    }

    fn persist(&self, session: &Session) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, json)
    }
}
