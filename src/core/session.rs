//! Persisted login session
//!
//! The session is the raw `bdd_users` row kept under [`SESSION_KEY`]. The
//! row includes the password as stored by the backend.

use std::cell::RefCell;

use super::cloud::UserRecord;

pub const SESSION_KEY: &str = "vdb_user";

/// Session storage error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Storage unavailable")]
    Unavailable,

    #[error("Failed to encode session: {0}")]
    Encode(String),
}

/// Where the current user survives page reloads
pub trait SessionStore {
    fn load(&self) -> Option<UserRecord>;
    fn save(&self, user: &UserRecord) -> Result<(), SessionError>;
    fn clear(&self);
}

/// Parses a stored session; corrupted values count as no session
pub fn decode_session(raw: &str) -> Option<UserRecord> {
    serde_json::from_str(raw).ok()
}

pub fn encode_session(user: &UserRecord) -> Result<String, SessionError> {
    serde_json::to_string(user).map_err(|e| SessionError::Encode(e.to_string()))
}

/// Session kept in memory only
#[derive(Debug, Default)]
pub struct MemorySession {
    value: RefCell<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl SessionStore for MemorySession {
    fn load(&self) -> Option<UserRecord> {
        self.value.borrow().as_deref().and_then(decode_session)
    }

    fn save(&self, user: &UserRecord) -> Result<(), SessionError> {
        *self.value.borrow_mut() = Some(encode_session(user)?);
        Ok(())
    }

    fn clear(&self) {
        self.value.borrow_mut().take();
    }
}

/// Session in `window.localStorage`
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSession;

#[cfg(feature = "hydrate")]
impl LocalStorageSession {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(feature = "hydrate")]
impl SessionStore for LocalStorageSession {
    fn load(&self) -> Option<UserRecord> {
        let raw = Self::storage()?.get_item(SESSION_KEY).ok()??;
        decode_session(&raw)
    }

    fn save(&self, user: &UserRecord) -> Result<(), SessionError> {
        let storage = Self::storage().ok_or(SessionError::Unavailable)?;
        storage
            .set_item(SESSION_KEY, &encode_session(user)?)
            .map_err(|_| SessionError::Unavailable)
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(SESSION_KEY);
        }
    }
}
