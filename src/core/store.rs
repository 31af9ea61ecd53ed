//! Token store
//!
//! Durable client-side storage for the session credentials and the cached user.
//! The store is backed by a simple key-value interface mirroring the browser's
//! `localStorage`, so the same logic runs against `localStorage` in the browser,
//! a JSON file on native targets, or memory in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::core::error::{ApiError, Result};
use crate::core::session::{Session, StoredSession, User};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Minimal persistent key-value storage
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

/// Storage persisted as a flat JSON object in a file
///
/// The whole file is rewritten on every change; it only ever holds a handful
/// of keys.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStorage {
    path: std::path::PathBuf,
    lock: Mutex<()>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ApiError::Storage(format!("corrupt session file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ApiError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, items: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ApiError::Storage(format!("failed to create {}: {e}", parent.display())))?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| ApiError::Storage(format!("failed to write {}: {e}", self.path.display())))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Browser `localStorage`
///
/// The storage handle is looked up on every call, so this type holds no
/// JS objects and stays `Send + Sync`.
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| ApiError::Storage("No window".into()))?;
        window
            .local_storage()
            .map_err(|e| ApiError::Storage(format!("Failed to get localStorage: {e:?}")))?
            .ok_or_else(|| ApiError::Storage("localStorage not available".into()))
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| ApiError::Storage(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| ApiError::Storage(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| ApiError::Storage(format!("{e:?}")))
    }
}

/// Owner of the `access_token`, `refresh_token` and `user` keys
///
/// Every compound operation runs under one lock, so readers never observe a
/// half-written or half-cleared session even when requests complete on
/// different threads.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
    lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist a full session, replacing whatever was stored
    ///
    /// If any write fails the store is emptied before the error is returned,
    /// so a new access token is never left paired with a stale or missing
    /// refresh token.
    pub fn set(&self, session: &Session) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result = self.write_session(session);
        if let Err(e) = &result {
            tracing::warn!("Failed to store session, clearing it: {}", e);
            let _ = self.remove_all();
        }
        result
    }

    /// Read all three fields; each may be absent independently
    pub fn get(&self) -> StoredSession {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        StoredSession {
            access_token: self.read(ACCESS_TOKEN_KEY),
            refresh_token: self.read(REFRESH_TOKEN_KEY),
            user: self.read_user(),
        }
    }

    /// Remove all three fields
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.remove_all()
    }

    /// Store a refreshed access token (and the rotated refresh token, if any).
    ///
    /// Returns `false` without writing when no refresh token is stored: the
    /// session was cleared while the refresh was in flight and must stay
    /// cleared.
    pub fn rotate_access_token(&self, access_token: &str, refresh_token: Option<&str>) -> Result<bool> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.read(REFRESH_TOKEN_KEY).is_none() {
            return Ok(false);
        }
        self.storage.set_item(ACCESS_TOKEN_KEY, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.storage.set_item(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(true)
    }

    pub fn access_token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Option<User> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_user()
    }

    /// Presence check only; expiry is discovered by the next 401
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    fn write_session(&self, session: &Session) -> Result<()> {
        let user = session.user.as_ref().map(serde_json::to_string).transpose()?;

        self.storage
            .set_item(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.storage
            .set_item(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        match user {
            Some(user) => self.storage.set_item(USER_KEY, &user),
            None => self.storage.remove_item(USER_KEY),
        }
    }

    fn remove_all(&self) -> Result<()> {
        let mut first_error = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::warn!("Failed to remove {} from storage: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read {} from storage: {}", key, e);
                None
            }
        }
    }

    fn read_user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring corrupt cached user: {}", e);
                None
            }
        }
    }
}
