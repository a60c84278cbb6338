//! # Browser `localStorage` session store
//!
//! [`LocalStorageStore`] is the [`SessionStore`] used on the web platform. The
//! session lives under the `auth-storage` key of `window.localStorage`, which
//! is also where the real-time client looks for the access token.
//!
//! Storage access fails in private-browsing modes and sandboxed iframes; those
//! failures surface as [`SessionError::Unavailable`] and the app simply starts
//! logged out.

use crate::session::{AuthSession, SessionError, SessionStore, SESSION_STORAGE_KEY};

#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage, SessionError> {
        let window =
            web_sys::window().ok_or_else(|| SessionError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|_| SessionError::Unavailable("localStorage access denied".to_string()))?
            .ok_or_else(|| SessionError::Unavailable("localStorage missing".to_string()))
    }
}

impl SessionStore for LocalStorageStore {
    async fn load(&self) -> Result<Option<AuthSession>, SessionError> {
        let raw = Self::storage()?
            .get_item(SESSION_STORAGE_KEY)
            .map_err(|_| SessionError::Unavailable("localStorage read failed".to_string()))?;
        match raw {
            Some(raw) => Ok(Some(AuthSession::from_storage_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        let raw = session.to_storage_string()?;
        Self::storage()?
            .set_item(SESSION_STORAGE_KEY, &raw)
            .map_err(|_| SessionError::Unavailable("localStorage write failed".to_string()))
    }

    async fn clear(&self) -> Result<(), SessionError> {
        Self::storage()?
            .remove_item(SESSION_STORAGE_KEY)
            .map_err(|_| SessionError::Unavailable("localStorage write failed".to_string()))
    }
}
