use std::sync::{Arc, Mutex};

use crate::session::{AuthSession, SessionError, SessionStore};

/// In-memory SessionStore for testing.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, SessionError> {
        self.session
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, SessionError> {
        match self.slot()?.as_deref() {
            Some(raw) => Ok(Some(AuthSession::from_storage_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        let raw = session.to_storage_string()?;
        *self.slot()? = Some(raw);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.slot()? = None;
        Ok(())
    }
}
