//! # Filesystem-backed session store
//!
//! [`FileSessionStore`] keeps the session as a single JSON file. It is used on
//! desktop to stay logged in across app restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! └── auth-storage.json      # {"state": {...}, "version": 0}
//! ```
//!
//! ## Platform data directories
//!
//! Use `dirs::data_dir()` to obtain a platform-appropriate base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/kanban/` |
//! | Linux | `~/.local/share/kanban/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\kanban\` |

use std::path::PathBuf;

use crate::session::{AuthSession, SessionError, SessionStore, SESSION_STORAGE_KEY};

/// Filesystem-backed SessionStore for desktop persistence.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    base: PathBuf,
}

impl FileSessionStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn session_path(&self) -> PathBuf {
        self.base.join(format!("{SESSION_STORAGE_KEY}.json"))
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<AuthSession>, SessionError> {
        match std::fs::read_to_string(self.session_path()) {
            Ok(raw) => Ok(Some(AuthSession::from_storage_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::write(self.session_path(), session.to_storage_string()?)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("kanban");

        let store = FileSessionStore::new(base.clone());
        assert!(store.load().await.unwrap().is_none());

        let session = AuthSession::new(
            User {
                id: 11,
                first_name: "Sam".into(),
                ..Default::default()
            },
            "access".into(),
            None,
        );
        store.save(&session).await.unwrap();

        // Re-open from same directory
        let reopened = FileSessionStore::new(base);
        assert_eq!(reopened.load().await.unwrap(), Some(session));

        reopened.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("auth-storage.json"), "{").unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        assert!(matches!(store.load().await, Err(SessionError::Malformed(_))));
    }
}
