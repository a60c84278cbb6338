//! # Persisted authentication session
//!
//! [`AuthSession`] is the part of the auth state that survives a reload: the
//! logged-in user and the access/refresh token pair. It is written under the
//! `auth-storage` key as `{"state": {...}, "version": 0}`, the envelope the
//! web client has always used, so sessions from older builds keep working.
//!
//! Storage goes through the [`SessionStore`] trait:
//!
//! | Implementation | Platform | Location |
//! |----------------|----------|----------|
//! | [`crate::MemorySessionStore`] | tests | process memory |
//! | [`crate::FileSessionStore`] | desktop | `<data_dir>/kanban/auth-storage.json` |
//! | `LocalStorageStore` | web | `window.localStorage["auth-storage"]` |

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Key (web) and file stem (desktop) of the persisted session.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

const SESSION_VERSION: u32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read or write session: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Tokens and profile kept across restarts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn new(user: User, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Serialize inside the `{"state", "version"}` envelope.
    pub fn to_storage_string(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(&Envelope {
            state: self.clone(),
            version: SESSION_VERSION,
        })?)
    }

    /// Parse the `{"state", "version"}` envelope.
    pub fn from_storage_str(s: &str) -> Result<Self, SessionError> {
        let envelope: Envelope = serde_json::from_str(s)?;
        Ok(envelope.state)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: AuthSession,
    #[serde(default)]
    version: u32,
}

/// Async interface for persisting the session.
pub trait SessionStore {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<AuthSession>, SessionError>>;
    fn save(
        &self,
        session: &AuthSession,
    ) -> impl std::future::Future<Output = Result<(), SessionError>>;
    fn clear(&self) -> impl std::future::Future<Output = Result<(), SessionError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_legacy_envelope() {
        let raw = r#"{"state":{"accessToken":"a.b.c","refreshToken":"r","user":{"id":7,"firstName":"Lu","lastName":"Paz","email":"lu@example.com"}},"version":0}"#;
        let session = AuthSession::from_storage_str(raw).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(7));
        assert_eq!(session.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_storage_string_roundtrip() {
        let user = User {
            id: 1,
            first_name: "Ana".into(),
            email: "ana@example.com".into(),
            ..Default::default()
        };
        let session = AuthSession::new(user, "token".into(), None);
        let text = session.to_storage_string().unwrap();
        assert!(text.contains("\"accessToken\":\"token\""));
        assert_eq!(AuthSession::from_storage_str(&text).unwrap(), session);
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(matches!(
            AuthSession::from_storage_str("not json"),
            Err(SessionError::Malformed(_))
        ));
    }
}
