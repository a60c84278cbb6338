//! Authentication context and hooks for the UI.
//!
//! [`AuthProvider`] restores the persisted session on mount (refreshing the
//! access token when a refresh token is available) and exposes it as a
//! `Signal<AuthState>`. [`Backend`] pairs that signal with an [`ApiClient`]
//! so views can make authenticated calls and react to expired tokens.

use api::{ApiClient, ApiError, RegisterForm};
use dioxus::prelude::*;
use store::{AuthSession, SessionStore, User};

use crate::config::use_client_config;
use crate::session_store::session_store;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub session: AuthSession,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            session: AuthSession::default(),
            loading: true,
        }
    }
}

impl AuthState {
    fn ready(session: AuthSession) -> Self {
        Self {
            session,
            loading: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.session.user_id()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.access_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Handle for backend calls made on behalf of the signed-in user.
#[derive(Clone, Copy)]
pub struct Backend {
    client: Signal<ApiClient>,
    auth: Signal<AuthState>,
}

pub fn use_backend() -> Backend {
    use_context::<Backend>()
}

impl Backend {
    /// Client carrying the current access token.
    pub fn client(&self) -> ApiClient {
        let token = self.auth.peek().session.access_token.clone();
        self.client.peek().clone().with_token(token)
    }

    pub fn auth(&self) -> Signal<AuthState> {
        self.auth
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let client = self.client.peek().clone();
        let session = client.login(email, password).await?;
        self.persist(&session).await;
        let mut auth = self.auth;
        auth.set(AuthState::ready(session));
        Ok(())
    }

    /// Returns `true` when the backend signed the new user in.
    pub async fn register(&self, form: &RegisterForm) -> Result<bool, ApiError> {
        let client = self.client.peek().clone();
        match client.register(form).await? {
            Some(session) => {
                self.persist(&session).await;
                let mut auth = self.auth;
                auth.set(AuthState::ready(session));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn logout(&self) {
        if let Err(e) = session_store().clear().await {
            tracing::warn!("could not clear stored session: {e}");
        }
        let mut auth = self.auth;
        auth.set(AuthState::ready(AuthSession::default()));
        tracing::info!("logged out");
    }

    /// Message to show for a failed call. An expired or rejected token signs
    /// the user out, which sends the layout back to the login page.
    pub fn handle_error(&self, error: &ApiError) -> String {
        if error.is_token_expired() && self.auth.peek().is_authenticated() {
            tracing::warn!("session expired: {error}");
            let backend = *self;
            spawn(async move { backend.logout().await });
            return "Your session has expired. Please sign in again.".to_string();
        }
        error.to_string()
    }

    async fn persist(&self, session: &AuthSession) {
        if let Err(e) = session_store().save(session).await {
            tracing::warn!("could not persist session: {e}");
        }
    }
}

/// Restore a stored session, refreshing its access token when possible.
///
/// A rejected refresh drops the session; any other failure keeps the stored
/// tokens so an offline start does not log the user out.
async fn restore(client: ApiClient) -> AuthSession {
    let store = session_store();
    let stored = match store.load().await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("ignoring unreadable stored session: {e}");
            None
        }
    };
    let Some(stored) = stored else {
        return AuthSession::default();
    };
    if stored.refresh_token.is_none() {
        return stored;
    }
    match client.restore_session(&stored).await {
        Ok(fresh) => {
            if let Err(e) = store.save(&fresh).await {
                tracing::warn!("could not persist refreshed session: {e}");
            }
            fresh
        }
        Err(e) if e.is_token_expired() => {
            tracing::info!("stored session rejected, signing out: {e}");
            if let Err(e) = store.clear().await {
                tracing::warn!("could not clear stored session: {e}");
            }
            AuthSession::default()
        }
        Err(e) => {
            tracing::warn!("could not refresh session, keeping stored tokens: {e}");
            stored
        }
    }
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let config = use_client_config();
    let mut auth_state = use_context_provider(|| Signal::new(AuthState::default()));
    let client = use_signal(|| ApiClient::from_config(&config));
    use_context_provider(|| Backend {
        client,
        auth: auth_state,
    });

    // Restore the persisted session on mount
    let _ = use_resource(move || async move {
        let client = client.peek().clone();
        let session = restore(client).await;
        if let Some(user_id) = session.user_id() {
            tracing::info!(user_id, "session restored");
        }
        auth_state.set(AuthState::ready(session));
    });

    rsx! {
        {children}
    }
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Log out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let backend = use_backend();

    let onclick = move |_| async move {
        backend.logout().await;
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
