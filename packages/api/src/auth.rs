//! Login, registration and token refresh against `/auth/*`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use store::{AuthSession, User};

use crate::{ApiClient, ApiError};

const MIN_PASSWORD_LEN: usize = 8;

/// Body returned by `/auth/login` and `/auth/register`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "usuario", alias = "user")]
    user: Option<User>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Option<AuthSession> {
        Some(AuthSession::new(
            self.user?,
            self.access_token?,
            self.refresh_token,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(rename = "usuario", alias = "user")]
    user: User,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Sign-up form, validated before it is sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(ApiError::Validation("All fields are required".into()));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(ApiError::Validation("Passwords do not match".into()));
        }
        Ok(())
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    }
    validate_email(email)?;
    validate_password(password)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.contains('@') {
        Ok(())
    } else {
        Err(ApiError::Validation("Please enter a valid email".into()))
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}

impl ApiClient {
    /// `POST /auth/login`. Validates the form locally first.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        validate_login(email, password)?;
        let request = self
            .anonymous(Method::POST, "/auth/login")
            .json(&Credentials {
                email: email.trim(),
                password,
            });
        let response: TokenResponse = self.send_json(request).await?;
        let session = response.into_session().ok_or_else(|| {
            ApiError::Validation("Login response did not include credentials".into())
        })?;
        tracing::info!(user_id = session.user_id(), "logged in");
        Ok(session)
    }

    /// `POST /auth/register`. Returns a session when the backend logs the new
    /// user in straight away.
    pub async fn register(&self, form: &RegisterForm) -> Result<Option<AuthSession>, ApiError> {
        form.validate()?;
        let request = self.anonymous(Method::POST, "/auth/register").json(form);
        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.into_session())
    }

    /// `POST /auth/refresh` with the refresh token as bearer. Returns a new
    /// access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request = self
            .anonymous(Method::POST, "/auth/refresh")
            .bearer_auth(refresh_token);
        let response: RefreshResponse = self.send_json(request).await?;
        Ok(response.access_token)
    }

    /// `GET /auth/me`: profile of the token's owner.
    pub async fn me(&self) -> Result<User, ApiError> {
        let request = self.authorized(Method::GET, "/auth/me")?;
        let response: MeResponse = self.send_json(request).await?;
        Ok(response.user)
    }

    /// Refresh the access token and re-read the profile. The refreshed
    /// session keeps the original refresh token.
    pub async fn restore_session(&self, session: &AuthSession) -> Result<AuthSession, ApiError> {
        let refresh_token = session
            .refresh_token
            .as_deref()
            .ok_or(ApiError::MissingToken)?;
        let access_token = self.refresh(refresh_token).await?;
        let authed = self.clone().with_token(Some(access_token.clone()));
        let user = match authed.me().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("profile reload after refresh failed: {e}");
                session.user.clone()
            }
        };
        Ok(AuthSession {
            user,
            access_token: Some(access_token),
            refresh_token: session.refresh_token.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_validation() {
        assert!(validate_login("", "password1").is_err());
        assert!(validate_login("no-at-sign", "password1").is_err());
        assert!(validate_login("a@b.c", "short").is_err());
        assert!(validate_login("a@b.c", "longenough").is_ok());
    }

    #[test]
    fn test_register_validation() {
        let mut form = RegisterForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "analytical".into(),
            confirm_password: "analytical".into(),
        };
        assert!(form.validate().is_ok());

        form.confirm_password = "different".into();
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");

        form.last_name = "  ".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "All fields are required");
    }

    #[test]
    fn test_register_form_wire_format() {
        let form = RegisterForm {
            first_name: "Ada".into(),
            last_name: "L".into(),
            email: "ada@example.com".into(),
            password: "secret123".into(),
            confirm_password: "secret123".into(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert!(json.get("confirmPassword").is_none());
    }
}
