use reqwest::Method;
use serde::Deserialize;
use store::User;

use crate::{ApiClient, ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub users: Vec<User>,
}

impl ApiClient {
    /// `GET /board/users/search?q=`.
    pub async fn search_users(&self, query: &str) -> Result<UserSearch, ApiError> {
        let request = self
            .authorized(Method::GET, "/board/users/search")?
            .query(&[("q", query.trim())]);
        self.send_json(request).await
    }

    /// Search and keep only an exact (case-insensitive) email match.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ApiError::Validation("Enter an email to search".into()));
        }
        let found = self.search_users(email).await?;
        Ok(found
            .users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }
}
