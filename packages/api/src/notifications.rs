//! REST side of the notification feed (`/realtime/notifications*`).
//!
//! The push side lives in [`crate::realtime`]; the two are reconciled in the
//! UI through [`store::NotificationFeed`].

use reqwest::Method;
use serde::{Deserialize, Serialize};
use store::{Notification, NotificationPage};

use crate::{ApiClient, ApiError};

/// Paging and filter options of a history fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FetchOptions {
    pub limit: usize,
    pub offset: usize,
    pub unread_only: bool,
}

impl FetchOptions {
    pub fn page(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            unread_only: false,
        }
    }

    /// Query pairs; zero and `false` values are left out.
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.limit > 0 {
            query.push(("limit", self.limit.to_string()));
        }
        if self.offset > 0 {
            query.push(("offset", self.offset.to_string()));
        }
        if self.unread_only {
            query.push(("unread_only", "true".to_string()));
        }
        query
    }
}

/// Which notifications a bulk mark-read applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkRead {
    All,
    Ids(Vec<String>),
}

#[derive(Serialize)]
struct MarkReadBody<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    all: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct MarkOneReadResponse {
    pub notification: Option<Notification>,
    #[serde(default)]
    pub unread_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadResponse {
    #[serde(default)]
    pub updated_count: usize,
    #[serde(default)]
    pub unread_count: usize,
}

/// Body of `test-push`; every field is optional and filled by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TestPush {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Deserialize)]
struct TestPushResponse {
    notification_id: String,
}

impl ApiClient {
    pub async fn fetch_notifications(
        &self,
        options: FetchOptions,
    ) -> Result<NotificationPage, ApiError> {
        let request = self
            .authorized(Method::GET, "/realtime/notifications")?
            .query(&options.query());
        self.send_json(request).await
    }

    pub async fn mark_one_read(&self, id: &str) -> Result<MarkOneReadResponse, ApiError> {
        let request = self.authorized(
            Method::POST,
            &format!("/realtime/notifications/mark-one-read/{id}"),
        )?;
        self.send_json(request).await
    }

    /// Fails with a validation error, without sending anything, when
    /// `Ids` is empty.
    pub async fn mark_read(&self, target: &MarkRead) -> Result<MarkReadResponse, ApiError> {
        let body = match target {
            MarkRead::All => MarkReadBody {
                all: true,
                ids: &[],
            },
            MarkRead::Ids(ids) if !ids.is_empty() => MarkReadBody { all: false, ids },
            MarkRead::Ids(_) => {
                return Err(ApiError::Validation(
                    "Specify 'all' or provide notification ids".into(),
                ))
            }
        };
        let request = self
            .authorized(Method::POST, "/realtime/notifications/mark-read")?
            .json(&body);
        self.send_json(request).await
    }

    /// Ask the backend to push a test notification to the current user.
    pub async fn send_test(&self, push: &TestPush) -> Result<String, ApiError> {
        let request = self
            .authorized(Method::POST, "/realtime/notifications/test-push")?
            .json(push);
        let response: TestPushResponse = self.send_json(request).await?;
        Ok(response.notification_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_skips_defaults() {
        assert!(FetchOptions::default().query().is_empty());
        let query = FetchOptions {
            limit: 20,
            offset: 0,
            unread_only: true,
        }
        .query();
        assert_eq!(
            query,
            vec![("limit", "20".to_string()), ("unread_only", "true".to_string())]
        );
    }

    #[test]
    fn test_mark_read_body() {
        let ids = vec!["a".to_string()];
        let body = serde_json::to_value(MarkReadBody { all: false, ids: &ids }).unwrap();
        assert_eq!(body, serde_json::json!({"ids": ["a"]}));
        let body = serde_json::to_value(MarkReadBody { all: true, ids: &[] }).unwrap();
        assert_eq!(body, serde_json::json!({"all": true}));
    }
}
