use reqwest::Method;
use serde::{Deserialize, Serialize};
use store::Tag;

use crate::{ApiClient, ApiError};

#[derive(Deserialize)]
struct TagItems {
    #[serde(default)]
    items: Vec<Tag>,
}

#[derive(Deserialize)]
struct TagEnvelope {
    tag: Tag,
}

#[derive(Serialize)]
struct NewTag<'a> {
    name: &'a str,
}

impl ApiClient {
    pub async fn all_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let request = self.authorized(Method::GET, "/tag/getTags")?;
        let tags: TagItems = self.send_json(request).await?;
        Ok(tags.items)
    }

    pub async fn create_tag(&self, name: &str) -> Result<Tag, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Tag name is required".into()));
        }
        let request = self
            .authorized(Method::POST, "/tag")?
            .json(&NewTag { name });
        let created: TagEnvelope = self.send_json(request).await?;
        Ok(created.tag)
    }

    /// `None` when the backend answers 404.
    pub async fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, ApiError> {
        let mut url = url::Url::parse(&self.url("/tag/by-name/"))
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Validation("invalid base URL".into()))?
            .pop_if_empty()
            .push(name.trim());
        let token = self.token().ok_or(ApiError::MissingToken)?;
        let request = self.http().get(url).bearer_auth(token);
        match self.send_json::<TagEnvelope>(request).await {
            Ok(found) => Ok(Some(found.tag)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look a tag up by name and create it when it does not exist yet.
    pub async fn find_or_create_tag(&self, name: &str) -> Result<Tag, ApiError> {
        match self.tag_by_name(name).await? {
            Some(tag) => Ok(tag),
            None => {
                tracing::debug!(name, "creating tag");
                self.create_tag(name).await
            }
        }
    }
}
