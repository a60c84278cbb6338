//! Board CRUD and membership (`/board/*`).

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use store::Board;

use crate::{ApiClient, ApiError};

/// An image attached to a new board.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Fields of the create-board form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewBoard {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub member_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
    pub image: Option<ImageUpload>,
}

impl NewBoard {
    fn into_form(self) -> Result<Form, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Board name is required".into()));
        }
        let mut form = Form::new()
            .text("name", self.name)
            .text("description", self.description)
            .text("isPublic", bool_field(self.is_public));
        for id in self.member_ids {
            form = form.text("member_ids", id.to_string());
        }
        for id in self.tag_ids {
            form = form.text("tag_ids", id.to_string());
        }
        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime)?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// Fields of the board settings form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardUpdate {
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub tags: Vec<String>,
}

impl BoardUpdate {
    pub fn from_board(board: &Board) -> Self {
        Self {
            name: board.name.clone(),
            description: board.description.clone(),
            is_public: board.is_public,
            tags: board.tags.iter().map(|t| t.id.to_string()).collect(),
        }
    }

    fn into_form(self) -> Form {
        let mut form = Form::new()
            .text("name", self.name)
            .text("description", self.description)
            .text("isPublic", bool_field(self.is_public));
        for tag in self.tags {
            form = form.text("tags", tag);
        }
        form
    }
}

fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Serialize)]
struct AddMember {
    member_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveMember {
    board_id: i64,
    user_id: i64,
}

/// Acknowledgement bodies vary between endpoints; only the board (when
/// present) is interesting.
#[derive(Debug, Default, Deserialize)]
struct BoardEnvelope {
    #[serde(default)]
    board: Option<Board>,
}

impl ApiClient {
    pub async fn my_boards(&self) -> Result<Vec<Board>, ApiError> {
        let request = self.authorized(Method::GET, "/board/getMyBoards")?;
        self.send_json(request).await
    }

    pub async fn favorite_boards(&self) -> Result<Vec<Board>, ApiError> {
        let request = self.authorized(Method::GET, "/board/getFavoriteBoards")?;
        self.send_json(request).await
    }

    pub async fn get_board(&self, board_id: i64) -> Result<Board, ApiError> {
        let request = self.authorized(Method::GET, &format!("/board/getBoard/{board_id}"))?;
        self.send_json(request).await
    }

    /// `POST /board/createBoard` as multipart. Returns the created board when
    /// the backend echoes it.
    pub async fn create_board(&self, board: NewBoard) -> Result<Option<Board>, ApiError> {
        let form = board.into_form()?;
        let request = self
            .authorized(Method::POST, "/board/createBoard")?
            .multipart(form);
        let created: serde_json::Value = self.send_json(request).await?;
        Ok(decode_board(created))
    }

    pub async fn update_board(
        &self,
        board_id: i64,
        update: BoardUpdate,
    ) -> Result<Option<Board>, ApiError> {
        let request = self
            .authorized(Method::PUT, &format!("/board/updateBoard/{board_id}"))?
            .multipart(update.into_form());
        let updated: serde_json::Value = self
            .send_json(request)
            .await
            .map_err(|e| e.forbidden_as("Only the creator can edit this board"))?;
        Ok(decode_board(updated))
    }

    pub async fn delete_board(&self, board_id: i64) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, &format!("/board/deleteBoard/{board_id}"))?;
        self.send_unit(request)
            .await
            .map_err(|e| e.forbidden_as("Only the creator can delete this board"))
    }

    pub async fn add_member(&self, board_id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::POST, &format!("/board/addMember/{board_id}"))?
            .json(&AddMember { member_id: user_id });
        self.send_unit(request).await
    }

    pub async fn remove_member(&self, board_id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::DELETE, "/board/removeMember")?
            .json(&RemoveMember { board_id, user_id });
        self.send_unit(request)
            .await
            .map_err(|e| e.forbidden_as("You cannot remove members from this board"))
    }
}

/// Accept both a bare board and `{ "board": {...} }`.
fn decode_board(value: serde_json::Value) -> Option<Board> {
    if let Ok(envelope) = serde_json::from_value::<BoardEnvelope>(value.clone()) {
        if envelope.board.is_some() {
            return envelope.board;
        }
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_requires_name() {
        let board = NewBoard {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(board.into_form(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_decode_board_shapes() {
        let bare = serde_json::json!({"id": 4, "name": "Roadmap"});
        assert_eq!(decode_board(bare).map(|b| b.id), Some(4));

        let wrapped = serde_json::json!({"board": {"id": 5, "name": "Ops"}});
        assert_eq!(decode_board(wrapped).map(|b| b.name), Some("Ops".to_string()));

        let ack = serde_json::json!({"message": "ok"});
        assert!(decode_board(ack).is_none());
    }
}
