//! Cards and board lists (`/card/*`, `/list/*`).

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use store::{BoardList, Card, CardState, Member, Priority};

use crate::{ApiClient, ApiError};

/// Which list a new card goes into.
#[derive(Clone, Debug, PartialEq)]
pub enum ListTarget {
    Existing(i64),
    New(String),
}

/// Body of `createCard` / `updateCard`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub title: String,
    pub description: String,
    pub board_id: i64,
    pub responsable_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<CardState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
}

impl CardDraft {
    pub fn new(board_id: i64, title: impl Into<String>) -> Self {
        Self {
            board_id,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Prefill an edit form from an existing card.
    pub fn from_card(card: &Card, board_id: i64) -> Self {
        Self {
            title: card.title.clone(),
            description: card.description.clone().unwrap_or_default(),
            board_id,
            responsable_id: card.responsible_id,
            begin_date: card.begin_date,
            due_date: card.due_date,
            tags: card.tags.clone(),
            priority: card.priority,
            state: Some(card.state.clone()),
            list_id: card.list_id,
            list_name: None,
        }
    }

    pub fn with_list(mut self, target: ListTarget) -> Self {
        match target {
            ListTarget::Existing(id) => {
                self.list_id = Some(id);
                self.list_name = None;
            }
            ListTarget::New(name) => {
                self.list_id = None;
                self.list_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            }
        }
        self
    }

    /// Add a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("Card title is required".into()));
        }
        if let (Some(begin), Some(due)) = (self.begin_date, self.due_date) {
            if due < begin {
                return Err(ApiError::Validation(
                    "Due date cannot be before the start date".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ListItems {
    #[serde(default, alias = "lists")]
    items: Vec<BoardList>,
}

impl ApiClient {
    pub async fn cards_for_board(&self, board_id: i64) -> Result<Vec<Card>, ApiError> {
        let request = self.authorized(Method::GET, &format!("/card/getCards/{board_id}"))?;
        self.send_json(request).await
    }

    pub async fn card_members(&self, card_id: i64) -> Result<Vec<Member>, ApiError> {
        let request = self.authorized(Method::GET, &format!("/card/getMembers/{card_id}"))?;
        self.send_json(request).await
    }

    pub async fn get_card(&self, card_id: i64) -> Result<Card, ApiError> {
        let request = self.authorized(Method::GET, &format!("/card/getCard/{card_id}"))?;
        self.send_json(request).await
    }

    pub async fn create_card(&self, draft: &CardDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let request = self
            .authorized(Method::POST, "/card/createCard")?
            .json(draft);
        self.send_unit(request).await
    }

    /// A user-defined column exists only as the state of its cards, so a new
    /// column is created by adding a placeholder card in that state.
    pub async fn create_column(&self, board_id: i64, name: &str) -> Result<(), ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Enter a name for the new list".into()));
        }
        let mut draft = CardDraft::new(board_id, format!("New task in {name}"));
        draft.state = Some(CardState::parse(name));
        self.create_card(&draft).await
    }

    pub async fn update_card(&self, card_id: i64, draft: &CardDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let request = self
            .authorized(Method::PUT, &format!("/card/updateCard/{card_id}"))?
            .json(draft);
        self.send_unit(request).await
    }

    pub async fn delete_card(&self, card_id: i64) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, &format!("/card/deleteCard/{card_id}"))?;
        self.send_unit(request).await
    }

    pub async fn lists_by_board(&self, board_id: i64) -> Result<Vec<BoardList>, ApiError> {
        let request = self.authorized(Method::GET, &format!("/list/by-board/{board_id}"))?;
        let lists: ListItems = self.send_json(request).await?;
        Ok(lists.items)
    }

    /// Cards of a board with their members and responsible filled in.
    ///
    /// The responsible is resolved against `board_members`. A failing member
    /// fetch leaves that card with no members instead of failing the board.
    pub async fn load_board_cards(
        &self,
        board_id: i64,
        board_members: &[Member],
    ) -> Result<Vec<Card>, ApiError> {
        let cards = self.cards_for_board(board_id).await?;
        let members = join_all(cards.iter().map(|card| self.card_members(card.id))).await;

        Ok(cards
            .into_iter()
            .zip(members)
            .map(|(mut card, members)| {
                card.members = members.unwrap_or_else(|e| {
                    tracing::warn!(card_id = card.id, "member fetch failed: {e}");
                    Vec::new()
                });
                card.responsible = card
                    .responsible_id
                    .and_then(|id| board_members.iter().find(|m| m.id == id).cloned());
                card
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_draft_wire_format() {
        let due = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let mut draft = CardDraft::new(3, "Write docs").with_list(ListTarget::New(" QA ".into()));
        draft.due_date = Some(due);
        draft.priority = Some(Priority::High);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["boardId"], 3);
        assert_eq!(json["listName"], "QA");
        assert!(json.get("listId").is_none());
        assert!(json["responsableId"].is_null());
        assert_eq!(json["dueDate"], "2025-08-01T00:00:00Z");
        assert!(json.get("beginDate").is_none());
    }

    #[test]
    fn test_draft_validation() {
        assert!(CardDraft::new(1, "  ").validate().is_err());

        let mut draft = CardDraft::new(1, "Ship");
        draft.begin_date = Some(Utc.with_ymd_and_hms(2025, 8, 2, 0, 0, 0).unwrap());
        draft.due_date = Some(Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_add_tag_dedup() {
        let mut draft = CardDraft::new(1, "x");
        assert!(draft.add_tag("bug"));
        assert!(!draft.add_tag(" bug "));
        assert!(!draft.add_tag(""));
        assert_eq!(draft.tags, vec!["bug"]);
    }
}
