//! # Domain models for boards, cards and notifications
//!
//! Everything the backend returns is decoded into these types. They are
//! `Serialize + Deserialize` so the same structs are used on the wire, in the
//! persisted session and in component props.
//!
//! The backend is not consistent about key casing (`firstName` on the auth
//! endpoints, `first_name` on the member endpoints), so fields carry serde
//! aliases for both spellings.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`User`] | A person: the logged-in profile, a board member or a card responsible. |
//! | [`Tag`] | A label attached to boards. |
//! | [`Board`] | A project container with members, tags and a visibility flag. |
//! | [`BoardList`] | A named list of a board that new cards can be filed into. |
//! | [`Card`] | A task. Its [`Priority`] is derived from the due date. |
//! | [`Notification`] | One entry of the per-user notification feed. |
//! | [`NotificationPage`] | A page of server-persisted notifications plus counters. |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A user as returned by the auth, member and search endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "profilePicture", alias = "image", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl User {
    /// Full name, falling back to the email when both name parts are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Up to two uppercase initials for avatar placeholders.
    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            self.email.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default()
        } else {
            initials
        }
    }
}

/// Board and card members share the user shape.
pub type Member = User;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Owner of the board.
    #[serde(default, alias = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, alias = "isPublic")]
    pub is_public: bool,
    #[serde(default, alias = "creationDate", skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

impl Board {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn member(&self, user_id: i64) -> Option<&Member> {
        self.members.iter().find(|m| m.id == user_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: i64,
    pub name: String,
    #[serde(default, alias = "boardId")]
    pub board_id: i64,
}

/// Column a card lives in.
///
/// The three default columns have fixed wire names; any other string is a
/// user-defined column and is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CardState {
    Todo,
    InProgress,
    Done,
    Custom(String),
}

impl CardState {
    pub const DEFAULTS: [CardState; 3] = [CardState::Todo, CardState::InProgress, CardState::Done];

    pub fn as_str(&self) -> &str {
        match self {
            CardState::Todo => "TODO",
            CardState::InProgress => "IN_PROGRESS",
            CardState::Done => "DONE",
            CardState::Custom(name) => name,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "TODO" => CardState::Todo,
            "IN_PROGRESS" => CardState::InProgress,
            "DONE" => CardState::Done,
            other => CardState::Custom(other.to_string()),
        }
    }

    /// Human label shown in badges and column headers.
    pub fn label(&self) -> &str {
        match self {
            CardState::Todo => "To Do",
            CardState::InProgress => "In Progress",
            CardState::Done => "Done",
            CardState::Custom(name) => name,
        }
    }

    /// CSS modifier used by the state badge and column header.
    pub fn css_class(&self) -> &'static str {
        match self {
            CardState::Todo => "state-todo",
            CardState::InProgress => "state-in-progress",
            CardState::Done => "state-done",
            CardState::Custom(_) => "state-custom",
        }
    }

    fn rank(&self) -> usize {
        match self {
            CardState::Todo => 0,
            CardState::InProgress => 1,
            CardState::Done => 2,
            CardState::Custom(_) => 3,
        }
    }
}

impl Default for CardState {
    fn default() -> Self {
        CardState::Todo
    }
}

impl Ord for CardState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.as_str().cmp(other.as_str()))
    }
}

impl PartialOrd for CardState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for CardState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CardState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CardState::parse(&raw))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "Baja")]
    Low,
    #[serde(alias = "Media")]
    Medium,
    #[serde(alias = "Alta")]
    High,
}

impl Priority {
    /// Derive the priority from a due date relative to `now`.
    ///
    /// Days are rounded up, so a card due in 3 days and one hour counts as 4.
    /// Overdue cards are always high priority.
    pub fn from_due_date(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Self> {
        let due = due?;
        let millis = (due - now).num_milliseconds();
        const DAY: i64 = 24 * 60 * 60 * 1000;
        let days = millis.div_euclid(DAY) + i64::from(millis.rem_euclid(DAY) != 0);
        Some(match days {
            d if d <= 3 => Priority::High,
            d if d <= 7 => Priority::Medium,
            _ => Priority::Low,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Priority::Low => "priority-low",
            Priority::Medium => "priority-medium",
            Priority::High => "priority-high",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "responsableId", skip_serializing_if = "Option::is_none")]
    pub responsible_id: Option<i64>,
    #[serde(default, alias = "responsable", skip_serializing_if = "Option::is_none")]
    pub responsible: Option<Member>,
    /// Priority stored by the backend, if any. Views use [`Card::effective_priority`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub state: CardState,
    #[serde(default, alias = "beginDate", skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, alias = "listId", skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,
}

impl Card {
    pub fn effective_priority(&self, now: DateTime<Utc>) -> Option<Priority> {
        Priority::from_due_date(self.due_date, now)
    }
}

/// Group cards into kanban columns.
///
/// Columns follow [`CardState`] ordering (defaults first, custom columns
/// alphabetically) and only states that actually occur are returned. Card
/// order inside a column is preserved.
pub fn group_by_state(cards: &[Card]) -> Vec<(CardState, Vec<Card>)> {
    let mut columns: std::collections::BTreeMap<CardState, Vec<Card>> = Default::default();
    for card in cards {
        columns.entry(card.state.clone()).or_default().push(card.clone());
    }
    columns.into_iter().collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    BoardMemberAdded,
    CardAssigned,
    CommentNew,
    CommentReply,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::BoardMemberAdded => "BOARD_MEMBER_ADDED",
            NotificationKind::CardAssigned => "CARD_ASSIGNED",
            NotificationKind::CommentNew => "COMMENT_NEW",
            NotificationKind::CommentReply => "COMMENT_REPLY",
            NotificationKind::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "BOARD_MEMBER_ADDED" => NotificationKind::BoardMemberAdded,
            "CARD_ASSIGNED" => NotificationKind::CardAssigned,
            "COMMENT_NEW" => NotificationKind::CommentNew,
            "COMMENT_REPLY" => NotificationKind::CommentReply,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

impl Default for NotificationKind {
    fn default() -> Self {
        NotificationKind::BoardMemberAdded
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(NotificationKind::parse(&raw))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Board,
    Card,
}

/// What a notification points at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, rename = "createdAt", alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "actorId", alias = "actor_id", skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub unread_count: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPage {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 22, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_priority_thresholds() {
        let now = now();
        assert_eq!(Priority::from_due_date(None, now), None);
        assert_eq!(Priority::from_due_date(Some(now - Duration::days(2)), now), Some(Priority::High));
        assert_eq!(Priority::from_due_date(Some(now + Duration::days(3)), now), Some(Priority::High));
        // 3 days and an hour rounds up to 4
        assert_eq!(
            Priority::from_due_date(Some(now + Duration::days(3) + Duration::hours(1)), now),
            Some(Priority::Medium)
        );
        assert_eq!(Priority::from_due_date(Some(now + Duration::days(7)), now), Some(Priority::Medium));
        assert_eq!(Priority::from_due_date(Some(now + Duration::days(8)), now), Some(Priority::Low));
    }

    #[test]
    fn test_card_state_wire_format() {
        let card: Card = serde_json::from_str(
            r#"{"id": 4, "title": "Write docs", "state": "IN_PROGRESS", "responsableId": 9, "dueDate": "2025-07-30T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(card.state, CardState::InProgress);
        assert_eq!(card.responsible_id, Some(9));
        assert!(card.due_date.is_some());

        let custom = CardState::parse("Review");
        assert_eq!(serde_json::to_string(&custom).unwrap(), "\"Review\"");
        assert_eq!(custom.label(), "Review");
    }

    #[test]
    fn test_group_by_state_orders_columns() {
        let card = |id: i64, state: &str| Card {
            id,
            title: format!("card {id}"),
            state: CardState::parse(state),
            ..Default::default()
        };
        let cards = vec![
            card(1, "DONE"),
            card(2, "Review"),
            card(3, "TODO"),
            card(4, "Blocked"),
            card(5, "TODO"),
        ];

        let columns = group_by_state(&cards);
        let names: Vec<&str> = columns.iter().map(|(state, _)| state.as_str()).collect();
        assert_eq!(names, ["TODO", "DONE", "Blocked", "Review"]);
        let todo_ids: Vec<i64> = columns[0].1.iter().map(|c| c.id).collect();
        assert_eq!(todo_ids, [3, 5]);
    }

    #[test]
    fn test_user_accepts_both_casings() {
        let from_auth: User =
            serde_json::from_str(r#"{"id": 1, "firstName": "Ana", "lastName": "Ruiz", "email": "ana@example.com"}"#)
                .unwrap();
        let from_members: User =
            serde_json::from_str(r#"{"id": 1, "first_name": "Ana", "last_name": "Ruiz", "email": "ana@example.com"}"#)
                .unwrap();
        assert_eq!(from_auth, from_members);
        assert_eq!(from_auth.display_name(), "Ana Ruiz");
        assert_eq!(from_auth.initials(), "AR");

        let nameless = User { id: 2, email: "x@example.com".into(), ..Default::default() };
        assert_eq!(nameless.display_name(), "x@example.com");
    }

    #[test]
    fn test_notification_decoding() {
        let n: Notification = serde_json::from_str(
            r#"{"id": "n1", "type": "CARD_ASSIGNED", "title": "Assigned", "message": "You got a card",
                "resource": {"kind": "card", "id": "42"}, "createdAt": "2025-07-22T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(n.kind, NotificationKind::CardAssigned);
        assert!(!n.read);
        assert_eq!(n.resource.unwrap().kind, ResourceKind::Card);

        let unknown: Notification = serde_json::from_str(r#"{"id": "n2", "type": "DUE_SOON"}"#).unwrap();
        assert_eq!(unknown.kind, NotificationKind::Other("DUE_SOON".to_string()));
    }
}
