//! # Notification feed: the local view of a user's notifications
//!
//! [`NotificationFeed`] is the in-memory list behind the notification bell and
//! the notifications page. It is fed from two independent paths:
//!
//! - **push**: events from the real-time channel, via [`NotificationFeed::receive_push`];
//! - **pull**: pages of server-persisted notifications, via
//!   [`NotificationFeed::replace_with_page`] (initial load) and
//!   [`NotificationFeed::merge_page`] ("load more").
//!
//! The two paths are not reconciled into one authoritative ordering. The feed
//! keeps itself sorted newest-first by `created_at` and filters repeated ids
//! on push and on merge; a push that lands between two page loads shifts the
//! server offsets, so a later page can skip entries.
//!
//! Read flags are local state. Syncing them to the backend is the caller's
//! job and a failed sync never reverts the local flag.

use chrono::{DateTime, Utc};

use crate::models::{Notification, NotificationKind, NotificationPage, ResourceKind, ResourceRef};

/// Ordered, in-memory list of notifications plus paging bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    has_more: bool,
}

/// Partial notification used by [`NotificationFeed::push_local`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalNotification {
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub resource: Option<ResourceRef>,
    pub actor_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Category tabs of the notifications page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedFilter {
    #[default]
    All,
    Assignments,
    Comments,
    Boards,
}

impl FeedFilter {
    pub const ALL: [FeedFilter; 4] = [
        FeedFilter::All,
        FeedFilter::Assignments,
        FeedFilter::Comments,
        FeedFilter::Boards,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeedFilter::All => "All",
            FeedFilter::Assignments => "Assignments",
            FeedFilter::Comments => "Comments",
            FeedFilter::Boards => "Boards",
        }
    }

    pub fn matches(&self, kind: &NotificationKind) -> bool {
        match self {
            FeedFilter::All => true,
            FeedFilter::Assignments => *kind == NotificationKind::CardAssigned,
            FeedFilter::Comments => {
                matches!(kind, NotificationKind::CommentNew | NotificationKind::CommentReply)
            }
            FeedFilter::Boards => *kind == NotificationKind::BoardMemberAdded,
        }
    }
}

fn newest_first(items: &mut [Notification]) {
    // Entries without a timestamp sink to the end; the sort is stable.
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the server reported more notifications than are loaded.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|n| n.id == id)
    }

    /// Offset to request for the next page.
    pub fn next_offset(&self) -> usize {
        self.items.len()
    }

    /// Record a notification delivered over the push channel.
    ///
    /// Returns `false` when an entry with the same id is already present.
    pub fn receive_push(&mut self, mut notification: Notification) -> bool {
        if self.contains(&notification.id) {
            tracing::debug!(id = %notification.id, "notification already in feed, skipping");
            return false;
        }
        notification.read = false;
        self.items.insert(0, notification);
        newest_first(&mut self.items);
        true
    }

    /// Prepend a locally generated notification, for exercising the UI
    /// without a backend. Missing fields get demo defaults. No de-duplication.
    pub fn push_local(&mut self, draft: LocalNotification, now: DateTime<Utc>) -> Notification {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            kind: draft.kind.unwrap_or(NotificationKind::BoardMemberAdded),
            title: draft.title.unwrap_or_else(|| "Test notification".to_string()),
            message: draft.message.unwrap_or_else(|| "You were added to a board".to_string()),
            resource: Some(draft.resource.unwrap_or(ResourceRef {
                kind: ResourceKind::Board,
                id: "demo".to_string(),
            })),
            read: false,
            created_at: Some(now),
            actor_id: draft.actor_id,
            metadata: draft.metadata,
        };
        self.items.insert(0, notification.clone());
        notification
    }

    /// Flip one entry to read. Returns `true` if an unread entry changed.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        }
    }

    /// Flip every entry to read. Returns how many changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }
        changed
    }

    /// Replace the whole feed with the first server page.
    pub fn replace_with_page(&mut self, page: NotificationPage) {
        self.items = page.notifications;
        newest_first(&mut self.items);
        self.has_more = page.meta.total_count > self.items.len();
    }

    /// Append a further server page, skipping ids already present.
    /// Returns the number of entries added.
    pub fn merge_page(&mut self, page: NotificationPage) -> usize {
        let previous_len = self.items.len();
        let fetched = page.notifications.len();
        for n in page.notifications {
            if !self.contains(&n.id) {
                self.items.push(n);
            }
        }
        newest_first(&mut self.items);
        self.has_more = page.meta.total_count > previous_len + fetched;
        self.items.len() - previous_len
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.has_more = false;
    }

    /// Entries matching a category and a case-insensitive text search over
    /// title and message.
    pub fn filtered(&self, filter: FeedFilter, search: &str) -> Vec<Notification> {
        let needle = search.trim().to_lowercase();
        self.items
            .iter()
            .filter(|n| filter.matches(&n.kind))
            .filter(|n| {
                needle.is_empty()
                    || n.title.to_lowercase().contains(&needle)
                    || n.message.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Number of entries per category, for the filter tab counters.
    pub fn count_for(&self, filter: FeedFilter) -> usize {
        self.items.iter().filter(|n| filter.matches(&n.kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageMeta;
    use chrono::{Duration, TimeZone};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 9, minute, 0).unwrap()
    }

    fn notification(id: &str, minute: u32) -> Notification {
        Notification {
            id: id.to_string(),
            kind: NotificationKind::CardAssigned,
            title: format!("title {id}"),
            message: format!("message {id}"),
            created_at: Some(at(minute)),
            ..Default::default()
        }
    }

    fn page(items: Vec<Notification>, total: usize) -> NotificationPage {
        NotificationPage {
            meta: PageMeta {
                total_count: total,
                unread_count: items.iter().filter(|n| !n.read).count(),
                limit: 20,
                offset: 0,
            },
            notifications: items,
        }
    }

    fn ids(feed: &NotificationFeed) -> Vec<&str> {
        feed.items().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_push_prepends_unread_and_skips_known_ids() {
        let mut feed = NotificationFeed::new();
        let mut first = notification("a", 1);
        first.read = true;
        assert!(feed.receive_push(first));
        assert!(feed.receive_push(notification("b", 2)));
        assert!(!feed.receive_push(notification("a", 5)));

        assert_eq!(ids(&feed), ["b", "a"]);
        // Pushed entries are always unread, whatever the payload said.
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_push_keeps_newest_first_ordering() {
        let mut feed = NotificationFeed::new();
        feed.receive_push(notification("late", 30));
        feed.receive_push(notification("early", 10));
        let mut undated = notification("undated", 0);
        undated.created_at = None;
        feed.receive_push(undated);

        assert_eq!(ids(&feed), ["late", "early", "undated"]);
    }

    #[test]
    fn test_mark_as_read() {
        let mut feed = NotificationFeed::new();
        feed.receive_push(notification("a", 1));
        feed.receive_push(notification("b", 2));

        assert!(feed.mark_as_read("a"));
        assert!(!feed.mark_as_read("a"));
        assert!(!feed.mark_as_read("missing"));
        assert_eq!(feed.unread_count(), 1);

        assert_eq!(feed.mark_all_as_read(), 1);
        assert_eq!(feed.unread_count(), 0);
        assert_eq!(feed.mark_all_as_read(), 0);
    }

    #[test]
    fn test_replace_then_merge_pages() {
        let mut feed = NotificationFeed::new();
        feed.receive_push(notification("pushed", 59));

        feed.replace_with_page(page(vec![notification("n2", 2), notification("n3", 3)], 5));
        assert_eq!(ids(&feed), ["n3", "n2"]);
        assert!(feed.has_more());
        assert_eq!(feed.next_offset(), 2);

        // The second page overlaps the first by one entry.
        let added = feed.merge_page(page(vec![notification("n2", 2), notification("n1", 1)], 5));
        assert_eq!(added, 1);
        assert_eq!(ids(&feed), ["n3", "n2", "n1"]);
        // 2 loaded before + 2 fetched < 5
        assert!(feed.has_more());

        feed.merge_page(page(vec![notification("n0", 0)], 4));
        assert!(!feed.has_more());
    }

    #[test]
    fn test_push_local_fills_defaults_without_dedup() {
        let mut feed = NotificationFeed::new();
        let now = at(0) + Duration::hours(1);
        let first = feed.push_local(LocalNotification::default(), now);
        feed.push_local(
            LocalNotification {
                title: Some("Custom".to_string()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(feed.len(), 2);
        assert_eq!(first.kind, NotificationKind::BoardMemberAdded);
        assert_eq!(first.resource.as_ref().map(|r| r.id.as_str()), Some("demo"));
        assert_eq!(first.created_at, Some(now));
        assert_eq!(feed.items()[0].title, "Custom");
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_filtered_by_category_and_search() {
        let mut feed = NotificationFeed::new();
        feed.receive_push(notification("assigned", 1));
        let mut comment = notification("comment", 2);
        comment.kind = NotificationKind::CommentReply;
        comment.title = "Reply on Roadmap".to_string();
        feed.receive_push(comment);

        assert_eq!(feed.filtered(FeedFilter::Comments, "").len(), 1);
        assert_eq!(feed.filtered(FeedFilter::All, "roadmap").len(), 1);
        assert!(feed.filtered(FeedFilter::Assignments, "roadmap").is_empty());
        assert_eq!(feed.count_for(FeedFilter::Assignments), 1);
        assert_eq!(feed.count_for(FeedFilter::Boards), 0);

        feed.clear();
        assert!(feed.is_empty());
        assert!(!feed.has_more());
    }
}
