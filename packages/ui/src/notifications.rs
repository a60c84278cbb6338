//! Notification context: history, live push and read markers.
//!
//! [`NotificationProvider`] keys everything on the signed-in user. When the
//! user (or their token) changes it tears the previous subscription down,
//! clears the feed, loads the first history page and subscribes to
//! `private-user-{id}`. Incoming `notification` events land in the same
//! [`NotificationFeed`] as the history pages.
//!
//! Read markers are applied locally first and then synced to the backend;
//! a failed sync is logged and the local flag stays.
//!
//! Every history response is checked against the identity it was requested
//! for, so a page fetched for a previous user never lands in the feed.

use std::cell::RefCell;
use std::rc::Rc;

use api::notifications::{FetchOptions, MarkRead, TestPush};
use api::realtime::{user_channel, ConnectionState, PushEvent, PusherClient};
use api::ApiError;
use dioxus::core::Task;
use dioxus::prelude::*;
use futures::StreamExt;
use store::{LocalNotification, Notification, NotificationFeed, NotificationPage, ResourceKind};

use crate::alerts::{alert, use_alerts, AlertLevel};
use crate::auth::{use_auth, use_backend, Backend};
use crate::config::use_client_config;
use crate::realtime::{disconnect_pusher, pusher_client};

/// Page a notification links to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationTarget {
    Board(i64),
    Card { board_id: i64, card_id: i64 },
}

/// Card links need the board id, which only comes in `metadata.boardId`.
/// Non-numeric ids (demo entries) link nowhere.
pub fn notification_target(notification: &Notification) -> Option<NotificationTarget> {
    let resource = notification.resource.as_ref()?;
    let id: i64 = resource.id.parse().ok()?;
    match resource.kind {
        ResourceKind::Board => Some(NotificationTarget::Board(id)),
        ResourceKind::Card => {
            let board_id = notification
                .metadata
                .as_ref()
                .and_then(|m| m.get("boardId").or_else(|| m.get("board_id")))
                .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))?;
            Some(NotificationTarget::Card { board_id, card_id: id })
        }
    }
}

/// Signed-in user and access token a request was made for.
pub type FeedIdentity = Option<(i64, String)>;

/// What a finished history request did to the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// Entries added.
    Applied(usize),
    /// The backend rejected the token; the feed was emptied.
    Cleared,
    /// Logged, feed untouched.
    Failed,
    /// The user or token changed while the request was in flight.
    Stale,
}

/// A history page can be requested when signed in and nothing is loading.
pub fn can_load_more(loading: bool, identity: &FeedIdentity) -> bool {
    !loading && identity.is_some()
}

/// Apply the first history page: replaces the feed, and a 401 clears it.
pub fn apply_history_result(
    feed: &mut NotificationFeed,
    requested: &FeedIdentity,
    current: &FeedIdentity,
    result: Result<NotificationPage, ApiError>,
) -> PageOutcome {
    if requested != current {
        tracing::debug!("dropping notification history for a previous session");
        return PageOutcome::Stale;
    }
    match result {
        Ok(page) => {
            let count = page.notifications.len();
            feed.replace_with_page(page);
            tracing::debug!(count, "notification history loaded");
            PageOutcome::Applied(count)
        }
        Err(e) if e.status() == Some(401) => {
            tracing::warn!("notification history rejected: {e}");
            feed.clear();
            PageOutcome::Cleared
        }
        Err(e) => {
            tracing::error!("could not load notifications: {e}");
            PageOutcome::Failed
        }
    }
}

/// Apply a further history page, skipping ids already in the feed.
pub fn apply_more_result(
    feed: &mut NotificationFeed,
    requested: &FeedIdentity,
    current: &FeedIdentity,
    result: Result<NotificationPage, ApiError>,
) -> PageOutcome {
    if requested != current {
        tracing::debug!("dropping notification page for a previous session");
        return PageOutcome::Stale;
    }
    match result {
        Ok(page) => {
            let added = feed.merge_page(page);
            tracing::debug!(added, "loaded more notifications");
            PageOutcome::Applied(added)
        }
        Err(e) => {
            tracing::error!("could not load more notifications: {e}");
            PageOutcome::Failed
        }
    }
}

/// Settle a read-marker sync. The local flags were set before the request
/// and are never rolled back; a failure is only logged.
pub fn settle_read_sync<T>(marker: &str, result: Result<T, ApiError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(marker, "could not sync read marker: {e}");
            false
        }
    }
}

#[derive(Clone, Copy)]
pub struct NotificationContext {
    pub feed: Signal<NotificationFeed>,
    pub loading: Signal<bool>,
    pub connection: Signal<Option<ConnectionState>>,
    identity: Memo<FeedIdentity>,
    backend: Backend,
    page_size: usize,
}

pub fn use_notifications() -> NotificationContext {
    use_context::<NotificationContext>()
}

impl NotificationContext {
    pub fn unread_count(&self) -> usize {
        self.feed.read().unread_count()
    }

    pub fn mark_as_read(&self, id: String) {
        let mut feed = self.feed;
        feed.write().mark_as_read(&id);
        let client = self.backend.client();
        if client.token().is_none() {
            return;
        }
        spawn(async move {
            let result = client.mark_one_read(&id).await;
            settle_read_sync(&id, result);
        });
    }

    pub fn mark_all_as_read(&self) {
        let mut feed = self.feed;
        let changed = feed.write().mark_all_as_read();
        let client = self.backend.client();
        if client.token().is_none() {
            return;
        }
        spawn(async move {
            let result = client.mark_read(&MarkRead::All).await;
            if let Ok(response) = &result {
                tracing::debug!(changed, updated = response.updated_count, "marked all notifications read");
            }
            settle_read_sync("all", result);
        });
    }

    /// Next history page. A no-op while a load is running or when signed out.
    /// A page that arrives after the user or token changed is dropped.
    pub fn load_more(&self) {
        let requested = self.identity.peek().clone();
        if !can_load_more(*self.loading.peek(), &requested) {
            return;
        }
        let client = self.backend.client();
        let identity = self.identity;
        let mut feed = self.feed;
        let mut loading = self.loading;
        let options = FetchOptions::page(self.page_size, feed.peek().next_offset());
        loading.set(true);
        spawn(async move {
            let result = client.fetch_notifications(options).await;
            let current = identity.peek().clone();
            let outcome = apply_more_result(&mut feed.write(), &requested, &current, result);
            if outcome != PageOutcome::Stale {
                loading.set(false);
            }
        });
    }

    /// Add a demo notification without touching the backend.
    pub fn push_local(&self, draft: LocalNotification) -> Notification {
        let mut feed = self.feed;
        let created = feed.write().push_local(draft, chrono::Utc::now());
        tracing::debug!(id = %created.id, "local notification added");
        created
    }

    /// Ask the backend to push a test notification through the live channel.
    pub async fn send_test(&self, push: TestPush) -> Result<String, api::ApiError> {
        self.backend.client().send_test(&push).await
    }
}

/// Live subscription held by the provider.
struct Subscription {
    client: PusherClient,
    channel: String,
    listener: Task,
}

type SubscriptionSlot = Rc<RefCell<Option<Subscription>>>;

fn teardown(slot: &SubscriptionSlot) {
    if let Some(subscription) = slot.borrow_mut().take() {
        subscription.listener.cancel();
        subscription.client.unsubscribe(&subscription.channel);
        disconnect_pusher();
        tracing::debug!(channel = %subscription.channel, "notification subscription closed");
    }
}

#[component]
pub fn NotificationProvider(children: Element) -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let config = use_client_config();
    let mut alerts = use_alerts();
    let page_size = config.notifications.page_size.max(1);

    let identity = use_memo(move || {
        let state = auth.read();
        state.user_id().zip(state.session.access_token.clone())
    });
    let ctx = use_context_provider(|| NotificationContext {
        feed: Signal::new(NotificationFeed::new()),
        loading: Signal::new(false),
        connection: Signal::new(None),
        identity,
        backend,
        page_size,
    });
    let slot: SubscriptionSlot = use_hook(|| Rc::new(RefCell::new(None)));

    let effect_slot = slot.clone();
    use_effect(move || {
        let current = identity();
        teardown(&effect_slot);
        let mut feed = ctx.feed;
        let mut loading = ctx.loading;
        let mut connection = ctx.connection;
        feed.write().clear();
        loading.set(false);
        connection.set(None);

        let Some((user_id, _token)) = current.clone() else {
            return;
        };
        let client = backend.client();

        // First history page
        let history_client = client.clone();
        loading.set(true);
        spawn(async move {
            let result = history_client
                .fetch_notifications(FetchOptions::page(page_size, 0))
                .await;
            let latest = identity.peek().clone();
            let outcome = apply_history_result(&mut feed.write(), &current, &latest, result);
            tracing::debug!(user_id, ?outcome, "first notification page settled");
            if outcome != PageOutcome::Stale {
                loading.set(false);
            }
        });

        // Live channel
        let Some(pusher) = pusher_client(&config, &client) else {
            return;
        };
        let channel = user_channel(user_id);
        let mut events = pusher.events();
        pusher.subscribe(&channel);

        let listen_channel = channel.clone();
        let listener = spawn(async move {
            while let Some(event) = events.next().await {
                match &event {
                    PushEvent::StateChange { previous, current } => {
                        tracing::info!(%previous, %current, "[pusher] state change");
                        connection.set(Some(*current));
                        match current {
                            ConnectionState::Failed | ConnectionState::Unavailable => alert(
                                &mut alerts,
                                AlertLevel::Warning,
                                &format!("Live notifications {current}"),
                            ),
                            _ => {}
                        }
                    }
                    PushEvent::SubscriptionSucceeded { channel } => {
                        tracing::info!(%channel, "[pusher] subscribed");
                    }
                    PushEvent::SubscriptionError { channel, status } => {
                        if matches!(status, Some(401) | Some(403)) {
                            tracing::error!(%channel, ?status, "[pusher] channel authorization rejected");
                        } else {
                            tracing::error!(%channel, ?status, "[pusher] subscription error");
                        }
                    }
                    PushEvent::Message { .. } => {
                        if let Some(notification) = event.notification_on(&listen_channel) {
                            tracing::debug!(id = %notification.id, "notification received");
                            feed.write().receive_push(notification);
                        }
                    }
                }
            }
        });

        *effect_slot.borrow_mut() = Some(Subscription {
            client: pusher,
            channel,
            listener,
        });
    });

    use_drop(move || teardown(&slot));

    rsx! {
        {children}
    }
}
