//! Full notifications page: category tabs, search, paging and the two test
//! hooks (backend test push, local demo entry).

use api::TestPush;
use dioxus::prelude::*;
use store::{FeedFilter, LocalNotification, Notification};

use crate::format::time_ago;
use crate::notifications::use_notifications;
use crate::{alert, use_alerts, use_client_config, AlertLevel};

#[component]
pub fn NotificationsView(on_open: EventHandler<Notification>) -> Element {
    let ctx = use_notifications();
    let config = use_client_config();
    let mut alerts = use_alerts();

    let initial_visible = config.notifications.initial_visible.max(1);
    let step = config.notifications.show_more_step.max(1);
    let mut filter = use_signal(FeedFilter::default);
    let mut search = use_signal(String::new);
    let mut visible = use_signal(|| initial_visible);
    let mut sending = use_signal(|| false);

    let feed = ctx.feed.read().clone();
    let matching = feed.filtered(filter(), &search());
    let shown: Vec<Notification> = matching.iter().take(visible()).cloned().collect();
    let hidden = matching.len().saturating_sub(shown.len());
    let unread = feed.unread_count();
    let now = chrono::Utc::now();
    let connection = match (ctx.connection)() {
        Some(state) => state.to_string(),
        None => "offline".to_string(),
    };

    let send_test = move |_| async move {
        sending.set(true);
        match ctx.send_test(TestPush::default()).await {
            Ok(id) => alert(&mut alerts, AlertLevel::Info, &format!("Test push queued ({id})")),
            Err(e) => alert(&mut alerts, AlertLevel::Error, &format!("Test push failed: {e}")),
        }
        sending.set(false);
    };

    rsx! {
        div {
            class: "page",
            div {
                class: "page-header",
                div {
                    h1 { "Notifications" }
                    p { class: "page-subtitle", "{unread} unread · live channel {connection}" }
                }
                div {
                    class: "page-actions",
                    button {
                        class: "secondary",
                        disabled: sending(),
                        onclick: send_test,
                        "Send test push"
                    }
                    button {
                        class: "secondary",
                        onclick: move |_| {
                            ctx.push_local(LocalNotification::default());
                        },
                        "Add demo entry"
                    }
                    button {
                        class: "primary",
                        disabled: unread == 0,
                        onclick: move |_| ctx.mark_all_as_read(),
                        "Mark all as read"
                    }
                }
            }

            div {
                class: "filter-tabs",
                for tab in FeedFilter::ALL {
                    button {
                        key: "{tab.label()}",
                        class: if filter() == tab { "filter-tab active" } else { "filter-tab" },
                        onclick: move |_| {
                            filter.set(tab);
                            visible.set(initial_visible);
                        },
                        "{tab.label()} ({feed.count_for(tab)})"
                    }
                }
            }

            input {
                class: "notification-search",
                r#type: "search",
                placeholder: "Search notifications",
                value: search(),
                oninput: move |evt: FormEvent| {
                    search.set(evt.value());
                    visible.set(initial_visible);
                },
            }

            if shown.is_empty() {
                p { class: "empty-state", "No notifications." }
            }
            ul {
                class: "notification-list",
                for notification in shown {
                    NotificationRow {
                        key: "{notification.id}",
                        age: time_ago(notification.created_at, now),
                        notification: notification.clone(),
                        on_open: move |n: Notification| {
                            ctx.mark_as_read(n.id.clone());
                            on_open.call(n);
                        },
                        on_mark_read: move |id: String| ctx.mark_as_read(id),
                    }
                }
            }

            div {
                class: "notification-paging",
                if hidden > 0 {
                    button {
                        class: "secondary",
                        onclick: move |_| visible += step,
                        "Show more ({hidden})"
                    }
                } else if feed.has_more() {
                    button {
                        class: "secondary",
                        disabled: (ctx.loading)(),
                        onclick: move |_| {
                            ctx.load_more();
                            visible += step;
                        },
                        if (ctx.loading)() { "Loading..." } else { "Load older" }
                    }
                }
            }
        }
    }
}

#[component]
fn NotificationRow(
    notification: Notification,
    age: String,
    on_open: EventHandler<Notification>,
    on_mark_read: EventHandler<String>,
) -> Element {
    let class = if notification.read { "notification-row" } else { "notification-row unread" };
    let id = notification.id.clone();
    let read = notification.read;
    let title = notification.title.clone();
    let message = notification.message.clone();
    rsx! {
        li {
            class: "{class}",
            div {
                class: "notification-row-body",
                onclick: move |_| on_open.call(notification.clone()),
                div { class: "notification-row-title", "{title}" }
                div { class: "notification-row-message", "{message}" }
                div { class: "notification-row-age", "{age}" }
            }
            if !read {
                button {
                    class: "link-button",
                    onclick: move |_| on_mark_read.call(id.clone()),
                    "Mark read"
                }
            }
        }
    }
}
