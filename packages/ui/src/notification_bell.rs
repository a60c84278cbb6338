//! Bell with unread counter and a dropdown of the latest notifications.

use dioxus::prelude::*;
use store::Notification;

use crate::format::time_ago;
use crate::icons::FaBell;
use crate::notifications::use_notifications;
use crate::Icon;

/// Entries shown in the dropdown.
const PREVIEW_COUNT: usize = 5;

#[component]
pub fn NotificationBell(
    /// Called with the clicked notification, after it is marked read.
    on_open: EventHandler<Notification>,
    on_view_all: EventHandler<()>,
) -> Element {
    let ctx = use_notifications();
    let mut open = use_signal(|| false);
    let unread = ctx.unread_count();
    let preview: Vec<Notification> = ctx.feed.read().items().iter().take(PREVIEW_COUNT).cloned().collect();
    let now = chrono::Utc::now();

    rsx! {
        div {
            class: "bell",
            button {
                class: "bell-button",
                title: "Notifications",
                onclick: move |_| open.toggle(),
                Icon { icon: FaBell, width: 16, height: 16 }
                if unread > 0 {
                    span {
                        class: "bell-count",
                        if unread > 99 { "99+" } else { "{unread}" }
                    }
                }
            }
            if open() {
                div {
                    class: "bell-dropdown",
                    div {
                        class: "bell-dropdown-header",
                        span { "Notifications" }
                        if unread > 0 {
                            button {
                                class: "link-button",
                                onclick: move |_| ctx.mark_all_as_read(),
                                "Mark all as read"
                            }
                        }
                    }
                    if preview.is_empty() {
                        div { class: "bell-empty", "You're all caught up." }
                    }
                    for notification in preview {
                        BellItem {
                            key: "{notification.id}",
                            age: time_ago(notification.created_at, now),
                            notification: notification.clone(),
                            on_click: move |n: Notification| {
                                open.set(false);
                                ctx.mark_as_read(n.id.clone());
                                on_open.call(n);
                            },
                        }
                    }
                    button {
                        class: "bell-view-all",
                        onclick: move |_| {
                            open.set(false);
                            on_view_all.call(());
                        },
                        "View all"
                    }
                }
            }
        }
    }
}

#[component]
fn BellItem(notification: Notification, age: String, on_click: EventHandler<Notification>) -> Element {
    let class = if notification.read { "bell-item" } else { "bell-item unread" };
    let title = notification.title.clone();
    let message = notification.message.clone();
    rsx! {
        button {
            class: "{class}",
            onclick: move |_| on_click.call(notification.clone()),
            div { class: "bell-item-title", "{title}" }
            div { class: "bell-item-message", "{message}" }
            div { class: "bell-item-age", "{age}" }
        }
    }
}
