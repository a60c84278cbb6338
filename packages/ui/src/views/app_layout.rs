use dioxus::prelude::*;
use store::Notification;

use crate::{use_auth, AlertPanel, BoardsProvider, Navbar, NotificationBell, NotificationProvider};

/// Shell of every signed-in page.
///
/// Platform packages provide navigation callbacks and an `Outlet` as children.
/// Board and notification state live here, so they are loaded once per
/// signed-in user and dropped on logout.
#[component]
pub fn AppLayoutView(
    /// The router outlet for child routes.
    children: Element,
    on_navigate_boards: EventHandler<()>,
    on_navigate_notifications: EventHandler<()>,
    /// Called with a notification the user opened from the bell.
    on_open_notification: EventHandler<Notification>,
    /// Called once the session is gone (logout, expiry, or never signed in).
    on_signed_out: EventHandler<()>,
) -> Element {
    let auth = use_auth();

    use_effect(move || {
        let state = auth();
        if !state.loading && !state.is_authenticated() {
            on_signed_out.call(());
        }
    });

    if auth().loading {
        return rsx! {
            div { class: "page-loading", "Loading..." }
        };
    }

    rsx! {
        BoardsProvider {
            NotificationProvider {
                div {
                    class: "app-shell",
                    Navbar {
                        on_home: move |_| on_navigate_boards.call(()),
                        NotificationBell {
                            on_open: move |n| on_open_notification.call(n),
                            on_view_all: move |_| on_navigate_notifications.call(()),
                        }
                    }
                    main {
                        class: "app-main",
                        {children}
                    }
                    AlertPanel {}
                }
            }
        }
    }
}
