use dioxus::prelude::*;
use store::Notification;
use ui::views::AppLayoutView;
use ui::{notification_target, NotificationTarget};

use crate::Route;

#[component]
pub fn AppLayout() -> Element {
    let nav = use_navigator();

    let open_notification = move |notification: Notification| {
        let route = match notification_target(&notification) {
            Some(NotificationTarget::Board(id)) => Route::BoardDetail { id },
            Some(NotificationTarget::Card { board_id, card_id }) => Route::CardDetail { board_id, card_id },
            None => Route::Notifications {},
        };
        nav.push(route);
    };

    rsx! {
        AppLayoutView {
            on_navigate_boards: move |_| {
                nav.push(Route::Boards {});
            },
            on_navigate_notifications: move |_| {
                nav.push(Route::Notifications {});
            },
            on_open_notification: open_notification,
            on_signed_out: move |_| {
                nav.replace(Route::Login {});
            },
            Outlet::<Route> {}
        }
    }
}
