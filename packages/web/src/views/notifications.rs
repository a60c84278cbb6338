use dioxus::prelude::*;
use store::Notification;
use ui::views::NotificationsView;
use ui::{notification_target, NotificationTarget};

use crate::Route;

#[component]
pub fn Notifications() -> Element {
    let nav = use_navigator();
    rsx! {
        NotificationsView {
            on_open: move |notification: Notification| {
                match notification_target(&notification) {
                    Some(NotificationTarget::Board(id)) => {
                        nav.push(Route::BoardDetail { id });
                    }
                    Some(NotificationTarget::Card { board_id, card_id }) => {
                        nav.push(Route::CardDetail { board_id, card_id });
                    }
                    None => {}
                }
            },
        }
    }
}
