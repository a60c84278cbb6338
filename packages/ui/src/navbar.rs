use dioxus::prelude::*;

use crate::auth::{use_auth, LogoutButton};
use crate::badges::Avatar;
use crate::AlertToggle;

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Top bar of the signed-in layout. `children` go between the brand and the
/// user menu (the notification bell, usually).
#[component]
pub fn Navbar(on_home: EventHandler<()>, children: Element) -> Element {
    let auth = use_auth();
    let user = auth().user().cloned();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        nav {
            class: "navbar",
            button {
                class: "navbar-brand",
                onclick: move |_| on_home.call(()),
                "Kanban"
            }
            div {
                class: "navbar-actions",
                {children}
                AlertToggle {}
                if let Some(user) = user {
                    div {
                        class: "navbar-user",
                        Avatar { member: user.clone(), small: true }
                        span { class: "navbar-user-name", "{user.display_name()}" }
                    }
                }
                LogoutButton { class: "navbar-logout" }
            }
        }
    }
}
