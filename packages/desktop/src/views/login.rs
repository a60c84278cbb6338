use dioxus::prelude::*;
use ui::views::{LoginView, RegisterView};

use crate::Route;

#[component]
pub fn Login() -> Element {
    let nav = use_navigator();
    rsx! {
        LoginView {
            on_signed_in: move |_| {
                nav.replace(Route::Boards {});
            },
            on_register: move |_| {
                nav.push(Route::Register {});
            },
        }
    }
}

#[component]
pub fn Register() -> Element {
    let nav = use_navigator();
    rsx! {
        RegisterView {
            on_registered: move |signed_in: bool| {
                if signed_in {
                    nav.replace(Route::Boards {});
                } else {
                    nav.replace(Route::Login {});
                }
            },
            on_login: move |_| {
                nav.push(Route::Login {});
            },
        }
    }
}
