use dioxus::prelude::*;
use ui::views::{CardDetailView, CardFormView};

use crate::Route;

#[component]
pub fn NewCard(board_id: i64) -> Element {
    let nav = use_navigator();
    rsx! {
        CardFormView {
            board_id,
            on_saved: move |_| {
                nav.replace(Route::BoardDetail { id: board_id });
            },
            on_cancel: move |_| nav.go_back(),
        }
    }
}

#[component]
pub fn EditCard(board_id: i64, card_id: i64) -> Element {
    let nav = use_navigator();
    rsx! {
        CardFormView {
            board_id,
            card_id,
            on_saved: move |_| {
                nav.replace(Route::CardDetail { board_id, card_id });
            },
            on_cancel: move |_| nav.go_back(),
        }
    }
}

#[component]
pub fn CardDetail(board_id: i64, card_id: i64) -> Element {
    let nav = use_navigator();
    rsx! {
        CardDetailView {
            board_id,
            card_id,
            on_edit: move |_| {
                nav.push(Route::EditCard { board_id, card_id });
            },
            on_back: move |_| {
                nav.push(Route::BoardDetail { id: board_id });
            },
            on_deleted: move |_| {
                nav.replace(Route::BoardDetail { id: board_id });
            },
        }
    }
}
