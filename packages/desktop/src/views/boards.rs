use dioxus::prelude::*;
use ui::views::{BoardDetailView, BoardListView, BoardSettingsView, NewBoardView};

use crate::Route;

#[component]
pub fn Boards() -> Element {
    let nav = use_navigator();
    rsx! {
        BoardListView {
            on_open_board: move |id: i64| {
                nav.push(Route::BoardDetail { id });
            },
            on_create_board: move |_| {
                nav.push(Route::NewBoard {});
            },
        }
    }
}

#[component]
pub fn NewBoard() -> Element {
    let nav = use_navigator();
    rsx! {
        NewBoardView {
            on_created: move |id: Option<i64>| {
                match id {
                    Some(id) => nav.replace(Route::BoardDetail { id }),
                    None => nav.replace(Route::Boards {}),
                };
            },
            on_cancel: move |_| nav.go_back(),
        }
    }
}

#[component]
pub fn BoardDetail(id: i64) -> Element {
    let nav = use_navigator();
    rsx! {
        BoardDetailView {
            board_id: id,
            on_open_card: move |card_id: i64| {
                nav.push(Route::CardDetail { board_id: id, card_id });
            },
            on_new_card: move |_| {
                nav.push(Route::NewCard { board_id: id });
            },
            on_settings: move |_| {
                nav.push(Route::BoardSettings { id });
            },
        }
    }
}

#[component]
pub fn BoardSettings(id: i64) -> Element {
    let nav = use_navigator();
    rsx! {
        BoardSettingsView {
            board_id: id,
            on_back: move |_| {
                nav.push(Route::BoardDetail { id });
            },
            on_deleted: move |_| {
                nav.replace(Route::Boards {});
            },
        }
    }
}
