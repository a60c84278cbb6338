use dioxus::prelude::*;
use store::Board;

use crate::icons::FaPlus;
use crate::{refresh_boards, use_auth, use_backend, use_boards, BoardCard, Icon};

/// Boards of the signed-in user: favourites, own boards, shared boards.
#[component]
pub fn BoardListView(on_open_board: EventHandler<i64>, on_create_board: EventHandler<()>) -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let boards = use_boards();

    let store = boards();
    let user_id = auth().user_id().unwrap_or_default();
    let (mine, shared) = store.partition(user_id);
    let favorites = store.favorites();

    rsx! {
        div {
            class: "page",
            div {
                class: "page-header",
                h1 { "Boards" }
                div {
                    class: "page-actions",
                    button {
                        class: "secondary",
                        disabled: store.loading,
                        onclick: move |_| async move { refresh_boards(boards, backend).await },
                        if store.loading { "Refreshing..." } else { "Refresh" }
                    }
                    button {
                        class: "primary",
                        onclick: move |_| on_create_board.call(()),
                        Icon { icon: FaPlus, width: 12, height: 12 }
                        " New board"
                    }
                }
            }

            if let Some(err) = store.error.clone() {
                div { class: "form-error", "{err}" }
            }

            if !favorites.is_empty() {
                BoardSection { title: "Favourites", boards: favorites, favorite_ids: store.favorite_ids.clone(), on_open_board }
            }
            BoardSection {
                title: "My boards",
                empty: "You have not created a board yet.",
                boards: mine,
                favorite_ids: store.favorite_ids.clone(),
                on_open_board,
            }
            if !shared.is_empty() {
                BoardSection { title: "Shared with me", boards: shared, favorite_ids: store.favorite_ids.clone(), on_open_board }
            }
        }
    }
}

#[component]
fn BoardSection(
    title: String,
    #[props(default)] empty: Option<String>,
    boards: Vec<Board>,
    favorite_ids: Vec<i64>,
    on_open_board: EventHandler<i64>,
) -> Element {
    rsx! {
        section {
            class: "board-section",
            h2 { "{title}" }
            if boards.is_empty() {
                if let Some(empty) = empty {
                    p { class: "empty-state", "{empty}" }
                }
            }
            div {
                class: "board-grid",
                for board in boards {
                    BoardCard {
                        key: "{board.id}",
                        favorite: favorite_ids.contains(&board.id),
                        board: board.clone(),
                        on_open: on_open_board,
                    }
                }
            }
        }
    }
}
