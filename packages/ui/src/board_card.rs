use dioxus::prelude::*;
use store::Board;

use crate::badges::Avatar;
use crate::icons::{FaLock, FaStar};
use crate::Icon;

/// Members shown before the "+N" counter.
const MAX_AVATARS: usize = 4;

#[component]
pub fn BoardCard(board: Board, favorite: bool, on_open: EventHandler<i64>) -> Element {
    let id = board.id;
    let hidden = board.members.len().saturating_sub(MAX_AVATARS);

    rsx! {
        div {
            class: "board-card",
            onclick: move |_| on_open.call(id),
            if let Some(image) = board.image.clone().filter(|i| !i.is_empty()) {
                img { class: "board-card-image", src: "{image}", alt: "" }
            }
            div {
                class: "board-card-body",
                div {
                    class: "board-card-title",
                    span { "{board.name}" }
                    if favorite {
                        span { class: "board-card-favorite", title: "Favourite", Icon { icon: FaStar, width: 12, height: 12 } }
                    }
                    if !board.is_public {
                        span { class: "board-card-private", title: "Private", Icon { icon: FaLock, width: 12, height: 12 } }
                    }
                }
                if !board.description.is_empty() {
                    p { class: "board-card-description", "{board.description}" }
                }
                div {
                    class: "board-card-footer",
                    div {
                        class: "avatar-stack",
                        for member in board.members.iter().take(MAX_AVATARS) {
                            Avatar { key: "{member.id}", member: member.clone(), small: true }
                        }
                        if hidden > 0 {
                            span { class: "avatar avatar-small avatar-more", "+{hidden}" }
                        }
                    }
                    div {
                        class: "board-card-tags",
                        for tag in board.tags.iter() {
                            span { key: "{tag.id}", class: "tag-chip", "#{tag.name}" }
                        }
                    }
                }
            }
        }
    }
}
