use dioxus::prelude::*;
use store::Card;

use crate::badges::{Avatar, PriorityBadge};
use crate::format::format_date;

/// Compact card used in kanban columns.
#[component]
pub fn CardTile(card: Card, on_open: EventHandler<i64>) -> Element {
    let id = card.id;
    let priority = card.effective_priority(chrono::Utc::now());

    rsx! {
        div {
            class: "card-tile",
            onclick: move |_| on_open.call(id),
            div { class: "card-tile-title", "{card.title}" }
            div {
                class: "card-tile-meta",
                PriorityBadge { priority }
                if card.due_date.is_some() {
                    span { class: "card-tile-due", "{format_date(card.due_date)}" }
                }
            }
            if !card.tags.is_empty() {
                div {
                    class: "card-tile-tags",
                    for tag in card.tags.iter() {
                        span { key: "{tag}", class: "tag-chip", "#{tag}" }
                    }
                }
            }
            if let Some(responsible) = card.responsible.clone() {
                div {
                    class: "card-tile-owner",
                    Avatar { member: responsible, small: true }
                }
            }
        }
    }
}
