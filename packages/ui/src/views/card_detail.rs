use dioxus::prelude::*;

use crate::format::format_date;
use crate::views::ConfirmDialog;
use crate::{alert, use_alerts, use_backend, AlertLevel, MemberRow, PriorityBadge, StateBadge, TagChip};

/// Read-only card page with edit and delete actions.
#[component]
pub fn CardDetailView(
    board_id: i64,
    card_id: i64,
    on_edit: EventHandler<()>,
    on_back: EventHandler<()>,
    on_deleted: EventHandler<()>,
) -> Element {
    let mut key = use_signal(|| (board_id, card_id));
    if *key.peek() != (board_id, card_id) {
        key.set((board_id, card_id));
    }

    let backend = use_backend();
    let mut alerts = use_alerts();
    let mut confirming = use_signal(|| false);

    let loader = use_resource(move || {
        let (board_id, card_id) = key();
        async move {
            let client = backend.client();
            let (board, card, members) = futures::join!(
                client.get_board(board_id),
                client.get_card(card_id),
                client.card_members(card_id),
            );
            let mut card = card?;
            card.members = members.unwrap_or_default();
            if let Ok(board) = board {
                card.responsible = card
                    .responsible_id
                    .and_then(|id| board.member(id).cloned());
            }
            Ok::<store::Card, api::ApiError>(card)
        }
    });

    let delete = move |_| async move {
        confirming.set(false);
        match backend.client().delete_card(card_id).await {
            Ok(()) => {
                alert(&mut alerts, AlertLevel::Success, "Card deleted");
                on_deleted.call(());
            }
            Err(e) => {
                let message = backend.handle_error(&e);
                alert(&mut alerts, AlertLevel::Error, &format!("Could not delete card: {message}"));
            }
        }
    };

    let card = match &*loader.read() {
        None => return rsx! { div { class: "page-loading", "Loading card..." } },
        Some(Err(e)) => {
            return rsx! {
                div { class: "page", div { class: "form-error", "Could not load card: {e}" } }
            }
        }
        Some(Ok(card)) => card.clone(),
    };
    let priority = card.effective_priority(chrono::Utc::now());
    let description = card.description.clone().unwrap_or_default();

    rsx! {
        div {
            class: "page page-narrow",
            button { class: "link-button", onclick: move |_| on_back.call(()), "← Back to board" }

            div {
                class: "page-header",
                h1 { "{card.title}" }
                div {
                    class: "page-actions",
                    button { class: "secondary", onclick: move |_| on_edit.call(()), "Edit" }
                    button { class: "danger", onclick: move |_| confirming.set(true), "Delete" }
                }
            }

            div {
                class: "card-meta",
                StateBadge { state: card.state.clone() }
                PriorityBadge { priority }
                span { "Start: {format_date(card.begin_date)}" }
                span { "Due: {format_date(card.due_date)}" }
            }

            if description.is_empty() {
                p { class: "muted", "No description." }
            } else {
                p { class: "card-description", "{description}" }
            }

            h3 { "Responsible" }
            match card.responsible.clone() {
                Some(owner) => rsx! { MemberRow { member: owner } },
                None => rsx! { p { class: "muted", "Unassigned" } },
            }

            h3 { "Members" }
            if card.members.is_empty() {
                p { class: "muted", "No members." }
            }
            for member in card.members.clone() {
                MemberRow { key: "{member.id}", member }
            }

            if !card.tags.is_empty() {
                h3 { "Tags" }
                div {
                    class: "tag-list",
                    for tag in card.tags.clone() {
                        TagChip { key: "{tag}", name: tag }
                    }
                }
            }

            if confirming() {
                ConfirmDialog {
                    title: "Delete card",
                    message: format!("\"{}\" will be removed from the board.", card.title),
                    on_confirm: delete,
                    on_cancel: move |_| confirming.set(false),
                }
            }
        }
    }
}
