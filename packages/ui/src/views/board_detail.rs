use dioxus::prelude::*;
use store::{group_by_state, Board, Card, CardState};

use crate::format::format_date;
use crate::icons::FaPlus;
use crate::{alert, use_alerts, use_backend, AlertLevel, Avatar, CardTile, Icon, PriorityBadge, StateBadge};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum BoardMode {
    Backlog,
    #[default]
    Kanban,
}

/// A board with its cards, as a backlog table or as kanban columns.
#[component]
pub fn BoardDetailView(
    board_id: i64,
    on_open_card: EventHandler<i64>,
    on_new_card: EventHandler<()>,
    on_settings: EventHandler<()>,
) -> Element {
    // Track the id in a signal so the loader re-runs on route param change
    let mut id_signal = use_signal(|| board_id);
    if *id_signal.peek() != board_id {
        id_signal.set(board_id);
    }

    let backend = use_backend();
    let mut alerts = use_alerts();
    let mut mode = use_signal(BoardMode::default);
    let mut search = use_signal(String::new);
    let mut new_column = use_signal(String::new);

    let mut loader = use_resource(move || {
        let id = id_signal();
        async move {
            let client = backend.client();
            let board = client.get_board(id).await?;
            let cards = client.load_board_cards(id, &board.members).await?;
            Ok::<(Board, Vec<Card>), api::ApiError>((board, cards))
        }
    });

    let add_column = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            let name = new_column().trim().to_string();
            match backend.client().create_column(id_signal(), &name).await {
                Ok(()) => {
                    alert(&mut alerts, AlertLevel::Success, &format!("List \"{name}\" added"));
                    new_column.set(String::new());
                    loader.restart();
                }
                Err(e) => {
                    let message = backend.handle_error(&e);
                    alert(&mut alerts, AlertLevel::Error, &format!("Could not add list: {message}"));
                }
            }
        });
    };

    let result = loader.read().as_ref().map(|r| match r {
        Ok(data) => Ok(data.clone()),
        Err(e) => Err(e.to_string()),
    });
    let (board, cards) = match result {
        None => return rsx! { div { class: "page-loading", "Loading board..." } },
        Some(Err(e)) => {
            return rsx! {
                div {
                    class: "page",
                    div { class: "form-error", "Could not load board: {e}" }
                    button { class: "secondary", onclick: move |_| loader.restart(), "Retry" }
                }
            }
        }
        Some(Ok(data)) => data,
    };

    let needle = search().trim().to_lowercase();
    let visible: Vec<Card> = cards
        .iter()
        .filter(|c| needle.is_empty() || c.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    let columns = group_by_state(&visible);

    rsx! {
        div {
            class: "page page-wide",
            div {
                class: "page-header",
                div {
                    h1 { "{board.name}" }
                    if !board.description.is_empty() {
                        p { class: "page-subtitle", "{board.description}" }
                    }
                }
                div {
                    class: "page-actions",
                    div {
                        class: "segmented",
                        button {
                            class: if mode() == BoardMode::Backlog { "active" } else { "" },
                            onclick: move |_| mode.set(BoardMode::Backlog),
                            "Backlog"
                        }
                        button {
                            class: if mode() == BoardMode::Kanban { "active" } else { "" },
                            onclick: move |_| mode.set(BoardMode::Kanban),
                            "Kanban"
                        }
                    }
                    button { class: "secondary", onclick: move |_| on_settings.call(()), "Settings" }
                    button {
                        class: "primary",
                        onclick: move |_| on_new_card.call(()),
                        Icon { icon: FaPlus, width: 12, height: 12 }
                        " New card"
                    }
                }
            }

            div {
                class: "board-toolbar",
                input {
                    r#type: "search",
                    placeholder: "Filter cards",
                    value: search(),
                    oninput: move |evt: FormEvent| search.set(evt.value()),
                }
                span { class: "board-count", "{visible.len()} of {cards.len()} cards" }
            }

            match mode() {
                BoardMode::Kanban => rsx! {
                    div {
                        class: "kanban",
                        for (state, column) in columns {
                            KanbanColumn { key: "{state.as_str()}", state, cards: column, on_open_card }
                        }
                        form {
                            class: "kanban-add-column",
                            onsubmit: add_column,
                            input {
                                r#type: "text",
                                placeholder: "New list name",
                                value: new_column(),
                                oninput: move |evt: FormEvent| new_column.set(evt.value()),
                            }
                            button { class: "secondary", r#type: "submit", "Add list" }
                        }
                    }
                },
                BoardMode::Backlog => rsx! {
                    BacklogTable { cards: visible.clone(), on_open_card }
                },
            }
        }
    }
}

#[component]
fn KanbanColumn(state: CardState, cards: Vec<Card>, on_open_card: EventHandler<i64>) -> Element {
    rsx! {
        section {
            class: "kanban-column {state.css_class()}",
            header {
                class: "kanban-column-header",
                span { "{state.label()}" }
                span { class: "kanban-column-count", "{cards.len()}" }
            }
            div {
                class: "kanban-column-cards",
                for card in cards {
                    CardTile { key: "{card.id}", card: card.clone(), on_open: on_open_card }
                }
            }
        }
    }
}

#[component]
fn BacklogTable(cards: Vec<Card>, on_open_card: EventHandler<i64>) -> Element {
    let now = chrono::Utc::now();
    if cards.is_empty() {
        return rsx! { p { class: "empty-state", "No cards yet." } };
    }
    rsx! {
        table {
            class: "backlog",
            thead {
                tr {
                    th { "Title" }
                    th { "State" }
                    th { "Priority" }
                    th { "Due" }
                    th { "Responsible" }
                    th { "Tags" }
                }
            }
            tbody {
                for card in cards {
                    tr {
                        key: "{card.id}",
                        onclick: move |_| on_open_card.call(card.id),
                        td { class: "backlog-title", "{card.title}" }
                        td { StateBadge { state: card.state.clone() } }
                        td { PriorityBadge { priority: card.effective_priority(now) } }
                        td { "{format_date(card.due_date)}" }
                        td {
                            if let Some(owner) = card.responsible.clone() {
                                Avatar { member: owner, small: true }
                            } else {
                                span { class: "muted", "Unassigned" }
                            }
                        }
                        td { "{card.tags.join(\", \")}" }
                    }
                }
            }
        }
    }
}
