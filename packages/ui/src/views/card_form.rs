//! Create and edit form for cards.

use api::{CardDraft, ListTarget};
use dioxus::prelude::*;
use store::{BoardList, CardState, Member, Priority};

use crate::format::{date_input_value, parse_date_input};
use crate::{alert, use_alerts, use_backend, AlertLevel, PriorityBadge, TagChip};

const NEW_LIST: &str = "__new__";

#[derive(Clone, Debug, Default, PartialEq)]
struct FormData {
    members: Vec<Member>,
    lists: Vec<BoardList>,
}

/// Card editor. With `card_id` the card is loaded and updated, otherwise a
/// new card is created on `board_id`.
#[component]
pub fn CardFormView(
    board_id: i64,
    #[props(default)] card_id: Option<i64>,
    on_saved: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let mut key = use_signal(|| (board_id, card_id));
    if *key.peek() != (board_id, card_id) {
        key.set((board_id, card_id));
    }

    let backend = use_backend();
    let mut alerts = use_alerts();
    let mut draft = use_signal(|| CardDraft::new(board_id, ""));
    let mut list_choice = use_signal(String::new);
    let mut new_list = use_signal(String::new);
    let mut tag_name = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);

    let loader = use_resource(move || {
        let (board_id, card_id) = key();
        async move {
            let client = backend.client();
            let board = client.get_board(board_id).await?;
            let lists = client.lists_by_board(board_id).await.unwrap_or_else(|e| {
                tracing::warn!(board_id, "could not load lists: {e}");
                Vec::new()
            });
            let initial = match card_id {
                Some(id) => CardDraft::from_card(&client.get_card(id).await?, board_id),
                None => CardDraft::new(board_id, ""),
            };
            list_choice.set(initial.list_id.map(|id| id.to_string()).unwrap_or_default());
            draft.set(initial);
            Ok::<FormData, api::ApiError>(FormData {
                members: board.members,
                lists,
            })
        }
    });

    let add_tag = move |_| async move {
        let wanted = tag_name().trim().to_string();
        if wanted.is_empty() {
            return;
        }
        match backend.client().find_or_create_tag(&wanted).await {
            Ok(tag) => {
                draft.write().add_tag(&tag.name);
                tag_name.set(String::new());
            }
            Err(e) => error.set(Some(backend.handle_error(&e))),
        }
    };

    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            let choice = list_choice();
            let target = match choice.as_str() {
                "" => None,
                NEW_LIST => Some(ListTarget::New(new_list())),
                id => id.parse().ok().map(ListTarget::Existing),
            };
            let mut body = draft();
            body.priority = Priority::from_due_date(body.due_date, chrono::Utc::now());
            if let Some(target) = target {
                body = body.with_list(target);
            }
            if let Err(e) = body.validate() {
                error.set(Some(e.to_string()));
                return;
            }

            saving.set(true);
            let client = backend.client();
            let result = match key().1 {
                Some(id) => client.update_card(id, &body).await,
                None => client.create_card(&body).await,
            };
            saving.set(false);
            match result {
                Ok(()) => {
                    let verb = if key().1.is_some() { "updated" } else { "created" };
                    alert(&mut alerts, AlertLevel::Success, &format!("Card \"{}\" {verb}", body.title.trim()));
                    on_saved.call(());
                }
                Err(e) => error.set(Some(backend.handle_error(&e))),
            }
        });
    };

    let data = match &*loader.read() {
        None => return rsx! { div { class: "page-loading", "Loading..." } },
        Some(Err(e)) => {
            return rsx! {
                div { class: "page", div { class: "form-error", "Could not load card: {e}" } }
            }
        }
        Some(Ok(data)) => data.clone(),
    };

    let current = draft();
    let derived = Priority::from_due_date(current.due_date, chrono::Utc::now());
    let mut states = CardState::DEFAULTS.to_vec();
    if let Some(state) = current.state.clone().filter(|s| !states.contains(s)) {
        states.push(state);
    }
    let selected_state = current.state.clone().unwrap_or_default();
    let responsible = current.responsable_id.map(|id| id.to_string()).unwrap_or_default();
    let title = if card_id.is_some() { "Edit card" } else { "New card" };

    rsx! {
        div {
            class: "page page-narrow",
            h1 { "{title}" }

            form {
                class: "stacked-form",
                onsubmit: handle_save,

                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                label { "Title" }
                input {
                    r#type: "text",
                    value: "{current.title}",
                    oninput: move |evt: FormEvent| draft.write().title = evt.value(),
                }

                label { "Description" }
                textarea {
                    rows: 4,
                    value: "{current.description}",
                    oninput: move |evt: FormEvent| draft.write().description = evt.value(),
                }

                div {
                    class: "form-row",
                    div {
                        label { "Start date" }
                        input {
                            r#type: "date",
                            value: date_input_value(current.begin_date),
                            oninput: move |evt: FormEvent| draft.write().begin_date = parse_date_input(&evt.value()),
                        }
                    }
                    div {
                        label { "Due date" }
                        input {
                            r#type: "date",
                            value: date_input_value(current.due_date),
                            oninput: move |evt: FormEvent| draft.write().due_date = parse_date_input(&evt.value()),
                        }
                    }
                    div {
                        label { "Priority" }
                        PriorityBadge { priority: derived }
                    }
                }

                label { "State" }
                select {
                    value: "{selected_state.as_str()}",
                    onchange: move |evt: FormEvent| draft.write().state = Some(CardState::parse(&evt.value())),
                    for state in states {
                        option {
                            value: "{state.as_str()}",
                            selected: state == selected_state,
                            "{state.label()}"
                        }
                    }
                }

                label { "Responsible" }
                select {
                    value: "{responsible}",
                    onchange: move |evt: FormEvent| draft.write().responsable_id = evt.value().parse().ok(),
                    option { value: "", "Unassigned" }
                    for member in data.members.iter() {
                        option {
                            value: "{member.id}",
                            selected: responsible == member.id.to_string(),
                            "{member.display_name()}"
                        }
                    }
                }

                label { "List" }
                select {
                    value: list_choice(),
                    onchange: move |evt: FormEvent| list_choice.set(evt.value()),
                    option { value: "", "No list" }
                    for list in data.lists.iter() {
                        option {
                            value: "{list.id}",
                            selected: list_choice() == list.id.to_string(),
                            "{list.name}"
                        }
                    }
                    option { value: NEW_LIST, "New list..." }
                }
                if list_choice() == NEW_LIST {
                    input {
                        r#type: "text",
                        placeholder: "List name",
                        value: new_list(),
                        oninput: move |evt: FormEvent| new_list.set(evt.value()),
                    }
                }

                label { "Tags" }
                div {
                    class: "inline-field",
                    input {
                        r#type: "text",
                        placeholder: "frontend",
                        value: tag_name(),
                        oninput: move |evt: FormEvent| tag_name.set(evt.value()),
                    }
                    button { r#type: "button", class: "secondary", onclick: add_tag, "Add" }
                }
                div {
                    class: "tag-list",
                    for tag in current.tags.clone() {
                        TagChip {
                            key: "{tag}",
                            name: tag.clone(),
                            on_remove: move |removed: String| draft.write().tags.retain(|t| *t != removed),
                        }
                    }
                }

                div {
                    class: "form-actions",
                    button {
                        class: "primary",
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Save card" }
                    }
                    button {
                        r#type: "button",
                        class: "secondary",
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                }
            }
        }
    }
}
