//! Board creation form.

use api::NewBoard;
use dioxus::prelude::*;
use store::{Member, Tag};

use crate::{alert, refresh_boards, use_alerts, use_backend, use_boards, AlertLevel, MemberRow, TagChip};

#[component]
pub fn NewBoardView(
    /// Id of the created board when the backend returned it.
    on_created: EventHandler<Option<i64>>,
    on_cancel: EventHandler<()>,
) -> Element {
    let backend = use_backend();
    let mut boards = use_boards();
    let mut alerts = use_alerts();

    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut is_public = use_signal(|| false);
    let mut members = use_signal(Vec::<Member>::new);
    let mut tags = use_signal(Vec::<Tag>::new);
    let mut member_email = use_signal(String::new);
    let mut tag_name = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);

    let add_member = move |_| async move {
        error.set(None);
        match backend.client().find_user_by_email(&member_email()).await {
            Ok(Some(user)) => {
                if !members.read().iter().any(|m| m.id == user.id) {
                    members.write().push(user);
                }
                member_email.set(String::new());
            }
            Ok(None) => error.set(Some(format!("No user with email {}", member_email().trim()))),
            Err(e) => error.set(Some(backend.handle_error(&e))),
        }
    };

    let add_tag = move |_| async move {
        let wanted = tag_name().trim().to_string();
        if wanted.is_empty() || tags.read().iter().any(|t| t.name.eq_ignore_ascii_case(&wanted)) {
            tag_name.set(String::new());
            return;
        }
        match backend.client().find_or_create_tag(&wanted).await {
            Ok(tag) => {
                tags.write().push(tag);
                tag_name.set(String::new());
            }
            Err(e) => error.set(Some(backend.handle_error(&e))),
        }
    };

    let handle_create = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            let board = NewBoard {
                name: name().trim().to_string(),
                description: description().trim().to_string(),
                is_public: is_public(),
                member_ids: members.read().iter().map(|m| m.id).collect(),
                tag_ids: tags.read().iter().map(|t| t.id).collect(),
                image: None,
            };
            saving.set(true);
            match backend.client().create_board(board).await {
                Ok(created) => {
                    alert(&mut alerts, AlertLevel::Success, &format!("Board \"{}\" created", name().trim()));
                    let id = created.as_ref().map(|b| b.id);
                    match created {
                        Some(board) => boards.write().upsert(board),
                        None => refresh_boards(boards, backend).await,
                    }
                    on_created.call(id);
                }
                Err(e) => error.set(Some(backend.handle_error(&e))),
            }
            saving.set(false);
        });
    };

    rsx! {
        div {
            class: "page page-narrow",
            h1 { "New board" }

            form {
                class: "stacked-form",
                onsubmit: handle_create,

                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                label { "Name" }
                input {
                    r#type: "text",
                    placeholder: "Product roadmap",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }

                label { "Description" }
                textarea {
                    rows: 3,
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }

                label {
                    class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: is_public(),
                        onchange: move |evt: FormEvent| is_public.set(evt.checked()),
                    }
                    " Public board"
                }

                label { "Members" }
                div {
                    class: "inline-field",
                    input {
                        r#type: "email",
                        placeholder: "teammate@example.com",
                        value: member_email(),
                        oninput: move |evt: FormEvent| member_email.set(evt.value()),
                    }
                    button { r#type: "button", class: "secondary", onclick: add_member, "Add" }
                }
                div {
                    class: "member-list",
                    for member in members() {
                        MemberRow {
                            key: "{member.id}",
                            member: member.clone(),
                            on_remove: move |id: i64| members.write().retain(|m| m.id != id),
                        }
                    }
                }

                label { "Tags" }
                div {
                    class: "inline-field",
                    input {
                        r#type: "text",
                        placeholder: "design",
                        value: tag_name(),
                        oninput: move |evt: FormEvent| tag_name.set(evt.value()),
                    }
                    button { r#type: "button", class: "secondary", onclick: add_tag, "Add" }
                }
                div {
                    class: "tag-list",
                    for tag in tags() {
                        TagChip {
                            key: "{tag.id}",
                            name: tag.name.clone(),
                            on_remove: move |removed: String| tags.write().retain(|t| t.name != removed),
                        }
                    }
                }

                div {
                    class: "form-actions",
                    button {
                        class: "primary",
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Creating..." } else { "Create board" }
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
