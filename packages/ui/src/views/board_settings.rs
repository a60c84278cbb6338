//! Board settings: details, members and deletion.
//!
//! Only the board creator may edit or delete; the backend enforces this and
//! the 403 messages are shown inline.

use api::BoardUpdate;
use dioxus::prelude::*;
use store::Board;

use crate::views::ConfirmDialog;
use crate::{alert, use_alerts, use_auth, use_backend, use_boards, AlertLevel, MemberRow};

#[component]
pub fn BoardSettingsView(board_id: i64, on_back: EventHandler<()>, on_deleted: EventHandler<()>) -> Element {
    let mut id_signal = use_signal(|| board_id);
    if *id_signal.peek() != board_id {
        id_signal.set(board_id);
    }

    let auth = use_auth();
    let backend = use_backend();
    let mut boards = use_boards();
    let mut alerts = use_alerts();

    let mut board = use_signal(|| Option::<Board>::None);
    let mut form = use_signal(BoardUpdate::default);
    let mut member_email = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut saving = use_signal(|| false);
    let mut confirming = use_signal(|| false);

    let _loader = use_resource(move || {
        let id = id_signal();
        async move {
            match backend.client().get_board(id).await {
                Ok(loaded) => {
                    form.set(BoardUpdate::from_board(&loaded));
                    board.set(Some(loaded));
                }
                Err(e) => error.set(Some(backend.handle_error(&e))),
            }
        }
    });

    let save = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            saving.set(true);
            let result = backend.client().update_board(id_signal(), form()).await;
            saving.set(false);
            match result {
                Ok(updated) => {
                    let mut current = board().unwrap_or_default();
                    match updated {
                        Some(fresh) => current = fresh,
                        None => {
                            let values = form();
                            current.name = values.name;
                            current.description = values.description;
                            current.is_public = values.is_public;
                        }
                    }
                    boards.write().upsert(current.clone());
                    board.set(Some(current));
                    alert(&mut alerts, AlertLevel::Success, "Board updated");
                }
                Err(e) => error.set(Some(backend.handle_error(&e))),
            }
        });
    };

    let add_member = move |_| async move {
        error.set(None);
        let client = backend.client();
        let user = match client.find_user_by_email(&member_email()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                error.set(Some(format!("No user with email {}", member_email().trim())));
                return;
            }
            Err(e) => {
                error.set(Some(backend.handle_error(&e)));
                return;
            }
        };
        if board.read().as_ref().is_some_and(|b| b.member(user.id).is_some()) {
            error.set(Some(format!("{} is already a member", user.display_name())));
            return;
        }
        match client.add_member(id_signal(), user.id).await {
            Ok(()) => {
                alert(&mut alerts, AlertLevel::Success, &format!("{} added to the board", user.display_name()));
                if let Some(b) = board.write().as_mut() {
                    b.members.push(user);
                    boards.write().upsert(b.clone());
                }
                member_email.set(String::new());
            }
            Err(e) => error.set(Some(backend.handle_error(&e))),
        }
    };

    let remove_member = move |user_id: i64| {
        spawn(async move {
            error.set(None);
            match backend.client().remove_member(id_signal(), user_id).await {
                Ok(()) => {
                    if let Some(b) = board.write().as_mut() {
                        b.members.retain(|m| m.id != user_id);
                        boards.write().upsert(b.clone());
                    }
                    alert(&mut alerts, AlertLevel::Info, "Member removed");
                }
                Err(e) => error.set(Some(backend.handle_error(&e))),
            }
        });
    };

    let delete = move |_| async move {
        confirming.set(false);
        let id = id_signal();
        match backend.client().delete_board(id).await {
            Ok(()) => {
                boards.write().remove(id);
                alert(&mut alerts, AlertLevel::Success, "Board deleted");
                on_deleted.call(());
            }
            Err(e) => error.set(Some(backend.handle_error(&e))),
        }
    };

    let Some(current) = board() else {
        return rsx! {
            div {
                class: "page page-narrow",
                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                } else {
                    div { class: "page-loading", "Loading board..." }
                }
            }
        };
    };
    let owner_id = current.user_id;
    let is_owner = auth().user_id() == Some(owner_id);
    let values = form();

    rsx! {
        div {
            class: "page page-narrow",
            button { class: "link-button", onclick: move |_| on_back.call(()), "← Back to board" }
            h1 { "Settings: {current.name}" }

            if let Some(err) = error() {
                div { class: "form-error", "{err}" }
            }
            if !is_owner {
                p { class: "muted", "Only the board creator can change these settings." }
            }

            form {
                class: "stacked-form",
                onsubmit: save,
                label { "Name" }
                input {
                    r#type: "text",
                    value: "{values.name}",
                    oninput: move |evt: FormEvent| form.write().name = evt.value(),
                }
                label { "Description" }
                textarea {
                    rows: 3,
                    value: "{values.description}",
                    oninput: move |evt: FormEvent| form.write().description = evt.value(),
                }
                label {
                    class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: values.is_public,
                        onchange: move |evt: FormEvent| form.write().is_public = evt.checked(),
                    }
                    " Public board"
                }
                div {
                    class: "form-actions",
                    button {
                        class: "primary",
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Save changes" }
                    }
                }
            }

            h2 { "Members" }
            div {
                class: "inline-field",
                input {
                    r#type: "email",
                    placeholder: "teammate@example.com",
                    value: member_email(),
                    oninput: move |evt: FormEvent| member_email.set(evt.value()),
                }
                button { class: "secondary", onclick: add_member, "Add member" }
            }
            div {
                class: "member-list",
                for member in current.members.clone() {
                    if member.id == owner_id {
                        MemberRow { key: "{member.id}", member, note: "Owner".to_string() }
                    } else {
                        MemberRow { key: "{member.id}", member, on_remove: remove_member }
                    }
                }
            }

            h2 { "Danger zone" }
            button { class: "danger", onclick: move |_| confirming.set(true), "Delete board" }

            if confirming() {
                ConfirmDialog {
                    title: "Delete board",
                    message: format!("\"{}\" and all its cards will be deleted.", current.name),
                    on_confirm: delete,
                    on_cancel: move |_| confirming.set(false),
                }
            }
        }
    }
}
