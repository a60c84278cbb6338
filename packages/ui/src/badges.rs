//! Small inline markers for cards and members.

use dioxus::prelude::*;
use store::{CardState, Member, Priority};

#[component]
pub fn PriorityBadge(priority: Option<Priority>) -> Element {
    match priority {
        Some(priority) => rsx! {
            span { class: "badge {priority.css_class()}", "{priority.label()}" }
        },
        None => rsx! {
            span { class: "badge priority-none", "No due date" }
        },
    }
}

#[component]
pub fn StateBadge(state: CardState) -> Element {
    rsx! {
        span { class: "badge {state.css_class()}", "{state.label()}" }
    }
}

#[component]
pub fn TagChip(name: String, #[props(default)] on_remove: Option<EventHandler<String>>) -> Element {
    let label = name.clone();
    rsx! {
        span {
            class: "tag-chip",
            "#{label}"
            if let Some(on_remove) = on_remove {
                button {
                    class: "tag-chip-remove",
                    title: "Remove tag",
                    onclick: move |_| on_remove.call(name.clone()),
                    "×"
                }
            }
        }
    }
}

/// Round initials badge; shows the profile picture when there is one.
#[component]
pub fn Avatar(member: Member, #[props(default)] small: bool) -> Element {
    let class = if small { "avatar avatar-small" } else { "avatar" };
    let name = member.display_name();
    match member.profile_picture.clone() {
        Some(src) if !src.is_empty() => rsx! {
            img { class: "{class}", src: "{src}", alt: "{name}", title: "{name}" }
        },
        _ => rsx! {
            span { class: "{class}", title: "{name}", "{member.initials()}" }
        },
    }
}

/// Avatar, name and email, with an optional remove action.
#[component]
pub fn MemberRow(
    member: Member,
    #[props(default)] note: Option<String>,
    #[props(default)] on_remove: Option<EventHandler<i64>>,
) -> Element {
    let id = member.id;
    let name = member.display_name();
    let email = member.email.clone();
    rsx! {
        div {
            class: "member-row",
            Avatar { member, small: true }
            div {
                class: "member-row-text",
                span { class: "member-row-name", "{name}" }
                span { class: "member-row-email", "{email}" }
            }
            if let Some(note) = note {
                span { class: "member-row-note", "{note}" }
            }
            if let Some(on_remove) = on_remove {
                button {
                    r#type: "button",
                    class: "link-button",
                    onclick: move |_| on_remove.call(id),
                    "Remove"
                }
            }
        }
    }
}
