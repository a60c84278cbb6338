use dioxus::prelude::*;

use crate::alerts::use_alerts;

const ALERTS_CSS: Asset = asset!("/assets/styling/alerts.css");

#[component]
pub fn AlertPanel() -> Element {
    let mut log = use_alerts();

    if !log().visible {
        return rsx! {};
    }

    let entries = log().entries.clone();

    rsx! {
        document::Stylesheet { href: ALERTS_CSS }

        div {
            class: "alert-panel",
            div {
                class: "alert-panel-header",
                span { "Activity" }
                div {
                    class: "alert-panel-actions",
                    button {
                        onclick: move |_| log.write().entries.clear(),
                        "Clear"
                    }
                    button {
                        onclick: move |_| log.write().visible = false,
                        "Close"
                    }
                }
            }
            div {
                class: "alert-panel-entries",
                if entries.is_empty() {
                    div { class: "alert-empty", "Nothing to report." }
                }
                for entry in entries.iter().rev() {
                    div {
                        class: entry.level.css_class(),
                        span { class: "alert-time", "{entry.timestamp}" }
                        span { " {entry.message}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn AlertToggle() -> Element {
    let mut log = use_alerts();
    let count = log().entries.len();
    let has_errors = log().has_errors();

    rsx! {
        button {
            class: if has_errors { "alert-toggle has-errors" } else { "alert-toggle" },
            onclick: move |_| {
                let visible = log().visible;
                log.write().visible = !visible;
            },
            title: "Activity",
            if count > 0 {
                "{count}"
            } else {
                "Log"
            }
        }
    }
}
