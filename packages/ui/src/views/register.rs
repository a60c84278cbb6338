//! Account creation.

use api::RegisterForm;
use dioxus::prelude::*;

use crate::{alert, use_alerts, use_backend, AlertLevel};

#[component]
pub fn RegisterView(
    /// Called after sign-up. `true` when the backend signed the user in.
    on_registered: EventHandler<bool>,
    on_login: EventHandler<()>,
) -> Element {
    let backend = use_backend();
    let mut alerts = use_alerts();
    let mut form = use_signal(RegisterForm::default);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            let submitted = form();
            if let Err(e) = submitted.validate() {
                error.set(Some(e.to_string()));
                return;
            }
            loading.set(true);
            match backend.register(&submitted).await {
                Ok(signed_in) => {
                    alert(&mut alerts, AlertLevel::Success, "Account created");
                    on_registered.call(signed_in);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-page",
            h1 { "Create account" }
            p { class: "auth-subtitle", "Start organising your work" }

            form {
                class: "auth-form",
                onsubmit: handle_register,

                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                div {
                    class: "form-row",
                    input {
                        r#type: "text",
                        placeholder: "First name",
                        value: form().first_name,
                        oninput: move |evt: FormEvent| form.write().first_name = evt.value(),
                    }
                    input {
                        r#type: "text",
                        placeholder: "Last name",
                        value: form().last_name,
                        oninput: move |evt: FormEvent| form.write().last_name = evt.value(),
                    }
                }
                input {
                    r#type: "email",
                    placeholder: "Email",
                    value: form().email,
                    oninput: move |evt: FormEvent| form.write().email = evt.value(),
                }
                input {
                    r#type: "password",
                    placeholder: "Password (at least 8 characters)",
                    value: form().password,
                    oninput: move |evt: FormEvent| form.write().password = evt.value(),
                }
                input {
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: form().confirm_password,
                    oninput: move |evt: FormEvent| form.write().confirm_password = evt.value(),
                }

                button {
                    class: "primary",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating account..." } else { "Create account" }
                }
            }

            p {
                class: "auth-switch",
                "Already registered? "
                button {
                    class: "link-button",
                    onclick: move |_| on_login.call(()),
                    "Sign in"
                }
            }
        }
    }
}
