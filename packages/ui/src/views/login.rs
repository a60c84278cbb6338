//! Email/password sign-in.

use dioxus::prelude::*;

use crate::{use_auth, use_backend};

#[component]
pub fn LoginView(on_signed_in: EventHandler<()>, on_register: EventHandler<()>) -> Element {
    let auth = use_auth();
    let backend = use_backend();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    // Already signed in
    use_effect(move || {
        let state = auth();
        if !state.loading && state.is_authenticated() {
            on_signed_in.call(());
        }
    });

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        spawn(async move {
            error.set(None);
            if let Err(e) = api::validate_login(&email(), &password()) {
                error.set(Some(e.to_string()));
                return;
            }
            loading.set(true);
            match backend.login(&email(), &password()).await {
                // The effect above navigates once the auth state flips.
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("login failed: {e}");
                    error.set(Some(match e {
                        api::ApiError::Unauthorized(_) => "Invalid email or password".to_string(),
                        other => other.to_string(),
                    }));
                }
            }
            loading.set(false);
        });
    };

    rsx! {
        div {
            class: "auth-page",
            h1 { "Kanban" }
            p { class: "auth-subtitle", "Sign in to your boards" }

            form {
                class: "auth-form",
                onsubmit: handle_login,

                if let Some(err) = error() {
                    div { class: "form-error", "{err}" }
                }

                label { r#for: "login-email", "Email" }
                input {
                    id: "login-email",
                    r#type: "email",
                    placeholder: "you@example.com",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }

                label { r#for: "login-password", "Password" }
                input {
                    id: "login-password",
                    r#type: "password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }

                button {
                    class: "primary",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "auth-switch",
                "No account yet? "
                button {
                    class: "link-button",
                    onclick: move |_| on_register.call(()),
                    "Create one"
                }
            }
        }
    }
}
