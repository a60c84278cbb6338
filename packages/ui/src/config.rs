//! Where the client configuration comes from on each platform.
//!
//! - **Web** (WASM): `KANBAN_*` variables captured at compile time.
//! - **Desktop** (native): `kanban.toml` in the working directory, then the
//!   process environment.

use dioxus::prelude::*;
use store::ClientConfig;

pub fn load_config() -> ClientConfig {
    #[cfg(target_arch = "wasm32")]
    {
        ClientConfig::default().with_overrides(compile_time_var)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = std::path::Path::new(ClientConfig::filename());
        let config = match std::fs::read_to_string(path) {
            Ok(text) => ClientConfig::from_toml(&text).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                ClientConfig::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ClientConfig::default(),
            Err(e) => {
                tracing::warn!("could not read {}: {e}", path.display());
                ClientConfig::default()
            }
        };
        config.with_env_overrides()
    }
}

#[cfg(target_arch = "wasm32")]
fn compile_time_var(name: &str) -> Option<String> {
    let value = match name {
        "KANBAN_API_URL" => option_env!("KANBAN_API_URL"),
        "KANBAN_PUSHER_KEY" => option_env!("KANBAN_PUSHER_KEY"),
        "KANBAN_PUSHER_CLUSTER" => option_env!("KANBAN_PUSHER_CLUSTER"),
        "KANBAN_PUSHER_AUTH_ENDPOINT" => option_env!("KANBAN_PUSHER_AUTH_ENDPOINT"),
        _ => None,
    };
    value.map(str::to_string)
}

/// Configuration provided by the platform app with `use_context_provider`.
pub fn use_client_config() -> ClientConfig {
    use_context::<ClientConfig>()
}
