//! One push connection per app.
//!
//! The socket is opened lazily by the first caller of [`pusher_client`] and
//! shared afterwards. [`disconnect_pusher`] closes it and forgets the handle,
//! so the next call opens a fresh connection (with whatever token is current
//! by then).

use std::cell::RefCell;

use api::realtime::{self, HttpAuthorizer, PusherClient, PusherOptions};
use api::ApiClient;
use dioxus::core::spawn_forever;
use store::ClientConfig;

thread_local! {
    static PUSHER: RefCell<Option<PusherClient>> = const { RefCell::new(None) };
}

/// The shared client, connecting on first use. `None` when push is not
/// configured.
pub fn pusher_client(config: &ClientConfig, api: &ApiClient) -> Option<PusherClient> {
    PUSHER.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(client) = slot.as_ref().filter(|c| !c.is_closed()) {
            return Some(client.clone());
        }
        let options = PusherOptions::from_config(config)?;
        let authorizer = HttpAuthorizer::new(api.clone(), options.auth_endpoint.clone());
        let (client, driver) = realtime::connect(options, authorizer);
        spawn_forever(driver);
        tracing::debug!("[pusher] client created");
        *slot = Some(client.clone());
        Some(client)
    })
}

pub fn disconnect_pusher() {
    let client = PUSHER.with(|slot| slot.borrow_mut().take());
    if let Some(client) = client {
        client.disconnect();
        tracing::debug!("[pusher] client disconnected");
    }
}
