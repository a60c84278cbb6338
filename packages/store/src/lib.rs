pub mod config;
pub mod models;
pub mod notifications;
pub mod session;

mod memory;
pub use memory::MemorySessionStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileSessionStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageStore;

pub use config::ClientConfig;
pub use models::{
    group_by_state, Board, BoardList, Card, CardState, Member, Notification, NotificationKind,
    NotificationPage, PageMeta, Priority, ResourceKind, ResourceRef, Tag, User,
};
pub use notifications::{FeedFilter, LocalNotification, NotificationFeed};
pub use session::{AuthSession, SessionError, SessionStore};
