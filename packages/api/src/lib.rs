//! # API crate: typed client for the kanban backend
//!
//! Every backend call the frontends make goes through [`ApiClient`]. Each
//! resource area adds its own `impl ApiClient` block in a sibling module, so
//! `client.my_boards()`, `client.create_card(..)` and
//! `client.fetch_notifications(..)` all hang off the same value.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Login, registration, token refresh, `me`, form validation |
//! | [`boards`] | Board listing, creation (multipart), update, delete, membership |
//! | [`cards`] | Cards, board lists ("columns") and the board loader |
//! | [`tags`] | Tag catalogue and get-or-create |
//! | [`users`] | User search |
//! | [`notifications`] | Notification history and read markers |
//! | [`realtime`] | Pusher websocket client for live notifications |
//! | [`error`] | [`ApiError`], mapping HTTP statuses to variants |
//!
//! ## Authentication
//!
//! Protected endpoints send `Authorization: Bearer <access token>`. A client
//! built without a token fails those calls with [`ApiError::MissingToken`]
//! before any request leaves the process. Token expiry shows up as
//! [`ApiError::is_token_expired`]; the UI reacts by refreshing or logging out.

pub mod auth;
pub mod boards;
pub mod cards;
mod client;
pub mod error;
pub mod notifications;
pub mod realtime;
pub mod tags;
pub mod users;

pub use auth::{validate_login, RegisterForm};
pub use boards::{BoardUpdate, ImageUpload, NewBoard};
pub use cards::{CardDraft, ListTarget};
pub use client::ApiClient;
pub use error::ApiError;
pub use notifications::{FetchOptions, MarkRead, TestPush};
pub use realtime::{HttpAuthorizer, PusherClient, PusherOptions, PushEvent};
pub use users::UserSearch;
