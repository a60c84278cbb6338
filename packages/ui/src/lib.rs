//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod views;

pub mod format;

mod config;
pub use config::{load_config, use_client_config};

mod session_store;

mod auth;
pub use auth::{use_auth, use_backend, AuthProvider, AuthState, Backend, LogoutButton};

pub mod alerts;
pub use alerts::{alert, use_alerts, AlertLevel, AlertLog};

mod alert_panel;
pub use alert_panel::{AlertPanel, AlertToggle};

mod boards;
pub use boards::{refresh_boards, use_boards, BoardStore, BoardsProvider};

mod realtime;

pub mod notifications;
pub use notifications::{
    notification_target, use_notifications, NotificationContext, NotificationProvider, NotificationTarget,
};

mod navbar;
pub use navbar::Navbar;

mod notification_bell;
pub use notification_bell::NotificationBell;

mod badges;
pub use badges::{Avatar, MemberRow, PriorityBadge, StateBadge, TagChip};

mod board_card;
pub use board_card::BoardCard;

mod card_tile;
pub use card_tile::CardTile;
