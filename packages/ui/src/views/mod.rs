mod modal_overlay;
pub use modal_overlay::{ConfirmDialog, ModalOverlay};

mod app_layout;
pub use app_layout::AppLayoutView;

mod login;
pub use login::LoginView;

mod register;
pub use register::RegisterView;

mod board_list;
pub use board_list::BoardListView;

mod new_board;
pub use new_board::NewBoardView;

mod board_detail;
pub use board_detail::BoardDetailView;

mod board_settings;
pub use board_settings::BoardSettingsView;

mod card_form;
pub use card_form::CardFormView;

mod card_detail;
pub use card_detail::CardDetailView;

mod notifications;
pub use notifications::NotificationsView;
