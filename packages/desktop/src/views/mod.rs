mod login;
pub use login::{Login, Register};

mod app_layout;
pub use app_layout::AppLayout;

mod boards;
pub use boards::{BoardDetail, BoardSettings, Boards, NewBoard};

mod cards;
pub use cards::{CardDetail, EditCard, NewCard};

mod notifications;
pub use notifications::Notifications;
