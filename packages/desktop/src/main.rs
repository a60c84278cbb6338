use dioxus::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use views::{
    AppLayout, BoardDetail, BoardSettings, Boards, CardDetail, EditCard, Login, NewBoard, NewCard,
    Notifications, Register,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(AppLayout)]
        #[route("/boards")]
        Boards {},
        #[route("/boards/new")]
        NewBoard {},
        #[route("/boards/:id")]
        BoardDetail { id: i64 },
        #[route("/boards/:id/settings")]
        BoardSettings { id: i64 },
        #[route("/boards/:board_id/cards/new")]
        NewCard { board_id: i64 },
        #[route("/boards/:board_id/cards/:card_id")]
        CardDetail { board_id: i64, card_id: i64 },
        #[route("/boards/:board_id/cards/:card_id/edit")]
        EditCard { board_id: i64, card_id: i64 },
        #[route("/notifications")]
        Notifications {},
}

const FAVICON: Asset = asset!("/assets/favicon.svg");
const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter)
        .init();
    tracing::info!(config = %ui::load_config().base_url(), "starting desktop client");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(ui::load_config);
    use_context_provider(|| Signal::new(ui::AlertLog::default()));

    rsx! {
        // Global app resources
        document::Link { rel: "icon", href: FAVICON }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        ui::AuthProvider {
            Router::<Route> {}
        }
    }
}

/// Redirect `/` to the boards or the login page
#[component]
fn Root() -> Element {
    let auth = ui::use_auth();
    let nav = use_navigator();

    if !auth().loading {
        if auth().is_authenticated() {
            nav.replace(Route::Boards {});
        } else {
            nav.replace(Route::Login {});
        }
    }

    rsx! {}
}
