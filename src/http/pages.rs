use crate::http::AppState;
use axum::extract::State;
use axum::response::Html;

const HOME: &str = include_str!("pages/home.html");
const SHARE: &str = include_str!("pages/share.html");
const DASHBOARD: &str = include_str!("pages/dashboard.html");

const API_PREFIX_PLACEHOLDER: &str = "{{api_prefix}}";

/// The HTML documents, rendered once for the configured API prefix.
#[derive(Debug)]
pub struct Pages {
    home: String,
    share: String,
    dashboard: String,
}

impl Pages {
    pub fn render(api_prefix: &str) -> Self {
        let render = |template: &str| template.replace(API_PREFIX_PLACEHOLDER, api_prefix);

        Pages {
            home: render(HOME),
            share: render(SHARE),
            dashboard: render(DASHBOARD),
        }
    }
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(state.pages.home.clone())
}

pub async fn share(State(state): State<AppState>) -> Html<String> {
    Html(state.pages.share.clone())
}

pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(state.pages.dashboard.clone())
}
